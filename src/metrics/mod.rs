pub mod disk;
pub mod drag;
pub mod maneuver;
pub mod mass;

pub use disk::{disk_loading, effective_disk_area, induced_power_ideal, DiskSpec, OverlapPair};
pub use drag::{check_boom_removal_consistency, compare_drag, parasite_power_w, total_cds, DragDelta, DragItem};
pub use maneuver::{compute_maneuverability, ManeuverConfig, ManeuverMetrics, ManeuverReq, RotorAuthority};
pub use mass::{compare_ledgers, compute_totals, InertiaDiag, MassDelta, MassItem, MassTotals};
