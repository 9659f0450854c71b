pub mod apply;
pub mod gate;
pub mod ingest;

pub use apply::{apply_calibration, CorrectedCloseoutRow};
pub use gate::{gate_calibration, CalibrationGateConfig, CalibrationGateResult, RejectedEntry};
pub use ingest::{ingest_calibration, parse_calibration_csv, BemtBaseline, CalibStatus, CalibrationEntry, CorrectionBounds};
