pub const GRAVITY: f64 = 9.80665; // m/s^2

/// FNV-1a 64-bit offset basis / prime (see `utils::math::fnv1a64`).
pub const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
pub const FNV_PRIME: u64 = 0x100000001b3;

/// Floor applied to the Prandtl tip-loss factor to avoid a singular thrust
/// gradient near the blade tip.
pub const TIP_LOSS_FLOOR: f64 = 1.0e-3;

/// Floor applied to blade-station spacing (`dr`) before integration.
pub const MIN_STATION_SPACING: f64 = 1.0e-6;

/// Small epsilon guarding `atan2`/division denominators in the BEMT kernel.
pub const VELOCITY_EPSILON: f64 = 1.0e-9;

pub const MAX_FIGURE_OF_MERIT: f64 = 1.5;
