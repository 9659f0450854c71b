use serde::{Deserialize, Serialize};

/// Status of a BEMT solve (spec §3 "BEMT result", §4.3 "Failure model").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BemtStatus {
    Ok,
    NonConverged,
    OutOfRange,
}

/// Per-station diagnostic breakdown, attached to a `BemtResult` for
/// inspection/sensitivity work (spec §3).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StationBreakdown {
    pub r: f64,
    pub dr: f64,
    pub phi_rad: f64,
    pub alpha_rad: f64,
    pub reynolds: f64,
    pub mach: f64,
    pub cl: f64,
    pub cd: f64,
    pub tip_loss_factor: f64,
    pub dthrust_n: f64,
    pub dtorque_nm: f64,
}

/// Output of a single BEMT solve (hover, trim, or forward-flight). Never
/// mutated after construction; non-finite fields mean "not computed" and
/// propagate per the NaN-is-unset discipline (spec §3, §8 property 1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BemtResult {
    pub status: BemtStatus,
    pub thrust_n: f64,
    pub torque_nm: f64,
    pub power_w: f64,
    pub induced_velocity_mps: f64,
    pub figure_of_merit: f64,
    pub residual: f64,
    pub inflow_iters: u32,
    pub trim_iters: u32,
    pub collective_rad: f64,
    pub stations: Vec<StationBreakdown>,
}

impl BemtResult {
    pub fn unset(status: BemtStatus, collective_rad: f64) -> Self {
        Self {
            status,
            thrust_n: f64::NAN,
            torque_nm: f64::NAN,
            power_w: f64::NAN,
            induced_velocity_mps: f64::NAN,
            figure_of_merit: f64::NAN,
            residual: f64::NAN,
            inflow_iters: 0,
            trim_iters: 0,
            collective_rad,
            stations: Vec::new(),
        }
    }
}
