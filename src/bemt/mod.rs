pub mod forward;
pub mod hover;
pub mod kernel;
pub mod result;
pub mod trim;

pub use forward::solve_forward;
pub use hover::{solve_hover, solve_hover_at};
pub use result::{BemtResult, BemtStatus, StationBreakdown};
pub use trim::trim_to_thrust;

use crate::geometry::{Environment, FlightMode, OperatingPoint, PolarDatabase, RotorGeometry, SolverConfig};
use crate::utils::errors::EngineResult;

/// Dispatches an operating point to the right solver entry point: collective
/// trim when `target_thrust_n` is set (hover-based bisection), otherwise
/// hover or forward flight per `op.mode` (spec §4.3).
pub fn solve(
    geometry: &RotorGeometry,
    environment: &Environment,
    op: &OperatingPoint,
    polars: &dyn PolarDatabase,
    config: &SolverConfig,
) -> EngineResult<BemtResult> {
    if op.target_thrust_n.is_some() {
        return trim_to_thrust(geometry, environment, op, polars, config);
    }
    match op.mode {
        FlightMode::Hover => solve_hover(geometry, environment, op, polars, config),
        FlightMode::Forward => solve_forward(geometry, environment, op, polars, config),
    }
}
