pub mod artifact;
pub mod bemt;
pub mod cache;
pub mod calibration;
pub mod closeout;
pub mod geometry;
pub mod metrics;
pub mod montecarlo;
pub mod pipeline;
pub mod polar;
pub mod sensitivity;
pub mod stats;
pub mod utils;

pub use bemt::{solve, BemtResult, BemtStatus};
pub use geometry::{Environment, FlightMode, OperatingPoint, PolarDatabase, RotorGeometry, SolverConfig};
pub use utils::errors::{EngineError, EngineResult, ErrorKind};
