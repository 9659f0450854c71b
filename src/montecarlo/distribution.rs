use crate::utils::errors::{EngineResult, ErrorKind};
use crate::{engine_err, here};
use rand::Rng;
use rand_distr::{Distribution as _, Normal};
use serde::{Deserialize, Serialize};

/// A sampled input variable (spec §4.5 "Monte Carlo"): normal with optional
/// truncation, or uniform as a degenerate normal (`std_dev = 0` truncated
/// to `[lo, hi]` reduces to a uniform draw over that interval in practice
/// only when paired with a truncation window; otherwise a dedicated
/// `Uniform` variant avoids rejection loops on a zero-width normal).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum Distribution {
    Normal { mean: f64, std_dev: f64, truncate_lo: f64, truncate_hi: f64 },
    Uniform { lo: f64, hi: f64 },
}

impl Distribution {
    pub fn validate(&self) -> EngineResult<()> {
        match self {
            Distribution::Normal { mean, std_dev, truncate_lo, truncate_hi } => {
                if !(mean.is_finite() && std_dev.is_finite() && *std_dev > 0.0) {
                    return Err(engine_err!(
                        ErrorKind::InvalidConfig,
                        "Normal distribution requires finite mean and std_dev > 0"
                    ));
                }
                if !(truncate_lo.is_finite() && truncate_hi.is_finite() && truncate_lo < truncate_hi) {
                    return Err(engine_err!(
                        ErrorKind::InvalidConfig,
                        "Normal distribution truncation bounds must be finite and ordered"
                    ));
                }
            }
            Distribution::Uniform { lo, hi } => {
                if !(lo.is_finite() && hi.is_finite() && lo < hi) {
                    return Err(engine_err!(
                        ErrorKind::InvalidConfig,
                        "Uniform distribution bounds must be finite and ordered"
                    ));
                }
            }
        }
        Ok(())
    }

    /// Draw one sample from `rng`. Truncated normals resample until the
    /// draw falls in range rather than clamping, so the realized
    /// distribution's shape is preserved within the window.
    pub fn sample(&self, rng: &mut impl Rng) -> f64 {
        match self {
            Distribution::Normal { mean, std_dev, truncate_lo, truncate_hi } => {
                let normal = Normal::new(*mean, *std_dev).expect("validated mean/std_dev");
                for _ in 0..1000 {
                    let x = normal.sample(rng);
                    if x >= *truncate_lo && x <= *truncate_hi {
                        return x;
                    }
                }
                mean.clamp(*truncate_lo, *truncate_hi)
            }
            Distribution::Uniform { lo, hi } => rng.gen_range(*lo..*hi),
        }
    }
}
