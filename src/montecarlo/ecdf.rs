use crate::utils::errors::{EngineResult, ErrorKind};
use crate::{engine_err, here};

/// A monotonically growing sample vector that becomes sorted once
/// finalized (spec §3 "Empirical CDF"). `push` is only valid before
/// `finalize`; quantiles and cdf/ccdf queries are only valid after.
#[derive(Debug, Clone, Default)]
pub struct Ecdf {
    samples: Vec<f64>,
    finalized: bool,
}

impl Ecdf {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one finite sample. Non-finite samples are dropped (spec §3
    /// "Aggregators ignore NaN samples rather than corrupt stats").
    pub fn push(&mut self, value: f64) -> EngineResult<()> {
        if self.finalized {
            return Err(engine_err!(ErrorKind::InvalidInput, "cannot push to a finalized Ecdf"));
        }
        if value.is_finite() {
            self.samples.push(value);
        }
        Ok(())
    }

    pub fn finalize(&mut self) {
        if !self.finalized {
            self.samples.sort_by(|a, b| a.partial_cmp(b).expect("finite samples are totally ordered"));
            self.finalized = true;
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// `P(X <= x)` over the finalized sample set.
    pub fn cdf(&self, x: f64) -> EngineResult<f64> {
        self.require_finalized()?;
        if self.samples.is_empty() {
            return Ok(f64::NAN);
        }
        let count = self.samples.partition_point(|&s| s <= x);
        Ok(count as f64 / self.samples.len() as f64)
    }

    pub fn ccdf(&self, x: f64) -> EngineResult<f64> {
        Ok(1.0 - self.cdf(x)?)
    }

    /// Linearly interpolated quantile at `p in [0,1]`.
    pub fn quantile(&self, p: f64) -> EngineResult<f64> {
        self.require_finalized()?;
        if self.samples.is_empty() {
            return Ok(f64::NAN);
        }
        if !(0.0..=1.0).contains(&p) {
            return Err(engine_err!(ErrorKind::InvalidInput, "quantile p must be in [0,1], got {}", p));
        }
        let n = self.samples.len();
        if n == 1 {
            return Ok(self.samples[0]);
        }
        let pos = p * (n - 1) as f64;
        let lo = pos.floor() as usize;
        let hi = pos.ceil() as usize;
        let frac = pos - lo as f64;
        Ok(self.samples[lo] + (self.samples[hi] - self.samples[lo]) * frac)
    }

    fn require_finalized(&self) -> EngineResult<()> {
        if !self.finalized {
            return Err(engine_err!(ErrorKind::InvalidInput, "Ecdf must be finalized before query"));
        }
        Ok(())
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }
}
