use crate::montecarlo::ecdf::Ecdf;
use crate::utils::errors::EngineResult;
use serde::{Deserialize, Serialize};

/// Online summary moments over a finite sample set (spec §2 "Stats hooks").
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Moments {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub stddev: f64,
}

/// Count/min/max/mean/sample-stdev over finite samples; `NaN` fields when
/// `samples` is empty (spec §4.5 "per-metric summary").
pub fn compute_moments(samples: &[f64]) -> Moments {
    let n = samples.len();
    if n == 0 {
        return Moments { count: 0, min: f64::NAN, max: f64::NAN, mean: f64::NAN, stddev: f64::NAN };
    }
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    for &v in samples {
        min = min.min(v);
        max = max.max(v);
        sum += v;
    }
    let mean = sum / n as f64;
    let stddev = if n > 1 {
        let var = samples.iter().map(|&v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        var.sqrt()
    } else {
        0.0
    };
    Moments { count: n, min, max, mean, stddev }
}

/// Which side of a threshold counts as a pass (spec §4.5 "gates",
/// §4.6 "leq/geq").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparator {
    Geq,
    Leq,
}

/// `P(metric Geq/Leq threshold)` over a finalized ECDF (spec §4.5).
pub fn pass_probability(ecdf: &Ecdf, comparator: Comparator, threshold: f64) -> EngineResult<f64> {
    match comparator {
        Comparator::Geq => {
            // P(X >= t) = 1 - P(X < t) ~= ccdf at the value just below t for
            // a discrete empirical sample set; use `1 - cdf(t) + P(X == t)`
            // approximated by treating the boundary as inclusive via ccdf of
            // the predecessor. For empirical data, `1 - cdf(t_exclusive)` is
            // exact when computed from the complement of strictly-less-than.
            let below = ecdf.samples().iter().filter(|&&x| x < threshold).count();
            Ok(if ecdf.is_empty() { f64::NAN } else { 1.0 - (below as f64 / ecdf.len() as f64) })
        }
        Comparator::Leq => ecdf.cdf(threshold),
    }
}
