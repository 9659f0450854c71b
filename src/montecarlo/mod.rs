pub mod distribution;
pub mod ecdf;

pub use distribution::Distribution;
pub use ecdf::Ecdf;

use crate::stats::{compute_moments, pass_probability, Comparator, Moments};
use crate::utils::errors::{EngineResult, ErrorKind};
use crate::utils::rng::RngManager;
use crate::{engine_err, here};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};

/// How a sample whose runner returned a non-`Ok` status is treated (spec
/// §4.5 "A sample whose runner returned a non-OK status is either counted
/// as failed or dropped, according to a configured policy").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    CountAsFailed,
    Drop,
}

#[derive(Debug, Clone, Copy)]
pub struct McConfig {
    pub n_samples: u32,
    pub master_seed: u64,
    pub failure_policy: FailurePolicy,
}

/// A pass/fail gate evaluated against a metric's ECDF (spec §4.5, §8 S3):
/// `P(metric comparator metric_threshold) comparator prob_threshold`, e.g.
/// `P(thrust_margin >= 0) >= 0.95`.
#[derive(Debug, Clone)]
pub struct Gate {
    pub metric: String,
    pub comparator: Comparator,
    pub metric_threshold: f64,
    pub prob_threshold: f64,
}

/// Moments plus standard quantile set for one metric's ECDF (spec §4.5
/// "per-metric summary").
#[derive(Debug, Clone, Copy)]
pub struct MetricSummary {
    pub moments: Moments,
    pub p10: f64,
    pub p50: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
}

#[derive(Debug, Clone)]
pub struct GateResult {
    pub metric: String,
    pub metric_threshold: f64,
    pub comparator: Comparator,
    pub probability: f64,
    pub prob_threshold: f64,
    pub pass: bool,
}

#[derive(Debug, Clone)]
pub struct McReport {
    pub summaries: BTreeMap<String, MetricSummary>,
    pub gates: Vec<GateResult>,
    pub eval_count: u32,
    pub failed_count: u32,
}

/// Runs `n_samples` draws of `variables` under `config.master_seed`,
/// passing each draw through `runner`, and accumulates the returned
/// metrics into per-metric ECDFs (spec §4.5). `runner` must be pure and
/// side-effect-free so sample evaluation can be parallelized with `rayon`
/// while per-sample seeds stay fixed to `(master_seed, sample_index)`
/// (spec §5).
pub fn run_monte_carlo<F>(
    variables: &[(String, Distribution)],
    config: &McConfig,
    gates: &[Gate],
    runner: F,
) -> EngineResult<McReport>
where
    F: Fn(&HashMap<String, f64>) -> EngineResult<HashMap<String, f64>> + Sync,
{
    if config.n_samples == 0 {
        return Err(engine_err!(ErrorKind::InvalidConfig, "n_samples must be > 0"));
    }
    for (name, dist) in variables {
        dist.validate().map_err(|e| {
            engine_err!(ErrorKind::InvalidConfig, "distribution for '{}' invalid: {}", name, e.message)
        })?;
    }

    let rng_manager = RngManager::new(config.master_seed);

    let draws: Vec<Option<HashMap<String, f64>>> = (0..config.n_samples)
        .into_par_iter()
        .map(|i| {
            let mut rng = rng_manager.rng_for_sample(i as u64);
            let inputs: HashMap<String, f64> =
                variables.iter().map(|(name, dist)| (name.clone(), dist.sample(&mut rng))).collect();
            match runner(&inputs) {
                Ok(metrics) => Some(metrics),
                Err(_) => match config.failure_policy {
                    FailurePolicy::CountAsFailed => Some(HashMap::new()),
                    FailurePolicy::Drop => None,
                },
            }
        })
        .collect();

    let failed_count = draws.iter().filter(|d| d.as_ref().is_some_and(HashMap::is_empty)).count() as u32;
    let eval_count = draws.iter().filter(|d| d.is_some()).count() as u32;

    let mut ecdfs: BTreeMap<String, Ecdf> = BTreeMap::new();
    for draw in draws.iter().flatten() {
        for (metric, value) in draw {
            ecdfs.entry(metric.clone()).or_default().push(*value)?;
        }
    }
    for ecdf in ecdfs.values_mut() {
        ecdf.finalize();
    }

    let mut summaries = BTreeMap::new();
    for (metric, ecdf) in &ecdfs {
        let moments = compute_moments(ecdf.samples());
        summaries.insert(
            metric.clone(),
            MetricSummary {
                moments,
                p10: ecdf.quantile(0.10)?,
                p50: ecdf.quantile(0.50)?,
                p90: ecdf.quantile(0.90)?,
                p95: ecdf.quantile(0.95)?,
                p99: ecdf.quantile(0.99)?,
            },
        );
    }

    let mut gate_results = Vec::with_capacity(gates.len());
    for gate in gates {
        let ecdf = ecdfs.get(&gate.metric).ok_or_else(|| {
            engine_err!(ErrorKind::InvalidInput, "gate references unknown metric '{}'", gate.metric)
        })?;
        let probability = pass_probability(ecdf, gate.comparator, gate.metric_threshold)?;
        gate_results.push(GateResult {
            metric: gate.metric.clone(),
            metric_threshold: gate.metric_threshold,
            comparator: gate.comparator,
            probability,
            prob_threshold: gate.prob_threshold,
            pass: probability.is_finite() && probability >= gate.prob_threshold,
        });
    }

    Ok(McReport { summaries, gates: gate_results, eval_count, failed_count })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s3_two_gates_report_probability_and_eval_count() {
        let variables = vec![
            ("rho".to_string(), Distribution::Normal { mean: 1.225, std_dev: 0.03, truncate_lo: 1.10, truncate_hi: 1.35 }),
            ("omega".to_string(), Distribution::Normal { mean: 300.0, std_dev: 8.0, truncate_lo: 260.0, truncate_hi: 340.0 }),
        ];
        let config = McConfig { n_samples: 300, master_seed: 999, failure_policy: FailurePolicy::Drop };
        let gates = vec![
            Gate {
                metric: "thrust_margin".into(),
                comparator: Comparator::Geq,
                metric_threshold: 0.0,
                prob_threshold: 0.95,
            },
            Gate {
                metric: "power_margin".into(),
                comparator: Comparator::Geq,
                metric_threshold: 0.0,
                prob_threshold: 0.90,
            },
        ];
        let report = run_monte_carlo(&variables, &config, &gates, |inputs| {
            let rho = inputs["rho"];
            let omega = inputs["omega"];
            let mut out = HashMap::new();
            out.insert("thrust_margin".to_string(), rho * omega - 300.0);
            out.insert("power_margin".to_string(), omega - 250.0);
            Ok(out)
        })
        .unwrap();

        assert_eq!(report.gates.len(), 2);
        assert!(report.summaries.contains_key("thrust_margin"));
        assert!(report.eval_count <= 300);
    }

    #[test]
    fn dropped_failures_reduce_eval_count() {
        let variables = vec![("x".to_string(), Distribution::Uniform { lo: 0.0, hi: 1.0 })];
        let config = McConfig { n_samples: 20, master_seed: 1, failure_policy: FailurePolicy::Drop };
        let report = run_monte_carlo(&variables, &config, &[], |inputs| {
            if inputs["x"] > 0.5 {
                Err(crate::engine_err!(ErrorKind::DomainError, "x too large"))
            } else {
                let mut out = HashMap::new();
                out.insert("x".to_string(), inputs["x"]);
                Ok(out)
            }
        })
        .unwrap();
        assert!(report.eval_count < 20);
        assert_eq!(report.failed_count, 0);
    }
}
