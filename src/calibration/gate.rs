use super::ingest::{CalibStatus, CalibrationEntry};
use crate::utils::errors::ErrorKind;
use serde::{Deserialize, Serialize};

/// Acceptance thresholds for calibration entries (spec §4.7 "Gate").
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CalibrationGateConfig {
    pub min_corr_allow: f64,
    pub max_corr_allow: f64,
    pub check_relative_error: bool,
    pub rel_t_max: f64,
    pub rel_p_max: f64,
    pub min_ok_cases: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectedEntry {
    pub case_id: String,
    pub reason: String,
}

/// Result of gating a calibration table (spec §4.7, §7 "failed ingest
/// yields an empty accepted set and a gate result whose code is
/// NonConverged"). `enabled` iff at least `min_ok_cases` entries survive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationGateResult {
    pub enabled: bool,
    pub accepted: Vec<CalibrationEntry>,
    pub rejected: Vec<RejectedEntry>,
    pub code: u32,
    pub message: String,
}

/// Gate each entry: it must already be `Ok` from ingest, its correction
/// must lie in `[min_corr_allow, max_corr_allow]`, and (if enabled) its
/// relative thrust/power error must not exceed the configured bounds. At
/// least `min_ok_cases` must remain for the result to be `enabled` (spec
/// §4.7).
pub fn gate_calibration(entries: &[CalibrationEntry], config: &CalibrationGateConfig) -> CalibrationGateResult {
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();

    for entry in entries {
        if entry.status != CalibStatus::Ok {
            rejected.push(RejectedEntry { case_id: entry.case_id.clone(), reason: "ingest marked InvalidInput".into() });
            continue;
        }
        if !(entry.correction_thrust >= config.min_corr_allow && entry.correction_thrust <= config.max_corr_allow) {
            rejected.push(RejectedEntry {
                case_id: entry.case_id.clone(),
                reason: format!("correction_thrust {} outside [{}, {}]", entry.correction_thrust, config.min_corr_allow, config.max_corr_allow),
            });
            continue;
        }
        if !(entry.correction_power >= config.min_corr_allow && entry.correction_power <= config.max_corr_allow) {
            rejected.push(RejectedEntry {
                case_id: entry.case_id.clone(),
                reason: format!("correction_power {} outside [{}, {}]", entry.correction_power, config.min_corr_allow, config.max_corr_allow),
            });
            continue;
        }
        if config.check_relative_error {
            let rel_t = (entry.t_cfd_n - entry.t_bemt_n).abs() / entry.t_bemt_n;
            let rel_p = (entry.p_cfd_w - entry.p_bemt_w).abs() / entry.p_bemt_w;
            if rel_t > config.rel_t_max {
                rejected.push(RejectedEntry { case_id: entry.case_id.clone(), reason: format!("relative thrust error {} exceeds {}", rel_t, config.rel_t_max) });
                continue;
            }
            if rel_p > config.rel_p_max {
                rejected.push(RejectedEntry { case_id: entry.case_id.clone(), reason: format!("relative power error {} exceeds {}", rel_p, config.rel_p_max) });
                continue;
            }
        }
        accepted.push(entry.clone());
    }

    if accepted.len() >= config.min_ok_cases {
        CalibrationGateResult { enabled: true, accepted, rejected, code: 0, message: String::new() }
    } else {
        CalibrationGateResult {
            enabled: false,
            accepted: Vec::new(),
            rejected,
            code: ErrorKind::NonConverged.code(),
            message: "Insufficient CFD samples after gating".to_string(),
        }
    }
}
