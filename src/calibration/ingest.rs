use crate::utils::errors::{EngineResult, ErrorKind};
use crate::{engine_err, here};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Outcome of ingesting one calibration row (spec §3 "Calibration entry").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalibStatus {
    Ok,
    InvalidInput,
}

/// `{case_id, T_cfd, P_cfd, T_bemt, P_bemt, correction_thrust,
/// correction_power, status}` (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationEntry {
    pub case_id: String,
    pub t_cfd_n: f64,
    pub p_cfd_w: f64,
    pub t_bemt_n: f64,
    pub p_bemt_w: f64,
    pub correction_thrust: f64,
    pub correction_power: f64,
    pub status: CalibStatus,
}

/// A case's BEMT baseline, looked up by `case_id` during ingest.
#[derive(Debug, Clone, Copy)]
pub struct BemtBaseline {
    pub t_bemt_n: f64,
    pub p_bemt_w: f64,
}

/// Parse `case_id,T_cfd_N,P_cfd_W` rows (header required, spec §6 "External
/// calibration file"). Empty lines are skipped; malformed rows are a
/// `ParseError`.
pub fn parse_calibration_csv(text: &str) -> EngineResult<Vec<(String, f64, f64)>> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let header = lines.next().ok_or_else(|| engine_err!(ErrorKind::ParseError, "empty calibration input"))?;
    let cols: Vec<&str> = header.split(',').map(str::trim).collect();
    if cols != ["case_id", "T_cfd_N", "P_cfd_W"] {
        return Err(engine_err!(ErrorKind::ParseError, "unexpected calibration header: {:?}", cols));
    }
    let mut rows = Vec::new();
    for (i, line) in lines.enumerate() {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != 3 {
            return Err(engine_err!(ErrorKind::ParseError, "row {} has {} fields, expected 3", i + 1, fields.len()));
        }
        let t_cfd: f64 = fields[1]
            .parse()
            .map_err(|_| engine_err!(ErrorKind::ParseError, "row {}: invalid T_cfd_N '{}'", i + 1, fields[1]))?;
        let p_cfd: f64 = fields[2]
            .parse()
            .map_err(|_| engine_err!(ErrorKind::ParseError, "row {}: invalid P_cfd_W '{}'", i + 1, fields[2]))?;
        rows.push((fields[0].to_string(), t_cfd, p_cfd));
    }
    Ok(rows)
}

/// Bounds correction multipliers are clamped into (spec §4.7 "Ingest").
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CorrectionBounds {
    pub min_corr: f64,
    pub max_corr: f64,
}

/// Build one `CalibrationEntry` per parsed row, matching against
/// `baselines` by `case_id`. Rows with no matching baseline, or a
/// non-finite/non-positive BEMT denominator, are `InvalidInput` and carry
/// `NaN` corrections rather than a computed (and meaningless) ratio (spec
/// §4.7 "For each row with matching baseline T_bemt and P_bemt...").
pub fn ingest_calibration(
    rows: &[(String, f64, f64)],
    baselines: &HashMap<String, BemtBaseline>,
    bounds: &CorrectionBounds,
) -> Vec<CalibrationEntry> {
    rows.iter()
        .map(|(case_id, t_cfd, p_cfd)| {
            let baseline = baselines.get(case_id);
            let valid_inputs = t_cfd.is_finite() && p_cfd.is_finite();
            match baseline {
                Some(b) if valid_inputs && b.t_bemt_n.is_finite() && b.t_bemt_n > 0.0 && b.p_bemt_w.is_finite() && b.p_bemt_w > 0.0 => {
                    let correction_thrust = (t_cfd / b.t_bemt_n).clamp(bounds.min_corr, bounds.max_corr);
                    let correction_power = (p_cfd / b.p_bemt_w).clamp(bounds.min_corr, bounds.max_corr);
                    CalibrationEntry {
                        case_id: case_id.clone(),
                        t_cfd_n: *t_cfd,
                        p_cfd_w: *p_cfd,
                        t_bemt_n: b.t_bemt_n,
                        p_bemt_w: b.p_bemt_w,
                        correction_thrust,
                        correction_power,
                        status: CalibStatus::Ok,
                    }
                }
                _ => CalibrationEntry {
                    case_id: case_id.clone(),
                    t_cfd_n: *t_cfd,
                    p_cfd_w: *p_cfd,
                    t_bemt_n: baseline.map_or(f64::NAN, |b| b.t_bemt_n),
                    p_bemt_w: baseline.map_or(f64::NAN, |b| b.p_bemt_w),
                    correction_thrust: f64::NAN,
                    correction_power: f64::NAN,
                    status: CalibStatus::InvalidInput,
                },
            }
        })
        .collect()
}
