use super::ingest::CalibrationEntry;
use crate::closeout::CloseoutRow;
use serde::{Deserialize, Serialize};

/// `closeout.csv` columns plus corrected thrust/power (spec §6
/// `corrected_closeout.csv`). Calibration idempotence (spec §8 property 9):
/// applying corrections of exactly `1.0` leaves `corr_*` equal to the
/// uncorrected values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectedCloseoutRow {
    pub case_id: String,
    pub cfd_corr_t: f64,
    pub cfd_corr_p: f64,
    pub corr_hover_t_n: f64,
    pub corr_hover_p_w: f64,
    pub corr_fwd_t_n: f64,
    pub corr_fwd_p_w: f64,
}

/// Multiply hover/forward thrust and power by the matched accepted
/// correction, defaulting to `1.0` when no entry applies to this
/// `case_id` (spec §4.7 "Apply").
pub fn apply_calibration(row: &CloseoutRow, accepted: &[CalibrationEntry]) -> CorrectedCloseoutRow {
    let matched = accepted.iter().find(|e| e.case_id == row.case_id);
    let (corr_t, corr_p) = matched.map_or((1.0, 1.0), |e| (e.correction_thrust, e.correction_power));

    CorrectedCloseoutRow {
        case_id: row.case_id.clone(),
        cfd_corr_t: corr_t,
        cfd_corr_p: corr_p,
        corr_hover_t_n: row.hover_thrust_n * corr_t,
        corr_hover_p_w: row.hover_power_w * corr_p,
        corr_fwd_t_n: row.fwd_thrust_n * corr_t,
        corr_fwd_p_w: row.fwd_power_w * corr_p,
    }
}
