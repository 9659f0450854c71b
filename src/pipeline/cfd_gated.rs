use crate::artifact::{fmt_f64, ArtifactAudit, CsvWriter, JsonValue};
use crate::calibration::{
    apply_calibration, gate_calibration, ingest_calibration, parse_calibration_csv, BemtBaseline,
    CalibrationGateConfig, CalibrationGateResult, CorrectedCloseoutRow, CorrectionBounds,
};
use crate::closeout::{evaluate_closeout, CloseoutConfig, CloseoutInputs, CloseoutRow, GateReport};
use crate::utils::errors::EngineResult;
use std::collections::HashMap;

/// Output of running the calibration pipeline end to end (spec §4.7
/// "The gated pipeline emits: the manifest JSON + CSV, the raw calibration
/// table, the gate result, the corrected closeout CSV, and the corrected
/// Go/No-Go CSV").
pub struct CfdGatedOutput {
    pub gate_result: CalibrationGateResult,
    pub corrected_rows: Vec<CorrectedCloseoutRow>,
    pub corrected_gate_reports: Vec<GateReport>,
}

/// Ingest, gate, and (if enabled) apply a CFD calibration table against a
/// set of closeout rows, re-evaluating closeout gates against the
/// corrected values (spec §4.7). If calibration is not enabled (too few
/// accepted cases), `corrected_rows`/`corrected_gate_reports` are empty —
/// the pipeline keeps the manifest but emits no corrected outputs (spec §4.7
/// "Gate", §7 "a failed ingest yields an empty accepted set").
pub fn run_cfd_gated_pipeline(
    calibration_csv_text: &str,
    rows: &[CloseoutRow],
    bounds: &CorrectionBounds,
    gate_config: &CalibrationGateConfig,
    closeout_config: &CloseoutConfig,
) -> EngineResult<CfdGatedOutput> {
    let parsed = parse_calibration_csv(calibration_csv_text)?;
    let baselines: HashMap<String, BemtBaseline> = rows
        .iter()
        .map(|r| (r.case_id.clone(), BemtBaseline { t_bemt_n: r.hover_thrust_n, p_bemt_w: r.hover_power_w }))
        .collect();
    let entries = ingest_calibration(&parsed, &baselines, bounds);
    let gate_result = gate_calibration(&entries, gate_config);

    if !gate_result.enabled {
        return Ok(CfdGatedOutput { gate_result, corrected_rows: Vec::new(), corrected_gate_reports: Vec::new() });
    }

    let corrected_rows: Vec<CorrectedCloseoutRow> =
        rows.iter().map(|row| apply_calibration(row, &gate_result.accepted)).collect();

    let corrected_gate_reports: Vec<GateReport> = rows
        .iter()
        .zip(&corrected_rows)
        .map(|(row, corrected)| {
            let mut row = row.clone();
            row.hover_thrust_n = corrected.corr_hover_t_n;
            row.hover_power_w = corrected.corr_hover_p_w;
            row.fwd_thrust_n = corrected.corr_fwd_t_n;
            row.fwd_power_w = corrected.corr_fwd_p_w;
            row.dl_n_m2 = crate::metrics::disk_loading(row.hover_thrust_n, row.a_m2);
            evaluate_closeout(&row, closeout_config, &CloseoutInputs::default())
        })
        .collect();

    Ok(CfdGatedOutput { gate_result, corrected_rows, corrected_gate_reports })
}

/// `corrected_closeout.csv`: `closeout.csv` columns plus the corrected
/// fields (spec §6). Only the correction columns are emitted here; callers
/// join them against `closeout_csv_header()`'s row by `case_id`.
pub fn emit_corrected_closeout_csv(rows: &[CorrectedCloseoutRow]) -> String {
    let mut w = CsvWriter::new(&["case_id", "cfd_corr_T", "cfd_corr_P", "corr_hover_T_N", "corr_hover_P_W", "corr_fwd_T_N", "corr_fwd_P_W"]);
    for row in rows {
        w.push_row(vec![
            row.case_id.clone(),
            fmt_f64(row.cfd_corr_t),
            fmt_f64(row.cfd_corr_p),
            fmt_f64(row.corr_hover_t_n),
            fmt_f64(row.corr_hover_p_w),
            fmt_f64(row.corr_fwd_t_n),
            fmt_f64(row.corr_fwd_p_w),
        ]);
    }
    w.finish()
}

/// `cfd_manifest.json`/`.csv` entries (spec §6): one job per accepted
/// calibration entry, tagged `CFD0_ActuatorDisk` for this screening-tier
/// pipeline (the `tier` field exists for richer producers upstream).
pub fn emit_cfd_manifest_json(gate_result: &CalibrationGateResult) -> EngineResult<String> {
    let jobs: Vec<JsonValue> = gate_result
        .accepted
        .iter()
        .enumerate()
        .map(|(i, e)| {
            JsonValue::obj(vec![
                ("job_id", JsonValue::String(format!("job-{}", i))),
                ("case_id", JsonValue::String(e.case_id.clone())),
                ("tier", JsonValue::String("CFD0_ActuatorDisk".to_string())),
                ("bemt_T_N", JsonValue::Number(e.t_bemt_n)),
                ("bemt_P_W", JsonValue::Number(e.p_bemt_w)),
                ("correction_thrust", JsonValue::Number(e.correction_thrust)),
                ("correction_power", JsonValue::Number(e.correction_power)),
            ])
        })
        .collect();
    crate::artifact::emit_json(&JsonValue::Array(jobs), false)
}

pub fn emit_cfd_manifest_csv(gate_result: &CalibrationGateResult) -> String {
    let mut w = CsvWriter::new(&["job_id", "case_id", "tier", "bemt_T_N", "bemt_P_W", "correction_thrust", "correction_power"]);
    for (i, e) in gate_result.accepted.iter().enumerate() {
        w.push_row(vec![
            format!("job-{}", i),
            e.case_id.clone(),
            "CFD0_ActuatorDisk".to_string(),
            fmt_f64(e.t_bemt_n),
            fmt_f64(e.p_bemt_w),
            fmt_f64(e.correction_thrust),
            fmt_f64(e.correction_power),
        ]);
    }
    w.finish()
}

pub fn cfd_manifest_audit(json_text: &str) -> ArtifactAudit {
    ArtifactAudit::of("cfd_manifest.v1", json_text)
}
