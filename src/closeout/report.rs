use super::compliance::ComplianceReport;
use super::gate::{aggregate_verdict, eval_bool_gate, eval_numeric_gate, GateCheck, GateRule, GateStatus};
use crate::bemt::{BemtResult, BemtStatus};
use crate::metrics::{DragDelta, ManeuverMetrics};
use crate::sensitivity::SensitivityReport;
use serde::{Deserialize, Serialize};

/// Flattened per-case summary (spec §3 "Closeout row", §6 `closeout.csv`).
/// Built once from a hover solve, an optional forward-flight solve, and a
/// sensitivity report; mutated only during construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloseoutRow {
    pub case_id: String,
    pub a_m2: f64,
    pub dl_n_m2: f64,
    pub hover_status: BemtStatus,
    pub hover_thrust_n: f64,
    pub hover_torque_nm: f64,
    pub hover_power_w: f64,
    pub hover_vi_mps: f64,
    pub hover_fm: f64,
    pub hover_collective_rad: f64,
    pub hover_inflow_iters: u32,
    pub hover_trim_iters: u32,
    pub fwd_status: Option<BemtStatus>,
    pub v_inplane_mps: f64,
    pub fwd_thrust_n: f64,
    pub fwd_torque_nm: f64,
    pub fwd_power_w: f64,
    pub fwd_vi_mps: f64,
    pub sensitivity: SensitivityReport,
    pub k_t: f64,
}

impl CloseoutRow {
    pub fn build(
        case_id: impl Into<String>,
        a_m2: f64,
        hover: &BemtResult,
        fwd: Option<&BemtResult>,
        v_inplane_mps: f64,
        sensitivity: SensitivityReport,
        k_t: f64,
    ) -> Self {
        Self {
            case_id: case_id.into(),
            a_m2,
            dl_n_m2: crate::metrics::disk_loading(hover.thrust_n, a_m2),
            hover_status: hover.status,
            hover_thrust_n: hover.thrust_n,
            hover_torque_nm: hover.torque_nm,
            hover_power_w: hover.power_w,
            hover_vi_mps: hover.induced_velocity_mps,
            hover_fm: hover.figure_of_merit,
            hover_collective_rad: hover.collective_rad,
            hover_inflow_iters: hover.inflow_iters,
            hover_trim_iters: hover.trim_iters,
            fwd_status: fwd.map(|f| f.status),
            v_inplane_mps,
            fwd_thrust_n: fwd.map_or(f64::NAN, |f| f.thrust_n),
            fwd_torque_nm: fwd.map_or(f64::NAN, |f| f.torque_nm),
            fwd_power_w: fwd.map_or(f64::NAN, |f| f.power_w),
            fwd_vi_mps: fwd.map_or(f64::NAN, |f| f.induced_velocity_mps),
            sensitivity,
            k_t,
        }
    }
}

/// Closeout gate thresholds (spec §4.6 "representative gate list"). Every
/// field is enabled iff strictly positive and finite.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CloseoutConfig {
    pub mass_delta_max_kg: f64,
    pub a_total_min_m2: f64,
    pub disk_loading_max_n_m2: f64,
    pub hover_power_max_w: f64,
    pub cds_max_m2: f64,
    pub p_parasite_max_w: f64,
    pub yaw_margin_min: f64,
    pub roll_margin_min: f64,
    pub pitch_margin_min: f64,
    pub turn_radius_max_m: f64,
    pub sync_margin_min: f64,
    pub fm_min: f64,
    pub require_compliance_ok: bool,
}

/// Ancillary per-case inputs the closeout engine consults alongside the
/// `CloseoutRow` (spec §4.6: "a closeout row plus external ancillary
/// reports"). Any missing optional input yields `NeedsData` for the gates
/// that depend on it, never a silent `Go`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CloseoutInputs<'a> {
    pub mass_delta_kg: Option<f64>,
    pub drag: Option<&'a DragDelta>,
    pub maneuver: Option<&'a ManeuverMetrics>,
    pub sync_margin: Option<f64>,
    pub compliance: Option<&'a ComplianceReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateReport {
    pub case_id: String,
    pub verdict: GateStatus,
    pub checks: Vec<GateCheck>,
}

/// Evaluate the representative gate list against `row` and `inputs` (spec
/// §4.6). `A_total`/`disk_loading`/hover power gates use hover-solver
/// outputs directly; anything non-finite is caught by `eval_numeric_gate`
/// as `NeedsData`, never inferred as `Go`.
pub fn evaluate_closeout(row: &CloseoutRow, config: &CloseoutConfig, inputs: &CloseoutInputs) -> GateReport {
    let mut checks = Vec::new();

    checks.push(eval_numeric_gate(
        "MASS.DELTA_MAX_KG",
        GateRule::Leq,
        inputs.mass_delta_kg.unwrap_or(f64::NAN),
        config.mass_delta_max_kg,
    ));
    checks.push(eval_numeric_gate("ROTOR.A_TOTAL_MIN_M2", GateRule::Geq, row.a_m2, config.a_total_min_m2));
    checks.push(eval_numeric_gate(
        "ROTOR.DISK_LOADING_MAX",
        GateRule::Leq,
        row.dl_n_m2,
        config.disk_loading_max_n_m2,
    ));
    checks.push(eval_numeric_gate(
        "POWER.HOVER_1G_MAX_W",
        GateRule::Leq,
        row.hover_power_w,
        config.hover_power_max_w,
    ));
    // hover_fm is NaN outside hover/V_axial~=0 (figure_of_merit), so this is
    // naturally NeedsData rather than Go when FM isn't meaningful for the case.
    checks.push(eval_numeric_gate("BEMT.FM_MIN", GateRule::Geq, row.hover_fm, config.fm_min));

    let (cds, p_par) = inputs.drag.map_or((f64::NAN, f64::NAN), |d| (d.cds_cand_m2, d.power_cand_w));
    checks.push(eval_numeric_gate("DRAG.CDS_MAX_M2", GateRule::Leq, cds, config.cds_max_m2));
    checks.push(eval_numeric_gate("DRAG.P_PARASITE_MAX_W", GateRule::Leq, p_par, config.p_parasite_max_w));

    let (yaw_m, roll_m, pitch_m, turn_r) = inputs
        .maneuver
        .map_or((f64::NAN, f64::NAN, f64::NAN, f64::NAN), |m| (m.yaw_margin, m.roll_margin, m.pitch_margin, m.turn_radius_m));
    checks.push(eval_numeric_gate("MANEUVER.YAW_MARGIN_MIN", GateRule::Geq, yaw_m, config.yaw_margin_min));
    checks.push(eval_numeric_gate("MANEUVER.ROLL_MARGIN_MIN", GateRule::Geq, roll_m, config.roll_margin_min));
    checks.push(eval_numeric_gate("MANEUVER.PITCH_MARGIN_MIN", GateRule::Geq, pitch_m, config.pitch_margin_min));
    checks.push(eval_numeric_gate("MANEUVER.TURN_RADIUS_MAX_M", GateRule::Leq, turn_r, config.turn_radius_max_m));

    checks.push(eval_numeric_gate(
        "SYNC.MARGIN_MIN",
        GateRule::Geq,
        inputs.sync_margin.unwrap_or(f64::NAN),
        config.sync_margin_min,
    ));

    if config.require_compliance_ok {
        let ok = inputs.compliance.is_some_and(|c| c.overall_ok);
        checks.push(eval_bool_gate("COMPLIANCE.OK", ok, "mandatory compliance clause failed or evidence missing"));
    }

    let verdict = aggregate_verdict(&checks);
    GateReport { case_id: row.case_id.clone(), verdict, checks }
}
