use crate::artifact::{fmt_f64, pipe_join, CsvWriter};
use crate::bemt::{self, BemtResult, BemtStatus};
use crate::closeout::{evaluate_closeout, CloseoutConfig, CloseoutInputs, CloseoutRow, GateReport, GateStatus};
use crate::geometry::{Environment, OperatingPoint, PolarDatabase, RotorGeometry, SolverConfig};
use crate::sensitivity::{compute_sensitivities, SensitivityConfig, SensitivityReport};
use crate::utils::errors::EngineResult;

fn status_code(status: BemtStatus) -> u32 {
    match status {
        BemtStatus::Ok => 0,
        BemtStatus::NonConverged => 1,
        BemtStatus::OutOfRange => 2,
    }
}

/// Solve hover (and, if `fwd_op` is given, forward flight) for one case,
/// compute sensitivities about the hover baseline, and flatten into a
/// `CloseoutRow` (spec §2 "Control flow": geometry + environment +
/// operating point enter the BEMT solver, producing per-case rows).
pub fn run_case(
    case_id: &str,
    geometry: &RotorGeometry,
    environment: &Environment,
    hover_op: &OperatingPoint,
    fwd_op: Option<&OperatingPoint>,
    polars: &dyn PolarDatabase,
    config: &SolverConfig,
    sens_config: &SensitivityConfig,
) -> EngineResult<CloseoutRow> {
    let a_m2 = geometry.disk_area();
    let hover: BemtResult = bemt::solve(geometry, environment, hover_op, polars, config)?;
    let fwd = match fwd_op {
        Some(op) => Some(bemt::solve(geometry, environment, op, polars, config)?),
        None => None,
    };
    let sensitivity: SensitivityReport =
        compute_sensitivities(geometry, environment, hover_op, polars, config, sens_config)?;
    let k_t = crate::utils::safe_div(hover.thrust_n, environment.rho * a_m2 * hover_op.omega.powi(2), f64::NAN);
    let v_inplane = fwd_op.map_or(f64::NAN, |op| op.freestream_speed);

    Ok(CloseoutRow::build(case_id, a_m2, &hover, fwd.as_ref(), v_inplane, sensitivity, k_t))
}

/// Evaluate the closeout gates for `row` (spec §2 "Rows feed...the
/// closeout engine, which applies gates and emits a CloseoutRow").
pub fn run_gates(row: &CloseoutRow, config: &CloseoutConfig, inputs: &CloseoutInputs) -> GateReport {
    evaluate_closeout(row, config, inputs)
}

/// `closeout.csv` stable column order (spec §6).
pub fn closeout_csv_header() -> &'static [&'static str] {
    &[
        "case_id", "A_m2", "DL_N_m2", "hover_code", "hover_T_N", "hover_Q_Nm", "hover_P_W", "hover_vi_mps",
        "hover_FM", "hover_collective_rad", "hover_inflow_iters", "hover_trim_iters", "fwd_code", "V_inplane_mps",
        "fwd_T_N", "fwd_Q_Nm", "fwd_P_W", "fwd_vi_mps", "sens_omega_n_dT", "sens_omega_n_dP", "sens_collective_n_dT",
        "sens_collective_n_dP", "sens_rho_n_dT", "sens_rho_n_dP", "sens_radius_n_dT", "sens_radius_n_dP",
        "sens_chord_n_dT", "sens_chord_n_dP", "kT",
    ]
}

pub fn closeout_row_to_csv(row: &CloseoutRow) -> Vec<String> {
    vec![
        row.case_id.clone(),
        fmt_f64(row.a_m2),
        fmt_f64(row.dl_n_m2),
        status_code(row.hover_status).to_string(),
        fmt_f64(row.hover_thrust_n),
        fmt_f64(row.hover_torque_nm),
        fmt_f64(row.hover_power_w),
        fmt_f64(row.hover_vi_mps),
        fmt_f64(row.hover_fm),
        fmt_f64(row.hover_collective_rad),
        row.hover_inflow_iters.to_string(),
        row.hover_trim_iters.to_string(),
        row.fwd_status.map_or("nan".to_string(), |s| status_code(s).to_string()),
        fmt_f64(row.v_inplane_mps),
        fmt_f64(row.fwd_thrust_n),
        fmt_f64(row.fwd_torque_nm),
        fmt_f64(row.fwd_power_w),
        fmt_f64(row.fwd_vi_mps),
        fmt_f64(row.sensitivity.omega.n_dthrust),
        fmt_f64(row.sensitivity.omega.n_dpower),
        fmt_f64(row.sensitivity.collective.n_dthrust),
        fmt_f64(row.sensitivity.collective.n_dpower),
        fmt_f64(row.sensitivity.rho.n_dthrust),
        fmt_f64(row.sensitivity.rho.n_dpower),
        fmt_f64(row.sensitivity.radius.n_dthrust),
        fmt_f64(row.sensitivity.radius.n_dpower),
        fmt_f64(row.sensitivity.chord.n_dthrust),
        fmt_f64(row.sensitivity.chord.n_dpower),
        fmt_f64(row.k_t),
    ]
}

pub fn emit_closeout_csv(rows: &[CloseoutRow]) -> String {
    let mut w = CsvWriter::new(closeout_csv_header());
    for row in rows {
        w.push_row(closeout_row_to_csv(row));
    }
    w.finish()
}

/// `gonogo.csv`: `case_id, status, reasons_count, reasons_keys,
/// reasons_messages` (spec §6).
pub fn emit_gonogo_csv(reports: &[GateReport]) -> String {
    let mut w = CsvWriter::new(&["case_id", "status", "reasons_count", "reasons_keys", "reasons_messages"]);
    for report in reports {
        let failing: Vec<&crate::closeout::GateCheck> =
            report.checks.iter().filter(|c| c.status != GateStatus::Go).collect();
        let status = match report.verdict {
            GateStatus::Go => "Go",
            GateStatus::Warn => "Warn",
            GateStatus::NeedsData => "NeedsData",
            GateStatus::NoGo => "NoGo",
        };
        w.push_row(vec![
            report.case_id.clone(),
            status.to_string(),
            failing.len().to_string(),
            pipe_join(failing.iter().map(|c| c.id.as_str())),
            pipe_join(failing.iter().map(|c| c.note.as_str())),
        ]);
    }
    w.finish()
}
