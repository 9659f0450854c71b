pub mod cfd_gated;
pub mod closeout_runner;
pub mod mc_integration;

pub use cfd_gated::{
    cfd_manifest_audit, emit_cfd_manifest_csv, emit_cfd_manifest_json, emit_corrected_closeout_csv,
    run_cfd_gated_pipeline, CfdGatedOutput,
};
pub use closeout_runner::{closeout_csv_header, closeout_row_to_csv, emit_closeout_csv, emit_gonogo_csv, run_case, run_gates};
pub use mc_integration::{emit_prob_gates_csv, emit_prob_summary_csv, run_mc_cases, McCase};
