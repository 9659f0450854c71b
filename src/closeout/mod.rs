pub mod compliance;
pub mod gate;
pub mod issue;
pub mod report;

pub use compliance::{evaluate_compliance, Clause, ClauseResult, ComplianceReport, Evidence};
pub use gate::{aggregate_verdict, eval_bool_gate, eval_numeric_gate, GateCheck, GateRule, GateStatus};
pub use issue::{Issue, IssueCatalog, IssueKind, IssueLog};
pub use report::{evaluate_closeout, CloseoutConfig, CloseoutInputs, CloseoutRow, GateReport};
