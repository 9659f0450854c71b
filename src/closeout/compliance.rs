use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A compliance clause with required evidence keys (spec §6 "Compliance
/// clauses"). `mandatory` clauses must all pass for overall compliance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clause {
    pub id: String,
    pub title: String,
    pub source: String,
    pub mandatory: bool,
    pub required_evidence_keys: Vec<String>,
}

/// One piece of supporting evidence, keyed by name (spec §6 "Evidence").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evidence {
    pub key: String,
    pub value: f64,
    pub unit: String,
    pub source: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClauseResult {
    pub id: String,
    pub pass: bool,
    pub missing_keys: Vec<String>,
}

/// Evaluate one clause: passes iff every required evidence key resolves to
/// a finite value (spec §4.6 "Compliance evaluation walks an input list of
/// clauses...a clause passes iff every required key resolves to a finite
/// evidence value").
pub fn evaluate_clause(clause: &Clause, evidence: &HashMap<String, f64>) -> ClauseResult {
    let missing_keys: Vec<String> = clause
        .required_evidence_keys
        .iter()
        .filter(|key| !evidence.get(*key).is_some_and(|v| v.is_finite()))
        .cloned()
        .collect();
    ClauseResult { id: clause.id.clone(), pass: missing_keys.is_empty(), missing_keys }
}

/// Overall compliance is the conjunction of all mandatory clauses (spec
/// §4.6). Non-mandatory clauses are still evaluated and returned but do
/// not affect `overall_ok`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub overall_ok: bool,
    pub clauses: Vec<ClauseResult>,
}

pub fn evaluate_compliance(clauses: &[Clause], evidence_list: &[Evidence]) -> ComplianceReport {
    let evidence: HashMap<String, f64> =
        evidence_list.iter().map(|e| (e.key.clone(), e.value)).collect();
    let results: Vec<ClauseResult> = clauses.iter().map(|c| evaluate_clause(c, &evidence)).collect();
    let overall_ok = clauses
        .iter()
        .zip(results.iter())
        .filter(|(c, _)| c.mandatory)
        .all(|(_, r)| r.pass);
    ComplianceReport { overall_ok, clauses: results }
}
