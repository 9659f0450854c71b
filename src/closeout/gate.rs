use serde::{Deserialize, Serialize};

/// Terminal verdict of the closeout gate engine, ordered
/// `NoGo > NeedsData > Warn > Go` (spec §3 "Gate status", §4.6). The
/// aggregated verdict over a set of checks is the maximum under this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GateStatus {
    Go,
    Warn,
    NeedsData,
    NoGo,
}

/// Which side of `threshold` counts as a pass for a numeric gate (spec
/// §4.6 "leq/geq").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateRule {
    Leq,
    Geq,
}

impl GateRule {
    fn passes(self, value: f64, threshold: f64) -> bool {
        match self {
            GateRule::Leq => value <= threshold,
            GateRule::Geq => value >= threshold,
        }
    }
}

/// One evaluated gate (spec §4.6 `GateCheck{id, pass, value, threshold,
/// note}`). `status` is `Go` on pass, `NoGo` on a failed enabled gate, and
/// `NeedsData` when the gate is enabled but `value` is not finite.
/// `Unknown` gates (threshold not strictly positive) are recorded as
/// `status: Go` with `enabled: false` and never move the verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateCheck {
    pub id: String,
    pub enabled: bool,
    pub status: GateStatus,
    pub value: f64,
    pub threshold: f64,
    pub note: String,
}

/// Evaluate one numeric gate. A gate is enabled iff `threshold` is finite
/// and strictly positive (spec §9 Open Questions: "this spec unifies to
/// enabled iff strictly positive and finite"). A disabled gate is an
/// `Unknown` check and never influences the verdict.
pub fn eval_numeric_gate(id: &str, rule: GateRule, value: f64, threshold: f64) -> GateCheck {
    if !(threshold.is_finite() && threshold > 0.0) {
        return GateCheck {
            id: id.to_string(),
            enabled: false,
            status: GateStatus::Go,
            value,
            threshold,
            note: "disabled: threshold not strictly positive".to_string(),
        };
    }
    if !value.is_finite() {
        return GateCheck {
            id: id.to_string(),
            enabled: true,
            status: GateStatus::NeedsData,
            value,
            threshold,
            note: "value is NaN/Inf; cannot evaluate".to_string(),
        };
    }
    if rule.passes(value, threshold) {
        GateCheck {
            id: id.to_string(),
            enabled: true,
            status: GateStatus::Go,
            value,
            threshold,
            note: String::new(),
        }
    } else {
        let rel = match rule {
            GateRule::Leq => "<=",
            GateRule::Geq => ">=",
        };
        GateCheck {
            id: id.to_string(),
            enabled: true,
            status: GateStatus::NoGo,
            value,
            threshold,
            note: format!("{} violates {} {} {}", id, value, rel, threshold),
        }
    }
}

/// Evaluate a boolean gate (e.g. `COMPLIANCE.OK`). Always enabled.
pub fn eval_bool_gate(id: &str, ok: bool, note_on_fail: &str) -> GateCheck {
    GateCheck {
        id: id.to_string(),
        enabled: true,
        status: if ok { GateStatus::Go } else { GateStatus::NoGo },
        value: if ok { 1.0 } else { 0.0 },
        threshold: 1.0,
        note: if ok { String::new() } else { note_on_fail.to_string() },
    }
}

/// The aggregated verdict over a set of checks is the maximum status under
/// `NoGo > NeedsData > Warn > Go` (spec §8 property 2, "Gate precedence").
pub fn aggregate_verdict(checks: &[GateCheck]) -> GateStatus {
    checks.iter().map(|c| c.status).max().unwrap_or(GateStatus::Go)
}
