use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Severity of one recorded issue (spec §3 "Issue").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueKind {
    Info,
    Warn,
    NeedsData,
    Error,
}

/// `{kind, code, message, context}` (spec §3). `context` is typically the
/// `case_id` or gate id the issue was raised against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub kind: IssueKind,
    pub code: u32,
    pub message: String,
    pub context: String,
}

/// Append-only issue log with a de-duplication key of `(kind, code,
/// context)` so re-running evaluation with unchanged inputs appends no new
/// issues (spec §8 property 3, "Issue idempotence").
#[derive(Debug, Clone, Default)]
pub struct IssueLog {
    issues: Vec<Issue>,
    seen: HashSet<(IssueKind, u32, String)>,
}

impl IssueLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `issue` unless its `(kind, code, context)` key was already
    /// seen. Returns `true` if it was newly recorded.
    pub fn push(&mut self, issue: Issue) -> bool {
        let key = (issue.kind, issue.code, issue.context.clone());
        if self.seen.insert(key) {
            self.issues.push(issue);
            true
        } else {
            false
        }
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

/// A known set of `(code, expected kind)` pairs; used to validate that
/// every emitted issue's code belongs to a known catalog entry and that
/// its severity matches (spec §4.6 "issue catalog").
#[derive(Debug, Clone, Default)]
pub struct IssueCatalog {
    entries: std::collections::HashMap<u32, IssueKind>,
}

impl IssueCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, code: u32, kind: IssueKind) -> &mut Self {
        self.entries.insert(code, kind);
        self
    }

    /// `Ok(())` iff `issue.code` is registered and its kind matches.
    pub fn check(&self, issue: &Issue) -> Result<(), String> {
        match self.entries.get(&issue.code) {
            None => Err(format!("issue code {} is not in the catalog", issue.code)),
            Some(expected) if *expected != issue.kind => {
                Err(format!("issue code {} expected kind {:?}, got {:?}", issue.code, expected, issue.kind))
            }
            Some(_) => Ok(()),
        }
    }

    /// Invariant: no `Go`-implying issue coexists with a `NoGo` summary
    /// issue for the same context (spec §4.6 "no Go gate contradicts a NoGo
    /// summary issue").
    pub fn check_no_contradiction(&self, issues: &[Issue]) -> Result<(), String> {
        for ctx_issues in group_by_context(issues) {
            let has_nogo = ctx_issues.iter().any(|i| i.kind == IssueKind::Error);
            let has_go_info = ctx_issues.iter().any(|i| i.kind == IssueKind::Info && i.message.contains("Go"));
            if has_nogo && has_go_info {
                return Err(format!("contradictory issues for context '{}'", ctx_issues[0].context));
            }
        }
        Ok(())
    }
}

fn group_by_context(issues: &[Issue]) -> Vec<Vec<&Issue>> {
    let mut groups: std::collections::BTreeMap<&str, Vec<&Issue>> = std::collections::BTreeMap::new();
    for issue in issues {
        groups.entry(issue.context.as_str()).or_default().push(issue);
    }
    groups.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_push_is_idempotent() {
        let mut log = IssueLog::new();
        let issue = Issue { kind: IssueKind::Warn, code: 7, message: "m".into(), context: "case-1".into() };
        assert!(log.push(issue.clone()));
        assert!(!log.push(issue));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn catalog_rejects_unknown_code() {
        let catalog = IssueCatalog::new();
        let issue = Issue { kind: IssueKind::Error, code: 99, message: "m".into(), context: "c".into() };
        assert!(catalog.check(&issue).is_err());
    }

    #[test]
    fn catalog_accepts_registered_matching_kind() {
        let mut catalog = IssueCatalog::new();
        catalog.register(7, IssueKind::Warn);
        let issue = Issue { kind: IssueKind::Warn, code: 7, message: "m".into(), context: "c".into() };
        assert!(catalog.check(&issue).is_ok());
    }
}
