//! Where check findings go.

use serde::Serialize;

use crate::issue::{Issue, Severity};

/// Receives issues as the check finds them.
pub trait DiagnosticSink {
    fn report(&mut self, issue: Issue);
}

impl DiagnosticSink for Vec<Issue> {
    fn report(&mut self, issue: Issue) {
        self.push(issue);
    }
}

/// Collected issues of one check run, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    issues: Vec<Issue>,
}

impl CheckReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.with_severity(Severity::Warning)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.with_severity(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// Whether any issue was produced by the given rule.
    pub fn has_rule(&self, rule_id: &str) -> bool {
        self.issues.iter().any(|issue| issue.rule_id() == rule_id)
    }

    fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(move |issue| issue.severity() == severity)
    }
}

impl DiagnosticSink for CheckReport {
    fn report(&mut self, issue: Issue) {
        tracing::debug!(rule = issue.rule_id(), severity = %issue.severity(), "{issue}");
        self.issues.push(issue);
    }
}
