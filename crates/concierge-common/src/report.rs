//! Typed action reports
//!
//! Every synchronizer records what it did to a record in an [`ActionReport`].
//! Reports for one configuration section are collected into a
//! [`SectionReport`], which renders as a single whitespace-normalized line.

use crate::error::ValidationError;
use crate::resource_kind::ResourceKind;

/// Text shown for a record (or scope) that needed no remediation
pub const NO_OP_MARKER: &str = "is ok,";

/// What an action did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ActionKind {
    Info,
    Created,
    Updated,
    Deleted,
    Warning,
    Error,
}

/// One entry of an [`ActionReport`]
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Action { kind: ActionKind, message: String },
    /// Nested report labelled with e.g. a region name
    Scope { label: String, report: ActionReport },
}

/// Ordered record of the remediation performed for one record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionReport {
    entries: Vec<Entry>,
}

impl ActionReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: ActionKind, message: impl Into<String>) {
        self.entries.push(Entry::Action {
            kind,
            message: message.into(),
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(ActionKind::Info, message);
    }

    pub fn created(&mut self, message: impl Into<String>) {
        self.push(ActionKind::Created, message);
    }

    pub fn updated(&mut self, message: impl Into<String>) {
        self.push(ActionKind::Updated, message);
    }

    pub fn deleted(&mut self, message: impl Into<String>) {
        self.push(ActionKind::Deleted, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(ActionKind::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(ActionKind::Error, message);
    }

    /// Append a nested report under `label`.
    pub fn scope(&mut self, label: impl Into<String>, report: ActionReport) {
        self.entries.push(Entry::Scope {
            label: label.into(),
            report,
        });
    }

    /// Append every entry of `other`.
    pub fn extend(&mut self, other: ActionReport) {
        self.entries.extend(other.entries);
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// True when nothing was done: no actions, and all scopes are no-ops.
    pub fn is_noop(&self) -> bool {
        self.entries.iter().all(|entry| match entry {
            Entry::Action { .. } => false,
            Entry::Scope { report, .. } => report.is_noop(),
        })
    }

    pub fn has_errors(&self) -> bool {
        self.count(ActionKind::Error) > 0
    }

    /// Number of actions of `kind`, including those in nested scopes.
    pub fn count(&self, kind: ActionKind) -> usize {
        self.actions().filter(|(k, _)| *k == kind).count()
    }

    /// Depth-first iterator over every action.
    pub fn actions(&self) -> impl Iterator<Item = (ActionKind, &str)> + '_ {
        let mut out = Vec::new();
        self.collect_actions(&mut out);
        out.into_iter()
    }

    fn collect_actions<'a>(&'a self, out: &mut Vec<(ActionKind, &'a str)>) {
        for entry in &self.entries {
            match entry {
                Entry::Action { kind, message } => out.push((*kind, message.as_str())),
                Entry::Scope { report, .. } => report.collect_actions(out),
            }
        }
    }

    /// Render as space-separated text; a no-op report renders as the marker.
    pub fn render(&self) -> String {
        if self.is_noop() {
            return NO_OP_MARKER.to_string();
        }
        let parts: Vec<String> = self
            .entries
            .iter()
            .map(|entry| match entry {
                Entry::Action { message, .. } => message.clone(),
                Entry::Scope { label, report } => format!("{label} {}", report.render()),
            })
            .collect();
        normalize(&parts.join(" "))
    }
}

/// Report for one configuration record
#[derive(Debug, Clone, PartialEq)]
pub struct RecordReport {
    /// Record identity shown before its actions (e.g. the role name)
    pub subject: Option<String>,
    pub report: ActionReport,
}

impl RecordReport {
    pub fn new(subject: impl Into<String>, report: ActionReport) -> Self {
        Self {
            subject: Some(subject.into()),
            report,
        }
    }

    /// A record rejected before any remote call.
    pub fn invalid(error: &ValidationError) -> Self {
        let mut report = ActionReport::new();
        report.error(error.to_string());
        Self {
            subject: None,
            report,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.report.is_noop()
    }

    pub fn render(&self) -> String {
        match &self.subject {
            Some(subject) => normalize(&format!("{subject} {}", self.report.render())),
            None => self.report.render(),
        }
    }
}

/// Aggregated reports for one configuration section
#[derive(Debug, Clone, PartialEq)]
pub struct SectionReport {
    pub kind: ResourceKind,
    pub records: Vec<RecordReport>,
}

impl SectionReport {
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            records: Vec::new(),
        }
    }

    pub fn push(&mut self, record: RecordReport) {
        self.records.push(record);
    }

    pub fn is_noop(&self) -> bool {
        self.records.iter().all(RecordReport::is_noop)
    }

    /// Records containing at least one error entry.
    pub fn failed_records(&self) -> usize {
        self.records.iter().filter(|r| r.report.has_errors()).count()
    }

    /// One output line for the section, whitespace-normalized.
    pub fn render_line(&self) -> String {
        let parts: Vec<String> = self.records.iter().map(RecordReport::render).collect();
        normalize(&parts.join(" "))
    }
}

fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
