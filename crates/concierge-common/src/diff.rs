//! Structural diff of JSON-like documents
//!
//! Compares a live document against the desired one and returns the ordered
//! list of operations that would turn `current` into `desired`. The differ is
//! resource-agnostic: normalization such as single-element array collapsing
//! is the caller's job.

use crate::Document;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;

/// One step in a path through a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// Location of a value inside a document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path(Vec<Segment>);

impl Path {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    fn child(&self, segment: Segment) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment);
        Self(segments)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("$");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                Segment::Key(key) if i == 0 => write!(f, "{key}")?,
                Segment::Key(key) => write!(f, ".{key}")?,
                Segment::Index(idx) => write!(f, "[{idx}]")?,
            }
        }
        Ok(())
    }
}

/// Kind of structural change
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ChangeKind {
    /// Present in desired, absent in current
    Added,
    /// Present in current, absent in desired
    Removed,
    /// Present in both with a different value or type
    Changed,
}

/// A single difference between two documents
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeOp {
    pub kind: ChangeKind,
    pub path: Path,
    pub old: Option<Value>,
    pub new: Option<Value>,
}

impl fmt::Display for ChangeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ChangeKind::Added => write!(f, "+ {} = {}", self.path, show(&self.new)),
            ChangeKind::Removed => write!(f, "- {} = {}", self.path, show(&self.old)),
            ChangeKind::Changed => write!(
                f,
                "~ {}: {} -> {}",
                self.path,
                show(&self.old),
                show(&self.new)
            ),
        }
    }
}

fn show(value: &Option<Value>) -> String {
    value
        .as_ref()
        .map(Value::to_string)
        .unwrap_or_else(|| "null".to_string())
}

/// Compute the structural diff from `current` to `desired`.
///
/// Object keys are visited in sorted order and array elements index by
/// index, so the output is deterministic.
pub fn diff(current: &Document, desired: &Document) -> Vec<ChangeOp> {
    let mut ops = Vec::new();
    diff_at(&Path::root(), current, desired, &mut ops);
    ops
}

/// Two documents are equal iff their diff is empty.
pub fn documents_equal(current: &Document, desired: &Document) -> bool {
    diff(current, desired).is_empty()
}

/// Flat, one-level diff restricted to the top-level keys declared in
/// `desired`.
///
/// Keys the live document carries but the desired one does not mention are
/// ignored. Used for field sets such as the account password policy, where
/// the remote side reports more fields than a declaration needs to pin.
pub fn diff_fields(current: &Document, desired: &Document) -> Vec<ChangeOp> {
    let Some(wanted) = desired.as_object() else {
        return diff(current, desired);
    };
    let live = current.as_object();

    let mut ops = Vec::new();
    let keys: BTreeSet<&String> = wanted.keys().collect();
    for key in keys {
        let path = Path::root().child(Segment::Key(key.clone()));
        let new = &wanted[key];
        match live.and_then(|m| m.get(key)) {
            None => ops.push(ChangeOp {
                kind: ChangeKind::Added,
                path,
                old: None,
                new: Some(new.clone()),
            }),
            Some(old) if old != new => ops.push(ChangeOp {
                kind: ChangeKind::Changed,
                path,
                old: Some(old.clone()),
                new: Some(new.clone()),
            }),
            Some(_) => {}
        }
    }
    ops
}

fn diff_at(path: &Path, current: &Value, desired: &Value, ops: &mut Vec<ChangeOp>) {
    match (current, desired) {
        (Value::Object(cur), Value::Object(des)) => {
            let keys: BTreeSet<&String> = cur.keys().chain(des.keys()).collect();
            for key in keys {
                let child = path.child(Segment::Key(key.clone()));
                match (cur.get(key), des.get(key)) {
                    (Some(c), Some(d)) => diff_at(&child, c, d, ops),
                    (Some(c), None) => ops.push(ChangeOp {
                        kind: ChangeKind::Removed,
                        path: child,
                        old: Some(c.clone()),
                        new: None,
                    }),
                    (None, Some(d)) => ops.push(ChangeOp {
                        kind: ChangeKind::Added,
                        path: child,
                        old: None,
                        new: Some(d.clone()),
                    }),
                    (None, None) => unreachable!("key came from one of the maps"),
                }
            }
        }
        (Value::Array(cur), Value::Array(des)) => {
            let common = cur.len().min(des.len());
            for idx in 0..common {
                diff_at(&path.child(Segment::Index(idx)), &cur[idx], &des[idx], ops);
            }
            for (idx, value) in des.iter().enumerate().skip(common) {
                ops.push(ChangeOp {
                    kind: ChangeKind::Added,
                    path: path.child(Segment::Index(idx)),
                    old: None,
                    new: Some(value.clone()),
                });
            }
            for (idx, value) in cur.iter().enumerate().skip(common) {
                ops.push(ChangeOp {
                    kind: ChangeKind::Removed,
                    path: path.child(Segment::Index(idx)),
                    old: Some(value.clone()),
                    new: None,
                });
            }
        }
        (c, d) if c == d => {}
        (c, d) => ops.push(ChangeOp {
            kind: ChangeKind::Changed,
            path: path.clone(),
            old: Some(c.clone()),
            new: Some(d.clone()),
        }),
    }
}
