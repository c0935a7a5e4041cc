//! concierge-common - Reconciliation core shared by every resource kind
//!
//! This crate has no AWS SDK dependencies. It holds the pieces of the
//! engine that are pure functions over documents and identifier sets.
//!
//! ## Modules
//!
//! - [`diff`]: Structural diff between two JSON-like documents
//! - [`reconcile`]: Set reconciliation (attach/detach deltas)
//! - [`render`]: Placeholder token expansion for policy templates
//! - [`trust`]: Assume-role trust document builder and principal normalization
//! - [`report`]: Typed action reports and per-section aggregation
//! - [`resource_kind`]: Closed set of configuration sections
//! - [`regions`]: Region table and `"all"` fan-out
//! - [`lookup`]: Found/NotFound result type for remote fetches
//! - [`error`]: Config, validation and fatal error types

pub mod diff;
pub mod error;
pub mod lookup;
pub mod reconcile;
pub mod regions;
pub mod render;
pub mod report;
pub mod resource_kind;
pub mod trust;

/// A policy or settings document (objects, arrays, scalars).
pub type Document = serde_json::Value;

// Re-export commonly used types
pub use diff::{ChangeKind, ChangeOp, Path, Segment, diff, diff_fields, documents_equal};
pub use error::{ConfigError, FatalError, ValidationError};
pub use lookup::Lookup;
pub use reconcile::{SetDelta, reconcile};
pub use render::{Substitutions, render, render_file, render_str};
pub use report::{ActionKind, ActionReport, NO_OP_MARKER, RecordReport, SectionReport};
pub use resource_kind::ResourceKind;
