//! Error taxonomy for the reconciliation engine
//!
//! Only [`ConfigError`] at load time and [`FatalError`] stop a run.
//! [`ValidationError`] is always scoped to a single record.

use thiserror::Error;

/// Malformed or unreadable desired-state file or policy template
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Desired-state file is not valid YAML
    #[error("Failed to parse desired-state file: {0}")]
    Yaml(String),

    /// Policy template is not a valid JSON document
    #[error("Failed to parse template '{path}': {source}")]
    Template {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Document parsed but does not have the expected structure
    #[error("{0}")]
    Shape(String),
}

impl ConfigError {
    /// Create an IO error with path context
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a template parse error with path context
    pub fn template(path: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Template {
            path: path.into(),
            source,
        }
    }
}

/// A record that cannot be processed as declared
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Required field is absent; the message is the user-facing text
    #[error("{0}")]
    MissingField(String),

    /// Record has a field of the wrong shape
    #[error("{0}")]
    Invalid(String),

    /// A named dependency (topic, role, log group) does not exist
    #[error("{0}")]
    UnresolvedDependency(String),
}

/// Errors that abort the whole run
#[derive(Debug, Error)]
pub enum FatalError {
    /// No account-scoped operation can proceed without the account number
    #[error(
        "Unable to determine AWS account number, please set ENV var AWS_ACCOUNT_NUMBER"
    )]
    AccountUnresolved,
}
