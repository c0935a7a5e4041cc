//! Run configuration and the desired-state file

use crate::gateway::MetricTransform;
use concierge_common::regions::DEFAULT_REGION;
use concierge_common::{ConfigError, ResourceKind};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// AWS connection settings
#[derive(Debug, Clone)]
pub struct AwsSettings {
    /// Home region for global services (IAM, STS)
    pub region: String,
    /// AWS profile name (overrides default credential resolution)
    pub profile: Option<String>,
}

/// Configuration for one reconciliation run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Desired-state YAML file
    pub config_path: PathBuf,
    /// Sections to process, in order; empty means the default order
    pub sections: Vec<ResourceKind>,
    pub aws: AwsSettings,
    /// Account number to use instead of asking AWS
    pub account_override: Option<String>,
}

impl RunConfig {
    /// Selected sections, falling back to [`ResourceKind::DEFAULT_ORDER`].
    pub fn selected_sections(&self) -> Vec<ResourceKind> {
        if self.sections.is_empty() {
            ResourceKind::DEFAULT_ORDER.to_vec()
        } else {
            self.sections.clone()
        }
    }
}

/// Parsed desired-state file
///
/// Sections stay loosely typed until a synchronizer parses each record, so
/// one bad record never prevents the rest of its section from running.
#[derive(Debug, Clone, Default)]
pub struct DesiredConfig {
    sections: HashMap<ResourceKind, Value>,
}

impl DesiredConfig {
    /// Read and parse a desired-state file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::io(path.display().to_string(), e))?;
        let config = Self::from_yaml(&text)?;
        debug!(path = %path.display(), sections = config.sections.len(), "Loaded desired state");
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let value: Value =
            serde_yaml::from_str(text).map_err(|e| ConfigError::Yaml(e.to_string()))?;
        Self::from_value(value)
    }

    /// Build from an already parsed document.
    ///
    /// The top level must be a mapping. List sections must hold a list and
    /// `account` / `cloudtrail` a single mapping; an empty section is
    /// treated as absent.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        let Value::Object(top) = value else {
            return Err(ConfigError::Shape(
                "desired-state file must be a mapping of section names".to_string(),
            ));
        };

        let mut sections = HashMap::new();
        for (key, section) in top {
            let Ok(kind) = key.parse::<ResourceKind>() else {
                if !ResourceKind::is_known_key(&key) {
                    warn!(section = %key, "Ignoring unknown section");
                }
                continue;
            };
            if section.is_null() {
                continue;
            }
            let shape_ok = if is_single_record(kind) {
                section.is_object()
            } else {
                section.is_array()
            };
            if !shape_ok {
                let expected = if is_single_record(kind) {
                    "a mapping"
                } else {
                    "a list"
                };
                return Err(ConfigError::Shape(format!(
                    "section '{kind}' must be {expected}"
                )));
            }
            sections.insert(kind, section);
        }
        Ok(Self { sections })
    }

    pub fn contains(&self, kind: ResourceKind) -> bool {
        self.sections.contains_key(&kind)
    }

    /// Raw section value.
    pub fn section(&self, kind: ResourceKind) -> Option<&Value> {
        self.sections.get(&kind)
    }

    /// Records of a list section.
    pub fn records(&self, kind: ResourceKind) -> &[Value] {
        self.sections
            .get(&kind)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

fn is_single_record(kind: ResourceKind) -> bool {
    matches!(kind, ResourceKind::Account | ResourceKind::Cloudtrail)
}

/// Whether a raw record carries `disabled: true`.
pub fn is_disabled(raw: &Value) -> bool {
    raw.get("disabled").and_then(Value::as_bool).unwrap_or(false)
}

/// A scalar or a list of scalars
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn as_slice(&self) -> &[T] {
        match self {
            OneOrMany::One(item) => std::slice::from_ref(item),
            OneOrMany::Many(items) => items,
        }
    }
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoleRecord {
    pub name: Option<String>,
    pub policy_files: Option<OneOrMany<PathBuf>>,
    pub managed_policies: Option<Vec<String>>,
    #[serde(default)]
    pub require_mfa_to_assume_role: bool,
    #[serde(default)]
    pub trusted_principal_arns: Vec<String>,
    #[serde(default)]
    pub trusted_services: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupRecord {
    pub name: Option<String>,
    pub policy_files: Option<OneOrMany<PathBuf>>,
    pub managed_policies: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BucketRecord {
    pub name: Option<String>,
    #[serde(default = "default_region")]
    pub region: String,
    pub bucket_policy_file: Option<PathBuf>,
    #[serde(default)]
    pub prefixes: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrailRecord {
    pub regions: Option<OneOrMany<String>>,
    pub bucket: Option<String>,
    pub role: Option<String>,
    pub global_events_log_region: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlarmRecord {
    pub name: Option<String>,
    pub regions: Option<OneOrMany<String>>,
    pub filter: String,
    #[serde(default)]
    pub transforms: Vec<MetricTransform>,
    pub threshold: f64,
    pub comparison: String,
    pub statistic: String,
    pub period: i32,
    pub eval_periods: i32,
    pub description: Option<String>,
    pub metric_name: String,
    pub topic: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopicRecord {
    pub name: Option<String>,
    #[serde(default)]
    pub subscribers: Vec<String>,
    #[serde(default = "default_region")]
    pub region: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountRecord {
    pub password_policy: Option<PathBuf>,
    pub root: Option<RootRecord>,
    pub alias: Option<String>,
    pub managed_policies: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RootRecord {
    pub mfa_enabled: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManagedPolicyRecord {
    pub name: Option<String>,
    pub description: Option<String>,
    pub document: Option<OneOrMany<PathBuf>>,
}
