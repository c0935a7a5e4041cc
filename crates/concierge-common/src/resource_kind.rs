//! Configuration sections handled by the engine

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// A selectable section of the desired-state file
///
/// The top-level `policies` key only holds templates referenced from other
/// sections, so it is not a variant.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Roles,
    Groups,
    S3,
    Cloudtrail,
    Alarms,
    Account,
    Sns,
}

impl ResourceKind {
    /// Order used when no sections are selected
    pub const DEFAULT_ORDER: [ResourceKind; 7] = [
        ResourceKind::Roles,
        ResourceKind::Groups,
        ResourceKind::S3,
        ResourceKind::Cloudtrail,
        ResourceKind::Alarms,
        ResourceKind::Account,
        ResourceKind::Sns,
    ];

    /// Top-level keys that are valid in a desired-state file but not
    /// selectable sections.
    pub const TEMPLATE_ONLY_KEYS: [&'static str; 1] = ["policies"];

    /// Section key in the desired-state file
    pub fn key(self) -> &'static str {
        self.into()
    }

    /// Whether `key` is a recognized top-level key of a desired-state file.
    pub fn is_known_key(key: &str) -> bool {
        key.parse::<ResourceKind>().is_ok() || Self::TEMPLATE_ONLY_KEYS.contains(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_parse_section_names() {
        assert_eq!(ResourceKind::from_str("roles").unwrap(), ResourceKind::Roles);
        assert_eq!(ResourceKind::from_str("s3").unwrap(), ResourceKind::S3);
        assert_eq!(
            ResourceKind::from_str("cloudtrail").unwrap(),
            ResourceKind::Cloudtrail
        );
        assert!(ResourceKind::from_str("policies").is_err());
        assert!(ResourceKind::from_str("lambdas").is_err());
    }

    #[test]
    fn test_display_matches_key() {
        for kind in ResourceKind::iter() {
            assert_eq!(kind.to_string(), kind.key());
            assert_eq!(ResourceKind::from_str(kind.key()).unwrap(), kind);
        }
    }

    #[test]
    fn test_default_order_covers_every_kind_once() {
        let all: Vec<_> = ResourceKind::iter().collect();
        assert_eq!(ResourceKind::DEFAULT_ORDER.len(), all.len());
        for kind in all {
            assert!(ResourceKind::DEFAULT_ORDER.contains(&kind));
        }
        assert_eq!(ResourceKind::DEFAULT_ORDER[0], ResourceKind::Roles);
        assert_eq!(ResourceKind::DEFAULT_ORDER[6], ResourceKind::Sns);
    }

    #[test]
    fn test_known_keys() {
        assert!(ResourceKind::is_known_key("policies"));
        assert!(ResourceKind::is_known_key("alarms"));
        assert!(!ResourceKind::is_known_key("vpcs"));
    }
}
