//! Resource gateway traits
//!
//! Synchronizers only talk to AWS through these traits. The `aws` module
//! implements them over the SDK clients and tests implement them with
//! in-memory fakes. Every fetch returns `Lookup` so that a missing
//! resource is a value, not an error.

use crate::aws::error::AwsError;
use concierge_common::{Document, Lookup};
use serde::{Deserialize, Serialize};

pub type GatewayResult<T> = Result<T, AwsError>;

/// Something that holds managed-policy attachments and inline policies
/// (an IAM role or group).
#[allow(async_fn_in_trait)]
pub trait PolicyHolder {
    /// ARNs of attached managed policies.
    async fn list_attached(&self, holder: &str) -> GatewayResult<Vec<String>>;

    async fn attach(&self, holder: &str, policy_arn: &str) -> GatewayResult<()>;

    async fn detach(&self, holder: &str, policy_arn: &str) -> GatewayResult<()>;

    /// Names of inline policies.
    async fn list_inline(&self, holder: &str) -> GatewayResult<Vec<String>>;

    /// URL-decoded inline policy document.
    async fn get_inline(&self, holder: &str, policy_name: &str) -> GatewayResult<Lookup<Document>>;

    async fn put_inline(
        &self,
        holder: &str,
        policy_name: &str,
        document: &Document,
    ) -> GatewayResult<()>;

    async fn delete_inline(&self, holder: &str, policy_name: &str) -> GatewayResult<()>;
}

#[allow(async_fn_in_trait)]
pub trait RoleGateway: PolicyHolder {
    /// The role's URL-decoded trust document.
    async fn get_role(&self, name: &str) -> GatewayResult<Lookup<Document>>;

    async fn create_role(&self, name: &str, trust: &Document) -> GatewayResult<()>;

    async fn update_trust_document(&self, name: &str, trust: &Document) -> GatewayResult<()>;
}

#[allow(async_fn_in_trait)]
pub trait GroupGateway: PolicyHolder {
    async fn get_group(&self, name: &str) -> GatewayResult<Lookup<()>>;

    async fn create_group(&self, name: &str) -> GatewayResult<()>;
}

/// Live state of a customer managed policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedPolicyState {
    pub arn: String,
    pub description: Option<String>,
    pub default_version_id: String,
}

/// One stored version of a managed policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyVersion {
    pub version_id: String,
    pub is_default: bool,
}

impl PolicyVersion {
    /// Numeric part of a `vN` version id; IAM numbers versions in creation
    /// order.
    pub fn sequence(&self) -> u64 {
        self.version_id
            .trim_start_matches(['v', 'V'])
            .parse()
            .unwrap_or(u64::MAX)
    }
}

#[allow(async_fn_in_trait)]
pub trait ManagedPolicyGateway {
    async fn get_policy(&self, arn: &str) -> GatewayResult<Lookup<ManagedPolicyState>>;

    /// URL-decoded document of one version.
    async fn get_policy_version(
        &self,
        arn: &str,
        version_id: &str,
    ) -> GatewayResult<Lookup<Document>>;

    async fn list_policy_versions(&self, arn: &str) -> GatewayResult<Vec<PolicyVersion>>;

    async fn create_policy(
        &self,
        name: &str,
        description: Option<&str>,
        document: &Document,
    ) -> GatewayResult<()>;

    async fn create_policy_version(
        &self,
        arn: &str,
        document: &Document,
        set_as_default: bool,
    ) -> GatewayResult<()>;

    async fn delete_policy_version(&self, arn: &str, version_id: &str) -> GatewayResult<()>;

    async fn delete_policy(&self, arn: &str) -> GatewayResult<()>;
}

/// Account password policy, keyed the way desired-state templates name the
/// fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PasswordPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_password_length: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_symbols: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_numbers: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_uppercase_characters: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_lowercase_characters: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_users_to_change_password: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_password_age: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_reuse_prevention: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hard_expiry: Option<bool>,
}

#[allow(async_fn_in_trait)]
pub trait AccountGateway {
    async fn get_password_policy(&self) -> GatewayResult<Lookup<PasswordPolicy>>;

    async fn update_password_policy(&self, policy: &PasswordPolicy) -> GatewayResult<()>;

    /// Whether the root user has an MFA device.
    async fn root_mfa_enabled(&self) -> GatewayResult<bool>;

    async fn list_account_aliases(&self) -> GatewayResult<Vec<String>>;

    async fn create_account_alias(&self, alias: &str) -> GatewayResult<()>;
}

#[allow(async_fn_in_trait)]
pub trait BucketGateway {
    /// Location constraint of an existing bucket.
    async fn bucket_location(&self, bucket: &str) -> GatewayResult<Lookup<String>>;

    /// Create a bucket in the gateway's region.
    async fn create_bucket(&self, bucket: &str) -> GatewayResult<()>;

    async fn get_bucket_policy(&self, bucket: &str) -> GatewayResult<Lookup<Document>>;

    async fn put_bucket_policy(&self, bucket: &str, policy: &Document) -> GatewayResult<()>;

    /// Object body as text.
    async fn get_object(&self, bucket: &str, key: &str) -> GatewayResult<Lookup<String>>;

    async fn put_empty_object(&self, bucket: &str, key: &str) -> GatewayResult<()>;
}

/// Trail settings compared field by field against the live trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrailSpec {
    pub s3_bucket_name: String,
    pub s3_key_prefix: String,
    pub cloud_watch_logs_log_group_arn: String,
    pub cloud_watch_logs_role_arn: String,
    pub include_global_service_events: bool,
}

#[allow(async_fn_in_trait)]
pub trait TrailGateway {
    /// ARN of the log group with exactly this name.
    async fn find_log_group(&self, name: &str) -> GatewayResult<Lookup<String>>;

    async fn create_log_group(&self, name: &str) -> GatewayResult<()>;

    async fn resolve_role_arn(&self, role_name: &str) -> GatewayResult<Lookup<String>>;

    async fn describe_trail(&self, name: &str) -> GatewayResult<Lookup<TrailSpec>>;

    async fn create_trail(&self, name: &str, spec: &TrailSpec) -> GatewayResult<()>;

    async fn update_trail(&self, name: &str, spec: &TrailSpec) -> GatewayResult<()>;

    /// Whether the trail is currently logging.
    async fn trail_status(&self, name: &str) -> GatewayResult<Lookup<bool>>;

    async fn start_logging(&self, name: &str) -> GatewayResult<()>;
}

/// One metric transformation of a log metric filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricTransform {
    pub metric_name: String,
    pub metric_namespace: String,
    pub metric_value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<f64>,
}

/// A log metric filter to create
#[derive(Debug, Clone, PartialEq)]
pub struct MetricFilterSpec {
    pub name: String,
    pub pattern: String,
    pub transforms: Vec<MetricTransform>,
}

/// Alarm settings compared field by field against the live alarm
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlarmSpec {
    pub alarm_name: String,
    pub alarm_description: Option<String>,
    pub actions_enabled: bool,
    pub alarm_actions: Vec<String>,
    pub metric_name: String,
    pub namespace: String,
    pub evaluation_periods: i32,
    pub threshold: f64,
    pub comparison_operator: String,
    pub statistic: String,
    pub period: i32,
}

#[allow(async_fn_in_trait)]
pub trait AlarmGateway {
    /// ARN of the SNS topic whose ARN ends with `:{topic}`.
    async fn find_topic_arn(&self, topic: &str) -> GatewayResult<Lookup<String>>;

    async fn metric_filter_exists(&self, log_group: &str, filter: &str) -> GatewayResult<bool>;

    async fn put_metric_filter(
        &self,
        log_group: &str,
        filter: &MetricFilterSpec,
    ) -> GatewayResult<()>;

    async fn describe_alarm(
        &self,
        metric_name: &str,
        namespace: &str,
        alarm_name: &str,
    ) -> GatewayResult<Lookup<AlarmSpec>>;

    async fn delete_alarm(&self, alarm_name: &str) -> GatewayResult<()>;

    async fn put_alarm(&self, alarm: &AlarmSpec) -> GatewayResult<()>;
}

/// Subscription ARN reported for a subscription nobody has confirmed
pub const PENDING_CONFIRMATION: &str = "PendingConfirmation";

/// One subscription of an SNS topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub endpoint: String,
    pub protocol: String,
    pub subscription_arn: String,
}

impl Subscription {
    pub fn is_pending(&self) -> bool {
        self.subscription_arn == PENDING_CONFIRMATION
    }
}

#[allow(async_fn_in_trait)]
pub trait TopicGateway {
    /// `NotFound` when the topic does not exist.
    async fn list_subscriptions(&self, topic_arn: &str) -> GatewayResult<Lookup<Vec<Subscription>>>;

    /// Create a topic and return its ARN.
    async fn create_topic(&self, name: &str) -> GatewayResult<String>;

    async fn subscribe(&self, topic_arn: &str, protocol: &str, endpoint: &str)
    -> GatewayResult<()>;

    async fn unsubscribe(&self, subscription_arn: &str) -> GatewayResult<()>;
}

/// Identity lookups used to determine the account number
#[allow(async_fn_in_trait)]
#[cfg_attr(test, mockall::automock)]
pub trait IdentityGateway {
    /// ARN of the calling IAM user.
    async fn current_user_arn(&self) -> GatewayResult<String>;

    /// ARN of the first user in the account, if any.
    async fn first_user_arn(&self) -> GatewayResult<Option<String>>;

    /// Account of the calling principal.
    async fn caller_account(&self) -> GatewayResult<String>;
}

/// Hands out one gateway per region.
///
/// Implemented for any `Fn(&str) -> G`, so callers can pass a closure.
pub trait RegionalGateways {
    type Gateway;

    fn gateway(&self, region: &str) -> Self::Gateway;
}

impl<F, G> RegionalGateways for F
where
    F: Fn(&str) -> G,
{
    type Gateway = G;

    fn gateway(&self, region: &str) -> G {
        self(region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_sequence_orders_numerically() {
        let v = |id: &str| PolicyVersion {
            version_id: id.to_string(),
            is_default: false,
        };
        assert!(v("v2").sequence() < v("v10").sequence());
        assert_eq!(v("v7").sequence(), 7);
        assert_eq!(v("odd").sequence(), u64::MAX);
    }

    #[test]
    fn test_pending_subscription() {
        let sub = Subscription {
            endpoint: "a@x.com".into(),
            protocol: "email".into(),
            subscription_arn: PENDING_CONFIRMATION.into(),
        };
        assert!(sub.is_pending());
    }

    #[test]
    fn test_password_policy_serializes_declared_fields_only() {
        let policy = PasswordPolicy {
            minimum_password_length: Some(14),
            require_symbols: Some(true),
            ..Default::default()
        };
        let doc = serde_json::to_value(&policy).unwrap();
        assert_eq!(
            doc,
            serde_json::json!({"minimum_password_length": 14, "require_symbols": true})
        );
    }

    #[test]
    fn test_closure_is_regional_provider() {
        let provider = |region: &str| format!("gateway-{region}");
        assert_eq!(provider.gateway("eu-west-1"), "gateway-eu-west-1");
    }
}
