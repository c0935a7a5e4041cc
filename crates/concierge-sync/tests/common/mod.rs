//! In-memory fakes for the reconciliation integration tests
//!
//! Every gateway shares one [`State`] so a test can seed remote state, run a
//! synchronizer, then inspect both the resulting state and the ordered list
//! of mutating calls.

#![allow(dead_code)]

use concierge_common::{Document, Lookup};
use concierge_sync::aws::AwsError;
use concierge_sync::coordinator::Backend;
use concierge_sync::gateway::{
    AccountGateway, AlarmGateway, AlarmSpec, BucketGateway, GatewayResult, GroupGateway,
    IdentityGateway, ManagedPolicyGateway, ManagedPolicyState, MetricFilterSpec, PasswordPolicy,
    PolicyHolder, PolicyVersion, RoleGateway, Subscription, TopicGateway, TrailGateway, TrailSpec,
};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};
use tempfile::NamedTempFile;

pub const ACCOUNT: &str = "123456789012";

#[derive(Debug, Default, Clone)]
pub struct Holder {
    pub trust: Option<Document>,
    pub attached: Vec<String>,
    pub inline: BTreeMap<String, Document>,
}

#[derive(Debug, Default, Clone)]
pub struct FakePolicy {
    pub name: String,
    pub description: Option<String>,
    /// `(version_id, document)` in creation order
    pub versions: Vec<(String, Document)>,
    pub default_version: String,
    pub next_version: u64,
}

#[derive(Debug, Default, Clone)]
pub struct FakeBucket {
    pub region: String,
    pub policy: Option<Document>,
    pub objects: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct FakeTrail {
    pub spec: TrailSpec,
    pub logging: bool,
}

#[derive(Debug, Default)]
pub struct State {
    /// Mutating calls, in order
    pub calls: Vec<String>,
    /// Read calls, in order
    pub reads: Vec<String>,

    pub roles: BTreeMap<String, Holder>,
    pub groups: BTreeMap<String, Holder>,
    pub policies: BTreeMap<String, FakePolicy>,
    pub password_policy: Option<PasswordPolicy>,
    pub root_mfa: bool,
    pub aliases: Vec<String>,

    pub buckets: BTreeMap<String, FakeBucket>,

    pub log_groups: BTreeSet<String>,
    pub logs_unsupported: BTreeSet<String>,
    pub trail_unsupported: BTreeSet<String>,
    pub trails: BTreeMap<String, FakeTrail>,

    /// Topic ARNs
    pub topics: BTreeSet<String>,
    pub subscriptions: BTreeMap<String, Vec<Subscription>>,
    pub failing_endpoints: BTreeSet<String>,
    pub metric_filters: BTreeSet<(String, String)>,
    pub alarms: BTreeMap<(String, String), AlarmSpec>,

    /// Returned by [`IdentityGateway::current_user_arn`]
    pub user_arn: Option<String>,
}

impl State {
    fn call(&mut self, call: impl Into<String>) {
        self.calls.push(call.into());
    }

    fn read(&mut self, call: impl Into<String>) {
        self.reads.push(call.into());
    }
}

/// Shared handle to the fake account
#[derive(Debug, Clone, Default)]
pub struct FakeAws {
    state: Arc<Mutex<State>>,
}

impl FakeAws {
    pub fn new() -> Self {
        let aws = Self::default();
        aws.state().user_arn = Some(format!("arn:aws:iam::{ACCOUNT}:user/ops"));
        aws
    }

    pub fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    /// Every read and mutating call.
    pub fn total_calls(&self) -> usize {
        let state = self.state();
        state.calls.len() + state.reads.len()
    }

    pub fn roles(&self) -> FakeRoles {
        FakeRoles(self.clone())
    }

    pub fn groups(&self) -> FakeGroups {
        FakeGroups(self.clone())
    }

    pub fn account(&self) -> FakeAccount {
        FakeAccount(self.clone())
    }

    pub fn regional(&self, region: &str) -> FakeRegional {
        FakeRegional {
            aws: self.clone(),
            region: region.to_string(),
        }
    }

    pub fn add_topic(&self, region: &str, name: &str) -> String {
        let arn = format!("arn:aws:sns:{region}:{ACCOUNT}:{name}");
        self.state().topics.insert(arn.clone());
        arn
    }

    pub fn add_subscription(&self, topic_arn: &str, endpoint: &str, subscription_arn: &str) {
        self.state()
            .subscriptions
            .entry(topic_arn.to_string())
            .or_default()
            .push(Subscription {
                endpoint: endpoint.to_string(),
                protocol: "email".to_string(),
                subscription_arn: subscription_arn.to_string(),
            });
    }

    pub fn add_policy(&self, name: &str, description: Option<&str>, documents: &[Document]) -> String {
        let arn = format!("arn:aws:iam::{ACCOUNT}:policy/{name}");
        let versions: Vec<(String, Document)> = documents
            .iter()
            .enumerate()
            .map(|(i, doc)| (format!("v{}", i + 1), doc.clone()))
            .collect();
        let default_version = versions.last().map(|(id, _)| id.clone()).unwrap_or_default();
        self.state().policies.insert(
            arn.clone(),
            FakePolicy {
                name: name.to_string(),
                description: description.map(str::to_string),
                next_version: versions.len() as u64 + 1,
                versions,
                default_version,
            },
        );
        arn
    }
}

fn holder_mut<'a>(
    map: &'a mut BTreeMap<String, Holder>,
    name: &str,
) -> GatewayResult<&'a mut Holder> {
    map.get_mut(name)
        .ok_or_else(|| AwsError::NotFound(name.to_string()))
}

macro_rules! policy_holder {
    ($ty:ident, $field:ident, $kind:literal) => {
        impl PolicyHolder for $ty {
            async fn list_attached(&self, holder: &str) -> GatewayResult<Vec<String>> {
                let mut state = self.0.state();
                state.read(format!("list_attached {holder}"));
                Ok(holder_mut(&mut state.$field, holder)?.attached.clone())
            }

            async fn attach(&self, holder: &str, policy_arn: &str) -> GatewayResult<()> {
                let mut state = self.0.state();
                state.call(format!("attach {} {holder} {policy_arn}", $kind));
                holder_mut(&mut state.$field, holder)?
                    .attached
                    .push(policy_arn.to_string());
                Ok(())
            }

            async fn detach(&self, holder: &str, policy_arn: &str) -> GatewayResult<()> {
                let mut state = self.0.state();
                state.call(format!("detach {} {holder} {policy_arn}", $kind));
                holder_mut(&mut state.$field, holder)?
                    .attached
                    .retain(|arn| arn != policy_arn);
                Ok(())
            }

            async fn list_inline(&self, holder: &str) -> GatewayResult<Vec<String>> {
                let mut state = self.0.state();
                state.read(format!("list_inline {holder}"));
                Ok(holder_mut(&mut state.$field, holder)?
                    .inline
                    .keys()
                    .cloned()
                    .collect())
            }

            async fn get_inline(
                &self,
                holder: &str,
                policy_name: &str,
            ) -> GatewayResult<Lookup<Document>> {
                let mut state = self.0.state();
                state.read(format!("get_inline {holder} {policy_name}"));
                Ok(holder_mut(&mut state.$field, holder)?
                    .inline
                    .get(policy_name)
                    .cloned()
                    .into())
            }

            async fn put_inline(
                &self,
                holder: &str,
                policy_name: &str,
                document: &Document,
            ) -> GatewayResult<()> {
                let mut state = self.0.state();
                state.call(format!("put_inline {} {holder} {policy_name}", $kind));
                holder_mut(&mut state.$field, holder)?
                    .inline
                    .insert(policy_name.to_string(), document.clone());
                Ok(())
            }

            async fn delete_inline(&self, holder: &str, policy_name: &str) -> GatewayResult<()> {
                let mut state = self.0.state();
                state.call(format!("delete_inline {} {holder} {policy_name}", $kind));
                holder_mut(&mut state.$field, holder)?
                    .inline
                    .remove(policy_name);
                Ok(())
            }
        }
    };
}

pub struct FakeRoles(FakeAws);
pub struct FakeGroups(FakeAws);
pub struct FakeAccount(FakeAws);
pub struct FakeIdentity(FakeAws);

pub struct FakeRegional {
    aws: FakeAws,
    region: String,
}

policy_holder!(FakeRoles, roles, "role");
policy_holder!(FakeGroups, groups, "group");

impl RoleGateway for FakeRoles {
    async fn get_role(&self, name: &str) -> GatewayResult<Lookup<Document>> {
        let mut state = self.0.state();
        state.read(format!("get_role {name}"));
        Ok(state.roles.get(name).and_then(|r| r.trust.clone()).into())
    }

    async fn create_role(&self, name: &str, trust: &Document) -> GatewayResult<()> {
        let mut state = self.0.state();
        state.call(format!("create_role {name}"));
        state.roles.insert(
            name.to_string(),
            Holder {
                trust: Some(trust.clone()),
                ..Default::default()
            },
        );
        Ok(())
    }

    async fn update_trust_document(&self, name: &str, trust: &Document) -> GatewayResult<()> {
        let mut state = self.0.state();
        state.call(format!("update_trust_document {name}"));
        holder_mut(&mut state.roles, name)?.trust = Some(trust.clone());
        Ok(())
    }
}

impl GroupGateway for FakeGroups {
    async fn get_group(&self, name: &str) -> GatewayResult<Lookup<()>> {
        let mut state = self.0.state();
        state.read(format!("get_group {name}"));
        Ok(state.groups.get(name).map(|_| ()).into())
    }

    async fn create_group(&self, name: &str) -> GatewayResult<()> {
        let mut state = self.0.state();
        state.call(format!("create_group {name}"));
        state.groups.insert(name.to_string(), Holder::default());
        Ok(())
    }
}

fn policy_mut<'a>(state: &'a mut State, arn: &str) -> GatewayResult<&'a mut FakePolicy> {
    state
        .policies
        .get_mut(arn)
        .ok_or_else(|| AwsError::NotFound(arn.to_string()))
}

impl ManagedPolicyGateway for FakeAccount {
    async fn get_policy(&self, arn: &str) -> GatewayResult<Lookup<ManagedPolicyState>> {
        let mut state = self.0.state();
        state.read(format!("get_policy {arn}"));
        Ok(state
            .policies
            .get(arn)
            .map(|p| ManagedPolicyState {
                arn: arn.to_string(),
                description: p.description.clone(),
                default_version_id: p.default_version.clone(),
            })
            .into())
    }

    async fn get_policy_version(
        &self,
        arn: &str,
        version_id: &str,
    ) -> GatewayResult<Lookup<Document>> {
        let mut state = self.0.state();
        state.read(format!("get_policy_version {arn} {version_id}"));
        Ok(state
            .policies
            .get(arn)
            .and_then(|p| p.versions.iter().find(|(id, _)| id == version_id))
            .map(|(_, doc)| doc.clone())
            .into())
    }

    async fn list_policy_versions(&self, arn: &str) -> GatewayResult<Vec<PolicyVersion>> {
        let mut state = self.0.state();
        state.read(format!("list_policy_versions {arn}"));
        let policy = policy_mut(&mut state, arn)?;
        Ok(policy
            .versions
            .iter()
            .map(|(id, _)| PolicyVersion {
                version_id: id.clone(),
                is_default: *id == policy.default_version,
            })
            .collect())
    }

    async fn create_policy(
        &self,
        name: &str,
        description: Option<&str>,
        document: &Document,
    ) -> GatewayResult<()> {
        if !document.is_object() {
            return Err(AwsError::MalformedDocument(name.to_string()));
        }
        let mut state = self.0.state();
        state.call(format!("create_policy {name}"));
        let arn = format!("arn:aws:iam::{ACCOUNT}:policy/{name}");
        state.policies.insert(
            arn,
            FakePolicy {
                name: name.to_string(),
                description: description.map(str::to_string),
                versions: vec![("v1".to_string(), document.clone())],
                default_version: "v1".to_string(),
                next_version: 2,
            },
        );
        Ok(())
    }

    async fn create_policy_version(
        &self,
        arn: &str,
        document: &Document,
        set_as_default: bool,
    ) -> GatewayResult<()> {
        let mut state = self.0.state();
        state.call(format!("create_policy_version {arn}"));
        let policy = policy_mut(&mut state, arn)?;
        if policy.versions.len() >= 5 {
            return Err(AwsError::LimitExceeded(arn.to_string()));
        }
        let id = format!("v{}", policy.next_version);
        policy.next_version += 1;
        policy.versions.push((id.clone(), document.clone()));
        if set_as_default {
            policy.default_version = id;
        }
        Ok(())
    }

    async fn delete_policy_version(&self, arn: &str, version_id: &str) -> GatewayResult<()> {
        let mut state = self.0.state();
        state.call(format!("delete_policy_version {arn} {version_id}"));
        policy_mut(&mut state, arn)?
            .versions
            .retain(|(id, _)| id != version_id);
        Ok(())
    }

    async fn delete_policy(&self, arn: &str) -> GatewayResult<()> {
        let mut state = self.0.state();
        state.call(format!("delete_policy {arn}"));
        state.policies.remove(arn);
        Ok(())
    }
}

impl AccountGateway for FakeAccount {
    async fn get_password_policy(&self) -> GatewayResult<Lookup<PasswordPolicy>> {
        let mut state = self.0.state();
        state.read("get_password_policy");
        Ok(state.password_policy.clone().into())
    }

    async fn update_password_policy(&self, policy: &PasswordPolicy) -> GatewayResult<()> {
        let mut state = self.0.state();
        state.call("update_password_policy");
        state.password_policy = Some(policy.clone());
        Ok(())
    }

    async fn root_mfa_enabled(&self) -> GatewayResult<bool> {
        let mut state = self.0.state();
        state.read("root_mfa_enabled");
        Ok(state.root_mfa)
    }

    async fn list_account_aliases(&self) -> GatewayResult<Vec<String>> {
        let mut state = self.0.state();
        state.read("list_account_aliases");
        Ok(state.aliases.clone())
    }

    async fn create_account_alias(&self, alias: &str) -> GatewayResult<()> {
        let mut state = self.0.state();
        state.call(format!("create_account_alias {alias}"));
        state.aliases = vec![alias.to_string()];
        Ok(())
    }
}

impl IdentityGateway for FakeIdentity {
    async fn current_user_arn(&self) -> GatewayResult<String> {
        let mut state = self.0.state();
        state.read("current_user_arn");
        state
            .user_arn
            .clone()
            .ok_or_else(|| AwsError::NotFound("user".to_string()))
    }

    async fn first_user_arn(&self) -> GatewayResult<Option<String>> {
        let mut state = self.0.state();
        state.read("first_user_arn");
        Ok(None)
    }

    async fn caller_account(&self) -> GatewayResult<String> {
        let mut state = self.0.state();
        state.read("caller_account");
        Err(AwsError::Throttled)
    }
}

impl BucketGateway for FakeRegional {
    async fn bucket_location(&self, bucket: &str) -> GatewayResult<Lookup<String>> {
        let mut state = self.aws.state();
        state.read(format!("bucket_location {bucket}"));
        Ok(state.buckets.get(bucket).map(|b| b.region.clone()).into())
    }

    async fn create_bucket(&self, bucket: &str) -> GatewayResult<()> {
        let mut state = self.aws.state();
        state.call(format!("create_bucket {bucket} {}", self.region));
        state.buckets.insert(
            bucket.to_string(),
            FakeBucket {
                region: self.region.clone(),
                ..Default::default()
            },
        );
        Ok(())
    }

    async fn get_bucket_policy(&self, bucket: &str) -> GatewayResult<Lookup<Document>> {
        let mut state = self.aws.state();
        state.read(format!("get_bucket_policy {bucket}"));
        Ok(state.buckets.get(bucket).and_then(|b| b.policy.clone()).into())
    }

    async fn put_bucket_policy(&self, bucket: &str, policy: &Document) -> GatewayResult<()> {
        let mut state = self.aws.state();
        state.call(format!("put_bucket_policy {bucket}"));
        let bucket = state
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| AwsError::NotFound(bucket.to_string()))?;
        bucket.policy = Some(policy.clone());
        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> GatewayResult<Lookup<String>> {
        let mut state = self.aws.state();
        state.read(format!("get_object {bucket} {key}"));
        Ok(state
            .buckets
            .get(bucket)
            .and_then(|b| b.objects.get(key).cloned())
            .into())
    }

    async fn put_empty_object(&self, bucket: &str, key: &str) -> GatewayResult<()> {
        let mut state = self.aws.state();
        state.call(format!("put_empty_object {bucket} {key}"));
        let bucket = state
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| AwsError::NotFound(bucket.to_string()))?;
        bucket.objects.insert(key.to_string(), String::new());
        Ok(())
    }
}

impl FakeRegional {
    fn log_group_arn(&self) -> String {
        format!(
            "arn:aws:logs:{}:{ACCOUNT}:log-group:CloudTrail/DefaultLogGroup:*",
            self.region
        )
    }
}

impl TrailGateway for FakeRegional {
    async fn find_log_group(&self, _name: &str) -> GatewayResult<Lookup<String>> {
        let mut state = self.aws.state();
        state.read(format!("find_log_group {}", self.region));
        if state.logs_unsupported.contains(&self.region) {
            return Err(AwsError::Unsupported(self.region.clone()));
        }
        Ok(state
            .log_groups
            .contains(&self.region)
            .then(|| self.log_group_arn())
            .into())
    }

    async fn create_log_group(&self, _name: &str) -> GatewayResult<()> {
        let mut state = self.aws.state();
        state.call(format!("create_log_group {}", self.region));
        state.log_groups.insert(self.region.clone());
        Ok(())
    }

    async fn resolve_role_arn(&self, role_name: &str) -> GatewayResult<Lookup<String>> {
        let mut state = self.aws.state();
        state.read(format!("resolve_role_arn {role_name}"));
        Ok(state
            .roles
            .contains_key(role_name)
            .then(|| format!("arn:aws:iam::{ACCOUNT}:role/{role_name}"))
            .into())
    }

    async fn describe_trail(&self, _name: &str) -> GatewayResult<Lookup<TrailSpec>> {
        let mut state = self.aws.state();
        state.read(format!("describe_trail {}", self.region));
        Ok(state.trails.get(&self.region).map(|t| t.spec.clone()).into())
    }

    async fn create_trail(&self, _name: &str, spec: &TrailSpec) -> GatewayResult<()> {
        let mut state = self.aws.state();
        state.call(format!("create_trail {}", self.region));
        if state.trail_unsupported.contains(&self.region) {
            return Err(AwsError::Unsupported(self.region.clone()));
        }
        state.trails.insert(
            self.region.clone(),
            FakeTrail {
                spec: spec.clone(),
                logging: false,
            },
        );
        Ok(())
    }

    async fn update_trail(&self, _name: &str, spec: &TrailSpec) -> GatewayResult<()> {
        let mut state = self.aws.state();
        state.call(format!("update_trail {}", self.region));
        if let Some(trail) = state.trails.get_mut(&self.region) {
            trail.spec = spec.clone();
        }
        Ok(())
    }

    async fn trail_status(&self, _name: &str) -> GatewayResult<Lookup<bool>> {
        let mut state = self.aws.state();
        state.read(format!("trail_status {}", self.region));
        Ok(state.trails.get(&self.region).map(|t| t.logging).into())
    }

    async fn start_logging(&self, _name: &str) -> GatewayResult<()> {
        let mut state = self.aws.state();
        state.call(format!("start_logging {}", self.region));
        if let Some(trail) = state.trails.get_mut(&self.region) {
            trail.logging = true;
        }
        Ok(())
    }
}

impl AlarmGateway for FakeRegional {
    async fn find_topic_arn(&self, topic: &str) -> GatewayResult<Lookup<String>> {
        let mut state = self.aws.state();
        state.read(format!("find_topic_arn {} {topic}", self.region));
        let prefix = format!("arn:aws:sns:{}:", self.region);
        let suffix = format!(":{topic}");
        Ok(state
            .topics
            .iter()
            .find(|arn| arn.starts_with(&prefix) && arn.ends_with(&suffix))
            .cloned()
            .into())
    }

    async fn metric_filter_exists(&self, _log_group: &str, filter: &str) -> GatewayResult<bool> {
        let mut state = self.aws.state();
        state.read(format!("metric_filter_exists {} {filter}", self.region));
        Ok(state
            .metric_filters
            .contains(&(self.region.clone(), filter.to_string())))
    }

    async fn put_metric_filter(
        &self,
        _log_group: &str,
        filter: &MetricFilterSpec,
    ) -> GatewayResult<()> {
        let mut state = self.aws.state();
        state.call(format!("put_metric_filter {} {}", self.region, filter.name));
        state
            .metric_filters
            .insert((self.region.clone(), filter.name.clone()));
        Ok(())
    }

    async fn describe_alarm(
        &self,
        _metric_name: &str,
        _namespace: &str,
        alarm_name: &str,
    ) -> GatewayResult<Lookup<AlarmSpec>> {
        let mut state = self.aws.state();
        state.read(format!("describe_alarm {} {alarm_name}", self.region));
        Ok(state
            .alarms
            .get(&(self.region.clone(), alarm_name.to_string()))
            .cloned()
            .into())
    }

    async fn delete_alarm(&self, alarm_name: &str) -> GatewayResult<()> {
        let mut state = self.aws.state();
        state.call(format!("delete_alarm {} {alarm_name}", self.region));
        state
            .alarms
            .remove(&(self.region.clone(), alarm_name.to_string()));
        Ok(())
    }

    async fn put_alarm(&self, alarm: &AlarmSpec) -> GatewayResult<()> {
        let mut state = self.aws.state();
        state.call(format!("put_alarm {} {}", self.region, alarm.alarm_name));
        state
            .alarms
            .insert((self.region.clone(), alarm.alarm_name.clone()), alarm.clone());
        Ok(())
    }
}

impl TopicGateway for FakeRegional {
    async fn list_subscriptions(&self, topic_arn: &str) -> GatewayResult<Lookup<Vec<Subscription>>> {
        let mut state = self.aws.state();
        state.read(format!("list_subscriptions {topic_arn}"));
        if !state.topics.contains(topic_arn) {
            return Ok(Lookup::NotFound);
        }
        Ok(Lookup::Found(
            state.subscriptions.get(topic_arn).cloned().unwrap_or_default(),
        ))
    }

    async fn create_topic(&self, name: &str) -> GatewayResult<String> {
        let mut state = self.aws.state();
        state.call(format!("create_topic {} {name}", self.region));
        let arn = format!("arn:aws:sns:{}:{ACCOUNT}:{name}", self.region);
        state.topics.insert(arn.clone());
        Ok(arn)
    }

    async fn subscribe(&self, topic_arn: &str, protocol: &str, endpoint: &str) -> GatewayResult<()> {
        let mut state = self.aws.state();
        state.call(format!("subscribe {topic_arn} {endpoint}"));
        if state.failing_endpoints.contains(endpoint) {
            return Err(AwsError::Sdk {
                code: Some("InvalidParameter".to_string()),
                message: format!("Invalid parameter: Endpoint {endpoint}"),
            });
        }
        state
            .subscriptions
            .entry(topic_arn.to_string())
            .or_default()
            .push(Subscription {
                endpoint: endpoint.to_string(),
                protocol: protocol.to_string(),
                subscription_arn: concierge_sync::gateway::PENDING_CONFIRMATION.to_string(),
            });
        Ok(())
    }

    async fn unsubscribe(&self, subscription_arn: &str) -> GatewayResult<()> {
        let mut state = self.aws.state();
        state.call(format!("unsubscribe {subscription_arn}"));
        for subs in state.subscriptions.values_mut() {
            subs.retain(|s| s.subscription_arn != subscription_arn);
        }
        Ok(())
    }
}

impl Backend for FakeAws {
    type Roles = FakeRoles;
    type Groups = FakeGroups;
    type Account = FakeAccount;
    type Identity = FakeIdentity;
    type Buckets = FakeRegional;
    type Trails = FakeRegional;
    type Alarms = FakeRegional;
    type Topics = FakeRegional;

    fn roles(&self) -> FakeRoles {
        FakeRoles(self.clone())
    }

    fn groups(&self) -> FakeGroups {
        FakeGroups(self.clone())
    }

    fn account(&self) -> FakeAccount {
        FakeAccount(self.clone())
    }

    fn identity(&self) -> FakeIdentity {
        FakeIdentity(self.clone())
    }

    fn buckets(&self, region: &str) -> FakeRegional {
        self.regional(region)
    }

    fn trails(&self, region: &str) -> FakeRegional {
        self.regional(region)
    }

    fn alarms(&self, region: &str) -> FakeRegional {
        self.regional(region)
    }

    fn topics(&self, region: &str) -> FakeRegional {
        self.regional(region)
    }
}

/// Write `content` to a temporary template file.
pub fn template(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{content}").unwrap();
    file
}

pub fn templates() -> concierge_sync::templates::PolicyTemplates {
    let account = concierge_sync::aws::AccountId::parse(ACCOUNT).unwrap();
    concierge_sync::templates::PolicyTemplates::new(account)
}
