//! Run coordination
//!
//! Walks the selected sections in order, resolves the account number once
//! before the first section that is present, and hands each section to its
//! synchronizer with gateways taken from a [`Backend`].

use crate::aws::account::AccountId;
use crate::config::DesiredConfig;
use crate::gateway::{
    AccountGateway, AlarmGateway, BucketGateway, GroupGateway, IdentityGateway,
    ManagedPolicyGateway, RoleGateway, TopicGateway, TrailGateway,
};
use crate::sync::{account, alarms, buckets, groups, roles, topics, trails};
use crate::templates::{PolicyTemplates, resolve_account_number};
use concierge_common::{FatalError, ResourceKind, SectionReport};
use tracing::{debug, info, warn};

/// Source of gateways for one run
///
/// Global services get one gateway each. Regional services get a fresh
/// gateway per region.
pub trait Backend {
    type Roles: RoleGateway;
    type Groups: GroupGateway;
    type Account: AccountGateway + ManagedPolicyGateway;
    type Identity: IdentityGateway;
    type Buckets: BucketGateway;
    type Trails: TrailGateway;
    type Alarms: AlarmGateway;
    type Topics: TopicGateway;

    fn roles(&self) -> Self::Roles;
    fn groups(&self) -> Self::Groups;
    fn account(&self) -> Self::Account;
    fn identity(&self) -> Self::Identity;
    fn buckets(&self, region: &str) -> Self::Buckets;
    fn trails(&self, region: &str) -> Self::Trails;
    fn alarms(&self, region: &str) -> Self::Alarms;
    fn topics(&self, region: &str) -> Self::Topics;
}

pub struct Coordinator<B> {
    backend: B,
    account_override: Option<String>,
    account: Option<AccountId>,
}

impl<B: Backend> Coordinator<B> {
    pub fn new(backend: B, account_override: Option<String>) -> Self {
        Self {
            backend,
            account_override,
            account: None,
        }
    }

    /// Account resolved so far, if any section has run.
    pub fn account(&self) -> Option<&AccountId> {
        self.account.as_ref()
    }

    /// Reconcile `sections` in order.
    ///
    /// `on_section` sees each report as soon as its section finishes. Only
    /// an unresolvable account number stops the run.
    pub async fn run(
        &mut self,
        desired: &DesiredConfig,
        sections: &[ResourceKind],
        mut on_section: impl FnMut(&SectionReport),
    ) -> Result<Vec<SectionReport>, FatalError> {
        let mut reports = Vec::with_capacity(sections.len());
        for &kind in sections {
            if !desired.contains(kind) {
                info!(section = %kind, "Section not declared, skipping");
                continue;
            }
            let templates = self.templates().await?;

            info!(section = %kind, "Reconciling section");
            let report = self.sync_section(kind, desired, &templates).await;
            let failed = report.failed_records();
            if failed > 0 {
                warn!(section = %kind, records = report.records.len(), failed, "Section finished with errors");
            } else {
                info!(section = %kind, records = report.records.len(), "Section finished");
            }
            on_section(&report);
            reports.push(report);
        }
        Ok(reports)
    }

    async fn templates(&mut self) -> Result<PolicyTemplates, FatalError> {
        if let Some(account) = &self.account {
            return Ok(PolicyTemplates::new(account.clone()));
        }
        let identity = self.backend.identity();
        let account = resolve_account_number(self.account_override.as_deref(), &identity).await?;
        debug!(account_id = %account, "Account number resolved");
        self.account = Some(account.clone());
        Ok(PolicyTemplates::new(account))
    }

    async fn sync_section(
        &self,
        kind: ResourceKind,
        desired: &DesiredConfig,
        templates: &PolicyTemplates,
    ) -> SectionReport {
        let backend = &self.backend;
        let records = desired.records(kind);
        match kind {
            ResourceKind::Roles => roles::sync_roles(records, &backend.roles(), templates).await,
            ResourceKind::Groups => {
                groups::sync_groups(records, &backend.groups(), templates).await
            }
            ResourceKind::S3 => {
                let gateways = |region: &str| backend.buckets(region);
                buckets::sync_buckets(records, &gateways, templates).await
            }
            ResourceKind::Cloudtrail => {
                let gateways = |region: &str| backend.trails(region);
                trails::sync_trails(desired.section(kind), &gateways).await
            }
            ResourceKind::Alarms => {
                let gateways = |region: &str| backend.alarms(region);
                alarms::sync_alarms(records, &gateways).await
            }
            ResourceKind::Account => {
                account::sync_account(desired.section(kind), &backend.account(), templates).await
            }
            ResourceKind::Sns => {
                let gateways = |region: &str| backend.topics(region);
                topics::sync_topics(records, &gateways, templates.account()).await
            }
        }
    }
}
