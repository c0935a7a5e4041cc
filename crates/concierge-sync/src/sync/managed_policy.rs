//! Customer managed policy lifecycle
//!
//! IAM treats a policy's description as immutable and caps stored versions,
//! so a change is either a delete-and-recreate or a new default version.

use super::{parse_record, record_outcome};
use crate::aws::account::AccountId;
use crate::config::ManagedPolicyRecord;
use crate::gateway::{GatewayResult, ManagedPolicyGateway};
use crate::templates::PolicyTemplates;
use concierge_common::{ActionReport, Document, Lookup, RecordReport, ValidationError, documents_equal};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Versions IAM keeps per managed policy
pub const MAX_POLICY_VERSIONS: usize = 5;

pub fn policy_arn(account: &AccountId, name: &str) -> String {
    format!("arn:aws:iam::{account}:policy/{name}")
}

/// Reconcile one `account.managed_policies` entry.
pub async fn sync_managed_policy(
    raw: &Value,
    gateway: &impl ManagedPolicyGateway,
    templates: &PolicyTemplates,
) -> RecordReport {
    let record: ManagedPolicyRecord = match parse_record("managed policy", raw) {
        Ok(record) => record,
        Err(e) => return RecordReport::invalid(&e),
    };
    let Some(name) = record.name else {
        let e = ValidationError::MissingField(format!("managed policy missing name {raw}"));
        return RecordReport::invalid(&e);
    };
    let subject = format!("managed policy {name}");
    let mut report = ActionReport::new();

    let Some(path) = record.document.as_ref().and_then(|d| d.as_slice().first()) else {
        report.error(format!("managed policy {name} needs a document"));
        return RecordReport::new(subject, report);
    };
    let document = match templates.load_one(path, None) {
        Ok(document) => document,
        Err(e) => {
            warn!(policy = %name, error = %e, "Failed to load managed policy document");
            report.error(e.to_string());
            return RecordReport::new(subject, report);
        }
    };

    let arn = policy_arn(templates.account(), &name);
    let description = record.description.as_deref().filter(|d| !d.is_empty());
    let result = apply_policy(gateway, &arn, &name, description, &document, &mut report).await;
    record_outcome(&mut report, &subject, result);
    RecordReport::new(subject, report)
}

async fn apply_policy(
    gateway: &impl ManagedPolicyGateway,
    arn: &str,
    name: &str,
    description: Option<&str>,
    document: &Document,
    report: &mut ActionReport,
) -> GatewayResult<()> {
    let live = match gateway.get_policy(arn).await? {
        Lookup::Found(live) => live,
        Lookup::NotFound => {
            info!(policy_arn = %arn, "Creating managed policy");
            gateway.create_policy(name, description, document).await?;
            report.created("Created");
            return Ok(());
        }
    };

    let live_description = live.description.as_deref().filter(|d| !d.is_empty());
    if live_description != description {
        info!(policy_arn = %arn, "Description changed, recreating managed policy");
        for version in gateway.list_policy_versions(arn).await? {
            if !version.is_default {
                gateway.delete_policy_version(arn, &version.version_id).await?;
            }
        }
        gateway.delete_policy(arn).await?;
        report.deleted("Deleted");
        gateway.create_policy(name, description, document).await?;
        report.created("Created");
        return Ok(());
    }

    let current = gateway
        .get_policy_version(arn, &live.default_version_id)
        .await?;
    if let Lookup::Found(current) = &current {
        if documents_equal(current, document) {
            debug!(policy_arn = %arn, "Managed policy up to date");
            return Ok(());
        }
    }

    match push_version(gateway, arn, document, report).await {
        Err(e) if e.is_not_found() => {
            warn!(policy_arn = %arn, "Policy disappeared before new version was pushed");
            report.error(format!(
                "Unable to push new version to policy {arn} as it doesn't exist"
            ));
            Ok(())
        }
        other => other,
    }
}

async fn push_version(
    gateway: &impl ManagedPolicyGateway,
    arn: &str,
    document: &Document,
    report: &mut ActionReport,
) -> GatewayResult<()> {
    let versions = gateway.list_policy_versions(arn).await?;
    if versions.len() >= MAX_POLICY_VERSIONS {
        if let Some(oldest) = versions
            .iter()
            .filter(|v| !v.is_default)
            .min_by_key(|v| v.sequence())
        {
            info!(policy_arn = %arn, version = %oldest.version_id, "Pruning oldest policy version");
            gateway.delete_policy_version(arn, &oldest.version_id).await?;
            report.deleted(format!("Pruned version {}", oldest.version_id));
        }
    }
    info!(policy_arn = %arn, "Pushing new default policy version");
    gateway.create_policy_version(arn, document, true).await?;
    report.updated("Updated");
    Ok(())
}
