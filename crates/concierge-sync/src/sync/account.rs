//! Account-wide settings: password policy, root MFA, alias and customer
//! managed policies

use super::managed_policy::sync_managed_policy;
use super::{parse_record, record_outcome};
use crate::aws::error::AwsError;
use crate::config::{AccountRecord, is_disabled};
use crate::gateway::{AccountGateway, GatewayResult, ManagedPolicyGateway, PasswordPolicy};
use crate::templates::PolicyTemplates;
use concierge_common::{
    ActionReport, Lookup, RecordReport, ResourceKind, SectionReport, diff_fields,
};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info, warn};

pub async fn sync_account<G>(
    section: Option<&Value>,
    gateway: &G,
    templates: &PolicyTemplates,
) -> SectionReport
where
    G: AccountGateway + ManagedPolicyGateway,
{
    let mut report = SectionReport::new(ResourceKind::Account);
    let Some(raw) = section else {
        return report;
    };
    if is_disabled(raw) {
        debug!("Skipping disabled account section");
        return report;
    }
    let record: AccountRecord = match parse_record("account", raw) {
        Ok(record) => record,
        Err(e) => {
            warn!(error = %e, "Invalid account section");
            report.push(RecordReport::invalid(&e));
            return report;
        }
    };

    if let Some(path) = &record.password_policy {
        report.push(sync_password_policy(path, gateway, templates).await);
    }
    if let Some(desired) = record.root.as_ref().and_then(|r| r.mfa_enabled) {
        report.push(check_root_mfa(desired, gateway).await);
    }
    if let Some(alias) = &record.alias {
        report.push(sync_alias(alias, gateway).await);
    }
    for policy in record.managed_policies.iter().flatten() {
        if is_disabled(policy) {
            continue;
        }
        report.push(sync_managed_policy(policy, gateway, templates).await);
    }
    report
}

async fn sync_password_policy(
    path: &Path,
    gateway: &impl AccountGateway,
    templates: &PolicyTemplates,
) -> RecordReport {
    const SUBJECT: &str = "account password policy";
    let mut report = ActionReport::new();

    let desired = templates
        .load_one(path, None)
        .map_err(|e| e.to_string())
        .and_then(|doc| {
            serde_json::from_value::<PasswordPolicy>(doc)
                .map_err(|e| format!("{}: {e}", path.display()))
        });
    let desired = match desired {
        Ok(desired) => desired,
        Err(e) => {
            warn!(error = %e, "Failed to load password policy");
            report.error(e);
            return RecordReport::new(SUBJECT, report);
        }
    };

    let result = apply_password_policy(gateway, &desired, &mut report).await;
    record_outcome(&mut report, SUBJECT, result);
    RecordReport::new(SUBJECT, report)
}

async fn apply_password_policy(
    gateway: &impl AccountGateway,
    desired: &PasswordPolicy,
    report: &mut ActionReport,
) -> GatewayResult<()> {
    match gateway.get_password_policy().await? {
        Lookup::NotFound => report.created("Empty policy replaced"),
        Lookup::Found(live) => {
            let live =
                serde_json::to_value(&live).map_err(|e| AwsError::malformed("password policy", e))?;
            let wanted = serde_json::to_value(desired)
                .map_err(|e| AwsError::malformed("password policy", e))?;
            for op in diff_fields(&live, &wanted) {
                let found = op.old.as_ref().map(Value::to_string).unwrap_or_default();
                let should = op.new.as_ref().map(Value::to_string).unwrap_or_default();
                report.updated(format!(
                    "{} differed found:{found}: should be:{should}:,",
                    op.path
                ));
            }
        }
    }

    if !report.is_noop() {
        info!("Updating account password policy");
        gateway.update_password_policy(desired).await?;
    }
    Ok(())
}

async fn check_root_mfa(desired: bool, gateway: &impl AccountGateway) -> RecordReport {
    const SUBJECT: &str = "root mfa status";
    let mut report = ActionReport::new();
    match gateway.root_mfa_enabled().await {
        Ok(live) if live == desired => {}
        Ok(false) => {
            warn!("Root account MFA is not enabled");
            report.warning("NOT ENABLED PLEASE FIX!");
        }
        Ok(true) => report.warning("ENABLED BUT DECLARED DISABLED"),
        Err(e) => record_outcome(&mut report, SUBJECT, Err(e)),
    }
    RecordReport::new(SUBJECT, report)
}

async fn sync_alias(alias: &str, gateway: &impl AccountGateway) -> RecordReport {
    const SUBJECT: &str = "account_alias";
    let mut report = ActionReport::new();
    let result = apply_alias(alias, gateway, &mut report).await;
    record_outcome(&mut report, SUBJECT, result);
    RecordReport::new(SUBJECT, report)
}

async fn apply_alias(
    alias: &str,
    gateway: &impl AccountGateway,
    report: &mut ActionReport,
) -> GatewayResult<()> {
    let aliases = gateway.list_account_aliases().await?;
    if aliases.first().map(String::as_str) != Some(alias) {
        info!(alias = %alias, "Setting account alias");
        gateway.create_account_alias(alias).await?;
        report.updated(format!("Account alias set to {alias}"));
    }
    Ok(())
}
