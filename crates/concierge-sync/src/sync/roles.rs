//! IAM role synchronizer
//!
//! Drives each role through creation, trust document, managed-policy
//! attachments and inline policies, in that order.

use super::attachments::{sync_inline_policies, sync_managed_policies};
use super::{parse_record, record_outcome};
use crate::config::{RoleRecord, is_disabled};
use crate::gateway::{GatewayResult, RoleGateway};
use crate::templates::{InlinePolicy, PolicyTemplates};
use concierge_common::trust::collapse_singleton_principals;
use concierge_common::{
    ActionReport, Document, Lookup, RecordReport, ResourceKind, SectionReport, ValidationError,
    documents_equal,
};
use serde_json::Value;
use tracing::{debug, info, warn};

/// A role record that passed validation
struct ValidRole {
    name: String,
    record: RoleRecord,
}

fn validate(raw: &Value) -> Result<ValidRole, ValidationError> {
    let record: RoleRecord = parse_record("role", raw)?;
    let Some(name) = record.name.clone() else {
        return Err(ValidationError::MissingField(format!("role missing name {raw}")));
    };
    if record.policy_files.is_none() && record.managed_policies.is_none() {
        return Err(ValidationError::MissingField(format!(
            "role {name} must have either inline or managed_policies"
        )));
    }
    Ok(ValidRole { name, record })
}

pub async fn sync_roles(
    records: &[Value],
    gateway: &impl RoleGateway,
    templates: &PolicyTemplates,
) -> SectionReport {
    let mut section = SectionReport::new(ResourceKind::Roles);
    for raw in records {
        if is_disabled(raw) {
            debug!(record = %raw, "Skipping disabled role");
            continue;
        }
        let role = match validate(raw) {
            Ok(role) => role,
            Err(e) => {
                warn!(error = %e, "Invalid role record");
                section.push(RecordReport::invalid(&e));
                continue;
            }
        };
        section.push(sync_role(role, gateway, templates).await);
    }
    section
}

async fn sync_role(
    role: ValidRole,
    gateway: &impl RoleGateway,
    templates: &PolicyTemplates,
) -> RecordReport {
    let mut report = ActionReport::new();

    let inline = match &role.record.policy_files {
        Some(files) => match templates.load_inline_policies(files.as_slice()) {
            Ok(policies) => policies,
            Err(e) => {
                warn!(role = %role.name, error = %e, "Failed to load inline policies");
                report.error(e.to_string());
                return RecordReport::new(role.name, report);
            }
        },
        None => Vec::new(),
    };
    let trust = templates.trust_document(
        role.record.require_mfa_to_assume_role,
        &role.record.trusted_principal_arns,
        &role.record.trusted_services,
    );
    let managed = role.record.managed_policies.clone().unwrap_or_default();

    let result = apply_role(gateway, &role.name, &trust, &managed, &inline, &mut report).await;
    record_outcome(&mut report, &role.name, result);
    RecordReport::new(role.name, report)
}

async fn apply_role(
    gateway: &impl RoleGateway,
    name: &str,
    trust: &Document,
    managed: &[String],
    inline: &[InlinePolicy],
    report: &mut ActionReport,
) -> GatewayResult<()> {
    match gateway.get_role(name).await? {
        Lookup::NotFound => {
            info!(role = %name, "Creating role");
            gateway.create_role(name, trust).await?;
            report.created("Created role");
        }
        Lookup::Found(mut live) => {
            collapse_singleton_principals(&mut live);
            if !documents_equal(&live, trust) {
                info!(role = %name, "Updating trust document");
                gateway.update_trust_document(name, trust).await?;
                report.updated("updated trust document");
            }
        }
    }

    sync_managed_policies(gateway, name, managed, report).await?;
    sync_inline_policies(gateway, name, inline, report).await
}
