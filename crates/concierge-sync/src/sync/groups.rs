//! IAM group synchronizer

use super::attachments::{sync_inline_policies, sync_managed_policies};
use super::{parse_record, record_outcome};
use crate::config::{GroupRecord, is_disabled};
use crate::gateway::{GatewayResult, GroupGateway};
use crate::templates::{InlinePolicy, PolicyTemplates};
use concierge_common::{
    ActionReport, Lookup, RecordReport, ResourceKind, SectionReport, ValidationError,
};
use serde_json::Value;
use tracing::{debug, info, warn};

fn validate(raw: &Value) -> Result<(String, GroupRecord), ValidationError> {
    let record: GroupRecord = parse_record("group", raw)?;
    match record.name.clone() {
        Some(name) => Ok((name, record)),
        None => Err(ValidationError::MissingField(format!(
            "Skipped: group missing name {raw}"
        ))),
    }
}

pub async fn sync_groups(
    records: &[Value],
    gateway: &impl GroupGateway,
    templates: &PolicyTemplates,
) -> SectionReport {
    let mut section = SectionReport::new(ResourceKind::Groups);
    for raw in records {
        if is_disabled(raw) {
            debug!(record = %raw, "Skipping disabled group");
            continue;
        }
        match validate(raw) {
            Ok((name, record)) => section.push(sync_group(name, record, gateway, templates).await),
            Err(e) => {
                warn!(error = %e, "Invalid group record");
                section.push(RecordReport::invalid(&e));
            }
        }
    }
    section
}

async fn sync_group(
    name: String,
    record: GroupRecord,
    gateway: &impl GroupGateway,
    templates: &PolicyTemplates,
) -> RecordReport {
    let mut report = ActionReport::new();
    let inline = match &record.policy_files {
        Some(files) => match templates.load_inline_policies(files.as_slice()) {
            Ok(policies) => policies,
            Err(e) => {
                warn!(group = %name, error = %e, "Failed to load inline policies");
                report.error(e.to_string());
                return RecordReport::new(name, report);
            }
        },
        None => Vec::new(),
    };
    let managed = record.managed_policies.unwrap_or_default();

    let result = apply_group(gateway, &name, &managed, &inline, &mut report).await;
    record_outcome(&mut report, &name, result);
    RecordReport::new(name, report)
}

async fn apply_group(
    gateway: &impl GroupGateway,
    name: &str,
    managed: &[String],
    inline: &[InlinePolicy],
    report: &mut ActionReport,
) -> GatewayResult<()> {
    if let Lookup::NotFound = gateway.get_group(name).await? {
        info!(group = %name, "Creating group");
        gateway.create_group(name).await?;
        report.created("Created group");
    }
    sync_managed_policies(gateway, name, managed, report).await?;
    sync_inline_policies(gateway, name, inline, report).await
}
