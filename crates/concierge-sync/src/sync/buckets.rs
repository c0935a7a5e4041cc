//! S3 bucket synchronizer
//!
//! Buckets are created in their declared region, get their policy from a
//! template rendered with `BUCKETNAME`, and get an empty placeholder object
//! for each declared prefix.

use super::{parse_record, record_outcome};
use crate::config::{BucketRecord, is_disabled};
use crate::gateway::{BucketGateway, GatewayResult, RegionalGateways};
use crate::templates::PolicyTemplates;
use concierge_common::{
    ActionReport, Document, Lookup, RecordReport, ResourceKind, SectionReport, ValidationError,
    documents_equal,
};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

pub async fn sync_buckets(
    records: &[Value],
    gateways: &impl RegionalGateways<Gateway: BucketGateway>,
    templates: &PolicyTemplates,
) -> SectionReport {
    let mut section = SectionReport::new(ResourceKind::S3);
    for raw in records {
        if is_disabled(raw) {
            debug!(record = %raw, "Skipping disabled bucket");
            continue;
        }
        let record: BucketRecord = match parse_record("bucket", raw) {
            Ok(record) => record,
            Err(e) => {
                section.push(RecordReport::invalid(&e));
                continue;
            }
        };
        let Some(name) = record.name.clone() else {
            let e = ValidationError::MissingField(format!("Bucket needs a name {raw}"));
            warn!(error = %e, "Invalid bucket record");
            section.push(RecordReport::invalid(&e));
            continue;
        };
        let gateway = gateways.gateway(&record.region);
        section.push(sync_bucket(name, &record, &gateway, templates).await);
    }
    section
}

async fn sync_bucket(
    name: String,
    record: &BucketRecord,
    gateway: &impl BucketGateway,
    templates: &PolicyTemplates,
) -> RecordReport {
    let mut report = ActionReport::new();
    let policy = match &record.bucket_policy_file {
        Some(path) => match templates.load_one(path, Some(&name)) {
            Ok(policy) => Some(policy),
            Err(e) => {
                warn!(bucket = %name, error = %e, "Failed to load bucket policy");
                report.error(e.to_string());
                return RecordReport::new(name, report);
            }
        },
        None => None,
    };

    let result = apply_bucket(gateway, &name, policy.as_ref(), &record.prefixes, &mut report).await;
    record_outcome(&mut report, &name, result);
    RecordReport::new(name, report)
}

async fn apply_bucket(
    gateway: &impl BucketGateway,
    name: &str,
    policy: Option<&Document>,
    prefixes: &[String],
    report: &mut ActionReport,
) -> GatewayResult<()> {
    if let Lookup::NotFound = gateway.bucket_location(name).await? {
        info!(bucket = %name, "Creating bucket");
        gateway.create_bucket(name).await?;
        report.created("Created bucket");
    }

    if let Some(desired) = policy {
        let (live, existed) = match gateway.get_bucket_policy(name).await? {
            Lookup::Found(live) => (live, true),
            Lookup::NotFound => (json!({}), false),
        };
        if !documents_equal(&live, desired) {
            info!(bucket = %name, existed, "Putting bucket policy");
            gateway.put_bucket_policy(name, desired).await?;
            if existed {
                report.updated("Updated policy");
            } else {
                report.created("Created policy");
            }
        }
    }

    for key in prefixes {
        match gateway.get_object(name, key).await? {
            Lookup::NotFound => {
                info!(bucket = %name, key = %key, "Creating prefix placeholder");
                gateway.put_empty_object(name, key).await?;
                report.created(format!("created key {key}"));
            }
            Lookup::Found(content) if !content.trim().is_empty() => {
                report.warning(format!("prefix {key} appears to have content, check it out"));
            }
            Lookup::Found(_) => {}
        }
    }
    Ok(())
}
