//! CloudTrail synchronizer
//!
//! One log group and one `default-trail` per region, delivering to a shared
//! bucket. Global service events are recorded only in the declared region.

use super::{parse_record, record_outcome};
use crate::aws::error::AwsError;
use crate::config::{OneOrMany, TrailRecord, is_disabled};
use crate::gateway::{GatewayResult, RegionalGateways, TrailGateway, TrailSpec};
use concierge_common::regions::expand_regions;
use concierge_common::{
    ActionReport, Lookup, RecordReport, ResourceKind, SectionReport, ValidationError,
    diff_fields,
};
use serde_json::Value;
use tracing::{debug, info, warn};

pub const TRAIL_NAME: &str = "default-trail";
pub const LOG_GROUP: &str = "CloudTrail/DefaultLogGroup";
pub const S3_KEY_PREFIX: &str = "logs";

/// Trail settings shared by every region
struct TrailPlan {
    regions: Vec<String>,
    bucket: String,
    role: String,
    global_events_region: Option<String>,
}

fn validate(raw: &Value) -> Result<TrailPlan, ValidationError> {
    let record: TrailRecord = parse_record("cloudtrail", raw)?;
    let Some(OneOrMany::Many(regions)) = record.regions else {
        return Err(ValidationError::MissingField("Region array not specified".into()));
    };
    let Some(bucket) = record.bucket else {
        return Err(ValidationError::MissingField("No bucket specified".into()));
    };
    let Some(role) = record.role else {
        return Err(ValidationError::MissingField("No cloudtrails role specified".into()));
    };
    Ok(TrailPlan {
        regions: expand_regions(&regions),
        bucket,
        role,
        global_events_region: record.global_events_log_region,
    })
}

pub async fn sync_trails(
    section: Option<&Value>,
    gateways: &impl RegionalGateways<Gateway: TrailGateway>,
) -> SectionReport {
    let mut report = SectionReport::new(ResourceKind::Cloudtrail);
    let Some(raw) = section else {
        return report;
    };
    if is_disabled(raw) {
        debug!("Skipping disabled cloudtrail section");
        return report;
    }
    let plan = match validate(raw) {
        Ok(plan) => plan,
        Err(e) => {
            warn!(error = %e, "Invalid cloudtrail section");
            report.push(RecordReport::invalid(&e));
            return report;
        }
    };

    for region in &plan.regions {
        let gateway = gateways.gateway(region);
        let mut actions = ActionReport::new();
        let result = sync_region(&gateway, region, &plan, &mut actions).await;
        record_outcome(&mut actions, region, result);
        report.push(RecordReport::new(region.clone(), actions));
    }
    report
}

async fn sync_region(
    gateway: &impl TrailGateway,
    region: &str,
    plan: &TrailPlan,
    report: &mut ActionReport,
) -> GatewayResult<()> {
    match ensure_log_group(gateway, report).await {
        Ok(log_group_arn) => configure_trail(gateway, region, plan, log_group_arn, report).await?,
        Err(e) if e.is_unsupported() => {
            warn!(region = %region, "CloudWatch Logs not available");
            report.warning(format!("skipped {region} as cloudwatch logs not available"));
        }
        Err(e) => return Err(e),
    }

    if let Lookup::Found(false) = gateway.trail_status(TRAIL_NAME).await? {
        info!(region = %region, "Starting trail logging");
        gateway.start_logging(TRAIL_NAME).await?;
        report.updated("enabled logging");
    }
    Ok(())
}

async fn ensure_log_group(
    gateway: &impl TrailGateway,
    report: &mut ActionReport,
) -> GatewayResult<String> {
    if let Lookup::Found(arn) = gateway.find_log_group(LOG_GROUP).await? {
        return Ok(arn);
    }
    gateway.create_log_group(LOG_GROUP).await?;
    report.created("created default log group");
    gateway
        .find_log_group(LOG_GROUP)
        .await?
        .found()
        .ok_or_else(|| AwsError::NotFound(LOG_GROUP.to_string()))
}

async fn configure_trail(
    gateway: &impl TrailGateway,
    region: &str,
    plan: &TrailPlan,
    log_group_arn: String,
    report: &mut ActionReport,
) -> GatewayResult<()> {
    let Lookup::Found(role_arn) = gateway.resolve_role_arn(&plan.role).await? else {
        let e = ValidationError::UnresolvedDependency(format!(
            "cloudtrails role {} does not exist",
            plan.role
        ));
        report.error(e.to_string());
        return Ok(());
    };

    let desired = TrailSpec {
        s3_bucket_name: plan.bucket.clone(),
        s3_key_prefix: S3_KEY_PREFIX.to_string(),
        cloud_watch_logs_log_group_arn: log_group_arn,
        cloud_watch_logs_role_arn: role_arn,
        include_global_service_events: plan.global_events_region.as_deref() == Some(region),
    };

    let result = match gateway.describe_trail(TRAIL_NAME).await? {
        Lookup::NotFound => {
            info!(region = %region, "Creating default trail");
            gateway.create_trail(TRAIL_NAME, &desired).await.map(|()| {
                report.created(format!(
                    "created default trail - global_events_status {}",
                    desired.include_global_service_events
                ));
            })
        }
        Lookup::Found(live) => {
            let live = serde_json::to_value(&live).map_err(|e| AwsError::malformed(TRAIL_NAME, e))?;
            let wanted =
                serde_json::to_value(&desired).map_err(|e| AwsError::malformed(TRAIL_NAME, e))?;
            if diff_fields(&live, &wanted).is_empty() {
                Ok(())
            } else {
                info!(region = %region, "Updating default trail");
                gateway
                    .update_trail(TRAIL_NAME, &desired)
                    .await
                    .map(|()| report.updated("updated trail"))
            }
        }
    };

    match result {
        Err(e) if e.is_unsupported() => {
            report.warning(format!(
                "skipped configuring default trail in {region} as it is not supported"
            ));
            Ok(())
        }
        other => other,
    }
}
