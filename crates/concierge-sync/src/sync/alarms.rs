//! CloudWatch alarm synchronizer
//!
//! Each alarm is a metric filter on the trail log group plus an alarm on the
//! resulting metric, notifying an existing SNS topic. Regions are reported
//! as scopes of the alarm's record.

use super::trails::LOG_GROUP;
use super::{parse_record, record_outcome};
use crate::config::{AlarmRecord, OneOrMany, is_disabled};
use crate::gateway::{AlarmGateway, AlarmSpec, GatewayResult, MetricFilterSpec, RegionalGateways};
use concierge_common::regions::expand_regions;
use concierge_common::{
    ActionReport, Lookup, RecordReport, ResourceKind, SectionReport, ValidationError,
};
use serde_json::Value;
use tracing::{debug, info, warn};

pub const ALARM_NAMESPACE: &str = "CloudTrailMetrics";

struct AlarmPlan {
    name: String,
    regions: Vec<String>,
    record: AlarmRecord,
}

fn validate(raw: &Value) -> Result<AlarmPlan, ValidationError> {
    let record: AlarmRecord = parse_record("alarm", raw)?;
    let Some(name) = record.name.clone() else {
        return Err(ValidationError::MissingField(format!("Alarm needs a name {raw}")));
    };
    let Some(OneOrMany::Many(regions)) = &record.regions else {
        return Err(ValidationError::MissingField("Must specify regions array".into()));
    };
    Ok(AlarmPlan {
        name,
        regions: expand_regions(regions),
        record,
    })
}

impl AlarmPlan {
    fn filter(&self) -> MetricFilterSpec {
        MetricFilterSpec {
            name: self.name.clone(),
            pattern: self.record.filter.clone(),
            transforms: self.record.transforms.clone(),
        }
    }

    fn alarm(&self, topic_arn: String) -> AlarmSpec {
        AlarmSpec {
            alarm_name: self.name.clone(),
            alarm_description: self.record.description.clone().filter(|d| !d.is_empty()),
            actions_enabled: true,
            alarm_actions: vec![topic_arn],
            metric_name: self.record.metric_name.clone(),
            namespace: ALARM_NAMESPACE.to_string(),
            evaluation_periods: self.record.eval_periods,
            threshold: self.record.threshold,
            comparison_operator: self.record.comparison.clone(),
            statistic: self.record.statistic.clone(),
            period: self.record.period,
        }
    }
}

pub async fn sync_alarms(
    records: &[Value],
    gateways: &impl RegionalGateways<Gateway: AlarmGateway>,
) -> SectionReport {
    let mut section = SectionReport::new(ResourceKind::Alarms);
    for raw in records {
        if is_disabled(raw) {
            debug!(record = %raw, "Skipping disabled alarm");
            continue;
        }
        let plan = match validate(raw) {
            Ok(plan) => plan,
            Err(e) => {
                warn!(error = %e, "Invalid alarm record");
                section.push(RecordReport::invalid(&e));
                continue;
            }
        };

        let mut report = ActionReport::new();
        for region in &plan.regions {
            let gateway = gateways.gateway(region);
            let mut scoped = ActionReport::new();
            let result = sync_region(&gateway, region, &plan, &mut scoped).await;
            record_outcome(&mut scoped, &plan.name, result);
            report.scope(region.clone(), scoped);
        }
        section.push(RecordReport::new(plan.name, report));
    }
    section
}

async fn sync_region(
    gateway: &impl AlarmGateway,
    region: &str,
    plan: &AlarmPlan,
    report: &mut ActionReport,
) -> GatewayResult<()> {
    let Lookup::Found(topic_arn) = gateway.find_topic_arn(&plan.record.topic).await? else {
        let e = ValidationError::UnresolvedDependency(format!(
            "Notification topic must exist in {region}"
        ));
        warn!(alarm = %plan.name, region = %region, topic = %plan.record.topic, "Notification topic missing");
        report.error(e.to_string());
        return Ok(());
    };

    if !gateway.metric_filter_exists(LOG_GROUP, &plan.name).await? {
        info!(alarm = %plan.name, region = %region, "Creating metric filter");
        gateway.put_metric_filter(LOG_GROUP, &plan.filter()).await?;
        report.created("created filter");
    }

    let desired = plan.alarm(topic_arn);
    match gateway
        .describe_alarm(&desired.metric_name, ALARM_NAMESPACE, &desired.alarm_name)
        .await?
    {
        Lookup::Found(live) if live == desired => return Ok(()),
        Lookup::Found(_) => {
            info!(alarm = %plan.name, region = %region, "Alarm differs, replacing");
            gateway.delete_alarm(&desired.alarm_name).await?;
            report.deleted("deleted alarm");
        }
        Lookup::NotFound => {}
    }
    gateway.put_alarm(&desired).await?;
    report.created("added alarm");
    Ok(())
}
