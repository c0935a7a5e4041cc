//! SNS topic synchronizer

use super::{parse_record, record_outcome};
use crate::aws::account::AccountId;
use crate::config::{TopicRecord, is_disabled};
use crate::gateway::{GatewayResult, RegionalGateways, TopicGateway};
use concierge_common::{
    ActionReport, Lookup, RecordReport, ResourceKind, SectionReport, ValidationError, reconcile,
};
use serde_json::Value;
use tracing::{debug, info, warn};

const EMAIL_PROTOCOL: &str = "email";

pub fn topic_arn(region: &str, account: &AccountId, name: &str) -> String {
    format!("arn:aws:sns:{region}:{account}:{name}")
}

pub async fn sync_topics(
    records: &[Value],
    gateways: &impl RegionalGateways<Gateway: TopicGateway>,
    account: &AccountId,
) -> SectionReport {
    let mut section = SectionReport::new(ResourceKind::Sns);
    for raw in records {
        if is_disabled(raw) {
            debug!(record = %raw, "Skipping disabled topic");
            continue;
        }
        let record: TopicRecord = match parse_record("topic", raw) {
            Ok(record) => record,
            Err(e) => {
                section.push(RecordReport::invalid(&e));
                continue;
            }
        };
        let Some(name) = record.name.clone() else {
            let e = ValidationError::MissingField(format!("Topic needs a name {raw}"));
            section.push(RecordReport::invalid(&e));
            continue;
        };
        let subject = format!("Topic: {name}");
        let gateway = gateways.gateway(&record.region);

        let mut report = ActionReport::new();
        let arn = topic_arn(&record.region, account, &name);
        let result = apply_topic(&gateway, &name, &arn, &record.subscribers, &mut report).await;
        record_outcome(&mut report, &subject, result);
        section.push(RecordReport::new(subject, report));
    }
    section
}

async fn apply_topic(
    gateway: &impl TopicGateway,
    name: &str,
    arn: &str,
    subscribers: &[String],
    report: &mut ActionReport,
) -> GatewayResult<()> {
    let (arn, current) = match gateway.list_subscriptions(arn).await? {
        Lookup::Found(current) => (arn.to_string(), current),
        Lookup::NotFound => {
            info!(topic = %name, "Creating topic");
            let created = gateway.create_topic(name).await?;
            report.created("created");
            (created, Vec::new())
        }
    };

    let current: Vec<_> = current
        .into_iter()
        .filter(|s| s.protocol == EMAIL_PROTOCOL)
        .collect();
    let delta = reconcile(
        current.iter().map(|s| s.endpoint.clone()),
        subscribers.iter().cloned(),
    );
    for email in &delta.to_add {
        match gateway.subscribe(&arn, EMAIL_PROTOCOL, email).await {
            Ok(()) => report.created(format!("{email} subscribed")),
            Err(e) => {
                warn!(topic = %name, endpoint = %email, error = %e, "Subscribe failed");
                report.error(format!("{email} not subscribed: {e}"));
            }
        }
    }
    for email in &delta.to_remove {
        for subscription in current.iter().filter(|s| &s.endpoint == email) {
            if subscription.is_pending() {
                report.warning(format!("{email} pending confirmation, cannot unsubscribe"));
                continue;
            }
            info!(topic = %name, endpoint = %email, "Unsubscribing");
            gateway.unsubscribe(&subscription.subscription_arn).await?;
            report.deleted(format!("{email} unsubscribed"));
        }
    }
    Ok(())
}
