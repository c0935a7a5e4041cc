//! CloudWatch alarm gateway
//!
//! Alarms need a metric filter on the trail's log group and an SNS topic to
//! notify, so this gateway wraps the CloudWatch, CloudWatch Logs and SNS
//! clients of one region.

use crate::aws::context::{AwsContext, FromAwsContext};
use crate::aws::error::{AwsError, SdkResultExt};
use crate::gateway::{AlarmGateway, AlarmSpec, GatewayResult, MetricFilterSpec};
use aws_sdk_cloudwatch::types::{ComparisonOperator, Statistic};
use aws_sdk_cloudwatchlogs::types::MetricTransformation;
use concierge_common::Lookup;
use tracing::debug;

pub struct CloudWatchAlarms {
    cloudwatch: aws_sdk_cloudwatch::Client,
    logs: aws_sdk_cloudwatchlogs::Client,
    sns: aws_sdk_sns::Client,
}

impl FromAwsContext for CloudWatchAlarms {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            cloudwatch: ctx.cloudwatch_client(),
            logs: ctx.logs_client(),
            sns: ctx.sns_client(),
        }
    }
}

impl AlarmGateway for CloudWatchAlarms {
    async fn find_topic_arn(&self, topic: &str) -> GatewayResult<Lookup<String>> {
        let suffix = format!(":{topic}");
        let topics: Vec<_> = self
            .sns
            .list_topics()
            .into_paginator()
            .items()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await
            .classify()?;
        let arn = topics
            .iter()
            .filter_map(|t| t.topic_arn())
            .find(|arn| arn.ends_with(&suffix))
            .map(str::to_string);
        Ok(arn.into())
    }

    async fn metric_filter_exists(&self, log_group: &str, filter: &str) -> GatewayResult<bool> {
        let output = self
            .logs
            .describe_metric_filters()
            .log_group_name(log_group)
            .filter_name_prefix(filter)
            .send()
            .await
            .classify()?;
        Ok(output
            .metric_filters()
            .iter()
            .any(|f| f.filter_name() == Some(filter)))
    }

    async fn put_metric_filter(
        &self,
        log_group: &str,
        filter: &MetricFilterSpec,
    ) -> GatewayResult<()> {
        let transformations = filter
            .transforms
            .iter()
            .map(|t| {
                MetricTransformation::builder()
                    .metric_name(&t.metric_name)
                    .metric_namespace(&t.metric_namespace)
                    .metric_value(&t.metric_value)
                    .set_default_value(t.default_value)
                    .build()
                    .map_err(|e| AwsError::malformed(&filter.name, e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.logs
            .put_metric_filter()
            .log_group_name(log_group)
            .filter_name(&filter.name)
            .filter_pattern(&filter.pattern)
            .set_metric_transformations(Some(transformations))
            .send()
            .await
            .classify()?;
        Ok(())
    }

    async fn describe_alarm(
        &self,
        metric_name: &str,
        namespace: &str,
        alarm_name: &str,
    ) -> GatewayResult<Lookup<AlarmSpec>> {
        let output = self
            .cloudwatch
            .describe_alarms_for_metric()
            .metric_name(metric_name)
            .namespace(namespace)
            .send()
            .await
            .classify()?;
        let Some(alarm) = output
            .metric_alarms()
            .iter()
            .find(|a| a.alarm_name() == Some(alarm_name))
        else {
            return Ok(Lookup::NotFound);
        };
        debug!(alarm = %alarm_name, "Fetched alarm");
        Ok(Lookup::Found(AlarmSpec {
            alarm_name: alarm_name.to_string(),
            alarm_description: alarm
                .alarm_description()
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            actions_enabled: alarm.actions_enabled().unwrap_or(false),
            alarm_actions: alarm.alarm_actions().to_vec(),
            metric_name: alarm.metric_name().unwrap_or_default().to_string(),
            namespace: alarm.namespace().unwrap_or_default().to_string(),
            evaluation_periods: alarm.evaluation_periods().unwrap_or_default(),
            threshold: alarm.threshold().unwrap_or_default(),
            comparison_operator: alarm
                .comparison_operator()
                .map(|c| c.as_str().to_string())
                .unwrap_or_default(),
            statistic: alarm
                .statistic()
                .map(|s| s.as_str().to_string())
                .unwrap_or_default(),
            period: alarm.period().unwrap_or_default(),
        }))
    }

    async fn delete_alarm(&self, alarm_name: &str) -> GatewayResult<()> {
        self.cloudwatch
            .delete_alarms()
            .alarm_names(alarm_name)
            .send()
            .await
            .classify()?;
        Ok(())
    }

    async fn put_alarm(&self, alarm: &AlarmSpec) -> GatewayResult<()> {
        self.cloudwatch
            .put_metric_alarm()
            .alarm_name(&alarm.alarm_name)
            .set_alarm_description(alarm.alarm_description.clone())
            .actions_enabled(alarm.actions_enabled)
            .set_alarm_actions(Some(alarm.alarm_actions.clone()))
            .metric_name(&alarm.metric_name)
            .namespace(&alarm.namespace)
            .evaluation_periods(alarm.evaluation_periods)
            .threshold(alarm.threshold)
            .comparison_operator(ComparisonOperator::from(alarm.comparison_operator.as_str()))
            .statistic(Statistic::from(alarm.statistic.as_str()))
            .period(alarm.period)
            .send()
            .await
            .classify()?;
        Ok(())
    }
}
