//! SNS topic gateway

use crate::aws::context::{AwsContext, FromAwsContext};
use crate::aws::error::{AwsError, SdkResultExt};
use crate::gateway::{GatewayResult, Subscription, TopicGateway};
use aws_sdk_sns::Client;
use concierge_common::Lookup;

pub struct SnsTopics {
    client: Client,
}

impl FromAwsContext for SnsTopics {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.sns_client(),
        }
    }
}

impl TopicGateway for SnsTopics {
    async fn list_subscriptions(&self, topic_arn: &str) -> GatewayResult<Lookup<Vec<Subscription>>> {
        let result = self
            .client
            .list_subscriptions_by_topic()
            .topic_arn(topic_arn)
            .into_paginator()
            .items()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await
            .lookup()?;
        Ok(result.map(|subs| {
            subs.iter()
                .map(|s| Subscription {
                    endpoint: s.endpoint().unwrap_or_default().to_string(),
                    protocol: s.protocol().unwrap_or_default().to_string(),
                    subscription_arn: s.subscription_arn().unwrap_or_default().to_string(),
                })
                .collect()
        }))
    }

    async fn create_topic(&self, name: &str) -> GatewayResult<String> {
        let output = self.client.create_topic().name(name).send().await.classify()?;
        output
            .topic_arn()
            .map(str::to_string)
            .ok_or_else(|| AwsError::Sdk {
                code: None,
                message: format!("CreateTopic returned no ARN for {name}"),
            })
    }

    async fn subscribe(
        &self,
        topic_arn: &str,
        protocol: &str,
        endpoint: &str,
    ) -> GatewayResult<()> {
        self.client
            .subscribe()
            .topic_arn(topic_arn)
            .protocol(protocol)
            .endpoint(endpoint)
            .send()
            .await
            .classify()?;
        Ok(())
    }

    async fn unsubscribe(&self, subscription_arn: &str) -> GatewayResult<()> {
        self.client
            .unsubscribe()
            .subscription_arn(subscription_arn)
            .send()
            .await
            .classify()?;
        Ok(())
    }
}
