//! CloudTrail gateway, together with the CloudWatch Logs group it delivers to

use crate::aws::context::{AwsContext, FromAwsContext};
use crate::aws::error::SdkResultExt;
use crate::gateway::{GatewayResult, TrailGateway, TrailSpec};
use concierge_common::Lookup;
use tracing::debug;

/// CloudTrail, CloudWatch Logs and IAM clients for one region
pub struct CloudTrailGateway {
    trails: aws_sdk_cloudtrail::Client,
    logs: aws_sdk_cloudwatchlogs::Client,
    iam: aws_sdk_iam::Client,
}

impl FromAwsContext for CloudTrailGateway {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            trails: ctx.cloudtrail_client(),
            logs: ctx.logs_client(),
            iam: ctx.iam_client(),
        }
    }
}

impl TrailGateway for CloudTrailGateway {
    async fn find_log_group(&self, name: &str) -> GatewayResult<Lookup<String>> {
        let output = self
            .logs
            .describe_log_groups()
            .log_group_name_prefix(name)
            .send()
            .await
            .classify()?;
        let arn = output
            .log_groups()
            .iter()
            .find(|group| group.log_group_name() == Some(name))
            .and_then(|group| group.arn())
            .map(str::to_string);
        Ok(arn.into())
    }

    async fn create_log_group(&self, name: &str) -> GatewayResult<()> {
        self.logs
            .create_log_group()
            .log_group_name(name)
            .send()
            .await
            .classify()?;
        Ok(())
    }

    async fn resolve_role_arn(&self, role_name: &str) -> GatewayResult<Lookup<String>> {
        let output = self
            .iam
            .get_role()
            .role_name(role_name)
            .send()
            .await
            .lookup()?;
        let arn = output
            .found()
            .and_then(|o| o.role().map(|role| role.arn().to_string()));
        Ok(arn.into())
    }

    async fn describe_trail(&self, name: &str) -> GatewayResult<Lookup<TrailSpec>> {
        let output = match self
            .trails
            .describe_trails()
            .trail_name_list(name)
            .send()
            .await
            .lookup()?
        {
            Lookup::Found(output) => output,
            Lookup::NotFound => return Ok(Lookup::NotFound),
        };
        let Some(trail) = output.trail_list().first() else {
            return Ok(Lookup::NotFound);
        };
        debug!(trail = %name, "Fetched trail configuration");
        Ok(Lookup::Found(TrailSpec {
            s3_bucket_name: trail.s3_bucket_name().unwrap_or_default().to_string(),
            s3_key_prefix: trail.s3_key_prefix().unwrap_or_default().to_string(),
            cloud_watch_logs_log_group_arn: trail
                .cloud_watch_logs_log_group_arn()
                .unwrap_or_default()
                .to_string(),
            cloud_watch_logs_role_arn: trail
                .cloud_watch_logs_role_arn()
                .unwrap_or_default()
                .to_string(),
            include_global_service_events: trail.include_global_service_events().unwrap_or(false),
        }))
    }

    async fn create_trail(&self, name: &str, spec: &TrailSpec) -> GatewayResult<()> {
        self.trails
            .create_trail()
            .name(name)
            .s3_bucket_name(&spec.s3_bucket_name)
            .s3_key_prefix(&spec.s3_key_prefix)
            .cloud_watch_logs_log_group_arn(&spec.cloud_watch_logs_log_group_arn)
            .cloud_watch_logs_role_arn(&spec.cloud_watch_logs_role_arn)
            .include_global_service_events(spec.include_global_service_events)
            .send()
            .await
            .classify()?;
        Ok(())
    }

    async fn update_trail(&self, name: &str, spec: &TrailSpec) -> GatewayResult<()> {
        self.trails
            .update_trail()
            .name(name)
            .s3_bucket_name(&spec.s3_bucket_name)
            .s3_key_prefix(&spec.s3_key_prefix)
            .cloud_watch_logs_log_group_arn(&spec.cloud_watch_logs_log_group_arn)
            .cloud_watch_logs_role_arn(&spec.cloud_watch_logs_role_arn)
            .include_global_service_events(spec.include_global_service_events)
            .send()
            .await
            .classify()?;
        Ok(())
    }

    async fn trail_status(&self, name: &str) -> GatewayResult<Lookup<bool>> {
        let output = self
            .trails
            .get_trail_status()
            .name(name)
            .send()
            .await
            .lookup()?;
        Ok(output.map(|o| o.is_logging().unwrap_or(false)))
    }

    async fn start_logging(&self, name: &str) -> GatewayResult<()> {
        self.trails
            .start_logging()
            .name(name)
            .send()
            .await
            .classify()?;
        Ok(())
    }
}
