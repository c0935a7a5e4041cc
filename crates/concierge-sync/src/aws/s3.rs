//! S3 bucket gateway

use crate::aws::context::{AwsContext, FromAwsContext};
use crate::aws::error::{AwsError, SdkResultExt};
use crate::gateway::{BucketGateway, GatewayResult};
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use concierge_common::regions::DEFAULT_REGION;
use concierge_common::{Document, Lookup};
use tracing::debug;

/// S3 client bound to one region
pub struct S3Buckets {
    client: Client,
    region: String,
}

impl FromAwsContext for S3Buckets {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.s3_client(),
            region: ctx.region().to_string(),
        }
    }
}

impl BucketGateway for S3Buckets {
    async fn bucket_location(&self, bucket: &str) -> GatewayResult<Lookup<String>> {
        let output = self
            .client
            .get_bucket_location()
            .bucket(bucket)
            .send()
            .await
            .lookup()?;
        Ok(output.map(|o| {
            // An empty constraint means the bucket lives in us-east-1
            o.location_constraint()
                .map(|c| c.as_str())
                .filter(|c| !c.is_empty())
                .unwrap_or(DEFAULT_REGION)
                .to_string()
        }))
    }

    async fn create_bucket(&self, bucket: &str) -> GatewayResult<()> {
        let mut request = self.client.create_bucket().bucket(bucket);
        if self.region != DEFAULT_REGION {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                    .build(),
            );
        }
        request.send().await.classify()?;
        debug!(bucket = %bucket, region = %self.region, "Bucket created");
        Ok(())
    }

    async fn get_bucket_policy(&self, bucket: &str) -> GatewayResult<Lookup<Document>> {
        let output = match self
            .client
            .get_bucket_policy()
            .bucket(bucket)
            .send()
            .await
            .lookup()?
        {
            Lookup::Found(output) => output,
            Lookup::NotFound => return Ok(Lookup::NotFound),
        };
        match output.policy() {
            Some(raw) => serde_json::from_str(raw)
                .map(Lookup::Found)
                .map_err(|e| AwsError::malformed(bucket, e)),
            None => Ok(Lookup::NotFound),
        }
    }

    async fn put_bucket_policy(&self, bucket: &str, policy: &Document) -> GatewayResult<()> {
        self.client
            .put_bucket_policy()
            .bucket(bucket)
            .policy(policy.to_string())
            .send()
            .await
            .classify()?;
        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> GatewayResult<Lookup<String>> {
        let output = match self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .lookup()?
        {
            Lookup::Found(output) => output,
            Lookup::NotFound => return Ok(Lookup::NotFound),
        };
        let body = output.body.collect().await.map_err(|e| AwsError::Sdk {
            code: None,
            message: format!("Failed to read s3://{bucket}/{key}: {e}"),
        })?;
        Ok(Lookup::Found(
            String::from_utf8_lossy(&body.into_bytes()).into_owned(),
        ))
    }

    async fn put_empty_object(&self, bucket: &str, key: &str) -> GatewayResult<()> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from_static(b""))
            .send()
            .await
            .classify()?;
        Ok(())
    }
}
