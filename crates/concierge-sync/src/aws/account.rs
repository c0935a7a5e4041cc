//! AWS account identity

use crate::aws::context::{AwsContext, FromAwsContext};
use crate::aws::error::{AwsError, SdkResultExt};
use crate::gateway::{GatewayResult, IdentityGateway};
use tracing::debug;

/// Strongly-typed AWS account ID (12-digit string)
///
/// This newtype prevents accidentally mixing account IDs with other strings
/// and keeps account resolution at a single point in a run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display, derive_more::Deref)]
pub struct AccountId(String);

impl AccountId {
    /// Accepts any non-empty string; whitespace is trimmed.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| AccountId(trimmed.to_string()))
    }

    /// Account field (index 4) of a colon-separated ARN.
    pub fn from_arn(arn: &str) -> Option<Self> {
        arn.split(':').nth(4).and_then(Self::parse)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// IAM and STS backed identity lookups
pub struct AwsIdentity {
    iam: aws_sdk_iam::Client,
    sts: aws_sdk_sts::Client,
}

impl FromAwsContext for AwsIdentity {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            iam: ctx.iam_client(),
            sts: ctx.sts_client(),
        }
    }
}

impl IdentityGateway for AwsIdentity {
    async fn current_user_arn(&self) -> GatewayResult<String> {
        let output = self.iam.get_user().send().await.classify()?;
        let arn = output
            .user()
            .map(|user| user.arn().to_string())
            .ok_or_else(|| AwsError::NotFound("GetUser returned no user".to_string()))?;
        debug!(arn = %arn, "Resolved caller user");
        Ok(arn)
    }

    async fn first_user_arn(&self) -> GatewayResult<Option<String>> {
        let output = self.iam.list_users().max_items(1).send().await.classify()?;
        Ok(output.users().first().map(|user| user.arn().to_string()))
    }

    async fn caller_account(&self) -> GatewayResult<String> {
        let identity = self.sts.get_caller_identity().send().await.classify()?;
        identity
            .account()
            .map(str::to_string)
            .ok_or_else(|| AwsError::NotFound("No account ID returned from STS".to_string()))
    }
}
