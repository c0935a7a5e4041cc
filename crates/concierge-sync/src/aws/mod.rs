//! AWS SDK backed gateways
//!
//! - IAM: roles, groups, managed policies and account settings
//! - STS: account number fallback
//! - S3: buckets, bucket policies and prefix placeholders
//! - CloudTrail / CloudWatch Logs: trails and their log group
//! - CloudWatch: metric filters and alarms
//! - SNS: topics and subscriptions

pub mod account;
pub mod cloudtrail;
pub mod cloudwatch;
pub mod context;
pub mod error;
pub mod iam;
pub mod s3;
pub mod sns;

pub use account::{AccountId, AwsIdentity};
pub use cloudtrail::CloudTrailGateway;
pub use cloudwatch::CloudWatchAlarms;
pub use context::{AwsContext, FromAwsContext};
pub use error::{AwsError, SdkResultExt, classify_aws_error};
pub use iam::{IamAccount, IamGroups, IamRoles};
pub use s3::S3Buckets;
pub use sns::SnsTopics;

use crate::coordinator::Backend;

/// [`Backend`] over one loaded SDK config
///
/// Global services use the home region of the context; regional services
/// reuse its credentials with the region swapped.
#[derive(Debug, Clone)]
pub struct AwsBackend {
    ctx: AwsContext,
}

impl AwsBackend {
    pub fn new(ctx: AwsContext) -> Self {
        Self { ctx }
    }
}

impl Backend for AwsBackend {
    type Roles = IamRoles;
    type Groups = IamGroups;
    type Account = IamAccount;
    type Identity = AwsIdentity;
    type Buckets = S3Buckets;
    type Trails = CloudTrailGateway;
    type Alarms = CloudWatchAlarms;
    type Topics = SnsTopics;

    fn roles(&self) -> IamRoles {
        IamRoles::from_context(&self.ctx)
    }

    fn groups(&self) -> IamGroups {
        IamGroups::from_context(&self.ctx)
    }

    fn account(&self) -> IamAccount {
        IamAccount::from_context(&self.ctx)
    }

    fn identity(&self) -> AwsIdentity {
        AwsIdentity::from_context(&self.ctx)
    }

    fn buckets(&self, region: &str) -> S3Buckets {
        S3Buckets::from_context(&self.ctx.for_region(region))
    }

    fn trails(&self, region: &str) -> CloudTrailGateway {
        CloudTrailGateway::from_context(&self.ctx.for_region(region))
    }

    fn alarms(&self, region: &str) -> CloudWatchAlarms {
        CloudWatchAlarms::from_context(&self.ctx.for_region(region))
    }

    fn topics(&self, region: &str) -> SnsTopics {
        SnsTopics::from_context(&self.ctx.for_region(region))
    }
}
