//! IAM gateways: roles, groups, managed policies and account settings

use crate::aws::context::{AwsContext, FromAwsContext};
use crate::aws::error::{AwsError, SdkResultExt};
use crate::gateway::{
    AccountGateway, GatewayResult, GroupGateway, ManagedPolicyGateway, ManagedPolicyState,
    PasswordPolicy, PolicyHolder, PolicyVersion, RoleGateway,
};
use aws_sdk_iam::Client;
use aws_sdk_iam::types::SummaryKeyType;
use concierge_common::{Document, Lookup};
use tracing::debug;

/// IAM stores documents URL-encoded.
fn decode_document(what: &str, raw: &str) -> GatewayResult<Document> {
    let decoded = urlencoding::decode(raw).map_err(|e| AwsError::malformed(what, e))?;
    serde_json::from_str(&decoded).map_err(|e| AwsError::malformed(what, e))
}

fn encode_document(document: &Document) -> String {
    document.to_string()
}

/// Role gateway over IAM
pub struct IamRoles {
    client: Client,
}

impl FromAwsContext for IamRoles {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.iam_client(),
        }
    }
}

impl PolicyHolder for IamRoles {
    async fn list_attached(&self, holder: &str) -> GatewayResult<Vec<String>> {
        let policies: Vec<_> = self
            .client
            .list_attached_role_policies()
            .role_name(holder)
            .into_paginator()
            .items()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await
            .classify()?;
        Ok(policies
            .iter()
            .filter_map(|p| p.policy_arn().map(str::to_string))
            .collect())
    }

    async fn attach(&self, holder: &str, policy_arn: &str) -> GatewayResult<()> {
        self.client
            .attach_role_policy()
            .role_name(holder)
            .policy_arn(policy_arn)
            .send()
            .await
            .classify()?;
        Ok(())
    }

    async fn detach(&self, holder: &str, policy_arn: &str) -> GatewayResult<()> {
        self.client
            .detach_role_policy()
            .role_name(holder)
            .policy_arn(policy_arn)
            .send()
            .await
            .classify()?;
        Ok(())
    }

    async fn list_inline(&self, holder: &str) -> GatewayResult<Vec<String>> {
        self.client
            .list_role_policies()
            .role_name(holder)
            .into_paginator()
            .items()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await
            .classify()
    }

    async fn get_inline(&self, holder: &str, policy_name: &str) -> GatewayResult<Lookup<Document>> {
        let output = self
            .client
            .get_role_policy()
            .role_name(holder)
            .policy_name(policy_name)
            .send()
            .await
            .lookup()?;
        match output {
            Lookup::Found(output) => Ok(Lookup::Found(decode_document(
                policy_name,
                output.policy_document(),
            )?)),
            Lookup::NotFound => Ok(Lookup::NotFound),
        }
    }

    async fn put_inline(
        &self,
        holder: &str,
        policy_name: &str,
        document: &Document,
    ) -> GatewayResult<()> {
        self.client
            .put_role_policy()
            .role_name(holder)
            .policy_name(policy_name)
            .policy_document(encode_document(document))
            .send()
            .await
            .classify()?;
        Ok(())
    }

    async fn delete_inline(&self, holder: &str, policy_name: &str) -> GatewayResult<()> {
        self.client
            .delete_role_policy()
            .role_name(holder)
            .policy_name(policy_name)
            .send()
            .await
            .classify()?;
        Ok(())
    }
}

impl RoleGateway for IamRoles {
    async fn get_role(&self, name: &str) -> GatewayResult<Lookup<Document>> {
        let output = match self.client.get_role().role_name(name).send().await.lookup()? {
            Lookup::Found(output) => output,
            Lookup::NotFound => return Ok(Lookup::NotFound),
        };
        let raw = output
            .role()
            .and_then(|role| role.assume_role_policy_document())
            .unwrap_or("{}");
        debug!(role = %name, "Fetched trust document");
        Ok(Lookup::Found(decode_document(name, raw)?))
    }

    async fn create_role(&self, name: &str, trust: &Document) -> GatewayResult<()> {
        self.client
            .create_role()
            .role_name(name)
            .assume_role_policy_document(encode_document(trust))
            .send()
            .await
            .classify()?;
        Ok(())
    }

    async fn update_trust_document(&self, name: &str, trust: &Document) -> GatewayResult<()> {
        self.client
            .update_assume_role_policy()
            .role_name(name)
            .policy_document(encode_document(trust))
            .send()
            .await
            .classify()?;
        Ok(())
    }
}

/// Group gateway over IAM
pub struct IamGroups {
    client: Client,
}

impl FromAwsContext for IamGroups {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.iam_client(),
        }
    }
}

impl PolicyHolder for IamGroups {
    async fn list_attached(&self, holder: &str) -> GatewayResult<Vec<String>> {
        let policies: Vec<_> = self
            .client
            .list_attached_group_policies()
            .group_name(holder)
            .into_paginator()
            .items()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await
            .classify()?;
        Ok(policies
            .iter()
            .filter_map(|p| p.policy_arn().map(str::to_string))
            .collect())
    }

    async fn attach(&self, holder: &str, policy_arn: &str) -> GatewayResult<()> {
        self.client
            .attach_group_policy()
            .group_name(holder)
            .policy_arn(policy_arn)
            .send()
            .await
            .classify()?;
        Ok(())
    }

    async fn detach(&self, holder: &str, policy_arn: &str) -> GatewayResult<()> {
        self.client
            .detach_group_policy()
            .group_name(holder)
            .policy_arn(policy_arn)
            .send()
            .await
            .classify()?;
        Ok(())
    }

    async fn list_inline(&self, holder: &str) -> GatewayResult<Vec<String>> {
        self.client
            .list_group_policies()
            .group_name(holder)
            .into_paginator()
            .items()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await
            .classify()
    }

    async fn get_inline(&self, holder: &str, policy_name: &str) -> GatewayResult<Lookup<Document>> {
        let output = self
            .client
            .get_group_policy()
            .group_name(holder)
            .policy_name(policy_name)
            .send()
            .await
            .lookup()?;
        match output {
            Lookup::Found(output) => Ok(Lookup::Found(decode_document(
                policy_name,
                output.policy_document(),
            )?)),
            Lookup::NotFound => Ok(Lookup::NotFound),
        }
    }

    async fn put_inline(
        &self,
        holder: &str,
        policy_name: &str,
        document: &Document,
    ) -> GatewayResult<()> {
        self.client
            .put_group_policy()
            .group_name(holder)
            .policy_name(policy_name)
            .policy_document(encode_document(document))
            .send()
            .await
            .classify()?;
        Ok(())
    }

    async fn delete_inline(&self, holder: &str, policy_name: &str) -> GatewayResult<()> {
        self.client
            .delete_group_policy()
            .group_name(holder)
            .policy_name(policy_name)
            .send()
            .await
            .classify()?;
        Ok(())
    }
}

impl GroupGateway for IamGroups {
    async fn get_group(&self, name: &str) -> GatewayResult<Lookup<()>> {
        let found = self
            .client
            .get_group()
            .group_name(name)
            .max_items(1)
            .send()
            .await
            .lookup()?;
        Ok(found.map(|_| ()))
    }

    async fn create_group(&self, name: &str) -> GatewayResult<()> {
        self.client
            .create_group()
            .group_name(name)
            .send()
            .await
            .classify()?;
        Ok(())
    }
}

/// Account settings and customer managed policies over IAM
pub struct IamAccount {
    client: Client,
}

impl FromAwsContext for IamAccount {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.iam_client(),
        }
    }
}

impl ManagedPolicyGateway for IamAccount {
    async fn get_policy(&self, arn: &str) -> GatewayResult<Lookup<ManagedPolicyState>> {
        let output = match self.client.get_policy().policy_arn(arn).send().await.lookup()? {
            Lookup::Found(output) => output,
            Lookup::NotFound => return Ok(Lookup::NotFound),
        };
        let Some(policy) = output.policy() else {
            return Ok(Lookup::NotFound);
        };
        Ok(Lookup::Found(ManagedPolicyState {
            arn: policy.arn().unwrap_or(arn).to_string(),
            description: policy.description().map(str::to_string),
            default_version_id: policy.default_version_id().unwrap_or("v1").to_string(),
        }))
    }

    async fn get_policy_version(
        &self,
        arn: &str,
        version_id: &str,
    ) -> GatewayResult<Lookup<Document>> {
        let output = match self
            .client
            .get_policy_version()
            .policy_arn(arn)
            .version_id(version_id)
            .send()
            .await
            .lookup()?
        {
            Lookup::Found(output) => output,
            Lookup::NotFound => return Ok(Lookup::NotFound),
        };
        match output.policy_version().and_then(|v| v.document()) {
            Some(raw) => Ok(Lookup::Found(decode_document(arn, raw)?)),
            None => Ok(Lookup::NotFound),
        }
    }

    async fn list_policy_versions(&self, arn: &str) -> GatewayResult<Vec<PolicyVersion>> {
        let output = self
            .client
            .list_policy_versions()
            .policy_arn(arn)
            .send()
            .await
            .classify()?;
        Ok(output
            .versions()
            .iter()
            .filter_map(|v| {
                v.version_id().map(|id| PolicyVersion {
                    version_id: id.to_string(),
                    is_default: v.is_default_version(),
                })
            })
            .collect())
    }

    async fn create_policy(
        &self,
        name: &str,
        description: Option<&str>,
        document: &Document,
    ) -> GatewayResult<()> {
        self.client
            .create_policy()
            .policy_name(name)
            .policy_document(encode_document(document))
            .set_description(description.map(str::to_string))
            .send()
            .await
            .classify()?;
        Ok(())
    }

    async fn create_policy_version(
        &self,
        arn: &str,
        document: &Document,
        set_as_default: bool,
    ) -> GatewayResult<()> {
        self.client
            .create_policy_version()
            .policy_arn(arn)
            .policy_document(encode_document(document))
            .set_as_default(set_as_default)
            .send()
            .await
            .classify()?;
        Ok(())
    }

    async fn delete_policy_version(&self, arn: &str, version_id: &str) -> GatewayResult<()> {
        self.client
            .delete_policy_version()
            .policy_arn(arn)
            .version_id(version_id)
            .send()
            .await
            .classify()?;
        Ok(())
    }

    async fn delete_policy(&self, arn: &str) -> GatewayResult<()> {
        self.client
            .delete_policy()
            .policy_arn(arn)
            .send()
            .await
            .classify()?;
        Ok(())
    }
}

impl AccountGateway for IamAccount {
    async fn get_password_policy(&self) -> GatewayResult<Lookup<PasswordPolicy>> {
        let output = match self
            .client
            .get_account_password_policy()
            .send()
            .await
            .lookup()?
        {
            Lookup::Found(output) => output,
            Lookup::NotFound => return Ok(Lookup::NotFound),
        };
        let Some(live) = output.password_policy() else {
            return Ok(Lookup::NotFound);
        };
        Ok(Lookup::Found(PasswordPolicy {
            minimum_password_length: live.minimum_password_length(),
            require_symbols: Some(live.require_symbols()),
            require_numbers: Some(live.require_numbers()),
            require_uppercase_characters: Some(live.require_uppercase_characters()),
            require_lowercase_characters: Some(live.require_lowercase_characters()),
            allow_users_to_change_password: Some(live.allow_users_to_change_password()),
            max_password_age: live.max_password_age(),
            password_reuse_prevention: live.password_reuse_prevention(),
            hard_expiry: live.hard_expiry(),
        }))
    }

    async fn update_password_policy(&self, policy: &PasswordPolicy) -> GatewayResult<()> {
        self.client
            .update_account_password_policy()
            .set_minimum_password_length(policy.minimum_password_length)
            .set_require_symbols(policy.require_symbols)
            .set_require_numbers(policy.require_numbers)
            .set_require_uppercase_characters(policy.require_uppercase_characters)
            .set_require_lowercase_characters(policy.require_lowercase_characters)
            .set_allow_users_to_change_password(policy.allow_users_to_change_password)
            .set_max_password_age(policy.max_password_age)
            .set_password_reuse_prevention(policy.password_reuse_prevention)
            .set_hard_expiry(policy.hard_expiry)
            .send()
            .await
            .classify()?;
        Ok(())
    }

    async fn root_mfa_enabled(&self) -> GatewayResult<bool> {
        let output = self.client.get_account_summary().send().await.classify()?;
        let enabled = output
            .summary_map()
            .and_then(|summary| summary.get(&SummaryKeyType::AccountMfaEnabled))
            .copied()
            .unwrap_or(0);
        Ok(enabled > 0)
    }

    async fn list_account_aliases(&self) -> GatewayResult<Vec<String>> {
        let output = self.client.list_account_aliases().send().await.classify()?;
        Ok(output.account_aliases().to_vec())
    }

    async fn create_account_alias(&self, alias: &str) -> GatewayResult<()> {
        self.client
            .create_account_alias()
            .account_alias(alias)
            .send()
            .await
            .classify()?;
        Ok(())
    }
}
