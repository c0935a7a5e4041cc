//! Policy templates and account number resolution

use crate::aws::account::AccountId;
use crate::gateway::IdentityGateway;
use concierge_common::trust::build_trust_document;
use concierge_common::{ConfigError, Document, FatalError, Substitutions, render_file};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info, warn};

/// Environment variable that overrides account number discovery
pub const ACCOUNT_NUMBER_ENV: &str = "AWS_ACCOUNT_NUMBER";

/// An inline policy file: `{"PolicyName": ..., "PolicyDocument": {...}}`
#[derive(Debug, Clone, PartialEq)]
pub struct InlinePolicy {
    pub name: String,
    pub document: Document,
}

/// Loads and renders templates for one account
#[derive(Debug, Clone)]
pub struct PolicyTemplates {
    account: AccountId,
}

impl PolicyTemplates {
    pub fn new(account: AccountId) -> Self {
        Self { account }
    }

    pub fn account(&self) -> &AccountId {
        &self.account
    }

    pub fn substitutions(&self, bucket_name: Option<&str>) -> Substitutions {
        let subs = Substitutions::new(self.account.as_str());
        match bucket_name {
            Some(bucket) => subs.with_bucket(bucket),
            None => subs,
        }
    }

    /// Render every file, keeping input order.
    pub fn load_from_files<P: AsRef<Path>>(
        &self,
        paths: &[P],
        bucket_name: Option<&str>,
    ) -> Result<Vec<Document>, ConfigError> {
        let subs = self.substitutions(bucket_name);
        paths
            .iter()
            .map(|path| {
                debug!(path = %path.as_ref().display(), "Rendering template");
                render_file(path.as_ref(), &subs)
            })
            .collect()
    }

    /// Render a single template.
    pub fn load_one(&self, path: &Path, bucket_name: Option<&str>) -> Result<Document, ConfigError> {
        render_file(path, &self.substitutions(bucket_name))
    }

    /// Render inline policy files and split out their name and document.
    pub fn load_inline_policies<P: AsRef<Path>>(
        &self,
        paths: &[P],
    ) -> Result<Vec<InlinePolicy>, ConfigError> {
        let docs = self.load_from_files(paths, None)?;
        paths
            .iter()
            .zip(docs)
            .map(|(path, mut doc)| {
                let name = doc.get("PolicyName").and_then(Value::as_str).map(str::to_string);
                let document = doc.get_mut("PolicyDocument").map(Value::take);
                match (name, document) {
                    (Some(name), Some(document)) if document.is_object() => {
                        Ok(InlinePolicy { name, document })
                    }
                    _ => Err(ConfigError::Shape(format!(
                        "{}: inline policy needs PolicyName and PolicyDocument",
                        path.as_ref().display()
                    ))),
                }
            })
            .collect()
    }

    /// Trust document for a role in this account.
    pub fn trust_document(
        &self,
        mfa_required: bool,
        principals: &[String],
        services: &[String],
    ) -> Document {
        build_trust_document(mfa_required, principals, services, self.account.as_str())
    }
}

/// Determine the account number.
///
/// Tried in order: the override, the calling user's ARN, the first listed
/// user's ARN, and STS caller identity.
pub async fn resolve_account_number(
    env_override: Option<&str>,
    identity: &impl IdentityGateway,
) -> Result<AccountId, FatalError> {
    if let Some(account) = env_override.and_then(AccountId::parse) {
        debug!(account_id = %account, "Using account number override");
        return Ok(account);
    }

    match identity.current_user_arn().await {
        Ok(arn) => {
            if let Some(account) = AccountId::from_arn(&arn) {
                info!(account_id = %account, "Resolved account from caller user");
                return Ok(account);
            }
        }
        Err(e) => debug!(error = %e, "GetUser failed, trying ListUsers"),
    }

    match identity.first_user_arn().await {
        Ok(Some(arn)) => {
            if let Some(account) = AccountId::from_arn(&arn) {
                info!(account_id = %account, "Resolved account from listed user");
                return Ok(account);
            }
        }
        Ok(None) => debug!("Account has no IAM users"),
        Err(e) => debug!(error = %e, "ListUsers failed, trying STS"),
    }

    match identity.caller_account().await {
        Ok(raw) => {
            if let Some(account) = AccountId::parse(&raw) {
                info!(account_id = %account, "Resolved account from STS");
                return Ok(account);
            }
        }
        Err(e) => warn!(error = %e, "STS GetCallerIdentity failed"),
    }

    Err(FatalError::AccountUnresolved)
}
