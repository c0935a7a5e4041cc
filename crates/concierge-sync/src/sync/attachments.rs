//! Managed-policy attachments and inline policies shared by roles and groups

use crate::gateway::{GatewayResult, PolicyHolder};
use crate::templates::InlinePolicy;
use concierge_common::{ActionReport, Lookup, documents_equal, reconcile};
use tracing::{debug, info};

/// Attach missing managed policies and detach undeclared ones.
pub async fn sync_managed_policies(
    gateway: &impl PolicyHolder,
    holder: &str,
    desired: &[String],
    report: &mut ActionReport,
) -> GatewayResult<()> {
    let current = gateway.list_attached(holder).await?;
    let delta = reconcile(current, desired.iter().cloned());
    debug!(holder = %holder, attach = delta.to_add.len(), detach = delta.to_remove.len(), "Managed policy delta");

    for arn in &delta.to_add {
        info!(holder = %holder, policy_arn = %arn, "Attaching managed policy");
        gateway.attach(holder, arn).await?;
        report.created(format!("Attached {arn}"));
    }
    for arn in &delta.to_remove {
        info!(holder = %holder, policy_arn = %arn, "Detaching managed policy");
        gateway.detach(holder, arn).await?;
        report.deleted(format!("Detached {arn}"));
    }
    Ok(())
}

/// Put missing or changed inline policies, then delete undeclared ones.
pub async fn sync_inline_policies(
    gateway: &impl PolicyHolder,
    holder: &str,
    desired: &[InlinePolicy],
    report: &mut ActionReport,
) -> GatewayResult<()> {
    for policy in desired {
        match gateway.get_inline(holder, &policy.name).await? {
            Lookup::NotFound => {
                info!(holder = %holder, policy = %policy.name, "Creating inline policy");
                gateway
                    .put_inline(holder, &policy.name, &policy.document)
                    .await?;
                report.created(format!("Created inline policy {}", policy.name));
            }
            Lookup::Found(live) if !documents_equal(&live, &policy.document) => {
                info!(holder = %holder, policy = %policy.name, "Replacing inline policy");
                gateway
                    .put_inline(holder, &policy.name, &policy.document)
                    .await?;
                report.updated(format!("Replaced inline policy {}", policy.name));
            }
            Lookup::Found(_) => {}
        }
    }

    let current = gateway.list_inline(holder).await?;
    let delta = reconcile(current, desired.iter().map(|p| p.name.clone()));
    for name in &delta.to_remove {
        info!(holder = %holder, policy = %name, "Deleting inline policy");
        gateway.delete_inline(holder, name).await?;
        report.deleted(format!("Deleted inline policy {name}"));
    }
    Ok(())
}
