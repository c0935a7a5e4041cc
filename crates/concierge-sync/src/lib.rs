//! concierge-sync - Reconciles a declared AWS account configuration
//!
//! Reads a YAML desired-state file and brings IAM roles, groups, managed
//! policies, S3 buckets, CloudTrail, CloudWatch alarms, SNS topics and
//! account settings in line with it. Every record reports what it changed.
//!
//! ## Modules
//!
//! - [`config`]: Run configuration and desired-state file
//! - [`coordinator`]: Section ordering and gateway wiring
//! - [`gateway`]: Traits over the remote services
//! - [`sync`]: One synchronizer per section
//! - [`templates`]: Policy templates and account number resolution
//! - [`aws`]: SDK-backed gateways

pub mod aws;
pub mod config;
pub mod coordinator;
pub mod gateway;
pub mod sync;
pub mod templates;

pub use coordinator::{Backend, Coordinator};
