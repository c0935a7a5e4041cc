//! concierge: declarative AWS account reconciliation
//!
//! Brings an AWS account in line with a YAML desired-state file and prints
//! one line per section describing what was changed.

use anyhow::{Context, Result};
use clap::Parser;
use concierge_common::ResourceKind;
use concierge_common::regions::DEFAULT_REGION;
use concierge_sync::aws::{AwsBackend, AwsContext};
use concierge_sync::config::{self, DesiredConfig};
use concierge_sync::coordinator::Coordinator;
use concierge_sync::templates::ACCOUNT_NUMBER_ENV;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "concierge")]
#[command(about = "Reconcile an AWS account against a declared configuration")]
#[command(version)]
struct Args {
    /// Desired-state YAML file
    config: PathBuf,

    /// Sections to reconcile, in order (default: all, in the standard order)
    #[arg(value_name = "SECTION")]
    sections: Vec<ResourceKind>,

    /// AWS profile to use (overrides AWS_PROFILE env var)
    #[arg(long)]
    aws_profile: Option<String>,

    /// Account number to use instead of asking AWS
    #[arg(long, env = ACCOUNT_NUMBER_ENV)]
    account_number: Option<String>,

    /// Home region for IAM and STS
    #[arg(long, default_value = DEFAULT_REGION)]
    region: String,
}

impl From<Args> for config::RunConfig {
    fn from(args: Args) -> Self {
        Self {
            config_path: args.config,
            sections: args.sections,
            aws: config::AwsSettings {
                region: args.region,
                profile: args.aws_profile,
            },
            account_override: args.account_number,
        }
    }
}

#[tokio::main]
async fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        // --help and --version
        Err(e) if !e.use_stderr() => {
            let _ = e.print();
            return;
        }
        Err(e) => {
            let _ = e.print();
            std::process::exit(1);
        }
    };

    if let Err(e) = run(args).await {
        print_error(&e);
        std::process::exit(1);
    }
}

/// Print error in a user-friendly way
fn print_error(e: &anyhow::Error) {
    use std::io::Write;

    let mut stderr = std::io::stderr();
    let _ = writeln!(stderr, "\n\x1b[1;31mError:\x1b[0m {e}");

    let mut source = e.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "  \x1b[33mCaused by:\x1b[0m {cause}");
        source = cause.source();
    }
}

async fn run(args: Args) -> Result<()> {
    // Logs go to stderr; stdout carries only the section reports
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let run_config: config::RunConfig = args.into();
    let desired = DesiredConfig::load(&run_config.config_path)
        .context("Failed to load desired-state file")?;
    let sections = run_config.selected_sections();

    if let Some(profile) = &run_config.aws.profile {
        info!(profile = %profile, "Using AWS profile");
    }
    info!(
        config = %run_config.config_path.display(),
        sections = ?sections,
        region = %run_config.aws.region,
        "Starting reconciliation"
    );

    let ctx =
        AwsContext::with_profile(&run_config.aws.region, run_config.aws.profile.as_deref()).await;
    let mut coordinator = Coordinator::new(AwsBackend::new(ctx), run_config.account_override);

    let reports = coordinator
        .run(&desired, &sections, |report| println!("{}", report.render_line()))
        .await?;

    let failed: usize = reports.iter().map(|r| r.failed_records()).sum();
    info!(sections = reports.len(), failed_records = failed, "Reconciliation finished");
    Ok(())
}
