//! Gitmirror CLI
//!
//! Keeps local mirrors of whole organizations in sync with a remote
//! server: lists every repository per configured organization, clones the
//! ones missing locally, fast-forwards the ones that exist, and replaces
//! diverged mirrors after backing them up.
//!
//! One invocation processes the configured set once and exits; failures
//! are reported per repository and never abort the run.

mod config;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use gitmirror_client::DirectoryClient;
use gitmirror_core::{SyncOutcome, SyncReport};
use gitmirror_engine::{LibGitTransport, SyncCoordinator, SyncExecutor};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "gitmirror")]
#[command(about = "Mirror every repository of an organization locally", long_about = None)]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(
        long,
        short = 'c',
        env = "GITMIRROR_CONFIG",
        default_value = "config.yaml"
    )]
    config: std::path::PathBuf,

    /// Override the configured concurrency cap
    #[arg(long)]
    max_parallel: Option<usize>,

    /// Per-request timeout for listing calls, in seconds
    #[arg(long, default_value_t = 30)]
    http_timeout: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gitmirror=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Configuration errors are fatal to the whole run
    let mut config = Config::load(&cli.config)?;
    if let Some(cap) = cli.max_parallel {
        config.max_parallel = cap;
    }
    config.validate()?;

    info!(
        orgs = config.orgs.len(),
        max_parallel = config.max_parallel,
        "configuration loaded"
    );

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(cli.http_timeout))
        .build()
        .context("failed to build HTTP client")?;
    let directory =
        DirectoryClient::with_client(&config.url, &config.token, http).with_strategy(config.listing);

    let executor = SyncExecutor::new(Arc::new(LibGitTransport::new()), &config.token);
    let coordinator = SyncCoordinator::new(executor, config.max_parallel);

    for org in &config.orgs {
        println!("{}", format!("Syncing organization {}", org.name).bold());

        let repos = match directory.list_repos(&org.name).await {
            Ok(repos) => repos,
            Err(e) => {
                // Listing failures are organization-scoped: report, skip,
                // continue with the remaining organizations
                error!(org = %org.name, error = %e, "failed to list repositories");
                println!("  {} listing failed, organization skipped", "x".red());
                continue;
            }
        };

        if repos.is_empty() {
            println!("  {}", "no repositories".dimmed());
            continue;
        }

        info!(org = %org.name, count = repos.len(), "repositories listed");
        let report = coordinator.run(repos, &org.output).await;
        print_report(&org.name, &report);
    }

    Ok(())
}

/// Print per-repository outcome lines and the aggregate summary
fn print_report(org: &str, report: &SyncReport) {
    for (name, outcome) in report.outcomes() {
        let line = match outcome {
            SyncOutcome::Cloned => "cloned".green(),
            SyncOutcome::UpToDate => "up to date".dimmed(),
            SyncOutcome::Pulled => "pulled".green(),
            SyncOutcome::Recovered { backup } => {
                format!("recovered (backup: {})", backup).yellow()
            }
            SyncOutcome::Failed { stage, reason } => {
                format!("failed during {}: {}", stage, reason).red()
            }
        };
        println!("  {} {:<40} {}", "-".cyan(), name, line);
    }

    let summary = format!(
        "{}: {} synced, {} failed",
        org,
        report.succeeded(),
        report.failed()
    );
    if report.failed() > 0 {
        println!("{}", summary.red().bold());
    } else {
        println!("{}", summary.green().bold());
    }
}
