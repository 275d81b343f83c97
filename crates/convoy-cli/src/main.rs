//! Convoy - Kubernetes multi-component installer
//!
//! Usage:
//!   convoy install --manifest convoy.yml
//!   convoy upgrade --manifest convoy.yml
//!   convoy uninstall --manifest convoy.yml

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use convoy_core::actions::{Install, Uninstall, Upgrade};
use convoy_core::checks::{CheckRunner, UnknownCheckPolicy};
use convoy_core::cluster::{Cluster, ClusterOps};
use convoy_core::durations::Timeouts;
use convoy_core::manifest;
use convoy_core::plan::build_plan;
use convoy_core::walker::{reverse_walk, walk, walk_serially};

#[derive(Parser)]
#[command(name = "convoy")]
#[command(about = "Kubernetes multi-component installer", long_about = None)]
struct Cli {
    /// Path to the component manifest
    #[arg(long, short, global = true, default_value = "convoy.yml")]
    manifest: PathBuf,

    /// Multiply readiness-wait timeouts by this factor
    #[arg(long, global = true, default_value_t = 1)]
    timeout_multiplier: u32,

    /// Fail on readiness checks with an unrecognized type instead of
    /// skipping them
    #[arg(long, global = true)]
    strict_checks: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install all components in your configured kubernetes cluster
    Install,
    /// Upgrade all components in your configured kubernetes cluster
    Upgrade,
    /// Uninstall all components from your configured kubernetes cluster
    Uninstall,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "convoy=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let cluster = Cluster::connect()
        .await
        .context("Failed to connect to the cluster")?;

    let m = manifest::load(&cli.manifest)
        .with_context(|| format!("Failed to load manifest {}", cli.manifest.display()))?;

    // validates the needs relation is acyclic before anything runs
    let plan = build_plan(&m.components)?;
    tracing::info!(
        components = %plan
            .ids()
            .iter()
            .map(|id| id.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        "plan"
    );

    let cluster: Arc<dyn ClusterOps> = Arc::new(cluster);
    let timeouts = Timeouts::new(cli.timeout_multiplier);
    let unknown = if cli.strict_checks {
        UnknownCheckPolicy::Deny
    } else {
        UnknownCheckPolicy::Allow
    };
    let checks = CheckRunner::new(cluster.clone(), timeouts, unknown);

    match cli.command {
        Commands::Install => {
            let action = Install::new(cluster.clone(), checks);
            walk(&m.components, &action)
                .await
                .context("Failed to install all components")?;
        }
        Commands::Upgrade => {
            let action = Upgrade::new(cluster.clone(), checks);
            walk_serially(&plan, &action)
                .await
                .context("Failed to upgrade all components")?;
        }
        Commands::Uninstall => {
            let action = Uninstall::new(cluster.clone(), checks);
            reverse_walk(&m.components, &action)
                .await
                .context("Failed to uninstall all components")?;
        }
    }

    Ok(())
}
