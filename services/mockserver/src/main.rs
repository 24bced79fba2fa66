//! Operator CLI for the mock server's snapshot file.
//!
//! # Purpose
//! Seeds a snapshot with the built-in entities or prints what a snapshot
//! holds, using the same configuration as the in-process server.
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mockserver::config::MockServerConfig;
use mockserver::observability;
use mockserver::store::EntityStore;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mockserver")]
#[command(about = "Manage mock log server snapshots")]
struct Args {
    /// Snapshot file (overrides GRAYMOCK_DATA_PATH)
    #[arg(long, global = true)]
    data_path: Option<PathBuf>,

    /// Print rendered metrics after the command
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the snapshot, add the built-in entities and save it
    Seed {
        /// Password of the seeded admin user (overrides GRAYMOCK_ADMIN_PASSWORD)
        #[arg(long)]
        admin_password: Option<String>,
    },
    /// Load the snapshot and print per-collection counts as JSON
    Inspect,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let metrics_handle = observability::init_observability("graymock");
    let mut config = MockServerConfig::from_env_or_yaml().context("mock server config")?;
    if let Some(path) = args.data_path {
        config.data_path = Some(path);
    }

    let store = EntityStore::from_config(&config);
    store.load().context("load snapshot")?;
    tracing::info!(
        backend = store.backend_name(),
        durable = store.is_durable(),
        "store ready"
    );

    match args.command {
        Command::Seed { admin_password } => {
            let password = admin_password.unwrap_or(config.admin_password);
            store.seed_defaults(&password).context("seed defaults")?;
            store.save().context("save snapshot")?;
            if !store.is_durable() {
                tracing::warn!("no data path configured; seeded state was not persisted");
            }
        }
        Command::Inspect => {
            let summary = serde_json::to_string_pretty(&store.summary())
                .context("encode summary")?;
            println!("{summary}");
        }
    }

    if args.metrics {
        print!("{}", metrics_handle.render());
    }
    Ok(())
}
