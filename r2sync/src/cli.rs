/// # r2sync CLI Interface (Module)
///
/// This module implements the full CLI interface for r2sync: command parsing,
/// argument validation and the async entrypoint used by both `main()` and the
/// integration tests.
///
/// All engine logic (key mapping, enumeration, bounded scheduling) lives in
/// the `r2sync-core` crate. This module is strictly CLI glue: it resolves
/// configuration plus flag overrides into a [`SyncRoot`], wires up the R2
/// client, runs a sync and prints the report.
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use r2sync_core::config::SyncRoot;
use r2sync_core::contract::Direction;
use r2sync_core::synchronise::{synchronise, SyncReport};

use crate::load_config::load_config;
use crate::store::R2Client;

/// CLI for r2sync: mirror a local directory tree against an R2 bucket.
#[derive(Parser)]
#[clap(
    name = "r2sync",
    version,
    about = "Mirror a local directory tree against a Cloudflare R2 bucket, in either direction"
)]
pub struct Cli {
    /// Path to the config file (defaults to $R2SYNC_CONFIG, then ./.r2syncrc)
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload the local tree into the bucket
    Upload(SyncArgs),
    /// Download the bucket contents into the local tree
    Download(SyncArgs),
}

#[derive(clap::Args)]
pub struct SyncArgs {
    /// Remote folder inside the bucket to scope the run to
    #[clap(long)]
    pub remote: Option<String>,

    /// Local folder to upload from or download to (overrides LOCAL_BACKUP)
    #[clap(long)]
    pub local: Option<PathBuf>,

    /// Maximum number of in-flight transfers (overrides CONCURRENCY_SPEED)
    #[clap(long)]
    pub concurrency: Option<usize>,
}

/// Extracted async CLI logic entrypoint for integration tests and main().
pub async fn run(cli: Cli) -> Result<SyncReport> {
    let (direction, args) = match cli.command {
        Commands::Upload(args) => (Direction::Upload, args),
        Commands::Download(args) => (Direction::Download, args),
    };

    let config = load_config(cli.config.as_deref())?;
    let root = SyncRoot::new(
        config.bucket.clone(),
        args.local.clone().unwrap_or_else(|| config.local_backup.clone()),
        args.remote.as_deref().unwrap_or(""),
    );
    root.trace_loaded();
    let max_concurrent = args.concurrency.unwrap_or(config.concurrency);

    let store = R2Client::new(&config).await;
    synchronise(&store, &root, direction, max_concurrent)
        .await
        .context("synchronisation aborted")
}

/// Print the run summary the way operators consume it: one summary line, one
/// line per failed item.
pub fn print_report(report: &SyncReport) {
    println!(
        "{} of {} files transferred ({} bytes)",
        report.succeeded, report.total, report.bytes_transferred
    );
    for failed in &report.failed {
        eprintln!("failed: {} ({})", failed.address, failed.reason);
    }
}
