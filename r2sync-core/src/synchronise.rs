//! High-level pipeline: orchestrates enumerate → map → schedule → transfer.
//!
//! This module provides the top-level orchestration for one sync run in either
//! direction. A run moves through enumeration, transfer and reporting in one
//! `synchronise` call:
//!   - Enumerates the source side (local walk or paginated bucket listing)
//!   - Runs every work item through the bounded scheduler
//!   - Aggregates per-item outcomes into a [`SyncReport`] as they arrive
//!
//! # Responsibilities
//! - Enumeration failure is fatal: the work set is unknown, so no transfers
//!   are attempted and the run returns `Err` immediately.
//! - Individual transfer failures never abort the run; they are recorded in
//!   the report alongside enumeration-time rejects.
//! - Invokes logging throughout for traceability (see tracing events).
//!
//! # Callable From
//! - Used by the CLI crate and the integration tests.
//! - Expects a concrete (async) [`ObjectStore`] implementation.
//!
//! # Navigation
//! - Main entrypoint: [`synchronise`]
//! - Supporting types: [`SyncReport`], [`FailedItem`].

use tracing::{error, info};

use crate::config::SyncRoot;
use crate::contract::{Direction, ObjectStore};
use crate::enumerate::{self, Enumeration, EnumerationError};
use crate::schedule;
use crate::transfer::TransferStatus;

/// One item that did not make it, with a human-readable reason.
#[derive(Debug, Clone)]
pub struct FailedItem {
    /// Remote key, or the local path for items rejected before mapping.
    pub address: String,
    pub reason: String,
}

/// Aggregate result of one run. Owned by the orchestrator for the duration of
/// the run and handed to the caller at the end; exactly one outcome per
/// enumerated item is folded in, in arrival order.
#[derive(Debug)]
pub struct SyncReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: Vec<FailedItem>,
    pub bytes_transferred: u64,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Entrypoint: mirror the scoped tree in the given direction, with at most
/// `max_concurrent` transfers in flight, and report what happened.
pub async fn synchronise<S>(
    store: &S,
    root: &SyncRoot,
    direction: Direction,
    max_concurrent: usize,
) -> Result<SyncReport, EnumerationError>
where
    S: ObjectStore + ?Sized,
{
    info!(
        ?direction,
        bucket = %root.bucket,
        local_dir = %root.local_dir.display(),
        remote_prefix = %root.remote_prefix,
        max_concurrent,
        "[SYNC] Starting run"
    );

    let Enumeration { items, rejected } = match direction {
        Direction::Upload => enumerate::enumerate_local(root).await,
        Direction::Download => enumerate::enumerate_remote(store, root).await,
    }
    .map_err(|err| {
        error!(error = %err, "[SYNC][ERROR] Enumeration failed, aborting run");
        err
    })?;

    let total = items.len() + rejected.len();
    info!(
        items = items.len(),
        rejected = rejected.len(),
        "[SYNC] Enumeration complete, starting transfers"
    );

    let mut failed: Vec<FailedItem> = rejected
        .into_iter()
        .map(|(address, err)| FailedItem {
            address,
            reason: err.to_string(),
        })
        .collect();

    let outcomes = schedule::run_all(store, direction, items, max_concurrent).await;

    let mut succeeded = 0;
    let mut bytes_transferred = 0;
    for outcome in outcomes {
        match outcome.status {
            TransferStatus::Success => {
                succeeded += 1;
                bytes_transferred += outcome.bytes_transferred;
            }
            TransferStatus::Failed(reason) => failed.push(FailedItem {
                address: outcome.item.key,
                reason,
            }),
        }
    }

    let report = SyncReport {
        total,
        succeeded,
        failed,
        bytes_transferred,
    };
    info!(
        total = report.total,
        succeeded = report.succeeded,
        failed = report.failed.len(),
        bytes = report.bytes_transferred,
        "[SYNC] Run reported"
    );
    Ok(report)
}
