//! Runs all work items with at most `max_concurrent` transfers in flight.
//!
//! The bound lives in an owned semaphore created per call; there is no module
//! or process level state. tokio's semaphore is fair, so admission is FIFO
//! over the enumerated sequence: when a slot frees, the next not-yet-started
//! item proceeds. Every item is attempted regardless of earlier failures;
//! this is a bulk batch operation, not a transaction.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use tracing::debug;

use crate::contract::{Direction, ObjectStore};
use crate::enumerate::WorkItem;
use crate::transfer::{self, TransferOutcome};

/// Execute every item through the transfer executor, yielding exactly one
/// outcome per item in completion order (not enumeration order).
pub async fn run_all<S>(
    store: &S,
    direction: Direction,
    items: Vec<WorkItem>,
    max_concurrent: usize,
) -> Vec<TransferOutcome>
where
    S: ObjectStore + ?Sized,
{
    let bound = max_concurrent.max(1);
    debug!(items = items.len(), max_concurrent = bound, "Scheduling transfers");

    let semaphore = Arc::new(Semaphore::new(bound));
    let mut in_flight: FuturesUnordered<_> = items
        .into_iter()
        .map(|item| {
            let semaphore = Arc::clone(&semaphore);
            async move {
                // The semaphore is owned by this call and never closed.
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("transfer semaphore closed");
                transfer::execute(store, direction, item).await
            }
        })
        .collect();

    let mut outcomes = Vec::with_capacity(in_flight.len());
    while let Some(outcome) = in_flight.next().await {
        outcomes.push(outcome);
    }
    outcomes
}
