//! Executes one work item's data movement and captures its outcome.
//!
//! `execute` never lets an error escape its boundary: every failure is folded
//! into a `Failed` outcome so one broken item cannot take the run down. Calls
//! are safe to run concurrently for disjoint items; there is no shared mutable
//! state here.

use std::path::Path;

use tracing::{info, warn};

use crate::contract::{Direction, ObjectStore, StoreError};
use crate::enumerate::WorkItem;

/// Uploaded objects are addressed content: serve them cached forever and
/// replace them by re-running the sync.
pub const CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Terminal state of one transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferStatus {
    Success,
    Failed(String),
}

/// Produced exactly once per work item, in completion order.
#[derive(Debug, Clone)]
pub struct TransferOutcome {
    pub item: WorkItem,
    pub status: TransferStatus,
    pub bytes_transferred: u64,
}

impl TransferOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.status, TransferStatus::Success)
    }
}

/// Infer a content type from the file extension, falling back to a generic
/// binary type when unknown. Applies to uploads only; downloads interpret no
/// metadata.
pub fn content_type_for(path: &Path) -> String {
    mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string())
}

/// Move one item's data in the given direction and report the outcome.
pub async fn execute<S>(store: &S, direction: Direction, item: WorkItem) -> TransferOutcome
where
    S: ObjectStore + ?Sized,
{
    let result = match direction {
        Direction::Upload => upload(store, &item).await,
        Direction::Download => download(store, &item).await,
    };
    match result {
        Ok(bytes_transferred) => {
            info!(key = %item.key, bytes = bytes_transferred, ?direction, "Transfer complete");
            TransferOutcome {
                item,
                status: TransferStatus::Success,
                bytes_transferred,
            }
        }
        Err(err) => {
            warn!(key = %item.key, error = %err, ?direction, "Transfer failed");
            TransferOutcome {
                item,
                status: TransferStatus::Failed(err.to_string()),
                bytes_transferred: 0,
            }
        }
    }
}

async fn upload<S>(store: &S, item: &WorkItem) -> Result<u64, StoreError>
where
    S: ObjectStore + ?Sized,
{
    let content_type = content_type_for(&item.local_path);
    store
        .put(&item.key, &item.local_path, &content_type, CACHE_CONTROL)
        .await
}

/// A get that fails mid-stream may leave a partial file at the destination;
/// re-running the sync overwrites it, so the operator contract is simply to
/// re-run until the report is clean.
async fn download<S>(store: &S, item: &WorkItem) -> Result<u64, StoreError>
where
    S: ObjectStore + ?Sized,
{
    if let Some(parent) = item.local_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    store.get(&item.key, &item.local_path).await
}
