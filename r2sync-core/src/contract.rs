//! # contract: capability interface for the remote object store
//!
//! This module defines the single trait (`ObjectStore`) the sync engine needs
//! from a storage backend, plus the plain data types crossing that boundary.
//! The engine never talks to a concrete SDK: the CLI crate wires up a real
//! S3-compatible client, and tests substitute a generated mock.
//!
//! ## Interface & Extensibility
//! - Implement [`ObjectStore`] to target a new backend (S3, R2, a fake, ...).
//! - All methods are async and return boxed error trait objects; the caller
//!   decides what is fatal and what is a per-item failure.
//! - Streaming is the implementor's concern: `get` and `put` take filesystem
//!   paths so bodies can be piped without buffering whole files in memory.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall`, so consumers can generate
//!   deterministic mocks for unit/integration tests (see the test suites of
//!   this crate for usage).

use std::path::Path;

use async_trait::async_trait;

/// Which way one run moves data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Local tree is the source; the bucket is the destination.
    Upload,
    /// The bucket is the source; the local tree is the destination.
    Download,
}

/// Error type for storage operations (simple boxed error for now).
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// One object as reported by a listing call.
#[derive(Debug, Clone)]
pub struct RemoteObject {
    /// Slash-separated address of the object within the bucket.
    pub key: String,
    /// Object size in bytes, when the backend reports one.
    pub size: Option<u64>,
}

/// One page of a paginated listing.
#[derive(Debug, Clone)]
pub struct ListPage {
    pub objects: Vec<RemoteObject>,
    /// Continuation token for the next page; `None` once exhausted.
    pub next_token: Option<String>,
}

/// Capability trait for the remote side of a sync: list a namespace, fetch an
/// object into a file, store a file as an object.
///
/// Implementations must be safe for concurrent use; the scheduler issues up to
/// its concurrency bound of `get`/`put` calls at once.
#[cfg_attr(any(test, feature = "test-export-mocks"), mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List one page of keys under `prefix` (the whole bucket when `None`),
    /// resuming from `continuation` when given.
    async fn list<'a>(
        &self,
        prefix: Option<&'a str>,
        continuation: Option<&'a str>,
    ) -> Result<ListPage, StoreError>;

    /// Fetch the object at `key`, streaming its body to `dest`. Returns the
    /// number of bytes written. `dest`'s parent directory must already exist.
    async fn get(&self, key: &str, dest: &Path) -> Result<u64, StoreError>;

    /// Store the file at `source` under `key`, streaming its body, with the
    /// given content type and cache-control header. Returns the number of
    /// bytes sent.
    async fn put(
        &self,
        key: &str,
        source: &Path,
        content_type: &str,
        cache_control: &str,
    ) -> Result<u64, StoreError>;
}
