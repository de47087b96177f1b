//! Produces the full set of work items for one direction of a run.
//!
//! The local variant walks the scoped directory with an explicit worklist (no
//! call-stack recursion, so arbitrarily deep trees are fine) and yields only
//! regular files; symlinks and special files are skipped. The remote variant
//! follows continuation tokens through a paginated listing until exhausted.
//!
//! Both variants are fatal on failure: if the work set cannot be produced in
//! full, nothing is transferred. Individual items whose mapping is invalid do
//! not abort the run; they are collected as rejected entries and reported as
//! failures by the orchestrator.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::SyncRoot;
use crate::contract::{ListPage, ObjectStore};
use crate::keymap::{self, InvalidPathError};

/// Attempts per listing page before the run is abandoned.
const MAX_LIST_ATTEMPTS: u32 = 3;
const LIST_BACKOFF_BASE_MS: u64 = 100;

/// One unit of transfer: one file, one direction. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub local_path: PathBuf,
    pub key: String,
    pub size_hint: Option<u64>,
}

/// The full work set for a run, plus the addresses that failed to map.
#[derive(Debug, Default)]
pub struct Enumeration {
    pub items: Vec<WorkItem>,
    /// (offending address, why it was rejected); reported as failed items.
    pub rejected: Vec<(String, InvalidPathError)>,
}

/// Listing or walking the source side failed; the work set is unknown, so the
/// whole run aborts without attempting any transfer.
#[derive(Debug)]
pub enum EnumerationError {
    NotADirectory(PathBuf),
    LocalWalk {
        path: PathBuf,
        source: std::io::Error,
    },
    RemoteList(String),
}

impl fmt::Display for EnumerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnumerationError::NotADirectory(path) => {
                write!(f, "{} does not exist or is not a directory", path.display())
            }
            EnumerationError::LocalWalk { path, source } => {
                write!(f, "failed to walk {}: {}", path.display(), source)
            }
            EnumerationError::RemoteList(reason) => {
                write!(f, "failed to list bucket contents: {reason}")
            }
        }
    }
}

impl std::error::Error for EnumerationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EnumerationError::LocalWalk { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Enumerate the scoped local subtree into upload work items.
pub async fn enumerate_local(root: &SyncRoot) -> Result<Enumeration, EnumerationError> {
    let scope = root.scope_dir();
    match tokio::fs::metadata(&scope).await {
        Ok(meta) if meta.is_dir() => {}
        _ => return Err(EnumerationError::NotADirectory(scope)),
    }

    let mut out = Enumeration::default();
    let mut pending = vec![scope];
    while let Some(dir) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&dir).await.map_err(|source| {
            EnumerationError::LocalWalk {
                path: dir.clone(),
                source,
            }
        })?;
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(source) => {
                    return Err(EnumerationError::LocalWalk {
                        path: dir.clone(),
                        source,
                    })
                }
            };
            // DirEntry::file_type does not follow symlinks, so links and
            // special files fall through both arms and are skipped.
            let file_type = match entry.file_type().await {
                Ok(ft) => ft,
                Err(source) => {
                    return Err(EnumerationError::LocalWalk {
                        path: entry.path(),
                        source,
                    })
                }
            };
            if file_type.is_dir() {
                pending.push(entry.path());
            } else if file_type.is_file() {
                let path = entry.path();
                match keymap::to_remote_key(root, &path) {
                    Ok(key) => {
                        let size_hint = entry.metadata().await.ok().map(|m| m.len());
                        out.items.push(WorkItem {
                            local_path: path,
                            key,
                            size_hint,
                        });
                    }
                    Err(err) => {
                        warn!(path = %path.display(), error = %err, "Skipping unmappable local file");
                        out.rejected.push((path.display().to_string(), err));
                    }
                }
            }
        }
    }
    debug!(
        items = out.items.len(),
        rejected = out.rejected.len(),
        "Local enumeration complete"
    );
    Ok(out)
}

/// Enumerate the scoped bucket namespace into download work items.
///
/// Listing is scoped to `prefix/` so sibling folders sharing the prefix as a
/// string (`images` vs `images2`) never bleed into the run.
pub async fn enumerate_remote<S>(store: &S, root: &SyncRoot) -> Result<Enumeration, EnumerationError>
where
    S: ObjectStore + ?Sized,
{
    let list_prefix = if root.remote_prefix.is_empty() {
        None
    } else {
        Some(format!("{}/", root.remote_prefix))
    };

    let mut out = Enumeration::default();
    let mut token: Option<String> = None;
    loop {
        let page = list_page(store, list_prefix.as_deref(), token.as_deref()).await?;
        for object in page.objects {
            match keymap::to_local_path(root, &object.key) {
                Ok(local_path) => out.items.push(WorkItem {
                    local_path,
                    key: object.key,
                    size_hint: object.size,
                }),
                Err(err) => {
                    warn!(key = %object.key, error = %err, "Skipping unmappable remote key");
                    out.rejected.push((object.key, err));
                }
            }
        }
        token = page.next_token;
        if token.is_none() {
            break;
        }
    }
    debug!(
        items = out.items.len(),
        rejected = out.rejected.len(),
        "Remote enumeration complete"
    );
    Ok(out)
}

/// Fetch one listing page, retrying transient failures with exponential
/// backoff before giving up on the whole run.
async fn list_page<S>(
    store: &S,
    prefix: Option<&str>,
    continuation: Option<&str>,
) -> Result<ListPage, EnumerationError>
where
    S: ObjectStore + ?Sized,
{
    let mut attempt = 1;
    loop {
        match store.list(prefix, continuation).await {
            Ok(page) => return Ok(page),
            Err(err) if attempt < MAX_LIST_ATTEMPTS => {
                let backoff =
                    Duration::from_millis(LIST_BACKOFF_BASE_MS * 2u64.pow(attempt - 1));
                warn!(attempt, error = %err, backoff_ms = backoff.as_millis() as u64, "Listing page failed, retrying");
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
            Err(err) => return Err(EnumerationError::RemoteList(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn missing_directory_is_an_enumeration_error() {
        let root = SyncRoot::new("bucket", "/definitely/not/here", "");
        let err = enumerate_local(&root).await.unwrap_err();
        assert!(matches!(err, EnumerationError::NotADirectory(_)));
    }

    #[tokio::test]
    async fn empty_directory_yields_no_items() {
        let dir = tempfile::tempdir().unwrap();
        let root = SyncRoot::new("bucket", dir.path(), "");
        let out = enumerate_local(&root).await.unwrap();
        assert!(out.items.is_empty());
        assert!(out.rejected.is_empty());
    }

    #[tokio::test]
    async fn walk_yields_only_regular_files_with_mapped_keys() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), b"a").unwrap();
        fs::create_dir_all(dir.path().join("sub/deep")).unwrap();
        fs::write(dir.path().join("sub/deep/b.png"), b"png").unwrap();
        #[cfg(unix)]
        std::os::unix::fs::symlink(dir.path().join("a.txt"), dir.path().join("link.txt"))
            .unwrap();

        let root = SyncRoot::new("bucket", dir.path(), "");
        let mut keys: Vec<String> = enumerate_local(&root)
            .await
            .unwrap()
            .items
            .into_iter()
            .map(|item| item.key)
            .collect();
        keys.sort();
        assert_eq!(keys, vec!["a.txt".to_string(), "sub/deep/b.png".to_string()]);
    }

    #[tokio::test]
    async fn prefix_scopes_the_walk_to_its_subtree() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("images")).unwrap();
        fs::write(dir.path().join("images/x.jpg"), b"jpg").unwrap();
        fs::write(dir.path().join("outside.txt"), b"out").unwrap();

        let root = SyncRoot::new("bucket", dir.path(), "images");
        let out = enumerate_local(&root).await.unwrap();
        assert_eq!(out.items.len(), 1);
        assert_eq!(out.items[0].key, "images/x.jpg");
        assert_eq!(out.items[0].size_hint, Some(3));
    }
}
