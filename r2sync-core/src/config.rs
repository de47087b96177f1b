use std::path::PathBuf;
use tracing::{debug, info};

/// Default number of in-flight transfers when the operator does not tune it.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// The resolved root of one sync run: which bucket, which local directory, and
/// an optional remote prefix scoping the run to a subtree of both sides.
#[derive(Debug, Clone)]
pub struct SyncRoot {
    pub bucket: String,
    pub local_dir: PathBuf,
    /// Normalised prefix: no leading or trailing slashes. Empty means the
    /// whole bucket maps to the whole local directory.
    pub remote_prefix: String,
}

impl SyncRoot {
    /// Build a sync root, normalising the remote prefix so that `"/images"`,
    /// `"images/"` and `"images"` all scope the same subtree.
    pub fn new(
        bucket: impl Into<String>,
        local_dir: impl Into<PathBuf>,
        remote_prefix: &str,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            local_dir: local_dir.into(),
            remote_prefix: remote_prefix.trim_matches('/').to_string(),
        }
    }

    /// Local directory the run actually reads or writes: `local_dir` joined
    /// with the prefix when one is set.
    pub fn scope_dir(&self) -> PathBuf {
        if self.remote_prefix.is_empty() {
            self.local_dir.clone()
        } else {
            self.local_dir.join(&self.remote_prefix)
        }
    }

    pub fn trace_loaded(&self) {
        info!(
            bucket = %self.bucket,
            local_dir = %self.local_dir.display(),
            remote_prefix = %self.remote_prefix,
            "Resolved SyncRoot"
        );
        debug!(?self, "SyncRoot (full debug)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_is_normalised() {
        let root = SyncRoot::new("bucket", "/backup", "/images/");
        assert_eq!(root.remote_prefix, "images");
        assert_eq!(root.scope_dir(), PathBuf::from("/backup/images"));
    }

    #[test]
    fn empty_prefix_scopes_whole_tree() {
        let root = SyncRoot::new("bucket", "/backup", "");
        assert_eq!(root.remote_prefix, "");
        assert_eq!(root.scope_dir(), PathBuf::from("/backup"));
    }
}
