//! Pure path↔key translation between a local tree and a bucket namespace.
//!
//! Remote keys always use forward slashes regardless of host conventions;
//! local paths use host-native separators. When a remote prefix is set, a file
//! at `local_dir/prefix/rest` corresponds to key `prefix/rest`, symmetrically
//! in both directions. With an empty prefix the mapping degenerates to the
//! identity relative to `local_dir`.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::config::SyncRoot;

/// A mapped key or path would escape its root, or cannot be represented on
/// the other side. The offending item is skipped, never transferred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidPathError {
    /// The local path or remote key that failed to map.
    pub offender: String,
    pub reason: &'static str,
}

impl InvalidPathError {
    fn new(offender: impl ToString, reason: &'static str) -> Self {
        Self {
            offender: offender.to_string(),
            reason,
        }
    }
}

impl fmt::Display for InvalidPathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid mapping for {:?}: {}", self.offender, self.reason)
    }
}

impl std::error::Error for InvalidPathError {}

/// Map a local file path to the remote key it syncs with.
///
/// `file_path` must lie under the scoped subtree (`local_dir` joined with the
/// prefix); every component must be a normal UTF-8 segment.
pub fn to_remote_key(root: &SyncRoot, file_path: &Path) -> Result<String, InvalidPathError> {
    let scope = root.scope_dir();
    let rel = file_path
        .strip_prefix(&scope)
        .map_err(|_| InvalidPathError::new(file_path.display(), "outside the sync scope"))?;

    let mut segments: Vec<&str> = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(os) => match os.to_str() {
                Some(seg) => segments.push(seg),
                None => {
                    return Err(InvalidPathError::new(
                        file_path.display(),
                        "non-UTF-8 path component",
                    ))
                }
            },
            _ => {
                return Err(InvalidPathError::new(
                    file_path.display(),
                    "path traversal component",
                ))
            }
        }
    }
    if segments.is_empty() {
        return Err(InvalidPathError::new(
            file_path.display(),
            "maps to the scope root, not a file",
        ));
    }

    let tail = segments.join("/");
    if root.remote_prefix.is_empty() {
        Ok(tail)
    } else {
        Ok(format!("{}/{}", root.remote_prefix, tail))
    }
}

/// Map a remote key to the local path it syncs with.
///
/// The key must lie under the prefix scope when one is set, and every segment
/// must be non-empty and free of traversal.
pub fn to_local_path(root: &SyncRoot, key: &str) -> Result<PathBuf, InvalidPathError> {
    if !root.remote_prefix.is_empty() {
        let scope = format!("{}/", root.remote_prefix);
        match key.strip_prefix(scope.as_str()) {
            Some(rest) if !rest.is_empty() => {}
            _ => return Err(InvalidPathError::new(key, "outside the prefix scope")),
        }
    }
    if key.is_empty() {
        return Err(InvalidPathError::new(key, "empty key"));
    }

    let mut path = root.local_dir.clone();
    for segment in key.split('/') {
        match segment {
            "" => return Err(InvalidPathError::new(key, "empty key segment")),
            "." | ".." => return Err(InvalidPathError::new(key, "path traversal segment")),
            seg => path.push(seg),
        }
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root(prefix: &str) -> SyncRoot {
        SyncRoot::new("bucket", "/backup", prefix)
    }

    #[test]
    fn empty_prefix_maps_relative_to_local_dir() {
        let root = root("");
        let key = to_remote_key(&root, Path::new("/backup/sub/b.png")).unwrap();
        assert_eq!(key, "sub/b.png");
        let path = to_local_path(&root, "sub/b.png").unwrap();
        assert_eq!(path, PathBuf::from("/backup/sub/b.png"));
    }

    #[test]
    fn prefix_strips_symmetrically_from_both_sides() {
        let root = root("/images");
        let key = to_remote_key(&root, Path::new("/backup/images/x.jpg")).unwrap();
        assert_eq!(key, "images/x.jpg");
        let path = to_local_path(&root, "images/x.jpg").unwrap();
        assert_eq!(path, PathBuf::from("/backup/images/x.jpg"));
    }

    #[test]
    fn round_trip_reconstructs_the_path() {
        let root = root("docs");
        let original = PathBuf::from("/backup/docs/a/b/c.txt");
        let key = to_remote_key(&root, &original).unwrap();
        assert_eq!(to_local_path(&root, &key).unwrap(), original);
    }

    #[test]
    fn path_outside_the_scope_is_rejected() {
        let root = root("images");
        let err = to_remote_key(&root, Path::new("/backup/other/x.jpg")).unwrap_err();
        assert_eq!(err.reason, "outside the sync scope");
        assert!(to_remote_key(&root, Path::new("/elsewhere/x.jpg")).is_err());
    }

    #[test]
    fn traversal_segments_are_rejected() {
        let root = root("");
        assert!(to_local_path(&root, "../etc/passwd").is_err());
        assert!(to_local_path(&root, "a/../../b").is_err());
        assert!(to_local_path(&root, "a//b").is_err());
        assert!(to_local_path(&root, "/absolute").is_err());
    }

    #[test]
    fn key_outside_prefix_scope_is_rejected() {
        let root = root("images");
        assert!(to_local_path(&root, "images2/x.jpg").is_err());
        // An object named exactly like the scope folder has no file to map to.
        assert!(to_local_path(&root, "images").is_err());
    }

    #[test]
    fn scope_root_itself_is_not_a_file() {
        let root = root("");
        assert!(to_remote_key(&root, Path::new("/backup")).is_err());
    }
}
