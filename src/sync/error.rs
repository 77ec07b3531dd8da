//! Per-document sync errors.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure while syncing one document or media folder.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to read `{0}`")]
    Read(PathBuf, #[source] io::Error),

    #[error("failed to write `{0}`")]
    Write(PathBuf, #[source] io::Error),

    #[error("failed to copy `{0}` to `{1}`")]
    Copy(PathBuf, PathBuf, #[source] io::Error),

    #[error("failed to walk `{0}`")]
    Walk(PathBuf, #[source] walkdir::Error),
}

impl SyncError {
    /// Walk failure, blamed on the entry that failed or else the walk root.
    pub fn walk(root: &Path, err: walkdir::Error) -> Self {
        let path = err.path().unwrap_or(root).to_path_buf();
        Self::Walk(path, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind;

    #[test]
    fn test_sync_error_display() {
        let err = SyncError::Copy(
            PathBuf::from("vault/works/media/a.png"),
            PathBuf::from("site/static/media/works/a.png"),
            io::Error::new(ErrorKind::PermissionDenied, "denied"),
        );
        let display = format!("{err}");
        assert!(display.contains("vault/works/media/a.png"));
        assert!(display.contains("site/static/media/works/a.png"));
    }

    #[test]
    fn test_sync_error_keeps_source() {
        let err = SyncError::Read(
            PathBuf::from("a.md"),
            io::Error::new(ErrorKind::NotFound, "missing"),
        );
        let chain = format!("{:#}", anyhow::Error::from(err));
        assert!(chain.contains("a.md"));
        assert!(chain.contains("missing"));
    }
}
