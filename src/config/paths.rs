//! Centralized path resolution for the destination site tree.
//!
//! # Architecture
//!
//! ```text
//! SyncConfig
//!     │
//!     └── paths() → PathResolver
//!                       │
//!                       ├── content_dir()          → /abs/site/content
//!                       ├── media_root()           → /abs/site/static/media
//!                       ├── content_file(rel)      → /abs/site/content/works/p1/a.md
//!                       ├── section_dir(section)   → /abs/site/content/works
//!                       ├── source_file(rel)       → /abs/vault/works/p1/a.md
//!                       └── vault_path_of(file)    → "works/p1/a.md"
//! ```
//!
//! Relative paths handed around by the converter are always slash-separated
//! vault paths; this module is the only place they meet the filesystem.

use crate::utils::slug::to_vault_path;
use std::path::{Path, PathBuf};

/// Content directory name inside the destination site.
const CONTENT_DIR: &str = "content";

/// Static media directory inside the destination site.
const MEDIA_DIR: &[&str] = &["static", "media"];

/// Path resolver between vault-relative paths and the two directory trees.
#[derive(Debug, Clone, Copy)]
pub struct PathResolver<'a> {
    /// Vault root directory
    source: &'a Path,
    /// Destination site root directory
    dest: &'a Path,
}

impl<'a> PathResolver<'a> {
    #[inline]
    pub const fn new(source: &'a Path, dest: &'a Path) -> Self {
        Self { source, dest }
    }

    /// Vault root.
    #[inline]
    pub const fn source(&self) -> &Path {
        self.source
    }

    /// `<dest>/content`
    #[inline]
    pub fn content_dir(&self) -> PathBuf {
        self.dest.join(CONTENT_DIR)
    }

    /// `<dest>/static/media`
    pub fn media_root(&self) -> PathBuf {
        MEDIA_DIR
            .iter()
            .fold(self.dest.to_path_buf(), |acc, part| acc.join(part))
    }

    /// Destination of a converted document.
    pub fn content_file(&self, vault_path: &str) -> PathBuf {
        join_slashed(&self.content_dir(), vault_path)
    }

    /// Destination directory for a section index (`""` is the content root).
    pub fn section_dir(&self, section: &str) -> PathBuf {
        join_slashed(&self.content_dir(), section)
    }

    /// Vault file for a vault-relative path.
    pub fn source_file(&self, vault_path: &str) -> PathBuf {
        join_slashed(self.source, vault_path)
    }

    /// Destination directory under the site's static root
    /// (`media/works/p1` → `<dest>/static/media/works/p1`).
    pub fn static_dir(&self, rel: &str) -> PathBuf {
        join_slashed(&self.dest.join("static"), rel)
    }

    /// Vault-relative path of a file inside the vault, if it is inside.
    pub fn vault_path_of(&self, file: &Path) -> Option<String> {
        let rel = file.strip_prefix(self.source).ok()?;
        rel.to_str().map(to_vault_path)
    }
}

/// Join a slash-separated relative path onto a base directory.
fn join_slashed(base: &Path, rel: &str) -> PathBuf {
    rel.split('/')
        .filter(|seg| !seg.is_empty())
        .fold(base.to_path_buf(), |acc, seg| acc.join(seg))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> PathResolver<'static> {
        PathResolver::new(Path::new("/vault"), Path::new("/site"))
    }

    #[test]
    fn test_content_dir() {
        assert_eq!(resolver().content_dir(), PathBuf::from("/site/content"));
    }

    #[test]
    fn test_media_root() {
        assert_eq!(resolver().media_root(), PathBuf::from("/site/static/media"));
    }

    #[test]
    fn test_content_file() {
        assert_eq!(
            resolver().content_file("works/p1/a.md"),
            PathBuf::from("/site/content/works/p1/a.md")
        );
    }

    #[test]
    fn test_section_dir_root() {
        assert_eq!(resolver().section_dir(""), PathBuf::from("/site/content"));
        assert_eq!(
            resolver().section_dir("works/project"),
            PathBuf::from("/site/content/works/project")
        );
    }

    #[test]
    fn test_source_and_static() {
        assert_eq!(
            resolver().source_file("works/p1/media"),
            PathBuf::from("/vault/works/p1/media")
        );
        assert_eq!(
            resolver().static_dir("media/works/p1"),
            PathBuf::from("/site/static/media/works/p1")
        );
    }

    #[test]
    fn test_vault_path_of() {
        let paths = resolver();
        assert_eq!(
            paths.vault_path_of(Path::new("/vault/works/p1/a.md")),
            Some("works/p1/a.md".to_string())
        );
        assert_eq!(paths.vault_path_of(Path::new("/elsewhere/a.md")), None);
    }
}
