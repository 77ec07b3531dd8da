//! Media folder publishing.

use super::error::SyncError;
use crate::config::PathResolver;
use crate::convert::MediaCopy;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Files never published.
const IGNORED_FILES: &[&str] = &[".DS_Store"];

/// Distinct media folders that exist in the vault, in path order.
pub fn pending_copies<'a>(
    paths: &PathResolver<'_>,
    copies: impl IntoIterator<Item = &'a MediaCopy>,
) -> Vec<MediaCopy> {
    copies
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .filter(|copy| paths.source_file(&copy.source).is_dir())
        .cloned()
        .collect()
}

/// Copy one media folder into the static tree, returning the file count.
///
/// Existing files are overwritten; stale ones are only removed by a clean
/// sync, since folders of nested notes share a destination prefix.
pub fn copy_media(paths: &PathResolver<'_>, copy: &MediaCopy) -> Result<usize, SyncError> {
    let source = paths.source_file(&copy.source);
    let dest = paths.static_dir(&copy.dest);
    copy_dir(&source, &dest)
}

fn copy_dir(source: &Path, dest: &Path) -> Result<usize, SyncError> {
    let mut copied = 0;

    for entry in WalkDir::new(source).follow_links(true) {
        let entry = entry.map_err(|err| SyncError::walk(source, err))?;
        let Ok(rel) = entry.path().strip_prefix(source) else {
            continue;
        };
        let target = dest.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|err| SyncError::Write(target.clone(), err))?;
            continue;
        }

        let name = entry.file_name().to_str().unwrap_or_default();
        if !entry.file_type().is_file() || IGNORED_FILES.contains(&name) {
            continue;
        }
        fs::copy(entry.path(), &target)
            .map_err(|err| SyncError::Copy(entry.path().to_path_buf(), target.clone(), err))?;
        copied += 1;
    }

    Ok(copied)
}
