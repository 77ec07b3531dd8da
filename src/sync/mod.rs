//! Vault synchronization.
//!
//! # Flow
//!
//! ```text
//! sync_vault()
//!     │
//!     ├── clean_dest()        remove content/ and static/media/
//!     ├── write_sections()    _index.md placeholders
//!     ├── collect_notes()     walk every content root
//!     ├── convert_note() ×N   parallel, failures counted
//!     ├── copy_media()   ×M   parallel, distinct folders only
//!     └── Manifest::write()   optional JSON report
//! ```

mod error;
pub mod manifest;
mod media;

pub use error::SyncError;

use crate::{
    config::{PathResolver, SyncConfig},
    convert::convert,
    log,
    logger::ProgressBars,
    sections::write_sections,
};
use anyhow::{Context, Result, bail};
use manifest::{Manifest, NoteRecord};
use rayon::prelude::*;
use std::{
    fs,
    path::Path,
    sync::atomic::{AtomicUsize, Ordering},
    time::Instant,
};
use walkdir::WalkDir;

/// Note file extension.
const NOTE_EXT: &str = "md";

/// Totals of one sync run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub notes: usize,
    pub media_folders: usize,
    pub media_files: usize,
}

/// Convert the whole vault into the site tree.
///
/// A failing document is logged and skipped; the run fails at the end if
/// anything failed.
pub fn sync_vault(config: &SyncConfig, manifest: Option<&Path>) -> Result<SyncReport> {
    let started = Instant::now();
    let paths = config.paths();

    if config.vault.clean {
        clean_dest(&paths)?;
    }
    write_sections(&paths, &config.sections, &config.convert)?;

    let (notes, unreadable) = collect_notes(config);
    log!("sync"; "converting {} notes from {}", notes.len(), paths.source().display());

    let failed = AtomicUsize::new(unreadable);
    let progress = ProgressBars::new_filtered(&[("notes", notes.len())]);
    let records: Vec<NoteRecord> = notes
        .par_iter()
        .filter_map(|vault_path| {
            let result = convert_note(config, &paths, vault_path);
            if let Some(progress) = &progress {
                progress.inc_by_name("notes");
            }
            result
                .map_err(|err| {
                    failed.fetch_add(1, Ordering::Relaxed);
                    log!("error"; "{vault_path}: {:#}", anyhow::Error::from(err));
                })
                .ok()
        })
        .collect();
    drop(progress);

    let copies = media::pending_copies(&paths, records.iter().map(|r| &r.media));
    let progress = ProgressBars::new_filtered(&[("media", copies.len())]);
    let media_files = AtomicUsize::new(0);
    copies.par_iter().for_each(|copy| {
        match media::copy_media(&paths, copy) {
            Ok(count) => {
                media_files.fetch_add(count, Ordering::Relaxed);
            }
            Err(err) => {
                failed.fetch_add(1, Ordering::Relaxed);
                log!("error"; "{:#}", anyhow::Error::from(err));
            }
        }
        if let Some(progress) = &progress {
            progress.inc_by_name("media");
        }
    });
    drop(progress);

    if let Some(path) = manifest {
        Manifest {
            notes: &records,
            media: &copies,
        }
        .write(path)?;
        log!("sync"; "manifest written to {}", path.display());
    }

    let report = SyncReport {
        notes: records.len(),
        media_folders: copies.len(),
        media_files: media_files.into_inner(),
    };

    let failed = failed.into_inner();
    if failed > 0 {
        bail!("{failed} item(s) failed, {} notes synced", report.notes);
    }

    log!(
        "done";
        "{} notes, {} media files from {} folders in {:.2?}",
        report.notes,
        report.media_files,
        report.media_folders,
        started.elapsed()
    );
    Ok(report)
}

/// Remove generated output and recreate an empty content directory.
fn clean_dest(paths: &PathResolver<'_>) -> Result<()> {
    for dir in [paths.content_dir(), paths.media_root()] {
        if dir.exists() {
            fs::remove_dir_all(&dir)
                .with_context(|| format!("Failed to clean {}", dir.display()))?;
        }
    }
    let content = paths.content_dir();
    fs::create_dir_all(&content)
        .with_context(|| format!("Failed to create {}", content.display()))?;
    Ok(())
}

/// Vault paths of every note under the content roots, sorted, and the
/// number of entries that could not be walked.
///
/// Files inside `media/` folders, section indexes and skip-listed paths are
/// left out. Walk errors are logged as they happen.
fn collect_notes(config: &SyncConfig) -> (Vec<String>, usize) {
    let paths = config.paths();
    let mut notes = Vec::new();
    let mut unreadable = 0;

    for root in &config.convert.roots {
        let dir = paths.source_file(root);
        if !dir.is_dir() {
            log!("sync"; "root `{root}` not found in vault, skipped");
            continue;
        }

        for entry in WalkDir::new(&dir).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    unreadable += 1;
                    log!("error"; "{:#}", anyhow::Error::from(SyncError::walk(&dir, err)));
                    continue;
                }
            };
            let is_note = entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(NOTE_EXT));
            if !is_note {
                continue;
            }
            if let Some(vault_path) = paths.vault_path_of(entry.path())
                && !vault_path.split('/').any(|seg| seg == "media")
                && !config.vault.is_skipped(&vault_path)
            {
                notes.push(vault_path);
            }
        }
    }

    notes.sort();
    notes.dedup();
    (notes, unreadable)
}

fn convert_note(
    config: &SyncConfig,
    paths: &PathResolver<'_>,
    vault_path: &str,
) -> Result<NoteRecord, SyncError> {
    let source = paths.source_file(vault_path);
    let text = fs::read_to_string(&source).map_err(|err| SyncError::Read(source, err))?;

    let conversion = convert(&text, vault_path, &config.convert);

    let dest = paths.content_file(vault_path);
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|err| SyncError::Write(parent.to_path_buf(), err))?;
    }
    fs::write(&dest, &conversion.text).map_err(|err| SyncError::Write(dest, err))?;

    Ok(NoteRecord {
        path: vault_path.to_owned(),
        media: conversion.media,
        footnotes: conversion.footnotes,
    })
}
