//! JSON manifest of a sync run.
//!
//! ```json
//! {
//!   "notes": [
//!     { "path": "works/p1/index.md", "media": { ... }, "footnotes": [ ... ] }
//!   ],
//!   "media": [ { "source": "works/p1/media", "dest": "media/works/p1" } ]
//! }
//! ```

use crate::convert::{MediaCopy, footnote::Footnote};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// One converted document.
#[derive(Debug, Clone, Serialize)]
pub struct NoteRecord {
    /// Vault-relative path
    pub path: String,
    pub media: MediaCopy,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub footnotes: Vec<Footnote>,
}

#[derive(Debug, Serialize)]
pub struct Manifest<'a> {
    pub notes: &'a [NoteRecord],
    /// Media folders actually copied
    pub media: &'a [MediaCopy],
}

impl Manifest<'_> {
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write manifest {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_manifest_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out/manifest.json");

        let media = MediaCopy {
            source: "works/media".into(),
            dest: "media/works".into(),
        };
        let notes = [NoteRecord {
            path: "works/a.md".into(),
            media: media.clone(),
            footnotes: vec![Footnote {
                id: "1".into(),
                text: "note".into(),
            }],
        }];
        Manifest {
            notes: &notes,
            media: std::slice::from_ref(&media),
        }
        .write(&path)
        .unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["notes"][0]["path"], "works/a.md");
        assert_eq!(json["notes"][0]["footnotes"][0]["text"], "note");
        assert_eq!(json["media"][0]["dest"], "media/works");
    }

    #[test]
    fn test_empty_footnotes_omitted() {
        let record = NoteRecord {
            path: "a.md".into(),
            media: MediaCopy {
                source: "media".into(),
                dest: "media".into(),
            },
            footnotes: Vec::new(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("footnotes").is_none());
    }
}
