//! Note conversion for the Zola content tree.
//!
//! Converting one note is a pure function of its text, its vault path and the
//! `[convert]` rules:
//!
//! ```text
//! split() ──► rewrite_body() ──► footnote::extract()
//!    │                                  │
//!    ▼                                  ▼
//! MetadataBlock ──► normalize_date() ──► migrate() ──► assemble()
//! ```
//!
//! Converting an already converted note gives back the same text.

pub mod block;
pub mod body;
pub mod fields;
pub mod figure;
pub mod footnote;
pub mod frontmatter;
pub mod media;
pub mod resolve;
pub mod scan;

use crate::config::ConvertConfig;
use crate::utils::slug::{parent_dir, to_vault_path};
use block::MetadataBlock;
use footnote::Footnote;
use resolve::Resolver;
use serde::Serialize;

/// Media folder a note needs published, both sides relative to their roots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MediaCopy {
    /// Under the vault source directory (`works/p1/media`)
    pub source: String,
    /// Under the site static directory (`media/works/p1`)
    pub dest: String,
}

/// Result of converting one note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub text: String,
    pub media: MediaCopy,
    pub footnotes: Vec<Footnote>,
}

/// Convert a note located at `vault_path` (`works/p1/index.md`).
pub fn convert(text: &str, vault_path: &str, config: &ConvertConfig) -> Conversion {
    let vault_path = to_vault_path(vault_path);
    let dir = parent_dir(&vault_path);
    let resolver = Resolver::new(config, dir);

    let parts = frontmatter::split(text);
    let body = body::rewrite_body(parts.body, &resolver);
    let footnotes = footnote::extract(&body, &resolver);

    let text = match parts.dialect {
        Some(dialect) => {
            let mut block = MetadataBlock::parse(dialect, parts.meta);
            frontmatter::normalize_date(&mut block);
            fields::migrate(&mut block, &footnotes, &resolver);
            frontmatter::assemble(Some(dialect), &block.render(), &body)
        }
        None => body,
    };

    Conversion {
        text,
        media: MediaCopy {
            source: media::source_dir(dir),
            dest: media::published_dir(dir),
        },
        footnotes,
    }
}
