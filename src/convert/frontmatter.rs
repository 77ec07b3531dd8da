//! Front matter fences and date normalization.
//!
//! Notes open with either a TOML block fenced by `+++` or a YAML block fenced
//! by `---`. [`split`] separates that block from the body and [`assemble`]
//! puts the pieces back together.

use super::block::{Entry, Field, MetadataBlock};
use crate::utils::date::FlexDate;
use regex::Regex;
use std::sync::LazyLock;

/// Metadata dialect of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// `+++` fenced, `key = value`
    Toml,
    /// `---` fenced, `key: value`
    Yaml,
}

impl Dialect {
    #[inline]
    pub const fn fence(self) -> &'static str {
        match self {
            Self::Toml => "+++",
            Self::Yaml => "---",
        }
    }

    /// Render a single-line `key = value` / `key: value` assignment.
    pub fn assignment(self, key: &str, value: &str) -> String {
        match self {
            Self::Toml => format!("{key} = {value}"),
            Self::Yaml if value.is_empty() => format!("{key}:"),
            Self::Yaml => format!("{key}: {value}"),
        }
    }
}

/// A note split at its front matter fences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Split<'a> {
    pub dialect: Option<Dialect>,
    pub meta: &'a str,
    pub body: &'a str,
}

/// Split a note into dialect, metadata text and body.
///
/// The opening fence must be the first non-blank line; the block ends at the
/// first line that is exactly the same fence. Without a complete block the
/// whole text is body.
pub fn split(text: &str) -> Split<'_> {
    let trimmed = text.trim_start();

    for dialect in [Dialect::Toml, Dialect::Yaml] {
        if let Some((meta, body)) = split_fenced(trimmed, dialect.fence()) {
            return Split {
                dialect: Some(dialect),
                meta,
                body,
            };
        }
    }

    Split {
        dialect: None,
        meta: "",
        body: text,
    }
}

fn split_fenced<'a>(text: &'a str, fence: &str) -> Option<(&'a str, &'a str)> {
    let after_fence = text.strip_prefix(fence)?;
    let (opening_rest, _) = after_fence.split_once('\n')?;
    if !opening_rest.trim().is_empty() {
        return None;
    }

    let meta_start = fence.len() + opening_rest.len() + 1;
    let mut offset = meta_start;
    loop {
        let rest = &text[offset..];
        let (line, next) = match rest.find('\n') {
            Some(pos) => (&rest[..pos], Some(offset + pos + 1)),
            None => (rest, None),
        };

        if line.trim_end() == fence {
            let meta = &text[meta_start..offset];
            let body = next.map_or("", |next| &text[next..]);
            return Some((meta.strip_suffix('\n').unwrap_or(meta), body));
        }

        offset = next?;
    }
}

/// Reassemble a note. Blank lines around the metadata are dropped.
pub fn assemble(dialect: Option<Dialect>, meta: &str, body: &str) -> String {
    match dialect {
        Some(dialect) => {
            let fence = dialect.fence();
            format!("{fence}\n{}\n{fence}\n{body}", meta.trim_matches('\n'))
        }
        None => body.to_owned(),
    }
}

/// Rewrite `date` to `YYYY-MM-DD`, promoting `date_sort` when `date` is absent.
///
/// An unparseable `date` is removed. An unparseable `date_sort` is left alone
/// and no `date` is created.
pub fn normalize_date(block: &mut MetadataBlock) {
    let dialect = block.dialect();

    if dialect == Dialect::Yaml {
        fix_stray_toml_date(block);
    }

    if let Some(index) = block.position("date") {
        let parsed = block
            .field(index)
            .and_then(|field| FlexDate::parse(&field.value));
        match parsed {
            Some(date) => {
                block.entries[index] =
                    Entry::Field(Field::scalar(dialect, "date", &date.to_ymd()));
            }
            None => {
                block.entries.remove(index);
            }
        }
        return;
    }

    let promoted = block
        .position("date_sort")
        .and_then(|index| block.field(index))
        .and_then(|field| FlexDate::parse(&field.value));

    if let Some(date) = promoted {
        block.insert_after_fields(Entry::Field(Field::scalar(
            dialect,
            "date",
            &date.to_ymd(),
        )));
    }
}

/// YAML notes sometimes carry a TOML-style `date = x` line.
fn fix_stray_toml_date(block: &mut MetadataBlock) {
    static STRAY_DATE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^\s*date\s*=\s*(.+?)\s*$").unwrap());

    for entry in &mut block.entries {
        let Entry::Line(line) = entry else {
            continue;
        };
        if let Some(caps) = STRAY_DATE.captures(line) {
            *entry = Entry::Field(Field::scalar(Dialect::Yaml, "date", &caps[1]));
        }
    }
}
