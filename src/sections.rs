//! Generated section indexes.
//!
//! Zola needs an `_index.md` in every section directory (and one
//! `_index.<lang>.md` per extra language). The vault has none, so they are
//! generated from `[[sections]]`:
//!
//! - redirect sections are rewritten on every sync
//! - other sections are only written when missing, so hand edits survive

use crate::{
    config::{ConvertConfig, PathResolver, SectionConfig},
    convert::frontmatter::{Dialect, assemble},
    log,
};
use anyhow::{Context, Result};
use std::fs;

/// Counts reported after writing placeholders.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SectionStats {
    pub written: usize,
    pub kept: usize,
}

/// Write every section index for every configured language.
pub fn write_sections(
    paths: &PathResolver<'_>,
    sections: &[SectionConfig],
    convert: &ConvertConfig,
) -> Result<SectionStats> {
    let mut stats = SectionStats::default();

    for section in sections {
        let dir = paths.section_dir(section.rel_path());
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;

        for lang in convert.locales() {
            let path = dir.join(index_name(lang, convert));
            let redirect = if section.is_redirect() {
                section.redirect_to(lang, &convert.default_language)
            } else {
                None
            };

            if redirect.is_none() && path.exists() {
                stats.kept += 1;
                continue;
            }

            let content = render_index(section, lang, redirect, convert);
            fs::write(&path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            stats.written += 1;
        }
    }

    log!("section"; "{} written, {} kept", stats.written, stats.kept);
    Ok(stats)
}

/// `_index.md` for the default language, `_index.<lang>.md` otherwise.
fn index_name(lang: &str, convert: &ConvertConfig) -> String {
    if convert.is_default_language(lang) {
        "_index.md".to_owned()
    } else {
        format!("_index.{lang}.md")
    }
}

fn render_index(
    section: &SectionConfig,
    lang: &str,
    redirect: Option<&str>,
    convert: &ConvertConfig,
) -> String {
    let title = section.title(lang, &convert.default_language);
    let mut lines = vec![format!("title = {}", toml_string(title))];

    match redirect {
        Some(target) => lines.push(format!("redirect_to = {}", toml_string(target))),
        None => {
            lines.push(format!("template = {}", toml_string(section.template())));
            if section.is_nested() {
                lines.push("transparent = true".to_owned());
            }
            if let Some(sort_by) = &section.sort_by {
                lines.push(format!("sort_by = {}", toml_string(sort_by)));
            }
        }
    }

    assemble(Some(Dialect::Toml), &lines.join("\n"), "")
}

#[inline]
fn toml_string(s: &str) -> String {
    toml::Value::String(s.to_owned()).to_string()
}
