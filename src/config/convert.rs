//! `[convert]` section configuration.
//!
//! The immutable rule set handed to the document converter: content roots,
//! front matter key groups and languages. Nothing in the converter reads
//! process-wide state; everything it needs is here.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[convert]` section in notesync.toml.
///
/// # Example
/// ```toml
/// [convert]
/// roots = ["works", "thought"]
/// keep = ["title", "date", "template", "draft", "weight", "slug", "taxonomies"]
/// files = ["thumbnail", "image", "poster"]
/// numeric = ["doc_no", "date_year"]
/// default_language = "en"
/// languages = ["kr"]
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ConvertConfig {
    /// Top-level vault folders. Also decides whether `works/a` is vault-rooted.
    #[serde(default = "defaults::convert::roots")]
    #[educe(Default = defaults::convert::roots())]
    pub roots: Vec<String>,

    /// Front matter keys that stay at the top level.
    #[serde(default = "defaults::convert::keep")]
    #[educe(Default = defaults::convert::keep())]
    pub keep: Vec<String>,

    /// Keys whose values are media paths.
    #[serde(default = "defaults::convert::files")]
    #[educe(Default = defaults::convert::files())]
    pub files: Vec<String>,

    /// Keys coerced to integers.
    #[serde(default = "defaults::convert::numeric")]
    #[educe(Default = defaults::convert::numeric())]
    pub numeric: Vec<String>,

    /// Language of notes without a locale marker.
    #[serde(default = "defaults::convert::default_language")]
    #[educe(Default = defaults::convert::default_language())]
    pub default_language: String,

    /// Other languages, written as `note.<lang>.md` in the vault.
    #[serde(default = "defaults::convert::languages")]
    #[educe(Default = defaults::convert::languages())]
    pub languages: Vec<String>,
}

impl ConvertConfig {
    #[inline]
    pub fn is_root(&self, segment: &str) -> bool {
        contains_ignore_case(&self.roots, segment)
    }

    #[inline]
    pub fn is_kept(&self, key: &str) -> bool {
        contains_ignore_case(&self.keep, key)
    }

    #[inline]
    pub fn is_file_key(&self, key: &str) -> bool {
        contains_ignore_case(&self.files, key)
    }

    #[inline]
    pub fn is_numeric_key(&self, key: &str) -> bool {
        contains_ignore_case(&self.numeric, key)
    }

    /// Match a locale marker (`kr` in `note.kr.md`) against the configured
    /// languages, returning the canonical spelling.
    pub fn locale(&self, marker: &str) -> Option<&str> {
        self.locales()
            .find(|lang| lang.eq_ignore_ascii_case(marker))
    }

    /// Whether `lang` is the default language.
    #[inline]
    pub fn is_default_language(&self, lang: &str) -> bool {
        self.default_language.eq_ignore_ascii_case(lang)
    }

    /// Default language first, then the others.
    pub fn locales(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.default_language.as_str())
            .chain(self.languages.iter().map(String::as_str))
    }
}

fn contains_ignore_case(list: &[String], needle: &str) -> bool {
    list.iter().any(|item| item.eq_ignore_ascii_case(needle))
}
