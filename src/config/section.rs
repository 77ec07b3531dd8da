//! `[[sections]]` configuration.
//!
//! Each entry describes one generated section index (`_index.md` plus one
//! `_index.<lang>.md` per extra language).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Template used when a section does not name one.
const DEFAULT_TEMPLATE: &str = "allarchive.html";

/// Template of the content root index.
const ROOT_TEMPLATE: &str = "section.html";

/// One `[[sections]]` entry in notesync.toml.
///
/// # Example
/// ```toml
/// [[sections]]
/// path = "works/project"
/// template = "allarchive.html"
/// sort_by = "date"
/// titles = { en = "project", kr = "프로젝트" }
///
/// [[sections]]
/// path = "about"
/// titles = { en = "about" }
/// redirect = { en = "/about/about/", kr = "/kr/about/about/" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectionConfig {
    /// Vault-relative section path; `""` is the content root.
    #[serde(default)]
    pub path: String,

    /// Zola template for the section page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    /// Section title per language.
    #[serde(default)]
    pub titles: BTreeMap<String, String>,

    /// Redirect target per language. A section with redirects has no listing.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub redirect: BTreeMap<String, String>,

    /// Optional zola `sort_by` value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
}

impl SectionConfig {
    /// Normalized section path without surrounding slashes.
    pub fn rel_path(&self) -> &str {
        self.path.trim_matches('/')
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.rel_path().is_empty()
    }

    /// Nested sections are rendered transparent so their pages bubble up.
    #[inline]
    pub fn is_nested(&self) -> bool {
        self.rel_path().contains('/')
    }

    #[inline]
    pub fn is_redirect(&self) -> bool {
        !self.redirect.is_empty()
    }

    pub fn template(&self) -> &str {
        match &self.template {
            Some(template) => template,
            None if self.is_root() => ROOT_TEMPLATE,
            None => DEFAULT_TEMPLATE,
        }
    }

    /// Title for `lang`, falling back to the default language, then the path.
    pub fn title(&self, lang: &str, default_lang: &str) -> &str {
        self.titles
            .get(lang)
            .or_else(|| self.titles.get(default_lang))
            .map_or_else(|| self.rel_path(), String::as_str)
    }

    /// Redirect target for `lang`, falling back to the default language.
    pub fn redirect_to(&self, lang: &str, default_lang: &str) -> Option<&str> {
        self.redirect
            .get(lang)
            .or_else(|| self.redirect.get(default_lang))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::super::SyncConfig;
    use super::*;

    fn section(path: &str) -> SectionConfig {
        SectionConfig {
            path: path.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_template_defaults() {
        assert_eq!(section("").template(), "section.html");
        assert_eq!(section("works").template(), "allarchive.html");

        let mut custom = section("works");
        custom.template = Some("section/works.html".into());
        assert_eq!(custom.template(), "section/works.html");
    }

    #[test]
    fn test_nesting() {
        assert!(section("").is_root());
        assert!(!section("works").is_nested());
        assert!(section("works/project").is_nested());
        assert!(section("/works/project/").is_nested());
    }

    #[test]
    fn test_title_fallbacks() {
        let mut s = section("works/project");
        assert_eq!(s.title("kr", "en"), "works/project");

        s.titles.insert("en".into(), "project".into());
        assert_eq!(s.title("kr", "en"), "project");

        s.titles.insert("kr".into(), "프로젝트".into());
        assert_eq!(s.title("kr", "en"), "프로젝트");
    }

    #[test]
    fn test_redirect_lookup() {
        let mut s = section("about");
        assert!(!s.is_redirect());
        s.redirect.insert("en".into(), "/about/about/".into());
        assert!(s.is_redirect());
        assert_eq!(s.redirect_to("kr", "en"), Some("/about/about/"));
    }

    #[test]
    fn test_sections_from_toml() {
        let config: SyncConfig = toml::from_str(
            r#"
            [[sections]]
            path = "notes"
            titles = { en = "notes" }

            [[sections]]
            path = "notes/daily"
            sort_by = "date"
        "#,
        )
        .unwrap();

        assert_eq!(config.sections.len(), 2);
        assert_eq!(config.sections[0].title("en", "en"), "notes");
        assert_eq!(config.sections[1].sort_by.as_deref(), Some("date"));
        assert!(config.sections[1].is_nested());
    }

    #[test]
    fn test_default_sections() {
        let config = SyncConfig::default();
        let about = config.sections.iter().find(|s| s.path == "about").unwrap();
        assert!(about.is_redirect());
        let root = config.sections.iter().find(|s| s.is_root()).unwrap();
        assert_eq!(root.template(), "section.html");
    }
}
