//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#true() -> bool {
    true
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}

// ============================================================================
// [vault] Section Defaults
// ============================================================================

pub mod vault {
    use std::path::PathBuf;

    pub fn root() -> Option<PathBuf> {
        None
    }

    pub fn source() -> PathBuf {
        "vault".into()
    }

    pub fn dest() -> PathBuf {
        "site".into()
    }

    /// Vault documents that double as section pages and must not be copied.
    pub fn skip() -> Vec<String> {
        super::strings(&[
            "about/index.md",
            "about/index.kr.md",
            "contact/index.md",
            "contact/index.kr.md",
        ])
    }
}

// ============================================================================
// [convert] Section Defaults
// ============================================================================

pub mod convert {
    pub fn roots() -> Vec<String> {
        super::strings(&[
            "about", "contact", "glossary", "method", "shop", "thought", "works",
        ])
    }

    pub fn keep() -> Vec<String> {
        super::strings(&[
            "title",
            "date",
            "template",
            "draft",
            "weight",
            "slug",
            "taxonomies",
        ])
    }

    pub fn files() -> Vec<String> {
        super::strings(&["thumbnail", "image", "poster"])
    }

    pub fn numeric() -> Vec<String> {
        super::strings(&["doc_no", "date_year"])
    }

    pub fn default_language() -> String {
        "en".into()
    }

    pub fn languages() -> Vec<String> {
        super::strings(&["kr"])
    }
}

// ============================================================================
// [[sections]] Defaults
// ============================================================================

pub mod sections {
    use super::super::SectionConfig;
    use std::collections::BTreeMap;

    /// (path, english title, korean title, template)
    const SECTIONS: &[(&str, &str, &str, Option<&str>)] = &[
        ("", "", "", Some("section.html")),
        ("allarchive", "all archive", "모든 아카이브", Some("allarchive.html")),
        ("about", "about", "이 웹에 대하여", None),
        ("contact", "contact", "연락처", None),
        ("glossary", "glossary", "참조", Some("allarchive.html")),
        ("method", "methodology", "방법", Some("allarchive.html")),
        ("shop", "shop", "구매", Some("section/shop.html")),
        ("thought", "thought", "생각", Some("allarchive.html")),
        ("works", "works", "작업들", Some("section/works.html")),
        ("works/project", "project", "프로젝트", None),
        ("works/workshop", "workshop", "워크샵", None),
        ("works/workshop-practice", "workshop practice", "워크샵 실천", None),
    ];

    /// Sections that only forward to a single page.
    const REDIRECTS: &[(&str, &str, &str)] = &[
        ("about", "/about/about/", "/kr/about/about/"),
        ("contact", "/contact/contact/", "/kr/contact/contact/"),
    ];

    pub fn all() -> Vec<SectionConfig> {
        SECTIONS
            .iter()
            .map(|&(path, en, kr, template)| {
                let redirect = REDIRECTS
                    .iter()
                    .find(|(p, ..)| *p == path)
                    .map(|&(_, en, kr)| pair(en, kr))
                    .unwrap_or_default();
                SectionConfig {
                    path: path.to_owned(),
                    template: template.map(str::to_owned),
                    titles: pair(en, kr),
                    redirect,
                    sort_by: None,
                }
            })
            .collect()
    }

    fn pair(en: &str, kr: &str) -> BTreeMap<String, String> {
        BTreeMap::from([("en".to_owned(), en.to_owned()), ("kr".to_owned(), kr.to_owned())])
    }
}
