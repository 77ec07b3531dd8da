//! Vault path to site URL resolution.
//!
//! # Rules
//!
//! | Input (from `works/project`)  | Output                    |
//! |-------------------------------|---------------------------|
//! | `/thought/idea`               | `/thought/idea/`          |
//! | `works/project/sub`           | `/works/project/sub/`     |
//! | `../other-doc`                | `/works/other-doc/`       |
//! | `My Note.kr.md`               | `/kr/works/project/my-note/` |
//! | `note#Some Heading`           | `/works/project/note/#some-heading` |
//! | `#Some Heading`               | `#some-heading`           |

use crate::config::ConvertConfig;
use crate::utils::slug::{collapse_slashes, slugify_fragment, slugify_segment};
use smallvec::SmallVec;

/// Note file extension stripped from the final segment.
const NOTE_EXT: &str = ".md";

/// Resolves references found in one note.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    config: &'a ConvertConfig,
    /// Vault directory of the note being converted (`""` at the vault root)
    dir: &'a str,
}

impl<'a> Resolver<'a> {
    #[inline]
    pub const fn new(config: &'a ConvertConfig, dir: &'a str) -> Self {
        Self { config, dir }
    }

    #[inline]
    pub const fn dir(&self) -> &'a str {
        self.dir
    }

    #[inline]
    pub const fn config(&self) -> &'a ConvertConfig {
        self.config
    }

    /// Resolve a reference expression to a site href.
    pub fn resolve(&self, expr: &str) -> String {
        let expr = expr.trim();
        let (path, fragment) = match expr.split_once('#') {
            Some((path, fragment)) => (path.trim(), Some(slugify_fragment(fragment))),
            None => (expr, None),
        };

        match fragment {
            Some(fragment) if path.is_empty() => format!("#{fragment}"),
            Some(fragment) if !fragment.is_empty() => {
                format!("{}#{fragment}", self.resolve_path(path))
            }
            _ => self.resolve_path(path),
        }
    }

    /// Resolve a reference and pick its label (explicit one, else derived).
    pub fn link(&self, expr: &str, label: Option<&str>) -> (String, String) {
        let href = self.resolve(expr);
        let label = match label.map(str::trim) {
            Some(label) if !label.is_empty() => label.to_owned(),
            _ => default_label(&href).to_owned(),
        };
        (href, label)
    }

    fn resolve_path(&self, path: &str) -> String {
        if path.is_empty() {
            return "/".to_owned();
        }

        let mut segments: SmallVec<[&str; 8]> = SmallVec::new();
        if let Some(rooted) = path.strip_prefix('/') {
            segments.extend(rooted.split('/').filter(|s| !s.is_empty()));
        } else if self.is_vault_rooted(path) {
            segments.extend(path.split('/').filter(|s| !s.is_empty()));
        } else {
            for segment in self.dir.split('/').chain(path.split('/')) {
                match segment {
                    "" | "." => {}
                    ".." => {
                        segments.pop();
                    }
                    _ => segments.push(segment),
                }
            }
        }

        let Some(last) = segments.pop() else {
            return "/".to_owned();
        };
        let (stem, locale) = self.split_locale(strip_note_ext(last));
        let slug = slugify_segment(stem);

        let mut href = String::new();
        if let Some(locale) = locale.filter(|l| !self.config.is_default_language(l)) {
            href.push('/');
            href.push_str(locale);
        }
        for segment in &segments {
            href.push('/');
            href.push_str(segment);
        }
        href.push('/');
        href.push_str(&slug);
        href.push('/');

        collapse_slashes(&href)
    }

    /// Whether the first segment names a content root.
    fn is_vault_rooted(&self, path: &str) -> bool {
        path.split('/')
            .next()
            .is_some_and(|head| self.config.is_root(head))
    }

    /// Split a trailing `.<locale>` marker off a file stem.
    fn split_locale<'s>(&self, stem: &'s str) -> (&'s str, Option<&'a str>) {
        if let Some((name, marker)) = stem.rsplit_once('.')
            && let Some(locale) = self.config.locale(marker)
        {
            return (name, Some(locale));
        }
        (stem, None)
    }
}

fn strip_note_ext(name: &str) -> &str {
    let split = name.len().saturating_sub(NOTE_EXT.len());
    match name.get(split..) {
        Some(ext) if ext.eq_ignore_ascii_case(NOTE_EXT) => &name[..split],
        _ => name,
    }
}

/// Label for a link without one: the last path segment of the href.
pub fn default_label(href: &str) -> &str {
    let path = href.split('#').next().unwrap_or_default();
    path.trim_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .unwrap_or(href)
}

/// Whether a link target names a note file (`a.md`, `a.md#part`).
pub fn is_note_target(target: &str) -> bool {
    let path = target.split('#').next().unwrap_or_default();
    let stem = strip_note_ext(path);
    !stem.is_empty() && stem.len() != path.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(expr: &str, dir: &str) -> String {
        let config = ConvertConfig::default();
        Resolver::new(&config, dir).resolve(expr)
    }

    #[test]
    fn test_relative_parent() {
        assert_eq!(resolve("../other-doc", "works/project"), "/works/other-doc/");
    }

    #[test]
    fn test_vault_rooted_by_content_root() {
        assert_eq!(
            resolve("works/project/sub", "thought"),
            "/works/project/sub/"
        );
        assert_eq!(resolve("Works/Note", "thought"), "/Works/note/");
    }

    #[test]
    fn test_leading_slash_is_vault_rooted() {
        assert_eq!(resolve("/misc/page", "works/p1"), "/misc/page/");
    }

    #[test]
    fn test_exhausted_parent_segments() {
        assert_eq!(resolve("../../..", "works/p1"), "/");
        assert_eq!(resolve("../../../x", "works"), "/x/");
    }

    #[test]
    fn test_document_relative() {
        assert_eq!(resolve("./child", "works/p1"), "/works/p1/child/");
        assert_eq!(resolve("child", ""), "/child/");
    }

    #[test]
    fn test_empty_expression() {
        assert_eq!(resolve("", "works"), "/");
        assert_eq!(resolve("   ", "works"), "/");
    }

    #[test]
    fn test_extension_and_slug() {
        assert_eq!(resolve("My Note.MD", "thought"), "/thought/my-note/");
    }

    #[test]
    fn test_locale_marker() {
        assert_eq!(resolve("works/a/Note.kr.md", ""), "/kr/works/a/note/");
        assert_eq!(resolve("works/a/note.kr", ""), "/kr/works/a/note/");
        assert_eq!(resolve("works/a/note.en.md", ""), "/works/a/note/");
        // unknown markers are part of the name
        assert_eq!(resolve("works/v1.2", ""), "/works/v1.2/");
    }

    #[test]
    fn test_fragments() {
        assert_eq!(
            resolve("note#Second Part", "works"),
            "/works/note/#second-part"
        );
        assert_eq!(resolve("#Second Part", "works"), "#second-part");
        assert_eq!(resolve("note#", "works"), "/works/note/");
    }

    #[test]
    fn test_default_label() {
        assert_eq!(default_label("/works/p1/note/"), "note");
        assert_eq!(default_label("/works/note/#part"), "note");
        assert_eq!(default_label("/"), "/");
        assert_eq!(default_label("#part"), "#part");
    }

    #[test]
    fn test_link_label() {
        let config = ConvertConfig::default();
        let resolver = Resolver::new(&config, "works");
        assert_eq!(
            resolver.link("a b", None),
            ("/works/a-b/".to_string(), "a-b".to_string())
        );
        assert_eq!(
            resolver.link("a", Some(" Label ")),
            ("/works/a/".to_string(), "Label".to_string())
        );
    }

    #[test]
    fn test_is_note_target() {
        assert!(is_note_target("other.md"));
        assert!(is_note_target("../Other.MD#part"));
        assert!(!is_note_target("image.png"));
        assert!(!is_note_target("#part"));
        assert!(!is_note_target(".md"));
    }
}
