//! Footnote definitions.
//!
//! Definitions stay in the body; their text is also surfaced as
//! `extra.notes` so templates can render a side column.

use super::body::rewrite_wikilinks;
use super::resolve::Resolver;
use super::scan;
use crate::utils::slug::strip_url_scheme;
use serde::Serialize;

/// `{id, text}` record of one footnote definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Footnote {
    pub id: String,
    pub text: String,
}

/// Rewrite wikilinks and bare URLs inside a piece of metadata text.
///
/// `see https://example.com` → `see [example.com](https://example.com)`.
/// Already rewritten text comes back unchanged.
pub fn rewrite_references(text: &str, resolver: &Resolver<'_>) -> String {
    let text = rewrite_wikilinks(text, resolver);
    let urls = scan::bare_urls(&text);
    scan::splice(&text, &urls, |_, url| {
        format!("[{}]({url})", strip_url_scheme(url))
    })
}

/// Rewrite the text of every footnote definition line in place.
pub fn rewrite_definitions(body: &str, resolver: &Resolver<'_>) -> String {
    let defs = scan::footnote_defs(body);
    scan::splice(body, &defs, |def, _| {
        format!("[^{}]: {}", def.id, rewrite_references(&def.text, resolver))
    })
}

/// Collect footnotes from an already rewritten body.
pub fn extract(body: &str, resolver: &Resolver<'_>) -> Vec<Footnote> {
    scan::footnote_defs(body)
        .into_iter()
        .map(|def| Footnote {
            text: rewrite_references(&def.value.text, resolver),
            id: def.value.id,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConvertConfig;

    #[test]
    fn test_rewrite_references() {
        let config = ConvertConfig::default();
        let resolver = Resolver::new(&config, "works/p1");
        assert_eq!(
            rewrite_references("see [[other|Other]] and https://example.com/x.", &resolver),
            "see [Other](/works/p1/other/) and [example.com/x](https://example.com/x)."
        );
    }

    #[test]
    fn test_rewrite_definitions_is_fixed_point() {
        let config = ConvertConfig::default();
        let resolver = Resolver::new(&config, "thought");
        let body = "text[^1]\n\n[^1]:   from http://a.org and [[idea]]\n";
        let once = rewrite_definitions(body, &resolver);
        assert_eq!(
            once,
            "text[^1]\n\n[^1]: from [a.org](http://a.org) and [idea](/thought/idea/)\n"
        );
        assert_eq!(rewrite_definitions(&once, &resolver), once);
    }

    #[test]
    fn test_parenthesized_url_is_linked_once() {
        let config = ConvertConfig::default();
        let resolver = Resolver::new(&config, "thought");
        let once = rewrite_references("source (https://x.org)", &resolver);
        assert_eq!(once, "source ([x.org](https://x.org))");
        assert_eq!(rewrite_references(&once, &resolver), once);
    }

    #[test]
    fn test_extract() {
        let config = ConvertConfig::default();
        let resolver = Resolver::new(&config, "");
        let notes = extract("a[^x]\n[^x]: note one\n[^2]: two", &resolver);
        assert_eq!(
            notes,
            [
                Footnote {
                    id: "x".into(),
                    text: "note one".into()
                },
                Footnote {
                    id: "2".into(),
                    text: "two".into()
                },
            ]
        );
    }
}
