//! Body rewriting.
//!
//! Passes run in a fixed order, each over the output of the previous one:
//!
//! 1. wikilinks → markdown links and images
//! 2. link and image targets → site paths
//! 3. `:::images` blocks → image sets
//! 4. image directives → figures and grids
//! 5. `[label](#disabled)` → inert anchors
//! 6. footnote definition text → resolved links

use super::figure::{expand_image_blocks, expand_image_directives};
use super::footnote::rewrite_definitions;
use super::media::{is_media_reference, normalize_media};
use super::resolve::{Resolver, default_label, is_note_target};
use super::scan::{self, InlineLink, WikiLink};
use crate::utils::slug::is_external_link;

/// Link target that marks a link as deliberately inactive.
const DISABLED_TARGET: &str = "#disabled";

/// Rewrite a note body.
pub fn rewrite_body(body: &str, resolver: &Resolver<'_>) -> String {
    let dir = resolver.dir();

    let text = rewrite_wikilinks(body, resolver);
    let text = rewrite_link_targets(&text, resolver);
    let text = expand_image_blocks(&text, dir);
    let text = expand_image_directives(&text, dir);
    let text = rewrite_disabled_links(&text);
    rewrite_definitions(&text, resolver)
}

/// Turn `[[...]]` references into markdown.
///
/// Media targets become media links (or images when embedded); note embeds
/// become plain links.
pub fn rewrite_wikilinks(text: &str, resolver: &Resolver<'_>) -> String {
    let links = scan::wikilinks(text);
    scan::splice(text, &links, |link, _| render_wikilink(link, resolver))
}

fn render_wikilink(link: &WikiLink, resolver: &Resolver<'_>) -> String {
    if is_media_reference(&link.path) {
        let src = normalize_media(&link.path, resolver.dir());
        return if link.embed {
            format!("![{}]({src})", link.label.as_deref().unwrap_or_default())
        } else {
            let label = link
                .label
                .as_deref()
                .unwrap_or_else(|| default_label(&src));
            format!("[{label}]({src})")
        };
    }

    let (href, label) = resolver.link(&link.path, link.label.as_deref());
    format!("[{label}]({href})")
}

/// Normalize media targets and resolve `.md` note targets.
fn rewrite_link_targets(text: &str, resolver: &Resolver<'_>) -> String {
    let links = scan::inline_links(text);
    scan::splice(text, &links, |link, raw| {
        match rewrite_target(link, resolver) {
            Some(target) => link.render_with(&target),
            None => raw.to_owned(),
        }
    })
}

fn rewrite_target(link: &InlineLink, resolver: &Resolver<'_>) -> Option<String> {
    let target = link.target.as_str();
    if is_external_link(target) {
        return None;
    }
    if is_media_reference(target) {
        return Some(normalize_media(target, resolver.dir()));
    }
    if !link.image && is_note_target(target) {
        return Some(resolver.resolve(target));
    }
    None
}

/// `[label](#disabled)` → `<a class="is-disabled" aria-disabled="true">label</a>`
fn rewrite_disabled_links(text: &str) -> String {
    let links: Vec<_> = scan::inline_links(text)
        .into_iter()
        .filter(|m| {
            !m.value.image && !m.value.label.is_empty() && m.value.target == DISABLED_TARGET
        })
        .collect();
    scan::splice(text, &links, |link, _| {
        format!(
            "<a class=\"is-disabled\" aria-disabled=\"true\">{}</a>",
            link.label
        )
    })
}
