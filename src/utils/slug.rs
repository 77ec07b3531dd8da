//! URL slugification and path utilities.
//!
//! Converts note names and vault paths to URL-safe formats.

/// Convert a note file stem to its URL segment.
///
/// Trims surrounding whitespace, replaces spaces with hyphens and lowercases.
/// Anything else (unicode included) is kept, so `"내 노트"` becomes `"내-노트"`.
pub fn slugify_segment(name: &str) -> String {
    name.trim().replace(' ', "-").to_lowercase()
}

/// Slugify a heading fragment (`#My Heading` → `my-heading`).
pub fn slugify_fragment(fragment: &str) -> String {
    slugify_segment(fragment.trim_start_matches('#'))
}

/// Collapse every run of `/` into a single slash.
pub fn collapse_slashes(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut prev_slash = false;
    for c in path.chars() {
        if c == '/' {
            if prev_slash {
                continue;
            }
            prev_slash = true;
        } else {
            prev_slash = false;
        }
        out.push(c);
    }
    out
}

/// Directory part of a vault-relative path.
///
/// `works/p1/doc.md` → `works/p1`, `doc.md` → `""`.
pub fn parent_dir(vault_path: &str) -> &str {
    let path = vault_path.trim_matches('/');
    path.rsplit_once('/').map_or("", |(dir, _)| dir)
}

/// Normalize a platform path string into a slash-separated vault path.
pub fn to_vault_path(path: &str) -> String {
    path.replace('\\', "/").trim_matches('/').to_owned()
}

/// Whether a link target carries a URL scheme (`https:`, `mailto:`, `data:`...)
/// or is protocol-relative.
#[inline]
pub fn is_external_link(link: &str) -> bool {
    if link.starts_with("//") {
        return true;
    }
    link.find(':').is_some_and(|pos| {
        pos > 1
            && link[..pos]
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}

/// Strip the `http://` / `https://` scheme for display.
pub fn strip_url_scheme(url: &str) -> &str {
    url.strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url)
}
