//! Media reference normalization.
//!
//! Every note keeps its attachments in a `media/` folder next to it. On the
//! site that folder is published as `/media/<note dir>/`, so any spelling of
//! a media reference is rewritten to that canonical form:
//!
//! ```text
//! media/foo/bar.webp              ─┐
//! ./media/foo/bar.webp             ├─► /media/works/p1/foo/bar.webp
//! ../p1/media/media/foo/bar.webp   │
//! /media/works/p1/media/foo/bar.webp ─┘
//! ```

use crate::utils::slug::collapse_slashes;

/// Name of the per-note media folder.
pub const MEDIA_DIR: &str = "media";

const MEDIA_SEGMENT: &str = "media/";

/// Schemes and prefixes that are never rewritten.
const EXTERNAL_PREFIXES: &[&str] = &["http://", "https://", "data:", "//"];

/// Normalize a media reference made from the note directory `dir`.
///
/// References without a `media/` segment are returned unchanged.
pub fn normalize_media(reference: &str, dir: &str) -> String {
    let s = reference.trim();
    if s.is_empty() || is_external(s) {
        return s.to_owned();
    }

    let base = media_base(dir);

    if s.starts_with("/media/") {
        // already canonical; only drop a doubled folder right after the base
        return match s.strip_prefix(base.as_str()) {
            Some(rest) => collapse_slashes(&format!("{base}{}", strip_media_segments(rest))),
            None => s.to_owned(),
        };
    }

    match find_media_segment(s) {
        Some(pos) => {
            let rest = strip_media_segments(&s[pos..]);
            collapse_slashes(&format!("{base}{rest}"))
        }
        None => reference.to_owned(),
    }
}

/// Whether a reference points into a `media/` folder.
pub fn is_media_reference(reference: &str) -> bool {
    let s = reference.trim();
    !is_external(s) && (s.starts_with("/media/") || find_media_segment(s).is_some())
}

/// Published directory of a note's media folder, relative to the static root.
pub fn published_dir(dir: &str) -> String {
    if dir.is_empty() {
        MEDIA_DIR.to_owned()
    } else {
        format!("{MEDIA_DIR}/{dir}")
    }
}

/// Vault directory of a note's media folder.
pub fn source_dir(dir: &str) -> String {
    if dir.is_empty() {
        MEDIA_DIR.to_owned()
    } else {
        format!("{dir}/{MEDIA_DIR}")
    }
}

#[inline]
fn is_external(s: &str) -> bool {
    EXTERNAL_PREFIXES.iter().any(|prefix| s.starts_with(prefix))
}

fn media_base(dir: &str) -> String {
    let dir = dir.trim_matches('/');
    if dir.is_empty() {
        "/media/".to_owned()
    } else {
        format!("/media/{dir}/")
    }
}

/// Byte offset of the first `media/` segment that starts a path component.
fn find_media_segment(s: &str) -> Option<usize> {
    s.match_indices(MEDIA_SEGMENT)
        .map(|(pos, _)| pos)
        .find(|&pos| pos == 0 || s.as_bytes()[pos - 1] == b'/')
}

/// Drop every leading `media/` segment (and stray slashes between them).
fn strip_media_segments(mut s: &str) -> &str {
    loop {
        s = s.trim_start_matches('/');
        match s.strip_prefix(MEDIA_SEGMENT) {
            Some(rest) => s = rest,
            None => return s,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vault_relative() {
        assert_eq!(
            normalize_media("media/foo/bar.webp", "works/p1"),
            "/media/works/p1/foo/bar.webp"
        );
        assert_eq!(
            normalize_media("./media/a.png", "works/p1"),
            "/media/works/p1/a.png"
        );
    }

    #[test]
    fn test_doubled_media_segment() {
        assert_eq!(
            normalize_media("/media/works/p1/media/foo.webp", "works/p1"),
            "/media/works/p1/foo.webp"
        );
        assert_eq!(
            normalize_media("media/media/foo.webp", "works/p1"),
            "/media/works/p1/foo.webp"
        );
    }

    #[test]
    fn test_canonical_other_dir_untouched() {
        assert_eq!(
            normalize_media("/media/works/p2/media/x.png", "works/p1"),
            "/media/works/p2/media/x.png"
        );
    }

    #[test]
    fn test_vault_root_note() {
        assert_eq!(normalize_media("media/a.png", ""), "/media/a.png");
    }

    #[test]
    fn test_passthrough() {
        assert_eq!(normalize_media("", "works"), "");
        assert_eq!(
            normalize_media("https://example.com/media/a.png", "works"),
            "https://example.com/media/a.png"
        );
        assert_eq!(normalize_media("//cdn/media/a.png", "works"), "//cdn/media/a.png");
        assert_eq!(normalize_media("data:image/png;base64,AA", "works"), "data:image/png;base64,AA");
        assert_eq!(normalize_media("images/a.png", "works"), "images/a.png");
        // `media/` must start a path segment
        assert_eq!(normalize_media("socialmedia/a.png", "works"), "socialmedia/a.png");
    }

    #[test]
    fn test_fixed_point() {
        let once = normalize_media("../p1/media/x y.png", "works/p1");
        assert_eq!(once, "/media/works/p1/x y.png");
        assert_eq!(normalize_media(&once, "works/p1"), once);
    }

    #[test]
    fn test_is_media_reference() {
        assert!(is_media_reference("media/a.png"));
        assert!(is_media_reference("/media/works/a.png"));
        assert!(!is_media_reference("https://x.com/media/a.png"));
        assert!(!is_media_reference("notes/a.md"));
    }

    #[test]
    fn test_copy_dirs() {
        assert_eq!(source_dir("works/p1"), "works/p1/media");
        assert_eq!(published_dir("works/p1"), "media/works/p1");
        assert_eq!(source_dir(""), "media");
        assert_eq!(published_dir(""), "media");
    }
}
