//! Purpose-built scanners for the markdown forms the converter rewrites.
//!
//! Each scanner walks the text once and yields [`Spanned`] matches; [`splice`]
//! rebuilds the text with every match replaced. Nothing here understands
//! markdown beyond these forms, so code blocks are scanned like prose.

use std::ops::Range;

/// A match and the byte range it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned<T> {
    pub span: Range<usize>,
    pub value: T,
}

/// Replace every match in `text` with `render(value, raw_match)`.
///
/// Matches must be sorted and non-overlapping, as every scanner yields them.
pub fn splice<T>(
    text: &str,
    matches: &[Spanned<T>],
    mut render: impl FnMut(&T, &str) -> String,
) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for m in matches {
        out.push_str(&text[last..m.span.start]);
        out.push_str(&render(&m.value, &text[m.span.clone()]));
        last = m.span.end;
    }
    out.push_str(&text[last..]);
    out
}

// ============================================================================
// Wikilinks
// ============================================================================

/// `[[path]]`, `[[path|label]]` or `![[path]]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiLink {
    pub embed: bool,
    /// Target, including any `#heading`
    pub path: String,
    pub label: Option<String>,
}

/// Find every wikilink. Links never span lines.
pub fn wikilinks(text: &str) -> Vec<Spanned<WikiLink>> {
    let bytes = text.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;

    while i + 1 < bytes.len() {
        if bytes[i] != b'[' || bytes[i + 1] != b'[' {
            i += 1;
            continue;
        }

        let inner_start = i + 2;
        let Some(inner_len) = find_wikilink_end(&bytes[inner_start..]) else {
            i += 1;
            continue;
        };
        let inner = &text[inner_start..inner_start + inner_len];

        match parse_wikilink_inner(inner) {
            Some((path, label)) => {
                let embed = i > 0 && bytes[i - 1] == b'!';
                let start = if embed { i - 1 } else { i };
                let end = inner_start + inner_len + 2;
                out.push(Spanned {
                    span: start..end,
                    value: WikiLink { embed, path, label },
                });
                i = end;
            }
            None => i += 1,
        }
    }
    out
}

/// Length of the wikilink body up to `]]`, rejecting brackets and newlines.
fn find_wikilink_end(bytes: &[u8]) -> Option<usize> {
    for (pos, &b) in bytes.iter().enumerate() {
        match b {
            b']' => return (bytes.get(pos + 1) == Some(&b']')).then_some(pos),
            b'[' | b'\n' => return None,
            _ => {}
        }
    }
    None
}

/// Split a wikilink body into target and optional label.
fn parse_wikilink_inner(inner: &str) -> Option<(String, Option<String>)> {
    let (path, label) = match inner.split_once('|') {
        Some((path, label)) => (path, Some(label)),
        None => (inner, None),
    };
    let path = path.trim();
    if path.is_empty() {
        return None;
    }
    let label = label
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_owned);
    Some((path.to_owned(), label))
}

/// Parse a value that is exactly one wikilink (`[[path|label]]`).
pub fn whole_wikilink(value: &str) -> Option<WikiLink> {
    let value = value.trim();
    let mut links = wikilinks(value);
    match links.pop() {
        Some(link) if links.is_empty() && link.span == (0..value.len()) => Some(link.value),
        _ => None,
    }
}

// ============================================================================
// Inline links and images
// ============================================================================

/// `[label](target)` or `![alt](src "title")`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineLink {
    pub image: bool,
    pub label: String,
    pub target: String,
    /// Quoted title (images only)
    pub title: Option<String>,
}

impl InlineLink {
    /// Markdown form with a new target.
    pub fn render_with(&self, target: &str) -> String {
        let bang = if self.image { "!" } else { "" };
        match &self.title {
            Some(title) => format!("{bang}[{}]({target} \"{title}\")", self.label),
            None => format!("{bang}[{}]({target})", self.label),
        }
    }
}

/// Find every inline link and image, each on a single line.
pub fn inline_links(text: &str) -> Vec<Spanned<InlineLink>> {
    let bytes = text.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'[' {
            i += 1;
            continue;
        }
        let image = i > 0 && bytes[i - 1] == b'!';
        match parse_inline_at(text, i, image) {
            Some((end, value)) => {
                let start = if image { i - 1 } else { i };
                out.push(Spanned {
                    span: start..end,
                    value,
                });
                i = end;
            }
            None => i += 1,
        }
    }
    out
}

/// Parse `[label](...)` starting at the `[` at `open`.
fn parse_inline_at(text: &str, open: usize, image: bool) -> Option<(usize, InlineLink)> {
    let bytes = text.as_bytes();

    let label_start = open + 1;
    let label_len = bytes[label_start..]
        .iter()
        .position(|&b| matches!(b, b']' | b'[' | b'\n'))?;
    let close = label_start + label_len;
    if bytes[close] != b']' || bytes.get(close + 1) != Some(&b'(') {
        return None;
    }

    let target_start = close + 2;
    let stop: &[u8] = if image { b")\"\n" } else { b")\n" };
    let target_len = bytes[target_start..]
        .iter()
        .position(|b| stop.contains(b))?;
    let target_end = target_start + target_len;
    let target = text[target_start..target_end].trim();
    if target.is_empty() {
        return None;
    }

    let mut pos = target_end;
    let mut title = None;
    if bytes[pos] == b'"' {
        let title_start = pos + 1;
        let title_len = bytes[title_start..]
            .iter()
            .position(|&b| matches!(b, b'"' | b'\n'))?;
        if bytes[title_start + title_len] != b'"' {
            return None;
        }
        title = Some(text[title_start..title_start + title_len].to_owned());
        pos = title_start + title_len + 1;
        while pos < bytes.len() && matches!(bytes[pos], b' ' | b'\t') {
            pos += 1;
        }
    }
    if bytes.get(pos) != Some(&b')') {
        return None;
    }

    Some((
        pos + 1,
        InlineLink {
            image,
            label: text[label_start..close].to_owned(),
            target: target.to_owned(),
            title,
        },
    ))
}

// ============================================================================
// Footnote definitions
// ============================================================================

/// `[^id]: text` at the start of a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FootnoteDef {
    pub id: String,
    pub text: String,
}

/// Find every footnote definition; the span covers the line without its newline.
pub fn footnote_defs(text: &str) -> Vec<Spanned<FootnoteDef>> {
    let mut out = Vec::new();
    let mut offset = 0;

    for line in text.split('\n') {
        if let Some(value) = parse_footnote_def(line) {
            out.push(Spanned {
                span: offset..offset + line.len(),
                value,
            });
        }
        offset += line.len() + 1;
    }
    out
}

fn parse_footnote_def(line: &str) -> Option<FootnoteDef> {
    let rest = line.strip_prefix("[^")?;
    let (id, rest) = rest.split_once(']')?;
    let text = rest.strip_prefix(':')?.trim();
    let id = id.trim();
    if id.is_empty() || text.is_empty() {
        return None;
    }
    Some(FootnoteDef {
        id: id.to_owned(),
        text: text.to_owned(),
    })
}

// ============================================================================
// Bare URLs
// ============================================================================

/// Characters that mark a URL as already being part of markup. A `(` only
/// counts as a link target after `]`.
const URL_GUARDS: &[u8] = b"[<\"'=";

/// Trailing characters never taken as part of a bare URL.
const URL_TRAILING: &[char] = &['.', ',', ';', ':', '!', '?'];

/// Find `http(s)://` URLs that are not already inside a link or attribute.
pub fn bare_urls(text: &str) -> Vec<Spanned<()>> {
    let bytes = text.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let rest = &text[i..];
        let scheme_len = if rest.starts_with("https://") {
            "https://".len()
        } else if rest.starts_with("http://") {
            "http://".len()
        } else {
            i += rest.chars().next().map_or(1, char::len_utf8);
            continue;
        };

        let len = rest
            .find(|c: char| c.is_whitespace() || matches!(c, '<' | '>' | '"' | '\''))
            .unwrap_or(rest.len());
        let end = i + trim_url(&rest[..len]).len();

        let guarded = i > 0 && {
            let prev = bytes[i - 1];
            URL_GUARDS.contains(&prev)
                || prev.is_ascii_alphanumeric()
                || text[..i].ends_with("](")
        };
        if !guarded && end > i + scheme_len {
            out.push(Spanned {
                span: i..end,
                value: (),
            });
        }
        i = (i + len).max(i + 1);
    }
    out
}

/// Drop trailing punctuation and closing brackets that have no opener.
fn trim_url(url: &str) -> &str {
    let mut url = url;
    loop {
        let trimmed = url.trim_end_matches(URL_TRAILING);
        let trimmed = match trimmed.chars().last() {
            Some(close @ (')' | ']')) => {
                let open = if close == ')' { '(' } else { '[' };
                if trimmed.matches(open).count() < trimmed.matches(close).count() {
                    &trimmed[..trimmed.len() - 1]
                } else {
                    trimmed
                }
            }
            _ => trimmed,
        };
        if trimmed.len() == url.len() {
            return url;
        }
        url = trimmed;
    }
}

// ============================================================================
// Image blocks
// ============================================================================

/// Find `:::images` ... `:::` blocks; the value is the block body.
pub fn image_blocks(text: &str) -> Vec<Spanned<Range<usize>>> {
    let mut out = Vec::new();
    let mut from = 0;

    while let Some(found) = text[from..].find(":::") {
        let start = from + found;
        match parse_image_block(text, start) {
            Some((body, end)) => {
                out.push(Spanned {
                    span: start..end,
                    value: body,
                });
                from = end;
            }
            None => from = start + 3,
        }
    }
    out
}

fn parse_image_block(text: &str, start: usize) -> Option<(Range<usize>, usize)> {
    let after = &text[start + 3..];
    let keyword = after.trim_start_matches([' ', '\t']);
    let rest = keyword.strip_prefix("images")?;
    let newline = rest.find('\n')?;
    if !rest[..newline].trim().is_empty() {
        return None;
    }

    let body_start = text.len() - rest.len() + newline + 1;
    let close = text[body_start..].find("\n:::")?;
    let body_end = body_start + close;
    Some((body_start..body_end, body_end + "\n:::".len()))
}
