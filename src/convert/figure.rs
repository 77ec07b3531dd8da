//! Image directives and image sets.
//!
//! An image title doubles as a small directive language:
//!
//! ```text
//! ![alt](media/a.webp "fixed=480;caption=Hello;border")
//! ```
//!
//! Tokens are split on `;` and read as `key=value`, `key:value` or a bare
//! flag. Recognized directives turn the image into a `<figure>`; images that
//! share a `grid` value and sit next to each other are wrapped in one grid.
//!
//! `:::images` blocks list one image per line and render as an image set.

use super::media::normalize_media;
use super::scan::{self, InlineLink, Spanned};

// ============================================================================
// Directive parsing
// ============================================================================

/// What an image title asks for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FigureSpec {
    pub classes: Vec<&'static str>,
    pub style: String,
    pub caption: Option<String>,
    /// `data-<key>` passthrough attributes, in title order
    pub data: Vec<(String, String)>,
    pub grid: Option<String>,
    pub grid_width: Option<u32>,
}

impl FigureSpec {
    /// Parse an image title. Unknown tokens with unsafe keys are ignored.
    pub fn parse(title: &str) -> Self {
        let mut spec = Self::default();

        for token in title.split(';').map(str::trim).filter(|t| !t.is_empty()) {
            let (key, value) = match token.split_once('=').or_else(|| token.split_once(':')) {
                Some((key, value)) => (key.trim().to_lowercase(), Some(value.trim())),
                None => (token.to_lowercase(), None),
            };

            match key.as_str() {
                "full" => spec.add_class("img--full"),
                "border" | "bordered" => spec.add_class("img--border"),
                "fixed" | "max" => {
                    if let Some(px) = value.and_then(parse_px) {
                        spec.add_class("img--fixed");
                        spec.style = format!("max-width:{px}px;");
                    }
                }
                "caption" => {
                    spec.caption = value.filter(|v| !v.is_empty()).map(str::to_owned);
                }
                "grid" => {
                    let group = value.filter(|v| !v.is_empty()).unwrap_or("1");
                    spec.grid = Some(group.to_owned());
                }
                "grid-width" => spec.grid_width = value.and_then(parse_px),
                _ if is_attribute_key(&key) => {
                    let value = value.unwrap_or_default().to_owned();
                    match spec.data.iter_mut().find(|(k, _)| *k == key) {
                        Some(slot) => slot.1 = value,
                        None => spec.data.push((key, value)),
                    }
                }
                _ => {}
            }
        }

        spec
    }

    /// Nothing recognized: the image stays plain markdown.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
            && self.style.is_empty()
            && self.caption.is_none()
            && self.data.is_empty()
            && self.grid.is_none()
    }

    fn add_class(&mut self, class: &'static str) {
        if !self.classes.contains(&class) {
            self.classes.push(class);
        }
    }

    /// Render the `<figure>` element for an image.
    pub fn render(&self, src: &str, alt: &str) -> String {
        let mut open = String::from("<figure");
        if !self.classes.is_empty() {
            push_attr(&mut open, "class", &self.classes.join(" "));
        }
        if !self.style.is_empty() {
            push_attr(&mut open, "style", &self.style);
        }
        for (key, value) in &self.data {
            push_attr(&mut open, &format!("data-{key}"), value);
        }
        open.push('>');

        let mut lines = vec![open, img_tag("  ", src, alt)];
        if let Some(caption) = &self.caption {
            lines.push(format!("  <figcaption>{caption}</figcaption>"));
        }
        lines.push("</figure>".to_owned());
        lines.join("\n")
    }
}

/// Pixel value: `480` or `480px`, positive.
fn parse_px(value: &str) -> Option<u32> {
    let value = value.trim();
    let digits = value.strip_suffix("px").unwrap_or(value).trim();
    digits.parse::<u32>().ok().filter(|px| *px > 0)
}

/// `[a-z][a-z0-9_-]*`
fn is_attribute_key(key: &str) -> bool {
    let mut chars = key.chars();
    chars.next().is_some_and(|c| c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}

fn escape_attr(value: &str) -> String {
    value.replace('"', "&quot;")
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push_str(&format!(" {name}=\"{}\"", escape_attr(value)));
}

fn img_tag(indent: &str, src: &str, alt: &str) -> String {
    format!(
        "{indent}<img src=\"{}\" alt=\"{}\">",
        escape_attr(src),
        escape_attr(alt)
    )
}

// ============================================================================
// Image directives
// ============================================================================

/// One rendered image, waiting to be grouped into a grid.
struct Figure {
    span: std::ops::Range<usize>,
    html: String,
    grid: Option<String>,
    grid_width: Option<u32>,
}

/// Expand image directives into figures and group grid images.
pub fn expand_image_directives(text: &str, dir: &str) -> String {
    let figures: Vec<Figure> = scan::inline_links(text)
        .into_iter()
        .filter(|m| m.value.image)
        .filter_map(|m| figure_for(m, dir))
        .collect();

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut i = 0;

    while i < figures.len() {
        let first = &figures[i];
        out.push_str(&text[last..first.span.start]);

        let Some(grid) = &first.grid else {
            out.push_str(&first.html);
            last = first.span.end;
            i += 1;
            continue;
        };

        // extend the group over neighbours separated only by whitespace
        let mut end = i + 1;
        while end < figures.len()
            && figures[end].grid.as_ref() == Some(grid)
            && text[figures[end - 1].span.end..figures[end].span.start]
                .trim()
                .is_empty()
        {
            end += 1;
        }

        let group = &figures[i..end];
        out.push_str(&render_grid(grid, group));
        last = group[group.len() - 1].span.end;
        i = end;
    }

    out.push_str(&text[last..]);
    out
}

fn figure_for(m: Spanned<InlineLink>, dir: &str) -> Option<Figure> {
    let spec = FigureSpec::parse(m.value.title.as_deref()?);
    if spec.is_empty() {
        return None;
    }
    let src = normalize_media(&m.value.target, dir);
    Some(Figure {
        span: m.span,
        html: spec.render(&src, m.value.label.trim()),
        grid: spec.grid,
        grid_width: spec.grid_width,
    })
}

fn render_grid(grid: &str, group: &[Figure]) -> String {
    let mut style = format!("--grid-cols:{};", group.len());
    if let Some(width) = group.iter().find_map(|f| f.grid_width) {
        style.push_str(&format!("max-width:{width}px;"));
    }

    let mut open = String::from("<div class=\"img-grid\"");
    push_attr(&mut open, "data-grid", grid);
    push_attr(&mut open, "style", &style);
    open.push('>');

    let mut lines = vec![open];
    lines.extend(group.iter().map(|f| f.html.clone()));
    lines.push("</div>".to_owned());
    lines.join("\n")
}

// ============================================================================
// Image sets
// ============================================================================

/// Expand `:::images` blocks; blocks without images are left as written.
pub fn expand_image_blocks(text: &str, dir: &str) -> String {
    let blocks = scan::image_blocks(text);
    scan::splice(text, &blocks, |body, raw| {
        render_image_set(&text[body.clone()], dir).unwrap_or_else(|| raw.to_owned())
    })
}

fn render_image_set(body: &str, dir: &str) -> Option<String> {
    let mut images = Vec::new();
    let mut caption = None;

    for line in body.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(prefix) = line.get(..8)
            && prefix.eq_ignore_ascii_case("caption:")
        {
            caption = Some(line[8..].trim());
            continue;
        }

        let Some(image) = scan::inline_links(line)
            .into_iter()
            .find(|m| m.span.start == 0 && m.value.image)
        else {
            continue;
        };
        let src = normalize_media(&image.value.target, dir);
        images.push(img_tag("    ", &src, image.value.label.trim()));
    }

    if images.is_empty() {
        return None;
    }

    let mut lines = vec![
        "<figure class=\"img-set\">".to_owned(),
        "  <div class=\"img-set__images\">".to_owned(),
    ];
    lines.extend(images);
    lines.push("  </div>".to_owned());
    if let Some(caption) = caption.filter(|c| !c.is_empty()) {
        lines.push(format!("  <figcaption>{caption}</figcaption>"));
    }
    lines.push("</figure>".to_owned());
    Some(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fixed_and_caption() {
        let spec = FigureSpec::parse("fixed=480;caption=Hello");
        assert_eq!(spec.classes, ["img--fixed"]);
        assert_eq!(spec.style, "max-width:480px;");
        assert_eq!(spec.caption.as_deref(), Some("Hello"));
    }

    #[test]
    fn test_parse_px_suffix_and_invalid() {
        assert_eq!(FigureSpec::parse("max: 320px").style, "max-width:320px;");
        let invalid = FigureSpec::parse("fixed=wide");
        assert!(invalid.classes.is_empty());
        assert!(invalid.style.is_empty());
        assert!(FigureSpec::parse("fixed=0").is_empty());
    }

    #[test]
    fn test_parse_flags() {
        let spec = FigureSpec::parse(" full ; Bordered ; border ");
        assert_eq!(spec.classes, ["img--full", "img--border"]);
    }

    #[test]
    fn test_equals_before_colon() {
        let spec = FigureSpec::parse("caption=Time: 10:00");
        assert_eq!(spec.caption.as_deref(), Some("Time: 10:00"));
    }

    #[test]
    fn test_data_passthrough() {
        let spec = FigureSpec::parse("loading=lazy;zoom;Bad Key=x;9x=1");
        assert_eq!(
            spec.data,
            [
                ("loading".to_string(), "lazy".to_string()),
                ("zoom".to_string(), String::new())
            ]
        );
    }

    #[test]
    fn test_empty_caption_is_nothing() {
        assert!(FigureSpec::parse("caption=").is_empty());
        assert!(FigureSpec::parse("; ;").is_empty());
    }

    #[test]
    fn test_render_figure() {
        let spec = FigureSpec::parse("fixed=480;caption=Hello");
        assert_eq!(
            spec.render("/media/w/a.webp", "A \"quoted\" alt"),
            "<figure class=\"img--fixed\" style=\"max-width:480px;\">\n  <img src=\"/media/w/a.webp\" alt=\"A &quot;quoted&quot; alt\">\n  <figcaption>Hello</figcaption>\n</figure>"
        );
    }

    #[test]
    fn test_render_omits_empty_attributes() {
        let spec = FigureSpec::parse("caption=Only");
        assert!(spec.render("/a.png", "").starts_with("<figure>\n"));
    }

    #[test]
    fn test_expand_directive() {
        let text = "intro\n![a](media/a.webp \"fixed=480;caption=Hello\")\nend";
        let out = expand_image_directives(text, "works/p1");
        assert_eq!(
            out,
            "intro\n<figure class=\"img--fixed\" style=\"max-width:480px;\">\n  <img src=\"/media/works/p1/a.webp\" alt=\"a\">\n  <figcaption>Hello</figcaption>\n</figure>\nend"
        );
    }

    #[test]
    fn test_plain_images_untouched() {
        let text = "![a](/media/w/a.png) ![b](/media/w/b.png \"just a title\")";
        assert_eq!(expand_image_directives(text, "w"), text);
    }

    #[test]
    fn test_grid_grouping() {
        let text = "![a](media/a.png \"grid=g;grid-width=900\")\n![b](media/b.png \"grid=g\")\n\n![c](media/c.png \"grid=h\")";
        let out = expand_image_directives(text, "w");
        assert!(out.starts_with(
            "<div class=\"img-grid\" data-grid=\"g\" style=\"--grid-cols:2;max-width:900px;\">\n<figure>\n  <img src=\"/media/w/a.png\" alt=\"a\">\n</figure>\n<figure>\n  <img src=\"/media/w/b.png\" alt=\"b\">\n</figure>\n</div>\n\n"
        ));
        assert!(out.ends_with(
            "<div class=\"img-grid\" data-grid=\"h\" style=\"--grid-cols:1;\">\n<figure>\n  <img src=\"/media/w/c.png\" alt=\"c\">\n</figure>\n</div>"
        ));
    }

    #[test]
    fn test_grid_broken_by_text() {
        let text = "![a](a.png \"grid=g\") and ![b](b.png \"grid=g\")";
        let out = expand_image_directives(text, "w");
        assert_eq!(out.matches("--grid-cols:1;").count(), 2);
        assert!(out.contains("</div> and <div"));
    }

    #[test]
    fn test_image_set() {
        let text = ":::images\n![one](media/1.png)\n![two](media/2.png \"t\")\nnot an image\ncaption: Pair\n:::";
        assert_eq!(
            expand_image_blocks(text, "works/p1"),
            "<figure class=\"img-set\">\n  <div class=\"img-set__images\">\n    <img src=\"/media/works/p1/1.png\" alt=\"one\">\n    <img src=\"/media/works/p1/2.png\" alt=\"two\">\n  </div>\n  <figcaption>Pair</figcaption>\n</figure>"
        );
    }

    #[test]
    fn test_image_set_without_images_is_verbatim() {
        let text = "a\n:::images\njust words\n:::\nb";
        assert_eq!(expand_image_blocks(text, "w"), text);
    }
}
