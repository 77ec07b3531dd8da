//! Front matter field migration.
//!
//! Zola only understands a handful of top-level keys; everything else must
//! live under `extra`. Each top-level key outside the keep list is moved
//! there, encoded by what kind of key it is:
//!
//! | Key kind           | Stored as                                   |
//! |--------------------|---------------------------------------------|
//! | `link`             | list of `{href, label}`                     |
//! | file keys          | media path string                           |
//! | numeric keys       | integer                                     |
//! | `meta_description` | list of strings with links rewritten        |
//! | anything else      | quoted string, list, or the original block  |
//!
//! Footnotes are added as `notes`. Keys already present in `extra` are
//! replaced where they stand, so running the migration twice changes nothing.

use super::block::{
    Entry, Field, MetadataBlock, Table, append_position, detect_indent, find_field, parse_yaml,
    render_entries, strip_toml_comment,
};
use super::footnote::{Footnote, rewrite_references};
use super::frontmatter::Dialect;
use super::media::normalize_media;
use super::resolve::Resolver;
use super::scan::{self, whole_wikilink};
use crate::utils::date::strip_quotes;
use crate::utils::slug::{is_external_link, strip_url_scheme};

/// Namespace key for migrated fields.
const EXTRA: &str = "extra";

const LINK_KEY: &str = "link";
const META_DESCRIPTION_KEY: &str = "meta_description";
const NOTES_KEY: &str = "notes";

/// A value stored under `extra`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtraValue {
    /// String content, quoted on output unless it already is
    Text(String),
    Integer(i64),
    Link { href: String, label: String },
    Footnote { id: String, text: String },
    List(Vec<ExtraValue>),
    /// Structure carried over as written
    Verbatim { value: String, children: Vec<String> },
}

// ============================================================================
// Classification
// ============================================================================

/// Move every non-kept top-level field into `extra` and add footnotes.
///
/// A note whose `extra` is not a mapping (`extra = "x"`, `extra: text`) is
/// left untouched.
pub fn migrate(block: &mut MetadataBlock, footnotes: &[Footnote], resolver: &Resolver<'_>) {
    let dialect = block.dialect();
    if !extra_is_mergeable(block) {
        return;
    }

    let config = resolver.config();
    let mut moved: Vec<(String, ExtraValue)> = Vec::new();
    let mut kept = Vec::with_capacity(block.entries.len());

    for entry in std::mem::take(&mut block.entries) {
        let mut field = match entry {
            Entry::Field(field) => field,
            other => {
                kept.push(other);
                continue;
            }
        };
        if field.key == EXTRA || config.is_kept(&field.key) {
            kept.push(Entry::Field(field));
            continue;
        }
        if dialect == Dialect::Toml {
            field.value = strip_toml_comment(&field.value).to_owned();
        }

        let key = field.key.to_lowercase();
        if key == LINK_KEY {
            let links = link_values(&field, dialect, resolver);
            match moved.iter_mut().find(|(k, _)| k.as_str() == LINK_KEY) {
                Some((_, ExtraValue::List(existing))) => existing.extend(links),
                Some((_, slot)) => *slot = ExtraValue::List(links),
                None => moved.push((LINK_KEY.to_owned(), ExtraValue::List(links))),
            }
            continue;
        }

        let value = if config.is_file_key(&key) {
            ExtraValue::Text(media_value(&field.value, resolver))
        } else if config.is_numeric_key(&key) {
            ExtraValue::Integer(parse_numeric(&field.value))
        } else if key == META_DESCRIPTION_KEY {
            let items = list_items(&field, dialect)
                .into_iter()
                .map(|item| ExtraValue::Text(rewrite_references(strip_quotes(&item), resolver)))
                .collect();
            ExtraValue::List(items)
        } else {
            plain_value(&field, dialect)
        };

        match moved.iter_mut().find(|(k, _)| *k == field.key) {
            Some((_, slot)) => *slot = value,
            None => moved.push((field.key, value)),
        }
    }

    if !footnotes.is_empty() {
        let notes = footnotes
            .iter()
            .map(|note| ExtraValue::Footnote {
                id: note.id.clone(),
                text: note.text.clone(),
            })
            .collect();
        moved.push((NOTES_KEY.to_owned(), ExtraValue::List(notes)));
    }

    block.entries = kept;
    if !moved.is_empty() {
        match dialect {
            Dialect::Toml => merge_toml_extra(block, &moved),
            Dialect::Yaml => merge_yaml_extra(block, &moved),
        }
    }
}

fn extra_is_mergeable(block: &MetadataBlock) -> bool {
    match block.position(EXTRA).and_then(|index| block.field(index)) {
        None => true,
        Some(field) => {
            block.dialect() == Dialect::Yaml && matches!(field.value.as_str(), "" | "{}")
        }
    }
}

/// Every `{href, label}` a `link` field contributes.
fn link_values(field: &Field, dialect: Dialect, resolver: &Resolver<'_>) -> Vec<ExtraValue> {
    list_items(field, dialect)
        .iter()
        .map(|item| link_value(item, resolver))
        .collect()
}

/// `[[path|label]]`, `[label](target)`, `label: URL`, `path|label` or an
/// external URL.
fn link_value(raw: &str, resolver: &Resolver<'_>) -> ExtraValue {
    let raw = strip_quotes(raw.trim()).trim();

    let (target, label) = if let Some(link) = whole_wikilink(raw) {
        (link.path, link.label)
    } else if let Some(link) = whole_markdown_link(raw) {
        (link.target, Some(link.label).filter(|l| !l.trim().is_empty()))
    } else if let Some((label, url)) = raw.split_once(": ")
        && is_external_link(url.trim())
    {
        (url.trim().to_owned(), Some(label.trim().to_owned()))
    } else {
        match raw.split_once('|') {
            Some((target, label)) => (target.trim().to_owned(), Some(label.trim().to_owned())),
            None => (raw.to_owned(), None),
        }
    };

    if is_external_link(&target) {
        let label = label
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| strip_url_scheme(&target).to_owned());
        return ExtraValue::Link { href: target, label };
    }

    let (href, label) = resolver.link(&target, label.as_deref());
    ExtraValue::Link { href, label }
}

fn whole_markdown_link(value: &str) -> Option<scan::InlineLink> {
    let mut links = scan::inline_links(value);
    match links.pop() {
        Some(link) if links.is_empty() && link.span == (0..value.len()) && !link.value.image => {
            Some(link.value)
        }
        _ => None,
    }
}

/// Media path of a file-valued key; a wikilink contributes its target.
fn media_value(raw: &str, resolver: &Resolver<'_>) -> String {
    let raw = strip_quotes(raw.trim()).trim();
    let candidate = match scan::wikilinks(raw).into_iter().next() {
        Some(link) => link.value.path,
        None => raw.to_owned(),
    };
    normalize_media(&candidate, resolver.dir())
}

/// Integer value: the whole value, else its first digit run, else 0.
pub fn parse_numeric(raw: &str) -> i64 {
    let value = strip_quotes(raw.trim()).trim();
    if let Ok(n) = value.parse::<i64>() {
        return n;
    }
    let digits: String = value
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().unwrap_or(0)
}

/// Any other key: quoted text, a list of scalars, or the original structure.
fn plain_value(field: &Field, dialect: Dialect) -> ExtraValue {
    let value = field.value.trim();

    match dialect {
        Dialect::Yaml => {
            if let Some(items) = yaml_block_list(field) {
                return ExtraValue::List(items.into_iter().map(ExtraValue::Text).collect());
            }
            let nested = !field.children().iter().all(|l| l.trim().is_empty());
            let flow = value.starts_with('[') && whole_wikilink(value).is_none();
            if nested || flow || value.starts_with(['{', '|', '>']) {
                return verbatim(field, dialect);
            }
        }
        Dialect::Toml => {
            if value.starts_with('[') && whole_wikilink(value).is_none() {
                return match toml_array(value) {
                    Some(items) => ExtraValue::List(items),
                    None => verbatim(field, dialect),
                };
            }
            if value.starts_with('{') || value.starts_with("\"\"\"") || value.starts_with("'''") {
                return verbatim(field, dialect);
            }
        }
    }

    match whole_wikilink(strip_quotes(value)) {
        Some(link) => ExtraValue::Text(link.label.unwrap_or_else(|| strip_quotes(value).to_owned())),
        None => ExtraValue::Text(value.to_owned()),
    }
}

fn verbatim(field: &Field, dialect: Dialect) -> ExtraValue {
    ExtraValue::Verbatim {
        value: field.value.clone(),
        children: match dialect {
            Dialect::Yaml => field.children().to_vec(),
            Dialect::Toml => Vec::new(),
        },
    }
}

/// Items of a list-valued field: YAML block or flow lists, a TOML array, or
/// a single scalar. Items keep their quotes.
///
/// Every `- item` child counts, whatever its text; other children are
/// ignored.
fn list_items(field: &Field, dialect: Dialect) -> Vec<String> {
    let value = field.value.trim();
    let mut items = Vec::new();

    match dialect {
        Dialect::Yaml => {
            match yaml_flow_items(value) {
                Some(flow) => items.extend(flow),
                None if !value.is_empty() => items.push(value.to_owned()),
                None => {}
            }
            items.extend(
                field
                    .children()
                    .iter()
                    .filter_map(|line| dash_item(line))
                    .filter(|item| !item.is_empty())
                    .map(str::to_owned),
            );
        }
        Dialect::Toml => match toml_array(value) {
            Some(values) if value.starts_with('[') && whole_wikilink(value).is_none() => {
                items.extend(values.into_iter().map(|v| match v {
                    ExtraValue::Text(s) => s,
                    ExtraValue::Integer(n) => n.to_string(),
                    _ => String::new(),
                }));
            }
            _ if !value.is_empty() => items.push(value.to_owned()),
            _ => {}
        },
    }
    items
}

/// Text after the dash of a `- item` line.
fn dash_item(line: &str) -> Option<&str> {
    let item = line.trim().strip_prefix('-')?;
    (item.is_empty() || item.starts_with(' ')).then(|| item.trim())
}

/// Scalar `- item` children of a YAML field; `None` if any child is
/// something else, including a `- key: value` mapping.
fn yaml_block_list(field: &Field) -> Option<Vec<String>> {
    let children: Vec<&str> = field
        .children()
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();
    if children.is_empty() {
        return None;
    }
    children
        .into_iter()
        .map(|line| {
            dash_item(line)
                .filter(|item| !item.is_empty() && !item.contains(": "))
                .map(str::to_owned)
        })
        .collect()
}

/// Items of a `[a, "b, c", [[note]]]` YAML flow sequence.
fn yaml_flow_items(value: &str) -> Option<Vec<String>> {
    if value.starts_with("[[") {
        return None;
    }
    let inner = value.strip_prefix('[')?.strip_suffix(']')?;

    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') if inner[start..i].trim().is_empty() => quote = Some(c),
            (None, '[' | '{') => depth += 1,
            (None, ']' | '}') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                items.push(&inner[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    items.push(&inner[start..]);

    Some(
        items
            .into_iter()
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_owned)
            .collect(),
    )
}

/// Scalars of a TOML array; `None` for nested or non-string/integer items.
fn toml_array(value: &str) -> Option<Vec<ExtraValue>> {
    let parsed: toml::Table = toml::from_str(&format!("v = {value}")).ok()?;
    let toml::Value::Array(items) = parsed.get("v")? else {
        return None;
    };
    items
        .iter()
        .map(|item| match item {
            toml::Value::String(s) => Some(ExtraValue::Text(quote(s))),
            toml::Value::Integer(n) => Some(ExtraValue::Integer(*n)),
            _ => None,
        })
        .collect()
}

// ============================================================================
// Emission
// ============================================================================

/// Quote a string, keeping it as is when it already carries matching quotes.
pub fn quote(s: &str) -> String {
    let s = s.trim();
    if strip_quotes(s).len() + 2 == s.len() {
        return s.to_owned();
    }
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

fn render_toml(key: &str, value: &ExtraValue) -> Vec<String> {
    match value {
        ExtraValue::List(items) if items.is_empty() => vec![format!("{key} = []")],
        ExtraValue::List(items) => {
            let mut lines = vec![format!("{key} = [")];
            lines.extend(items.iter().map(|item| format!("  {},", toml_inline(item))));
            lines.push("]".to_owned());
            lines
        }
        ExtraValue::Verbatim { value, .. } => {
            let mut lines: Vec<String> = value.split('\n').map(str::to_owned).collect();
            lines[0] = format!("{key} = {}", lines[0]);
            lines
        }
        other => vec![format!("{key} = {}", toml_inline(other))],
    }
}

fn toml_inline(value: &ExtraValue) -> String {
    match value {
        ExtraValue::Text(s) => quote(s),
        ExtraValue::Integer(n) => n.to_string(),
        ExtraValue::Link { href, label } => {
            format!("{{ href = {}, label = {} }}", quote(href), quote(label))
        }
        ExtraValue::Footnote { id, text } => {
            format!("{{ id = {}, text = {} }}", quote(id), quote(text))
        }
        ExtraValue::List(items) => {
            let items: Vec<String> = items.iter().map(toml_inline).collect();
            format!("[{}]", items.join(", "))
        }
        ExtraValue::Verbatim { value, .. } => value.clone(),
    }
}

fn render_yaml(key: &str, value: &ExtraValue, indent: usize) -> Vec<String> {
    let pad = " ".repeat(indent);
    let item_pad = " ".repeat(indent + 2);

    match value {
        ExtraValue::Text(s) => vec![format!("{pad}{key}: {}", quote(s))],
        ExtraValue::Integer(n) => vec![format!("{pad}{key}: {n}")],
        ExtraValue::List(items) if items.is_empty() => vec![format!("{pad}{key}: []")],
        ExtraValue::List(items) => {
            let mut lines = vec![format!("{pad}{key}:")];
            for item in items {
                lines.extend(yaml_item(item, &item_pad));
            }
            lines
        }
        ExtraValue::Link { href, label } => vec![
            format!("{pad}{key}:"),
            format!("{item_pad}href: {}", quote(href)),
            format!("{item_pad}label: {}", quote(label)),
        ],
        ExtraValue::Footnote { id, text } => vec![
            format!("{pad}{key}:"),
            format!("{item_pad}id: {}", quote(id)),
            format!("{item_pad}text: {}", quote(text)),
        ],
        ExtraValue::Verbatim { value, children } => {
            let mut lines = vec![format!("{pad}{}", Dialect::Yaml.assignment(key, value))];
            lines.extend(children.iter().map(|child| {
                if child.trim().is_empty() {
                    child.clone()
                } else {
                    format!("{pad}{child}")
                }
            }));
            lines
        }
    }
}

fn yaml_item(item: &ExtraValue, pad: &str) -> Vec<String> {
    match item {
        ExtraValue::Link { href, label } => vec![
            format!("{pad}- href: {}", quote(href)),
            format!("{pad}  label: {}", quote(label)),
        ],
        ExtraValue::Footnote { id, text } => vec![
            format!("{pad}- id: {}", quote(id)),
            format!("{pad}  text: {}", quote(text)),
        ],
        ExtraValue::Integer(n) => vec![format!("{pad}- {n}")],
        ExtraValue::Text(s) => vec![format!("{pad}- {}", quote(s))],
        other => vec![format!("{pad}- {}", toml_inline(other))],
    }
}

// ============================================================================
// Merging into `extra`
// ============================================================================

fn merge_toml_extra(block: &mut MetadataBlock, moved: &[(String, ExtraValue)]) {
    if let Some(table) = block.table_mut(EXTRA) {
        upsert(&mut table.entries, moved, |key, value| {
            Field::from_lines(key, "", render_toml(key, value))
        });
        return;
    }

    trim_trailing_blanks(&mut block.entries);
    if !block.entries.is_empty() {
        block.entries.push(Entry::Line(String::new()));
    }
    let mut entries = Vec::new();
    upsert(&mut entries, moved, |key, value| {
        Field::from_lines(key, "", render_toml(key, value))
    });
    block.entries.push(Entry::Table(Table {
        name: EXTRA.to_owned(),
        header: format!("[{EXTRA}]"),
        entries,
    }));
}

/// Drop blank lines at the end, including those closing the last table.
fn trim_trailing_blanks(entries: &mut Vec<Entry>) {
    while entries.last().is_some_and(Entry::is_blank) {
        entries.pop();
    }
    if let Some(Entry::Table(table)) = entries.last_mut() {
        trim_trailing_blanks(&mut table.entries);
    }
}

fn merge_yaml_extra(block: &mut MetadataBlock, moved: &[(String, ExtraValue)]) {
    match block.position(EXTRA) {
        Some(index) => {
            let Some(extra) = block.field(index) else {
                return;
            };
            let children = extra.children();
            let indent = detect_indent(children);
            let mut entries = parse_yaml(children, indent);
            upsert(&mut entries, moved, |key, value| {
                Field::from_lines(key, "", render_yaml(key, value, indent))
            });

            let mut lines = vec![format!("{EXTRA}:")];
            let rendered = render_entries(&entries);
            if !rendered.is_empty() {
                lines.extend(rendered.split('\n').map(str::to_owned));
            }
            block.entries[index] = Entry::Field(Field::from_lines(EXTRA, "", lines));
        }
        None => {
            let mut lines = vec![format!("{EXTRA}:")];
            for (key, value) in moved {
                lines.extend(render_yaml(key, value, super::block::YAML_INDENT));
            }
            block.insert_after_fields(Entry::Field(Field::from_lines(EXTRA, "", lines)));
        }
    }
}

/// Replace fields that already exist, append the rest after the last
/// non-blank entry.
fn upsert(
    entries: &mut Vec<Entry>,
    moved: &[(String, ExtraValue)],
    render: impl Fn(&str, &ExtraValue) -> Field,
) {
    let mut insert_at = append_position(entries);
    for (key, value) in moved {
        let field = Entry::Field(render(key, value));
        match find_field(entries, key) {
            Some(index) => entries[index] = field,
            None => {
                entries.insert(insert_at, field);
                insert_at += 1;
            }
        }
    }
}
