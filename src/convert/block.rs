//! Line-preserving model of a front matter block.
//!
//! The block is kept as an ordered list of entries that remember their source
//! lines, so an untouched block renders back byte-for-byte. Only the shapes
//! notes actually use are recognized:
//!
//! ```text
//! TOML                          YAML
//! ────────────────────────      ────────────────────────
//! key = value        Field      key: value        Field
//! key = [            Field      key:              Field
//!   "a",                          - a             (children)
//! ]                               - b
//! [extra]            Table      # comment         Line
//! x = 1              (entries)
//! # comment          Line
//! ```
//!
//! Anything else is carried as a verbatim [`Entry::Line`].

use super::frontmatter::Dialect;
use regex::Regex;
use std::sync::LazyLock;

/// Indentation used for newly created YAML children.
pub const YAML_INDENT: usize = 2;

/// A `key = value` / `key: value` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub key: String,
    /// Value text after the delimiter. Multi-line TOML values keep their
    /// continuation lines; YAML children are not part of it.
    pub value: String,
    /// Source lines, first line included.
    pub lines: Vec<String>,
}

impl Field {
    /// Single-line field.
    pub fn scalar(dialect: Dialect, key: &str, value: &str) -> Self {
        Self {
            key: key.to_owned(),
            value: value.to_owned(),
            lines: vec![dialect.assignment(key, value)],
        }
    }

    /// Field built from already rendered lines.
    pub fn from_lines(key: &str, value: &str, lines: Vec<String>) -> Self {
        Self {
            key: key.to_owned(),
            value: value.to_owned(),
            lines,
        }
    }

    /// Indented YAML lines below the key line.
    #[inline]
    pub fn children(&self) -> &[String] {
        self.lines.get(1..).unwrap_or_default()
    }
}

/// A TOML `[name]` table and its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub name: String,
    pub header: String,
    pub entries: Vec<Entry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Field(Field),
    Table(Table),
    /// Blank lines, comments and anything unrecognized.
    Line(String),
}

impl Entry {
    #[inline]
    pub fn as_field(&self) -> Option<&Field> {
        match self {
            Self::Field(field) => Some(field),
            _ => None,
        }
    }

    #[inline]
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Line(line) if line.trim().is_empty())
    }

    fn push_lines<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Field(field) => out.extend(field.lines.iter().map(String::as_str)),
            Self::Table(table) => {
                out.push(&table.header);
                for entry in &table.entries {
                    entry.push_lines(out);
                }
            }
            Self::Line(line) => out.push(line),
        }
    }
}

/// Render entries back to text, one source line per output line.
pub fn render_entries(entries: &[Entry]) -> String {
    let mut lines = Vec::new();
    for entry in entries {
        entry.push_lines(&mut lines);
    }
    lines.join("\n")
}

/// Index of the first field named `key`.
pub fn find_field(entries: &[Entry], key: &str) -> Option<usize> {
    entries
        .iter()
        .position(|entry| entry.as_field().is_some_and(|field| field.key == key))
}

/// Index after the last non-blank entry, where new fields are appended.
pub fn append_position(entries: &[Entry]) -> usize {
    entries
        .iter()
        .rposition(|entry| !entry.is_blank())
        .map_or(0, |index| index + 1)
}

/// Parsed front matter block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataBlock {
    dialect: Dialect,
    pub entries: Vec<Entry>,
}

impl MetadataBlock {
    pub fn parse(dialect: Dialect, text: &str) -> Self {
        let lines: Vec<&str> = if text.is_empty() {
            Vec::new()
        } else {
            text.split('\n').collect()
        };
        let entries = match dialect {
            Dialect::Toml => parse_toml(&lines),
            Dialect::Yaml => parse_yaml(lines.as_slice(), 0),
        };
        Self { dialect, entries }
    }

    #[inline]
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn render(&self) -> String {
        render_entries(&self.entries)
    }

    /// Index of the top-level field named `key`.
    #[inline]
    pub fn position(&self, key: &str) -> Option<usize> {
        find_field(&self.entries, key)
    }

    #[inline]
    pub fn field(&self, index: usize) -> Option<&Field> {
        self.entries.get(index).and_then(Entry::as_field)
    }

    /// Insert an entry right after the last top-level field.
    ///
    /// TOML tables stay after it, so the entry remains top-level.
    pub fn insert_after_fields(&mut self, entry: Entry) {
        let index = self
            .entries
            .iter()
            .rposition(|entry| matches!(entry, Entry::Field(_)))
            .map_or_else(|| self.first_table(), |index| index + 1);
        self.entries.insert(index, entry);
    }

    /// Top-level TOML table named `name`.
    pub fn table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.entries.iter_mut().find_map(|entry| match entry {
            Entry::Table(table) if table.name == name => Some(table),
            _ => None,
        })
    }

    fn first_table(&self) -> usize {
        self.entries
            .iter()
            .position(|entry| matches!(entry, Entry::Table(_)))
            .unwrap_or(self.entries.len())
    }
}

// ============================================================================
// TOML
// ============================================================================

static TOML_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([A-Za-z0-9_\-]+)\s*=\s*(.*?)\s*$").unwrap());

static TOML_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*\[(\[?)\s*([A-Za-z0-9_\-."' ]+?)\s*\]\]?\s*(?:#.*)?$"#).unwrap()
});

fn parse_toml(lines: &[&str]) -> Vec<Entry> {
    let mut top = Vec::new();
    let mut current: Option<Table> = None;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        if let Some(caps) = TOML_HEADER.captures(line) {
            if let Some(table) = current.take() {
                top.push(Entry::Table(table));
            }
            // `[[name]]` arrays of tables never match a plain table lookup
            let name = if caps[1].is_empty() {
                caps[2].to_owned()
            } else {
                format!("[{}]", &caps[2])
            };
            current = Some(Table {
                name,
                header: line.to_owned(),
                entries: Vec::new(),
            });
            i += 1;
            continue;
        }

        let (entry, next) = parse_toml_entry(lines, i);
        match current.as_mut() {
            Some(table) => table.entries.push(entry),
            None => top.push(entry),
        }
        i = next;
    }

    if let Some(table) = current {
        top.push(Entry::Table(table));
    }
    top
}

fn parse_toml_entry(lines: &[&str], start: usize) -> (Entry, usize) {
    let line = lines[start];
    let Some(caps) = TOML_KEY.captures(line) else {
        return (Entry::Line(line.to_owned()), start + 1);
    };
    let key = &caps[1];
    let first = caps.get(2).map_or("", |m| m.as_str());

    let mut scanner = ValueScanner::default();
    scanner.feed(first);
    let mut end = start + 1;
    while !scanner.is_complete() && end < lines.len() {
        scanner.feed(lines[end]);
        end += 1;
    }
    if !scanner.is_complete() {
        // unterminated value: keep the first line on its own
        end = start + 1;
    }

    let value = if end == start + 1 {
        first.to_owned()
    } else {
        let mut value = first.to_owned();
        for continuation in &lines[start + 1..end] {
            value.push('\n');
            value.push_str(continuation);
        }
        value.trim_end().to_owned()
    };
    let raw = lines[start..end].iter().map(|l| (*l).to_owned()).collect();

    (Entry::Field(Field::from_lines(key, &value, raw)), end)
}

/// A single-line TOML value without its trailing `# comment`.
///
/// Multi-line values come back unchanged.
pub fn strip_toml_comment(value: &str) -> &str {
    if value.contains('\n') {
        return value;
    }
    let mut scanner = ValueScanner::default();
    match scanner.feed(value) {
        // `#` inside brackets belongs to an unquoted `[[note#heading]]`
        Some(at) if scanner.depth == 0 => value[..at].trim_end(),
        _ => value,
    }
}

/// Tracks whether a TOML value continues on the next line.
#[derive(Debug, Default)]
struct ValueScanner {
    depth: usize,
    open: Option<&'static [u8]>,
}

impl ValueScanner {
    /// Consume one line, returning where a comment starts on it.
    fn feed(&mut self, line: &str) -> Option<usize> {
        let bytes = line.as_bytes();
        let mut i = 0;

        while i < bytes.len() {
            if let Some(delim) = self.open {
                if bytes[i..].starts_with(delim) {
                    self.open = None;
                    i += delim.len();
                } else if bytes[i] == b'\\' && delim == b"\"\"\"" {
                    i += 2;
                } else {
                    i += 1;
                }
                continue;
            }

            match bytes[i] {
                b'#' => return Some(i),
                b'[' | b'{' => self.depth += 1,
                b']' | b'}' => self.depth = self.depth.saturating_sub(1),
                quote @ (b'"' | b'\'') => {
                    let triple: &'static [u8] = if quote == b'"' { b"\"\"\"" } else { b"'''" };
                    if bytes[i..].starts_with(triple) {
                        self.open = Some(triple);
                        i += triple.len();
                        continue;
                    }
                    i += 1;
                    while i < bytes.len() && bytes[i] != quote {
                        if quote == b'"' && bytes[i] == b'\\' {
                            i += 1;
                        }
                        i += 1;
                    }
                }
                _ => {}
            }
            i += 1;
        }
        None
    }

    #[inline]
    fn is_complete(&self) -> bool {
        self.depth == 0 && self.open.is_none()
    }
}

// ============================================================================
// YAML
// ============================================================================

static YAML_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z0-9_\-]+)\s*:(\s.*)?$").unwrap());

/// Parse YAML lines whose keys sit at exactly `indent` spaces.
pub fn parse_yaml<S: AsRef<str>>(lines: &[S], indent: usize) -> Vec<Entry> {
    let mut entries = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].as_ref();
        let Some((key, value)) = yaml_key(line, indent) else {
            entries.push(Entry::Line(line.to_owned()));
            i += 1;
            continue;
        };

        // children run until the first line that is neither blank nor nested;
        // trailing blank lines belong to whatever follows
        let mut end = i + 1;
        let mut scan = i + 1;
        while scan < lines.len() {
            let next = lines[scan].as_ref();
            if next.trim().is_empty() {
                scan += 1;
            } else if is_yaml_child(next, indent) {
                scan += 1;
                end = scan;
            } else {
                break;
            }
        }

        let raw = lines[i..end].iter().map(|l| l.as_ref().to_owned()).collect();
        entries.push(Entry::Field(Field::from_lines(key, value, raw)));
        i = end;
    }

    entries
}

fn yaml_key(line: &str, indent: usize) -> Option<(&str, &str)> {
    let bytes = line.as_bytes();
    if bytes.len() < indent || !bytes[..indent].iter().all(|b| *b == b' ') {
        return None;
    }
    let caps = YAML_KEY.captures(&line[indent..])?;
    let key = caps.get(1)?.as_str();
    let value = caps.get(2).map_or("", |m| m.as_str().trim());
    Some((key, value))
}

fn is_yaml_child(line: &str, indent: usize) -> bool {
    let rest = line.trim_start();
    let lead = line.len() - rest.len();
    lead > indent || (lead == indent && (rest == "-" || rest.starts_with("- ")))
}

/// Leading spaces of the first non-blank line, or [`YAML_INDENT`].
pub fn detect_indent(lines: &[String]) -> usize {
    lines
        .iter()
        .find(|line| !line.trim().is_empty())
        .map_or(YAML_INDENT, |line| line.len() - line.trim_start_matches(' ').len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_round_trip() {
        let text = "title = \"a\"\n# note\ntags = [\n  \"x\", # first\n  \"y\",\n]\n\n[extra]\nk = 1\n\n[taxonomies]\ncategories = [\"c\"]";
        let block = MetadataBlock::parse(Dialect::Toml, text);
        assert_eq!(block.render(), text);
    }

    #[test]
    fn test_toml_multiline_array_is_one_field() {
        let block = MetadataBlock::parse(Dialect::Toml, "tags = [\n  \"a]\",\n  \"b\"\n]\nnext = 1");
        let tags = block.field(0).unwrap();
        assert_eq!(tags.key, "tags");
        assert_eq!(tags.lines.len(), 4);
        assert_eq!(tags.value, "[\n  \"a]\",\n  \"b\"\n]");
        assert_eq!(block.field(1).unwrap().key, "next");
    }

    #[test]
    fn test_toml_multiline_string() {
        let block = MetadataBlock::parse(Dialect::Toml, "body = \"\"\"\nline [\n\"\"\"\nafter = 2");
        assert_eq!(block.field(0).unwrap().lines.len(), 3);
        assert_eq!(block.field(1).unwrap().key, "after");
    }

    #[test]
    fn test_toml_unterminated_array_stays_single_line() {
        let block = MetadataBlock::parse(Dialect::Toml, "tags = [\"a\"\nnext = 1");
        assert_eq!(block.field(0).unwrap().lines.len(), 1);
        assert_eq!(block.position("next"), Some(1));
    }

    #[test]
    fn test_strip_toml_comment() {
        assert_eq!(strip_toml_comment("\"lead\" # main role"), "\"lead\"");
        assert_eq!(strip_toml_comment("\"a # b\""), "\"a # b\"");
        assert_eq!(strip_toml_comment("'x#y' #c"), "'x#y'");
        assert_eq!(strip_toml_comment("3 # count"), "3");
        assert_eq!(strip_toml_comment("[[note#Part|P]]"), "[[note#Part|P]]");
        assert_eq!(strip_toml_comment("[\n  1, # one\n]"), "[\n  1, # one\n]");
    }

    #[test]
    fn test_toml_tables_hold_their_fields() {
        let mut block = MetadataBlock::parse(Dialect::Toml, "a = 1\n[extra]\nb = 2\n[[links]]\nc = 3");
        assert_eq!(block.position("b"), None);
        let extra = block.table_mut("extra").unwrap();
        assert_eq!(find_field(&extra.entries, "b"), Some(0));
        assert!(block.table_mut("links").is_none());
    }

    #[test]
    fn test_yaml_round_trip() {
        let text = "title: a\ntags:\n  - x\n  - y\n\n# comment\nextra:\n  k: 1\n  list:\n    - z";
        let block = MetadataBlock::parse(Dialect::Yaml, text);
        assert_eq!(block.render(), text);
    }

    #[test]
    fn test_yaml_children_and_blank_lines() {
        let block = MetadataBlock::parse(Dialect::Yaml, "tags:\n- a\n\n- b\n\ntitle: t");
        let tags = block.field(0).unwrap();
        assert_eq!(tags.children(), ["- a", "", "- b"]);
        assert!(block.entries[1].is_blank());
        assert_eq!(block.position("title"), Some(2));
    }

    #[test]
    fn test_yaml_url_like_line_is_not_a_key() {
        let block = MetadataBlock::parse(Dialect::Yaml, "https://example.com");
        assert!(matches!(block.entries[0], Entry::Line(_)));
    }

    #[test]
    fn test_yaml_nested_parse() {
        let children = vec!["  a: 1".to_string(), "  b:".to_string(), "    - x".to_string()];
        let indent = detect_indent(&children);
        assert_eq!(indent, 2);
        let entries = parse_yaml(children.as_slice(), indent);
        assert_eq!(find_field(&entries, "b"), Some(1));
        assert_eq!(render_entries(&entries), "  a: 1\n  b:\n    - x");
    }

    #[test]
    fn test_insert_after_fields_before_tables() {
        let mut block = MetadataBlock::parse(Dialect::Toml, "a = 1\n\n[extra]\nb = 2");
        block.insert_after_fields(Entry::Field(Field::scalar(Dialect::Toml, "date", "2024-01-01")));
        assert_eq!(block.render(), "a = 1\ndate = 2024-01-01\n\n[extra]\nb = 2");
    }

    #[test]
    fn test_insert_after_fields_only_tables() {
        let mut block = MetadataBlock::parse(Dialect::Toml, "[extra]\nb = 2");
        block.insert_after_fields(Entry::Field(Field::scalar(Dialect::Toml, "a", "1")));
        assert_eq!(block.render(), "a = 1\n[extra]\nb = 2");
    }

    #[test]
    fn test_append_position_skips_trailing_blanks() {
        let entries = parse_yaml(&["a: 1", "", ""][..], 0);
        assert_eq!(append_position(&entries), 1);
        assert_eq!(append_position(&[]), 0);
    }
}
