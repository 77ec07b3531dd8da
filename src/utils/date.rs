//! Flexible front matter date parsing.
//!
//! Note authors write dates as `2024`, `2024.3`, `2024/3/5`, `2024-03-05`...
//! [`FlexDate::parse`] accepts all of them and [`FlexDate::to_ymd`] emits the
//! canonical `YYYY-MM-DD` form the site renderer expects.

/// Calendar date as written in a note, checked syntactically only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlexDate {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl FlexDate {
    pub const fn from_ymd(year: u16, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }

    /// Parse a flexible date expression.
    ///
    /// Grammar: 4-digit year, then optionally separators (`.`, `-`, `/`,
    /// whitespace) and a 1–2 digit month, then optionally separators and a
    /// 1–2 digit day. Missing parts default to `1`. Surrounding quotes and
    /// whitespace are ignored.
    ///
    /// Returns `None` for anything else, or when the month is outside
    /// `1..=12` or the day outside `1..=31`. There is no per-month check:
    /// `2023-02-31` is accepted as written.
    pub fn parse(s: &str) -> Option<Self> {
        let s = strip_quotes(s.trim()).trim();
        let bytes = s.as_bytes();

        let year = parse_u16(bytes.get(0..4)?)?;
        let mut pos = 4;

        let (month, day) = if pos == bytes.len() {
            (1, 1)
        } else {
            pos = skip_separators(bytes, pos);
            let (month, next) = take_digits(bytes, pos)?;
            pos = skip_whitespace(bytes, next);
            if pos == bytes.len() {
                (month, 1)
            } else {
                pos = skip_separators(bytes, next);
                let (day, next) = take_digits(bytes, pos)?;
                pos = skip_whitespace(bytes, next);
                (month, day)
            }
        };

        if pos != bytes.len() {
            return None;
        }

        let date = Self::from_ymd(year, month, day);
        date.is_valid().then_some(date)
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        (1..=12).contains(&self.month) && (1..=31).contains(&self.day)
    }

    /// Zero-padded `YYYY-MM-DD`.
    pub fn to_ymd(self) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Strip one pair of matching surrounding quotes.
pub fn strip_quotes(s: &str) -> &str {
    let bytes = s.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(b'"'), Some(b'"')) | (Some(b'\''), Some(b'\'')) if s.len() >= 2 => &s[1..s.len() - 1],
        _ => s,
    }
}

#[inline]
const fn is_separator(b: u8) -> bool {
    matches!(b, b'.' | b'-' | b'/') || b.is_ascii_whitespace()
}

fn skip_separators(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && is_separator(bytes[pos]) {
        pos += 1;
    }
    pos
}

fn skip_whitespace(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
        pos += 1;
    }
    pos
}

/// Take one or two ASCII digits starting at `pos`.
fn take_digits(bytes: &[u8], pos: usize) -> Option<(u8, usize)> {
    let mut value = 0u8;
    let mut end = pos;
    while end < bytes.len() && end - pos < 2 && bytes[end].is_ascii_digit() {
        value = value * 10 + (bytes[end] - b'0');
        end += 1;
    }
    (end > pos).then_some((value, end))
}

/// Parse 4-digit ASCII number
#[inline]
fn parse_u16(bytes: &[u8]) -> Option<u16> {
    if bytes.len() != 4 {
        return None;
    }
    let mut result = 0u16;
    for &b in bytes {
        let d = b.wrapping_sub(b'0');
        if d > 9 {
            return None;
        }
        result = result * 10 + d as u16;
    }
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(s: &str) -> Option<String> {
        FlexDate::parse(s).map(FlexDate::to_ymd)
    }

    #[test]
    fn test_year_only() {
        assert_eq!(ymd("2024").as_deref(), Some("2024-01-01"));
    }

    #[test]
    fn test_year_and_month() {
        assert_eq!(ymd("2024.3").as_deref(), Some("2024-03-01"));
        assert_eq!(ymd("2024-11").as_deref(), Some("2024-11-01"));
    }

    #[test]
    fn test_full_dates_with_each_separator() {
        assert_eq!(ymd("2024/3/5").as_deref(), Some("2024-03-05"));
        assert_eq!(ymd("2024-03-05").as_deref(), Some("2024-03-05"));
        assert_eq!(ymd("2024.03.05").as_deref(), Some("2024-03-05"));
        assert_eq!(ymd("2024 3 5").as_deref(), Some("2024-03-05"));
        assert_eq!(ymd("20240305").as_deref(), Some("2024-03-05"));
    }

    #[test]
    fn test_quotes_and_whitespace_ignored() {
        assert_eq!(ymd("  \"2024.3.5\" ").as_deref(), Some("2024-03-05"));
        assert_eq!(ymd("'2021'").as_deref(), Some("2021-01-01"));
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert_eq!(ymd("2024-13-01"), None);
        assert_eq!(ymd("2024-00-01"), None);
        assert_eq!(ymd("2024-01-32"), None);
        assert_eq!(ymd("2024-01-00"), None);
    }

    #[test]
    fn test_no_calendar_check() {
        assert_eq!(ymd("2023-02-31").as_deref(), Some("2023-02-31"));
    }

    #[test]
    fn test_garbage_rejected() {
        assert_eq!(ymd(""), None);
        assert_eq!(ymd("24"), None);
        assert_eq!(ymd("soon"), None);
        assert_eq!(ymd("2024-"), None);
        assert_eq!(ymd("2024-03-05T10:00:00Z"), None);
        assert_eq!(ymd("2024년"), None);
    }

    #[test]
    fn test_strip_quotes() {
        assert_eq!(strip_quotes("\"a\""), "a");
        assert_eq!(strip_quotes("'a'"), "a");
        assert_eq!(strip_quotes("\"a'"), "\"a'");
        assert_eq!(strip_quotes("\""), "\"");
    }
}
