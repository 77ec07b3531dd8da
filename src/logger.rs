//! Terminal output for sync runs.
//!
//! Every line starts with a colored `[module]` tag. While notes or media are
//! being processed, one progress line per phase sits at the bottom of the
//! terminal and log lines are printed above it.
//!
//! ```ignore
//! log!("sync"; "converting {} notes", count);
//!
//! let progress = ProgressBars::new(&[("notes", 120), ("media", 8)]);
//! progress.inc_by_name("notes");
//! progress.finish();
//! ```

use colored::{ColoredString, Colorize};
use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType, size},
};
use std::{
    io::{StdoutLock, Write, stdout},
    sync::{
        Mutex, OnceLock,
        atomic::{AtomicUsize, Ordering},
    },
};

static COLUMNS: OnceLock<usize> = OnceLock::new();

/// Progress lines currently reserved below the log output.
static RESERVED_ROWS: AtomicUsize = AtomicUsize::new(0);

const FALLBACK_COLUMNS: usize = 120;

/// Bounds for the `[████░░░░]` part of a progress line.
const BAR_CELLS: (usize, usize) = (10, 40);

fn columns() -> usize {
    *COLUMNS.get_or_init(|| size().map_or(FALLBACK_COLUMNS, |(w, _)| w as usize))
}

/// Print a message tagged with `[module]`.
///
/// ```ignore
/// log!("media"; "{} folders", count);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// A colored `[module]` tag and the columns it takes up, trailing space
/// included.
struct Tag {
    text: ColoredString,
    width: usize,
}

impl Tag {
    fn new(module: &str) -> Self {
        let text = format!("[{module}]");
        let text = match module.to_ascii_lowercase().as_str() {
            "sync" | "notes" => text.bright_blue(),
            "media" => text.bright_magenta(),
            "section" => text.bright_cyan(),
            "done" => text.bright_green(),
            "error" => text.bright_red(),
            _ => text.bright_yellow(),
        };
        Self {
            text: text.bold(),
            width: module.len() + 3,
        }
    }
}

/// Moves the cursor up `rows` lines, runs `f`, then moves back down.
#[allow(clippy::cast_possible_truncation)]
fn at_row_above(out: &mut StdoutLock<'_>, rows: usize, f: impl FnOnce(&mut StdoutLock<'_>)) {
    let rows = rows as u16;
    execute!(out, cursor::MoveUp(rows), Clear(ClearType::CurrentLine)).ok();
    f(out);
    execute!(out, cursor::MoveDown(rows)).ok();
    write!(out, "\r").ok();
}

/// Progress lines for the phases of a run, addressed by phase name.
pub struct ProgressBars {
    phases: Vec<Phase>,
    screen: Mutex<()>,
}

struct Phase {
    name: &'static str,
    tag: Tag,
    total: usize,
    done: AtomicUsize,
}

impl ProgressBars {
    /// Reserve one terminal line per `(name, total)` pair.
    pub fn new(phases: &[(&'static str, usize)]) -> Self {
        let mut out = stdout().lock();
        write!(out, "{}", "\n".repeat(phases.len())).ok();
        out.flush().ok();
        RESERVED_ROWS.store(phases.len(), Ordering::SeqCst);

        Self {
            phases: phases
                .iter()
                .map(|&(name, total)| Phase {
                    name,
                    tag: Tag::new(name),
                    total,
                    done: AtomicUsize::new(0),
                })
                .collect(),
            screen: Mutex::new(()),
        }
    }

    /// Like [`ProgressBars::new`], minus empty phases. A run with at most one
    /// item gets no bars at all.
    pub fn new_filtered(phases: &[(&'static str, usize)]) -> Option<Self> {
        let phases: Vec<_> = phases.iter().copied().filter(|&(_, n)| n > 0).collect();
        (phases.iter().map(|&(_, n)| n).sum::<usize>() > 1).then(|| Self::new(&phases))
    }

    /// Advance the named phase by one. Unknown names do nothing.
    pub fn inc_by_name(&self, name: &str) {
        let Some((row, phase)) = self.phases.iter().enumerate().find(|(_, p)| p.name == name)
        else {
            return;
        };
        let done = phase.done.fetch_add(1, Ordering::Relaxed) + 1;

        let _screen = self.screen.lock().ok();
        let count = format!("{done}/{}", phase.total);
        // "[tag] [" + "] " + count
        let room = columns().saturating_sub(phase.tag.width + 3 + count.len());
        let bar = render_bar(done, phase.total, room.clamp(BAR_CELLS.0, BAR_CELLS.1));

        let mut out = stdout().lock();
        at_row_above(&mut out, self.phases.len() - row, |out| {
            write!(out, "{} [{bar}] {count}", phase.tag.text).ok();
        });
        out.flush().ok();
    }

    /// Wipe the progress lines and leave the cursor where they began.
    #[allow(clippy::cast_possible_truncation)]
    pub fn finish(&self) {
        RESERVED_ROWS.store(0, Ordering::SeqCst);
        let _screen = self.screen.lock().ok();

        let rows = self.phases.len() as u16;
        let mut out = stdout().lock();
        execute!(out, cursor::MoveUp(rows), Clear(ClearType::FromCursorDown)).ok();
        out.flush().ok();
    }
}

impl Drop for ProgressBars {
    fn drop(&mut self) {
        self.finish();
    }
}

/// `cells` wide, filled in proportion to `done / total`.
fn render_bar(done: usize, total: usize, cells: usize) -> String {
    let filled = if total == 0 {
        0
    } else {
        (done.min(total) * cells) / total
    };
    format!("{}{}", "█".repeat(filled), "░".repeat(cells - filled))
}

/// Print one tagged line above any progress bars.
///
/// Single-line messages are cut to the terminal width.
#[allow(clippy::cast_possible_truncation)]
pub fn log(module: &str, message: &str) {
    let tag = Tag::new(module);
    let message = if message.contains('\n') {
        message
    } else {
        clip(message, columns().saturating_sub(tag.width))
    };

    let mut out = stdout().lock();
    let rows = RESERVED_ROWS.load(Ordering::SeqCst);
    if rows == 0 {
        execute!(out, Clear(ClearType::UntilNewLine)).ok();
        writeln!(out, "{} {message}", tag.text).ok();
    } else {
        execute!(out, cursor::MoveUp(rows as u16), Clear(ClearType::FromCursorDown)).ok();
        writeln!(out, "{} {message}{}", tag.text, "\n".repeat(rows)).ok();
    }
    out.flush().ok();
}

/// The longest prefix of `s` within `max` bytes that ends on a char boundary.
fn clip(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let end = (0..=max).rev().find(|&i| s.is_char_boundary(i)).unwrap_or(0);
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_width_counts_brackets_and_space() {
        assert_eq!(Tag::new("sync").width, 7);
        assert_eq!(Tag::new("").width, 3);
    }

    #[test]
    fn test_tag_keeps_module_case() {
        colored::control::set_override(false);
        assert_eq!(Tag::new("sync").text.to_string(), "[sync]");
        assert_eq!(Tag::new("Media").text.to_string(), "[Media]");
    }

    #[test]
    fn test_render_bar() {
        assert_eq!(render_bar(0, 4, 4), "░░░░");
        assert_eq!(render_bar(2, 4, 4), "██░░");
        assert_eq!(render_bar(4, 4, 4), "████");
        assert_eq!(render_bar(9, 4, 4), "████");
        assert_eq!(render_bar(1, 0, 3), "░░░");
    }

    #[test]
    fn test_clip_ascii() {
        assert_eq!(clip("notes", 10), "notes");
        assert_eq!(clip("notes", 5), "notes");
        assert_eq!(clip("notes synced", 5), "notes");
        assert_eq!(clip("notes", 0), "");
    }

    #[test]
    fn test_clip_stays_on_char_boundary() {
        // "노트" is two 3-byte chars
        assert_eq!(clip("노트", 4), "노");
        assert_eq!(clip("노트", 2), "");
        assert_eq!(clip("a노b", 4), "a노");
        assert_eq!(clip("a노b", 3), "a");
    }

    #[test]
    fn test_new_filtered_skips_trivial_runs() {
        assert!(ProgressBars::new_filtered(&[("notes", 1), ("media", 0)]).is_none());
        assert!(ProgressBars::new_filtered(&[("notes", 0)]).is_none());
    }
}
