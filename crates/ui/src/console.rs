//! On-device log: the last few lines of text, oldest first.
//!
//! Every user-visible error ends up here as one short line. Lines longer
//! than the display are cut, never wrapped.

use core::fmt::{self, Write};

use heapless::{Deque, String};

/// Rows of text on a 128x64 panel with `FONT_5X8`, minus the stats row.
pub const OLED_ROWS: usize = 7;
/// Columns of text on a 128x64 panel with `FONT_5X8`.
pub const OLED_COLS: usize = 25;

/// Console sized for the 128x64 OLED.
pub type OledConsole = Console<OLED_ROWS, OLED_COLS>;

/// Ring of `ROWS` lines, each at most `COLS` bytes.
#[derive(Debug, Default)]
pub struct Console<const ROWS: usize, const COLS: usize> {
    lines: Deque<String<COLS>, ROWS>,
}

/// `fmt::Write` adapter that silently stops at capacity.
struct Truncate<'a, const COLS: usize>(&'a mut String<COLS>);

impl<const COLS: usize> Write for Truncate<'_, COLS> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if c == '\n' || self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}

impl<const ROWS: usize, const COLS: usize> Console<ROWS, COLS> {
    /// Empty console.
    pub const fn new() -> Self {
        Self {
            lines: Deque::new(),
        }
    }

    /// Append one line, scrolling the oldest out when full.
    ///
    /// ```
    /// let mut console = ui::OledConsole::new();
    /// console.log(format_args!("loaded {}", "reverb"));
    /// assert_eq!(console.lines().last(), Some("loaded reverb"));
    /// ```
    pub fn log(&mut self, args: fmt::Arguments<'_>) {
        let mut line = String::new();
        // Truncate never fails; an Err can only come from a Display impl.
        let _ = Truncate(&mut line).write_fmt(args);
        if self.lines.is_full() {
            self.lines.pop_front();
        }
        // Room was made above.
        self.lines.push_back(line).ok();
    }

    /// Lines from oldest to newest.
    pub fn lines(&self) -> impl DoubleEndedIterator<Item = &str> + '_ {
        self.lines.iter().map(String::as_str)
    }

    /// Number of lines held.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// `true` before the first line.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Whether any held line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines().any(|line| line.contains(needle))
    }

    /// Drop all lines.
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
