//! Source location tracking for the Une transpiler
//!
//! This module provides types for tracking positions and spans in source text
//! during lexing and command parsing. Accurate location tracking is essential
//! for the diagnostics report, which renders the offending line with a caret.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in source text with line, column, and byte offset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    /// Byte offset from start of input (0-based)
    pub offset: u32,
    /// Line number (1-based)
    pub line: u32,
    /// Column number (1-based)
    pub column: u32,
}

impl Position {
    /// Create a new position
    pub fn new(offset: u32, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// Create the starting position (offset 0, line 1, column 1)
    pub fn start() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    /// Advance position by one character (tabs go through [`Position::advance_tab`])
    pub fn advance(self, ch: char) -> Self {
        match ch {
            '\n' => Self {
                offset: self.offset + 1,
                line: self.line + 1,
                column: 1,
            },
            _ => Self {
                offset: self.offset + ch.len_utf8() as u32,
                line: self.line,
                column: self.column + 1,
            },
        }
    }

    /// Advance position over a tab character to the next tab stop
    pub fn advance_tab(self, width: u32) -> Self {
        let width = width.max(1);
        Self {
            offset: self.offset + 1,
            line: self.line,
            column: self.column + width - ((self.column - 1) % width),
        }
    }

    /// Advance position by n bytes (useful for known ASCII sequences)
    pub fn advance_bytes(self, n: u32) -> Self {
        Self {
            offset: self.offset + n,
            line: self.line,
            column: self.column + n,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A span of source text from start to end position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Start position (inclusive)
    pub start: Position,
    /// End position (exclusive)
    pub end: Position,
}

impl Span {
    /// Create a new span
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(
            start.offset <= end.offset,
            "Span start must not be after end"
        );
        Self { start, end }
    }

    /// Create a single-character span
    pub fn single(pos: Position) -> Self {
        let end = Position {
            offset: pos.offset + 1,
            line: pos.line,
            column: pos.column + 1,
        };
        Self { start: pos, end }
    }

    /// Merge two spans into one covering both
    pub fn merge(self, other: Self) -> Self {
        let start = if self.start.offset < other.start.offset {
            self.start
        } else {
            other.start
        };

        let end = if self.end.offset > other.end.offset {
            self.end
        } else {
            other.end
        };

        Self { start, end }
    }

    /// Get the byte length of this span
    pub fn len(&self) -> usize {
        (self.end.offset - self.start.offset) as usize
    }

    /// Check if this span is empty
    pub fn is_empty(&self) -> bool {
        self.start.offset == self.end.offset
    }

    /// Check if this span contains a position
    pub fn contains(&self, pos: Position) -> bool {
        pos.offset >= self.start.offset && pos.offset < self.end.offset
    }

    /// Get the source text for this span from the input
    pub fn slice<'a>(&self, input: &'a str) -> &'a str {
        &input[self.start.offset as usize..self.end.offset as usize]
    }

    /// Create an unknown/dummy span (useful for generated tokens)
    pub fn dummy() -> Self {
        Self {
            start: Position::start(),
            end: Position::start(),
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(
                f,
                "{}:{}-{}",
                self.start.line, self.start.column, self.end.column
            )
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// A source map that tracks line starts for efficient position lookup
#[derive(Debug, Clone)]
pub struct SourceMap {
    /// The original source text
    pub source: String,
    /// Byte offsets of line starts
    line_starts: Vec<usize>,
}

impl SourceMap {
    /// Create a new source map from source text
    pub fn new(source: String) -> Self {
        let mut line_starts = vec![0];
        for (offset, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(offset + 1);
            }
        }
        Self {
            source,
            line_starts,
        }
    }

    /// Get the line and column for a byte offset
    pub fn position_at(&self, offset: u32) -> Position {
        let offset = offset as usize;
        let line = self
            .line_starts
            .binary_search(&offset)
            .unwrap_or_else(|i| i - 1);

        let line_start = self.line_starts[line];
        let end = offset.min(self.source.len());
        let column = self.source[line_start..end].chars().count();

        Position::new(offset as u32, (line + 1) as u32, (column + 1) as u32)
    }

    /// Number of lines in the source
    pub fn line_count(&self) -> u32 {
        self.line_starts.len() as u32
    }

    /// Get a line of text by line number (1-based)
    pub fn get_line(&self, line_num: u32) -> Option<&str> {
        if line_num == 0 {
            return None;
        }

        let line_idx = (line_num - 1) as usize;
        if line_idx >= self.line_starts.len() {
            return None;
        }

        let start = self.line_starts[line_idx];
        let end = if line_idx + 1 < self.line_starts.len() {
            self.line_starts[line_idx + 1] - 1
        } else {
            self.source.len()
        };

        Some(self.source[start..end].trim_end_matches('\r'))
    }

    /// Format a diagnostic message with source context and a caret
    pub fn format_error(&self, message: &str, line: u32, column: u32) -> String {
        self.format_error_with_context(message, line, column, 0)
    }

    /// [`SourceMap::format_error`] with `context` extra source lines
    /// shown above the offending one
    pub fn format_error_with_context(
        &self,
        message: &str,
        line: u32,
        column: u32,
        context: u32,
    ) -> String {
        let mut result = String::new();

        result.push_str(&format!("{} at {}:{}\n", message, line, column));

        if self.get_line(line).is_some() {
            let width = format!("{}", line).len();
            let padding = " ".repeat(width);

            result.push_str(&format!("   {} |\n", padding));
            let first = line.saturating_sub(context).max(1);
            for shown in first..=line {
                if let Some(text) = self.get_line(shown) {
                    result.push_str(&format!("   {:>width$} | {}\n", shown, text));
                }
            }

            let mut underline = String::new();
            underline.push_str(&format!("   {} | ", padding));
            for _ in 1..column {
                underline.push(' ');
            }
            underline.push('^');

            result.push_str(&underline);
            result.push('\n');
        }

        result
    }
}
