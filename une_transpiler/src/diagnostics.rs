//! Language-level problem reporting for the Une transpiler
//!
//! A [`Diagnostic`] is the unit of user-visible trouble: every detected
//! problem in a source file becomes exactly one Diagnostic and parsing
//! continues on a best-effort basis. Diagnostics are collected per
//! transpilation unit and never discarded; infrastructure failures use
//! `thiserror` enums instead (see the loader and emit modules).

use crate::utils::Position;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A problem found in Une source, tied to a line and column.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Line number (1-based)
    pub line: u32,
    /// Column number (1-based)
    pub column: u32,
    /// Human-readable message, ending with a period
    pub message: String,
}

impl Diagnostic {
    /// Create a diagnostic at an explicit line and column
    pub fn new(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }

    /// Create a diagnostic at a lexeme position
    pub fn at(message: impl Into<String>, position: Position) -> Self {
        Self::new(message, position.line, position.column)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}:{}", self.message, self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_position() {
        let d = Diagnostic::new("Missing THEN clause.", 4, 12);
        assert_eq!(d.to_string(), "Missing THEN clause. at 4:12");
    }

    #[test]
    fn at_copies_lexeme_position() {
        let d = Diagnostic::at("Unterminated string.", Position::new(10, 2, 7));
        assert_eq!((d.line, d.column), (2, 7));
    }

    #[test]
    fn ordering_is_by_position_first() {
        let mut all = vec![
            Diagnostic::new("b", 3, 1),
            Diagnostic::new("a", 1, 9),
            Diagnostic::new("c", 1, 2),
        ];
        all.sort();
        assert_eq!(all[0].message, "c");
        assert_eq!(all[1].message, "a");
        assert_eq!(all[2].message, "b");
    }
}
