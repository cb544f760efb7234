//! Lexeme model for the Une DSL
//!
//! A lexeme is a classified fragment of source text with its position.
//! Positions never change; a macro rewrite produces a new lexeme with a
//! freshly classified kind at the original site.

use crate::grammar::language::{self, Keyword};
use crate::utils::Position;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Token kinds (closed set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    Boolean,
    Number,
    String,
    ExtendedLiteral,
    Operator,
    Parenthesis,
    Delimiter,
    InlineCode,
    Name,
    Keyword,
    UnitSuffix,
    Error,
}

impl TokenKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::ExtendedLiteral => "extended-literal",
            Self::Operator => "operator",
            Self::Parenthesis => "parenthesis",
            Self::Delimiter => "delimiter",
            Self::InlineCode => "inline-code",
            Self::Name => "name",
            Self::Keyword => "keyword",
            Self::UnitSuffix => "unit-suffix",
            Self::Error => "error",
        }
    }

    /// Check if this kind is a basic data literal
    pub const fn is_basic_literal(self) -> bool {
        matches!(
            self,
            Self::Boolean | Self::Number | Self::String | Self::ExtendedLiteral
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One classified fragment of source text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lexeme {
    pub kind: TokenKind,
    pub text: String,
    pub position: Position,
}

impl Lexeme {
    /// Create a lexeme with an explicit kind
    pub fn new(kind: TokenKind, text: impl Into<String>, position: Position) -> Self {
        Self {
            kind,
            text: text.into(),
            position,
        }
    }

    /// Create a lexeme whose kind is derived from its text
    pub fn classified(text: impl Into<String>, position: Position) -> Self {
        let text = text.into();
        let kind = language::classify_text(&text);
        Self {
            kind,
            text,
            position,
        }
    }

    /// Produce a replacement lexeme at this site with reclassified kind
    pub fn rewritten(&self, text: impl Into<String>) -> Self {
        Self::classified(text, self.position)
    }

    /// Check site identity (same offset within one parse)
    pub fn same_site(&self, other: &Lexeme) -> bool {
        self.position.offset == other.position.offset
    }

    pub fn is_kind(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    pub fn is_delimiter(&self) -> bool {
        self.kind == TokenKind::Delimiter
    }

    /// Check if this lexeme is a specific keyword
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::Keyword && Keyword::from_str(&self.text) == Some(keyword)
    }

    /// Get keyword if this lexeme is one
    pub fn keyword(&self) -> Option<Keyword> {
        if self.kind == TokenKind::Keyword {
            Keyword::from_str(&self.text)
        } else {
            None
        }
    }

    /// Check if this lexeme is a basic data literal
    pub fn is_basic_literal(&self) -> bool {
        self.kind.is_basic_literal()
    }

    /// Compare text case-insensitively
    pub fn matches_text(&self, text: &str) -> bool {
        self.text.eq_ignore_ascii_case(text)
    }

    /// Get string literal content without the surrounding quotes
    pub fn string_content(&self) -> &str {
        if self.kind == TokenKind::String && self.text.len() >= 2 {
            &self.text[1..self.text.len() - 1]
        } else {
            &self.text
        }
    }
}

impl fmt::Display for Lexeme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// Reassemble canonical source text from a token slice
pub fn join_source(tokens: &[Lexeme]) -> String {
    tokens
        .iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
