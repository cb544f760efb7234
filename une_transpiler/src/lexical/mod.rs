//! Lexical analysis for Une source text.
//!
//! The analyzer produces the flat lexeme stream every later phase works
//! from. Use [`create_analyzer`] for environment-backed preferences or
//! [`create_analyzer_with_preferences`] to pin them down in tests.

pub mod analyzer;

pub use analyzer::{fold_unit_suffixes, LexicalAnalyzer, LexicalMetrics};

use crate::config::constants::compile_time::lexical::MAX_TOKEN_COUNT;
use crate::config::runtime::LexicalPreferences;
use crate::tokens::{Lexeme, TokenKind};

/// Create an analyzer with preferences read from the environment
pub fn create_analyzer() -> LexicalAnalyzer {
    LexicalAnalyzer::new()
}

/// Create an analyzer with explicit preferences
pub fn create_analyzer_with_preferences(preferences: LexicalPreferences) -> LexicalAnalyzer {
    LexicalAnalyzer::with_preferences(preferences)
}

/// Verify the lexical diagnostic codes are registered before first use
pub fn init_lexical_logging() -> Result<(), String> {
    let required = [
        crate::logging::codes::lexical::INVALID_CHARACTER,
        crate::logging::codes::lexical::UNTERMINATED_STRING,
        crate::logging::codes::lexical::UNTERMINATED_INLINE_CODE,
        crate::logging::codes::lexical::UNTERMINATED_LIST,
        crate::logging::codes::lexical::STRING_TOO_LONG,
        crate::logging::codes::lexical::INLINE_CODE_TOO_LONG,
        crate::logging::codes::lexical::TOO_MANY_TOKENS,
    ];

    for code in &required {
        if crate::logging::codes::get_description(code.as_str()) == "Unknown error" {
            return Err(format!(
                "Lexical error code {} has no description",
                code.as_str()
            ));
        }
    }

    crate::log_debug!("Lexical limits initialized",
        "max_token_count" => MAX_TOKEN_COUNT
    );
    Ok(())
}

/// Per-kind distribution of a lexeme stream
#[derive(Debug, Default, Clone)]
pub struct TokenCounts {
    pub total: usize,
    pub keywords: usize,
    pub names: usize,
    pub numbers: usize,
    pub booleans: usize,
    pub strings: usize,
    pub operators: usize,
    pub delimiters: usize,
    pub errors: usize,
}

impl TokenCounts {
    /// Whether the stream carries anything a parser could act on
    pub fn has_content(&self) -> bool {
        self.keywords > 0 || self.names > 0 || self.strings > 0
    }

    pub fn is_within_token_limit(&self) -> bool {
        self.total <= MAX_TOKEN_COUNT
    }
}

/// Count lexemes by kind
pub fn token_counts(tokens: &[Lexeme]) -> TokenCounts {
    let mut counts = TokenCounts::default();
    for token in tokens {
        counts.total += 1;
        match token.kind {
            TokenKind::Keyword => counts.keywords += 1,
            TokenKind::Name => counts.names += 1,
            TokenKind::Number => counts.numbers += 1,
            TokenKind::Boolean => counts.booleans += 1,
            TokenKind::String => counts.strings += 1,
            TokenKind::Operator => counts.operators += 1,
            TokenKind::Delimiter => counts.delimiters += 1,
            TokenKind::Error => counts.errors += 1,
            _ => {}
        }
    }
    counts
}
