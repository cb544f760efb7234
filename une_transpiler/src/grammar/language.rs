//! Language rules for the Une DSL
//!
//! Stateless keyword, operator, and suffix tables plus the text
//! classification used whenever a token's text changes and its kind
//! must be recomputed.

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::tokens::TokenKind;

/// Maximum length of a user-declared name
pub const NAME_MAX_LENGTH: usize = 48;

/// Une command and clause keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Keyword {
    // === COMMAND STARTERS ===
    Device,
    Driver,
    Rule,
    Include,
    Use,

    // === CLAUSE OPENERS ===
    When,
    If,
    Then,
    Script,
    Config,
    Init,

    // === MODIFIERS ===
    As,
    Required,
    After,
}

impl Keyword {
    /// Get the canonical uppercase representation
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Device => "DEVICE",
            Self::Driver => "DRIVER",
            Self::Rule => "RULE",
            Self::Include => "INCLUDE",
            Self::Use => "USE",
            Self::When => "WHEN",
            Self::If => "IF",
            Self::Then => "THEN",
            Self::Script => "SCRIPT",
            Self::Config => "CONFIG",
            Self::Init => "INIT",
            Self::As => "AS",
            Self::Required => "REQUIRED",
            Self::After => "AFTER",
        }
    }

    /// Parse keyword from source text, case-insensitively
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "DEVICE" => Some(Self::Device),
            "DRIVER" => Some(Self::Driver),
            "RULE" => Some(Self::Rule),
            "INCLUDE" => Some(Self::Include),
            "USE" => Some(Self::Use),
            "WHEN" => Some(Self::When),
            "IF" => Some(Self::If),
            "THEN" => Some(Self::Then),
            "SCRIPT" => Some(Self::Script),
            "CONFIG" => Some(Self::Config),
            "INIT" => Some(Self::Init),
            "AS" => Some(Self::As),
            "REQUIRED" => Some(Self::Required),
            "AFTER" => Some(Self::After),
            _ => None,
        }
    }

    /// Check if this keyword can begin a command
    pub const fn is_command_starter(self) -> bool {
        matches!(
            self,
            Self::Device | Self::Driver | Self::Rule | Self::Include | Self::Use
        )
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The complete list of reserved words
pub fn reserved_words() -> &'static [&'static str] {
    &[
        "DEVICE", "DRIVER", "RULE", "INCLUDE", "USE", "WHEN", "IF", "THEN", "SCRIPT", "CONFIG",
        "INIT", "AS", "REQUIRED", "AFTER",
    ]
}

/// Check if a word is reserved, case-insensitively
pub fn is_reserved_word(s: &str) -> bool {
    Keyword::from_str(s).is_some()
}

// ============================================================================
// OPERATORS
// ============================================================================

/// Two-character operator forms, matched before single characters
pub const TWO_CHAR_OPERATORS: &[&str] = &["==", "!=", "<=", ">=", "&&", "||", "<<", ">>"];

/// Single-character operator forms
pub const SINGLE_CHAR_OPERATORS: &str = "+-*/%<>=!&|^~,:";

/// Check if a character can start or continue an operator
pub fn is_operator_char(c: char) -> bool {
    SINGLE_CHAR_OPERATORS.contains(c)
}

/// Check if a two-character sequence is an operator
pub fn is_two_char_operator(s: &str) -> bool {
    TWO_CHAR_OPERATORS.contains(&s)
}

/// Check if a string is a complete operator form
pub fn is_operator(s: &str) -> bool {
    if is_two_char_operator(s) {
        return true;
    }
    let mut chars = s.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if is_operator_char(c))
}

// ============================================================================
// UNIT SUFFIXES
// ============================================================================

/// Time suffixes convertible to milliseconds
pub const TIME_SUFFIXES: &str = "utsmhd";

/// Temperature suffixes convertible to Celsius
pub const TEMPERATURE_SUFFIXES: &str = "cfk";

/// Check if a character is a time suffix
pub fn is_time_suffix(c: char) -> bool {
    TIME_SUFFIXES.contains(c.to_ascii_lowercase())
}

/// Check if a character is a temperature suffix
pub fn is_temperature_suffix(c: char) -> bool {
    TEMPERATURE_SUFFIXES.contains(c.to_ascii_lowercase())
}

/// Check if a character is any unit suffix
pub fn is_unit_suffix(c: char) -> bool {
    is_time_suffix(c) || is_temperature_suffix(c)
}

/// Milliseconds multiplier for a time suffix
pub fn milliseconds_factor(suffix: char) -> Option<f64> {
    match suffix.to_ascii_lowercase() {
        'u' => Some(10.0),
        't' => Some(100.0),
        's' => Some(1_000.0),
        'm' => Some(60_000.0),
        'h' => Some(3_600_000.0),
        'd' => Some(86_400_000.0),
        _ => None,
    }
}

/// Convert a temperature value to Celsius
pub fn to_celsius(value: f64, suffix: char) -> Option<f64> {
    match suffix.to_ascii_lowercase() {
        'c' => Some(value),
        'f' => Some((value - 32.0) * 5.0 / 9.0),
        'k' => Some(value - 273.15),
        _ => None,
    }
}

/// Apply a unit suffix conversion to a numeric value
pub fn convert_suffixed(value: f64, suffix: char) -> Option<f64> {
    if is_time_suffix(suffix) {
        milliseconds_factor(suffix).map(|factor| value * factor)
    } else {
        to_celsius(value, suffix)
    }
}

// ============================================================================
// LITERAL FORMS
// ============================================================================

/// Check if a string is a valid numeric literal
pub fn is_number(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    if digits.is_empty() {
        return false;
    }
    let mut seen_dot = false;
    for (i, c) in digits.char_indices() {
        match c {
            '0'..='9' => {}
            '.' if !seen_dot && i > 0 && i < digits.len() - 1 => seen_dot = true,
            _ => return false,
        }
    }
    true
}

/// Check if a string is a boolean literal, case-insensitively
pub fn is_boolean(s: &str) -> bool {
    s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("false")
}

/// Check if a string is a valid user-declared name
pub fn is_valid_name(s: &str) -> bool {
    if s.is_empty() || s.len() > NAME_MAX_LENGTH {
        return false;
    }
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

static DATE_PATTERN: OnceLock<regex::Regex> = OnceLock::new();
static TIME_PATTERN: OnceLock<regex::Regex> = OnceLock::new();
static PAIR_PATTERN: OnceLock<regex::Regex> = OnceLock::new();

/// Check if a string is a date literal (YYYY-MM-DD)
pub fn is_date(s: &str) -> bool {
    DATE_PATTERN
        .get_or_init(|| regex::Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap())
        .is_match(s)
}

/// Check if a string is a time literal (HH:MM or HH:MM:SS)
pub fn is_time(s: &str) -> bool {
    TIME_PATTERN
        .get_or_init(|| regex::Regex::new(r"^\d{1,2}:\d{2}(:\d{2})?$").unwrap())
        .is_match(s)
}

/// Check if a string is a list literal
pub fn is_list(s: &str) -> bool {
    s.len() >= 2 && s.starts_with('[') && s.ends_with(']')
}

/// Check if a string is a pair literal (key:value)
pub fn is_pair(s: &str) -> bool {
    PAIR_PATTERN
        .get_or_init(|| regex::Regex::new(r"^[A-Za-z0-9_]+:[A-Za-z0-9_]+$").unwrap())
        .is_match(s)
}

/// Check if a string is any extended literal form
pub fn is_extended_literal(s: &str) -> bool {
    is_date(s) || is_time(s) || is_list(s) || is_pair(s)
}

// ============================================================================
// CLASSIFICATION
// ============================================================================

/// Classify token text into a kind
///
/// Used whenever a token is created from text outside the lexer,
/// in particular after a macro rewrites a token's value. Unrecognized
/// text falls back to Name so that rewritten tokens stay usable.
pub fn classify_text(text: &str) -> TokenKind {
    if text.is_empty() {
        return TokenKind::Error;
    }
    if text == "\n" || text == ";" {
        return TokenKind::Delimiter;
    }
    if is_boolean(text) {
        return TokenKind::Boolean;
    }
    if Keyword::from_str(text).is_some() {
        return TokenKind::Keyword;
    }
    if is_operator(text) {
        return TokenKind::Operator;
    }
    if text == "(" || text == ")" {
        return TokenKind::Parenthesis;
    }
    let mut chars = text.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if is_unit_suffix(c) {
            return TokenKind::UnitSuffix;
        }
    }
    if is_number(text) {
        return TokenKind::Number;
    }
    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        return TokenKind::String;
    }
    if text.len() >= 2 && text.starts_with('{') && text.ends_with('}') {
        return TokenKind::InlineCode;
    }
    if is_extended_literal(text) {
        return TokenKind::ExtendedLiteral;
    }
    TokenKind::Name
}

/// Render a numeric value the way the DSL writes it
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_parsing_is_case_insensitive() {
        assert_eq!(Keyword::from_str("DEVICE"), Some(Keyword::Device));
        assert_eq!(Keyword::from_str("device"), Some(Keyword::Device));
        assert_eq!(Keyword::from_str("Rule"), Some(Keyword::Rule));
        assert_eq!(Keyword::from_str("banana"), None);
    }

    #[test]
    fn test_reserved_words() {
        assert!(is_reserved_word("when"));
        assert!(is_reserved_word("AFTER"));
        assert!(!is_reserved_word("kitchen_lamp"));
        assert_eq!(reserved_words().len(), 14);
    }

    #[test]
    fn test_operator_membership() {
        assert!(is_operator("=="));
        assert!(is_operator("&&"));
        assert!(is_operator("+"));
        assert!(is_operator(","));
        assert!(!is_operator("==="));
        assert!(!is_operator("abc"));
    }

    #[test]
    fn test_name_validity() {
        assert!(is_valid_name("kitchen_lamp"));
        assert!(is_valid_name("_x9"));
        assert!(!is_valid_name("9lives"));
        assert!(!is_valid_name("bad-name"));
        assert!(!is_valid_name(&"x".repeat(NAME_MAX_LENGTH + 1)));
    }

    #[test]
    fn test_number_validity() {
        assert!(is_number("42"));
        assert!(is_number("-3.5"));
        assert!(!is_number("3."));
        assert!(!is_number(".5"));
        assert!(!is_number("1.2.3"));
        assert!(!is_number("-"));
    }

    #[test]
    fn test_time_suffix_conversion() {
        assert_eq!(convert_suffixed(5.0, 's'), Some(5_000.0));
        assert_eq!(convert_suffixed(2.0, 'm'), Some(120_000.0));
        assert_eq!(convert_suffixed(1.0, 'h'), Some(3_600_000.0));
        assert_eq!(convert_suffixed(1.0, 'd'), Some(86_400_000.0));
        assert_eq!(convert_suffixed(3.0, 'u'), Some(30.0));
        assert_eq!(convert_suffixed(7.0, 't'), Some(700.0));
    }

    #[test]
    fn test_temperature_suffix_conversion() {
        assert_eq!(convert_suffixed(20.0, 'c'), Some(20.0));
        assert_eq!(convert_suffixed(212.0, 'f'), Some(100.0));
        assert_eq!(convert_suffixed(273.15, 'k'), Some(0.0));
        assert_eq!(convert_suffixed(1.0, 'z'), None);
    }

    #[test]
    fn test_classification() {
        assert_eq!(classify_text("=="), TokenKind::Operator);
        assert_eq!(classify_text("when"), TokenKind::Keyword);
        assert_eq!(classify_text("true"), TokenKind::Boolean);
        assert_eq!(classify_text("42.5"), TokenKind::Number);
        assert_eq!(classify_text("\"hello\""), TokenKind::String);
        assert_eq!(classify_text("{ x + 1 }"), TokenKind::InlineCode);
        assert_eq!(classify_text("("), TokenKind::Parenthesis);
        assert_eq!(classify_text("s"), TokenKind::UnitSuffix);
        assert_eq!(classify_text("2024-01-15"), TokenKind::ExtendedLiteral);
        assert_eq!(classify_text("12:30"), TokenKind::ExtendedLiteral);
        assert_eq!(classify_text("[1,2,3]"), TokenKind::ExtendedLiteral);
        assert_eq!(classify_text("kitchen_lamp"), TokenKind::Name);
        assert_eq!(classify_text("né!?"), TokenKind::Name);
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(format_number(5000.0), "5000");
        assert_eq!(format_number(120000.0), "120000");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(-40.0), "-40");
    }
}
