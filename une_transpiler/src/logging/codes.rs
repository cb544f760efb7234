//! Consolidated error codes and classification system
//!
//! Single source of truth for all error and success codes emitted by the
//! transpiler, together with their behavioral metadata. Language-level
//! diagnostics carry free-form messages; these codes classify the event
//! stream for log consumers.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for an error code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub description: &'static str,
}

impl ErrorMetadata {
    pub fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        description: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            description,
        }
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("U001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("U002");
    pub const INVALID_ARGUMENTS: Code = Code::new("U003");
}

/// Source loading error codes
pub mod loading {
    use super::Code;

    pub const SOURCE_NOT_FOUND: Code = Code::new("U010");
    pub const SOURCE_NOT_READABLE: Code = Code::new("U011");
    pub const EMPTY_SOURCE: Code = Code::new("U012");
    pub const UNSUPPORTED_CHARSET: Code = Code::new("U013");
    pub const SOURCE_TOO_LARGE: Code = Code::new("U014");
    pub const INVALID_PATTERN: Code = Code::new("U015");
}

/// Lexical analysis error codes
pub mod lexical {
    use super::Code;

    pub const INVALID_CHARACTER: Code = Code::new("U020");
    pub const UNTERMINATED_STRING: Code = Code::new("U021");
    pub const UNTERMINATED_INLINE_CODE: Code = Code::new("U022");
    pub const UNTERMINATED_LIST: Code = Code::new("U023");
    pub const INVALID_NUMBER: Code = Code::new("U024");
    pub const STRING_TOO_LONG: Code = Code::new("U025");
    pub const INLINE_CODE_TOO_LONG: Code = Code::new("U026");
    pub const TOO_MANY_TOKENS: Code = Code::new("U027");
    pub const LIST_TOO_LONG: Code = Code::new("U028");
}

/// Command syntax error codes
pub mod syntax {
    use super::Code;

    pub const UNKNOWN_COMMAND: Code = Code::new("U040");
    pub const MISSING_CLAUSE: Code = Code::new("U041");
    pub const EMPTY_CLAUSE: Code = Code::new("U042");
    pub const WRONG_ARITY: Code = Code::new("U043");
    pub const INVALID_NAME: Code = Code::new("U044");
    pub const RESERVED_WORD: Code = Code::new("U045");
    pub const UNEXPECTED_TOKEN: Code = Code::new("U046");
    pub const INVALID_ACTION: Code = Code::new("U047");
    pub const INVALID_DELAY: Code = Code::new("U048");
    pub const TOO_MANY_ITEMS: Code = Code::new("U049");
}

/// Semantic error codes
pub mod semantic {
    use super::Code;

    pub const EXPRESSION_WITH_VARIABLES: Code = Code::new("U060");
    pub const EXPRESSION_NOT_CONSTANT: Code = Code::new("U061");
    pub const EXPRESSION_INVALID: Code = Code::new("U062");
    pub const INVALID_DATA_TYPE: Code = Code::new("U063");
    pub const DUPLICATE_PROPERTY: Code = Code::new("U064");
    pub const DUPLICATE_CONFIG_ITEM: Code = Code::new("U065");
    pub const UNUSED_ALIAS: Code = Code::new("U066");
    pub const DUPLICATE_NAME: Code = Code::new("U067");
    pub const DUPLICATE_PATTERN: Code = Code::new("U068");
    pub const PROTECTED_PATTERN: Code = Code::new("U069");
    pub const TABLE_ARITY_MISMATCH: Code = Code::new("U070");
}

/// Include resolution error codes
pub mod resolution {
    use super::Code;

    pub const INCLUDE_DEPTH_EXCEEDED: Code = Code::new("U080");
    pub const TOO_MANY_UNITS: Code = Code::new("U081");
    pub const TOO_MANY_MACRO_RULES: Code = Code::new("U082");
    pub const TOO_MANY_EXPANSIONS: Code = Code::new("U083");
}

/// Emit error codes
pub mod emit {
    use super::Code;

    pub const JSON_ENCODING_FAILED: Code = Code::new("U090");
    pub const OUTPUT_WRITE_FAILED: Code = Code::new("U091");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    pub const RUN_COMPLETE: Code = Code::new("I001");
    pub const UNIT_LOADED: Code = Code::new("I010");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
    pub const PHASE_ONE_COMPLETE: Code = Code::new("I030");
    pub const PHASE_TWO_COMPLETE: Code = Code::new("I031");
    pub const EMIT_COMPLETE: Code = Code::new("I040");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

/// Error metadata registry using OnceLock for thread safety
static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

/// Initialize and get the error registry
fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        let mut registry = HashMap::new();

        let entries = [
            // System errors
            ErrorMetadata::new(
                "U001",
                "System",
                Severity::Critical,
                false,
                "Critical internal transpiler error",
            ),
            ErrorMetadata::new(
                "U002",
                "System",
                Severity::Critical,
                false,
                "Transpiler initialization failure",
            ),
            ErrorMetadata::new(
                "U003",
                "System",
                Severity::Medium,
                false,
                "Invalid command line arguments",
            ),
            // Source loading errors (terminal for one unit)
            ErrorMetadata::new(
                "U010",
                "Loading",
                Severity::Medium,
                true,
                "Source not found at specified URI",
            ),
            ErrorMetadata::new(
                "U011",
                "Loading",
                Severity::Medium,
                true,
                "Source could not be read",
            ),
            ErrorMetadata::new(
                "U012",
                "Loading",
                Severity::Low,
                true,
                "Source is empty when content expected",
            ),
            ErrorMetadata::new(
                "U013",
                "Loading",
                Severity::Medium,
                true,
                "Character set is not supported",
            ),
            ErrorMetadata::new(
                "U014",
                "Loading",
                Severity::Medium,
                true,
                "Source exceeds maximum size limit",
            ),
            ErrorMetadata::new(
                "U015",
                "Loading",
                Severity::Low,
                true,
                "Include wildcard pattern is invalid",
            ),
            // Lexical errors (lexing continues past all of them)
            ErrorMetadata::new(
                "U020",
                "Lexical",
                Severity::Low,
                true,
                "Unrecognized character sequence",
            ),
            ErrorMetadata::new(
                "U021",
                "Lexical",
                Severity::Low,
                true,
                "String literal not terminated before end of line",
            ),
            ErrorMetadata::new(
                "U022",
                "Lexical",
                Severity::Low,
                true,
                "Inline code block not terminated before end of input",
            ),
            ErrorMetadata::new(
                "U023",
                "Lexical",
                Severity::Low,
                true,
                "List literal not terminated before end of input",
            ),
            ErrorMetadata::new(
                "U024",
                "Lexical",
                Severity::Low,
                true,
                "Numeric literal is malformed",
            ),
            ErrorMetadata::new(
                "U025",
                "Lexical",
                Severity::Medium,
                true,
                "String literal exceeds maximum length",
            ),
            ErrorMetadata::new(
                "U026",
                "Lexical",
                Severity::Medium,
                true,
                "Inline code block exceeds maximum length",
            ),
            ErrorMetadata::new(
                "U027",
                "Lexical",
                Severity::High,
                false,
                "Token count ceiling reached; unit truncated",
            ),
            ErrorMetadata::new(
                "U028",
                "Lexical",
                Severity::Medium,
                true,
                "List literal exceeds maximum length",
            ),
            // Syntax errors
            ErrorMetadata::new(
                "U040",
                "Syntax",
                Severity::Medium,
                true,
                "Chunk does not start with a known command keyword",
            ),
            ErrorMetadata::new(
                "U041",
                "Syntax",
                Severity::Medium,
                true,
                "Mandatory clause is missing",
            ),
            ErrorMetadata::new(
                "U042",
                "Syntax",
                Severity::Medium,
                true,
                "Clause declared without content",
            ),
            ErrorMetadata::new(
                "U043",
                "Syntax",
                Severity::Medium,
                true,
                "Clause has the wrong number of tokens",
            ),
            ErrorMetadata::new(
                "U044",
                "Syntax",
                Severity::Medium,
                true,
                "Name fails validity rules",
            ),
            ErrorMetadata::new(
                "U045",
                "Syntax",
                Severity::Medium,
                true,
                "Reserved word used where a name is required",
            ),
            ErrorMetadata::new(
                "U046",
                "Syntax",
                Severity::Low,
                true,
                "Token not expected at this point",
            ),
            ErrorMetadata::new(
                "U047",
                "Syntax",
                Severity::Medium,
                true,
                "THEN item does not match any action form",
            ),
            ErrorMetadata::new(
                "U048",
                "Syntax",
                Severity::Medium,
                true,
                "AFTER modifier without a numeric delay",
            ),
            ErrorMetadata::new(
                "U049",
                "Syntax",
                Severity::High,
                true,
                "Clause item ceiling reached; remainder skipped",
            ),
            // Semantic errors
            ErrorMetadata::new(
                "U060",
                "Semantic",
                Severity::Medium,
                true,
                "Expression with free variables where a constant is required",
            ),
            ErrorMetadata::new(
                "U061",
                "Semantic",
                Severity::Medium,
                true,
                "Expression could not be folded to a constant",
            ),
            ErrorMetadata::new(
                "U062",
                "Semantic",
                Severity::Medium,
                true,
                "Expression rejected by the evaluator",
            ),
            ErrorMetadata::new(
                "U063",
                "Semantic",
                Severity::Medium,
                true,
                "Config item type is not a basic data type",
            ),
            ErrorMetadata::new(
                "U064",
                "Semantic",
                Severity::Medium,
                true,
                "Property declared twice within one clause",
            ),
            ErrorMetadata::new(
                "U065",
                "Semantic",
                Severity::Low,
                true,
                "Config item declared twice within one driver",
            ),
            ErrorMetadata::new(
                "U066",
                "Semantic",
                Severity::Low,
                true,
                "Rule alias never used in WHEN, IF or THEN",
            ),
            ErrorMetadata::new(
                "U067",
                "Semantic",
                Severity::Medium,
                true,
                "Command name already declared in another unit",
            ),
            ErrorMetadata::new(
                "U068",
                "Semantic",
                Severity::Medium,
                true,
                "Rewrite pattern already registered",
            ),
            ErrorMetadata::new(
                "U069",
                "Semantic",
                Severity::Medium,
                true,
                "INCLUDE and USE cannot be rewritten",
            ),
            ErrorMetadata::new(
                "U070",
                "Semantic",
                Severity::Medium,
                true,
                "Include table row does not match the declared columns",
            ),
            // Resolution errors
            ErrorMetadata::new(
                "U080",
                "Resolution",
                Severity::High,
                false,
                "Include nesting exceeds maximum depth",
            ),
            ErrorMetadata::new(
                "U081",
                "Resolution",
                Severity::High,
                false,
                "Unit ceiling reached; further includes skipped",
            ),
            ErrorMetadata::new(
                "U082",
                "Resolution",
                Severity::High,
                false,
                "Macro rule ceiling reached; further rules skipped",
            ),
            ErrorMetadata::new(
                "U083",
                "Resolution",
                Severity::High,
                false,
                "Macro expansion ceiling reached for one chunk",
            ),
            // Emit errors
            ErrorMetadata::new(
                "U090",
                "Emit",
                Severity::High,
                false,
                "Command list could not be encoded as JSON",
            ),
            ErrorMetadata::new(
                "U091",
                "Emit",
                Severity::High,
                false,
                "Output document could not be written",
            ),
        ];

        for entry in entries {
            registry.insert(entry.code, entry);
        }

        registry
    })
}

// ============================================================================
// CLASSIFICATION LOOKUP FUNCTIONS
// ============================================================================

pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_error_code_group_is_registered() {
        let all = [
            system::INTERNAL_ERROR,
            system::INITIALIZATION_FAILURE,
            system::INVALID_ARGUMENTS,
            loading::SOURCE_NOT_FOUND,
            loading::SOURCE_NOT_READABLE,
            loading::EMPTY_SOURCE,
            loading::UNSUPPORTED_CHARSET,
            loading::SOURCE_TOO_LARGE,
            loading::INVALID_PATTERN,
            lexical::INVALID_CHARACTER,
            lexical::UNTERMINATED_STRING,
            lexical::UNTERMINATED_INLINE_CODE,
            lexical::UNTERMINATED_LIST,
            lexical::INVALID_NUMBER,
            lexical::STRING_TOO_LONG,
            lexical::INLINE_CODE_TOO_LONG,
            lexical::TOO_MANY_TOKENS,
            lexical::LIST_TOO_LONG,
            syntax::UNKNOWN_COMMAND,
            syntax::MISSING_CLAUSE,
            syntax::EMPTY_CLAUSE,
            syntax::WRONG_ARITY,
            syntax::INVALID_NAME,
            syntax::RESERVED_WORD,
            syntax::UNEXPECTED_TOKEN,
            syntax::INVALID_ACTION,
            syntax::INVALID_DELAY,
            syntax::TOO_MANY_ITEMS,
            semantic::EXPRESSION_WITH_VARIABLES,
            semantic::EXPRESSION_NOT_CONSTANT,
            semantic::EXPRESSION_INVALID,
            semantic::INVALID_DATA_TYPE,
            semantic::DUPLICATE_PROPERTY,
            semantic::DUPLICATE_CONFIG_ITEM,
            semantic::UNUSED_ALIAS,
            semantic::DUPLICATE_NAME,
            semantic::DUPLICATE_PATTERN,
            semantic::PROTECTED_PATTERN,
            semantic::TABLE_ARITY_MISMATCH,
            resolution::INCLUDE_DEPTH_EXCEEDED,
            resolution::TOO_MANY_UNITS,
            resolution::TOO_MANY_MACRO_RULES,
            resolution::TOO_MANY_EXPANSIONS,
            emit::JSON_ENCODING_FAILED,
            emit::OUTPUT_WRITE_FAILED,
        ];

        for code in all {
            assert!(
                get_error_metadata(code.as_str()).is_some(),
                "code {} has no registry entry",
                code
            );
            assert_ne!(get_description(code.as_str()), "Unknown error");
        }
    }

    #[test]
    fn unknown_codes_fall_back_to_defaults() {
        assert_eq!(get_severity("U999"), Severity::Medium);
        assert!(is_recoverable("U999"));
        assert_eq!(get_category("U999"), "Unknown");
    }

    #[test]
    fn lexical_errors_are_recoverable_except_token_ceiling() {
        assert!(is_recoverable(lexical::INVALID_CHARACTER.as_str()));
        assert!(is_recoverable(lexical::UNTERMINATED_STRING.as_str()));
        assert!(!is_recoverable(lexical::TOO_MANY_TOKENS.as_str()));
    }
}
