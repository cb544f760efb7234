//! Error types for command parsing with diagnostic conversion.
//!
//! Parsers never fail past a command boundary: every problem becomes one
//! of these values, is logged under its code, and lands in the owning
//! unit's diagnostics as `message at line:column`.

use crate::diagnostics::Diagnostic;
use crate::logging::{codes, Code};
use crate::utils::Position;

/// Structural problems: the command shape itself is wrong
#[derive(Debug, Clone, thiserror::Error)]
pub enum SyntaxError {
    #[error("Unknown command '{found}'.")]
    UnknownCommand { found: String, position: Position },

    #[error("Missing {clause} clause in {command} command.")]
    MissingClause {
        clause: &'static str,
        command: &'static str,
        position: Position,
    },

    #[error("Empty {clause} clause.")]
    EmptyClause {
        clause: &'static str,
        position: Position,
    },

    #[error("Expected {expected}, found {found} tokens.")]
    WrongArity {
        expected: &'static str,
        found: usize,
        position: Position,
    },

    #[error("Not a valid name: '{name}'.")]
    InvalidName { name: String, position: Position },

    #[error("Reserved word '{word}' not allowed here.")]
    ReservedWord { word: String, position: Position },

    #[error("Expected {expected}, found '{found}'.")]
    UnexpectedToken {
        expected: &'static str,
        found: String,
        position: Position,
    },

    #[error("Not a valid action: '{text}'.")]
    InvalidAction { text: String, position: Position },

    #[error("AFTER requires a numeric delay, found {found}.")]
    InvalidDelay { found: String, position: Position },

    #[error("Too many {clause} items (limit {limit}).")]
    TooManyItems {
        clause: &'static str,
        limit: usize,
        position: Position,
    },
}

impl SyntaxError {
    pub fn unknown_command(found: &str, position: Position) -> Self {
        Self::UnknownCommand {
            found: found.to_string(),
            position,
        }
    }

    pub fn missing_clause(clause: &'static str, command: &'static str, position: Position) -> Self {
        Self::MissingClause {
            clause,
            command,
            position,
        }
    }

    pub fn empty_clause(clause: &'static str, position: Position) -> Self {
        Self::EmptyClause { clause, position }
    }

    pub fn invalid_name(name: &str, position: Position) -> Self {
        Self::InvalidName {
            name: name.to_string(),
            position,
        }
    }

    pub fn reserved_word(word: &str, position: Position) -> Self {
        Self::ReservedWord {
            word: word.to_string(),
            position,
        }
    }

    pub fn unexpected_token(expected: &'static str, found: &str, position: Position) -> Self {
        Self::UnexpectedToken {
            expected,
            found: found.to_string(),
            position,
        }
    }

    pub fn invalid_action(text: &str, position: Position) -> Self {
        Self::InvalidAction {
            text: text.to_string(),
            position,
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::UnknownCommand { .. } => codes::syntax::UNKNOWN_COMMAND,
            Self::MissingClause { .. } => codes::syntax::MISSING_CLAUSE,
            Self::EmptyClause { .. } => codes::syntax::EMPTY_CLAUSE,
            Self::WrongArity { .. } => codes::syntax::WRONG_ARITY,
            Self::InvalidName { .. } => codes::syntax::INVALID_NAME,
            Self::ReservedWord { .. } => codes::syntax::RESERVED_WORD,
            Self::UnexpectedToken { .. } => codes::syntax::UNEXPECTED_TOKEN,
            Self::InvalidAction { .. } => codes::syntax::INVALID_ACTION,
            Self::InvalidDelay { .. } => codes::syntax::INVALID_DELAY,
            Self::TooManyItems { .. } => codes::syntax::TOO_MANY_ITEMS,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            Self::UnknownCommand { position, .. }
            | Self::MissingClause { position, .. }
            | Self::EmptyClause { position, .. }
            | Self::WrongArity { position, .. }
            | Self::InvalidName { position, .. }
            | Self::ReservedWord { position, .. }
            | Self::UnexpectedToken { position, .. }
            | Self::InvalidAction { position, .. }
            | Self::InvalidDelay { position, .. }
            | Self::TooManyItems { position, .. } => *position,
        }
    }

    pub fn into_diagnostic(self) -> Diagnostic {
        let position = self.position();
        Diagnostic::at(self.to_string(), position)
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.error_code().as_str()).as_str()
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.error_code().as_str())
    }
}

/// Meaning-level problems: the shape parses but the content is wrong
///
/// `Display` and `Error` are implemented by hand: thiserror's derive
/// would treat the fields named `source` (which hold source text, not
/// an underlying error) as the error cause and fail to compile.
#[derive(Debug, Clone)]
pub enum SemanticError {
    ExpressionWithVariables {
        variables: String,
        position: Position,
    },

    ExpressionNotConstant { source: String, position: Position },

    ExpressionInvalid {
        source: String,
        detail: String,
        position: Position,
    },

    InvalidDataType { found: String, position: Position },

    DuplicateProperty { name: String, position: Position },

    DuplicateConfigItem { name: String, position: Position },

    UnusedAlias { alias: String, position: Position },

    DuplicateName {
        category: &'static str,
        name: String,
        position: Position,
    },

    DuplicatePattern { pattern: String, position: Position },

    ProtectedPattern { pattern: String, position: Position },

    TableArityMismatch {
        expected: usize,
        found: usize,
        position: Position,
    },
}

impl std::fmt::Display for SemanticError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExpressionWithVariables { .. } => {
                write!(f, "Expression with variables not allowed here.")
            }
            Self::ExpressionNotConstant { source, .. } => {
                write!(f, "Expression '{source}' is not constant.")
            }
            Self::ExpressionInvalid { source, detail, .. } => {
                write!(f, "Invalid expression '{source}': {detail}")
            }
            Self::InvalidDataType { .. } => write!(f, "Not a valid data type."),
            Self::DuplicateProperty { name, .. } => write!(f, "Duplicate property '{name}'."),
            Self::DuplicateConfigItem { name, .. } => {
                write!(f, "Duplicate config item '{name}'.")
            }
            Self::UnusedAlias { alias, .. } => write!(f, "Alias '{alias}' is not used."),
            Self::DuplicateName { category, name, .. } => {
                write!(f, "Duplicate {category} name '{name}'.")
            }
            Self::DuplicatePattern { pattern, .. } => {
                write!(f, "Duplicate USE pattern '{pattern}'.")
            }
            Self::ProtectedPattern { pattern, .. } => {
                write!(f, "Pattern '{pattern}' cannot be rewritten.")
            }
            Self::TableArityMismatch {
                expected, found, ..
            } => {
                write!(f, "USE table row has {found} values, expected {expected}.")
            }
        }
    }
}

impl std::error::Error for SemanticError {}

impl SemanticError {
    pub fn expression_with_variables(variables: &[String], position: Position) -> Self {
        Self::ExpressionWithVariables {
            variables: variables.join(", "),
            position,
        }
    }

    pub fn expression_not_constant(source: &str, position: Position) -> Self {
        Self::ExpressionNotConstant {
            source: source.to_string(),
            position,
        }
    }

    pub fn expression_invalid(source: &str, detail: &str, position: Position) -> Self {
        Self::ExpressionInvalid {
            source: source.to_string(),
            detail: detail.to_string(),
            position,
        }
    }

    pub fn invalid_data_type(found: &str, position: Position) -> Self {
        Self::InvalidDataType {
            found: found.to_string(),
            position,
        }
    }

    pub fn duplicate_property(name: &str, position: Position) -> Self {
        Self::DuplicateProperty {
            name: name.to_string(),
            position,
        }
    }

    pub fn duplicate_config_item(name: &str, position: Position) -> Self {
        Self::DuplicateConfigItem {
            name: name.to_string(),
            position,
        }
    }

    pub fn unused_alias(alias: &str, position: Position) -> Self {
        Self::UnusedAlias {
            alias: alias.to_string(),
            position,
        }
    }

    pub fn duplicate_name(category: &'static str, name: &str, position: Position) -> Self {
        Self::DuplicateName {
            category,
            name: name.to_string(),
            position,
        }
    }

    pub fn duplicate_pattern(pattern: &str, position: Position) -> Self {
        Self::DuplicatePattern {
            pattern: pattern.to_string(),
            position,
        }
    }

    pub fn protected_pattern(pattern: &str, position: Position) -> Self {
        Self::ProtectedPattern {
            pattern: pattern.to_string(),
            position,
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::ExpressionWithVariables { .. } => codes::semantic::EXPRESSION_WITH_VARIABLES,
            Self::ExpressionNotConstant { .. } => codes::semantic::EXPRESSION_NOT_CONSTANT,
            Self::ExpressionInvalid { .. } => codes::semantic::EXPRESSION_INVALID,
            Self::InvalidDataType { .. } => codes::semantic::INVALID_DATA_TYPE,
            Self::DuplicateProperty { .. } => codes::semantic::DUPLICATE_PROPERTY,
            Self::DuplicateConfigItem { .. } => codes::semantic::DUPLICATE_CONFIG_ITEM,
            Self::UnusedAlias { .. } => codes::semantic::UNUSED_ALIAS,
            Self::DuplicateName { .. } => codes::semantic::DUPLICATE_NAME,
            Self::DuplicatePattern { .. } => codes::semantic::DUPLICATE_PATTERN,
            Self::ProtectedPattern { .. } => codes::semantic::PROTECTED_PATTERN,
            Self::TableArityMismatch { .. } => codes::semantic::TABLE_ARITY_MISMATCH,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            Self::ExpressionWithVariables { position, .. }
            | Self::ExpressionNotConstant { position, .. }
            | Self::ExpressionInvalid { position, .. }
            | Self::InvalidDataType { position, .. }
            | Self::DuplicateProperty { position, .. }
            | Self::DuplicateConfigItem { position, .. }
            | Self::UnusedAlias { position, .. }
            | Self::DuplicateName { position, .. }
            | Self::DuplicatePattern { position, .. }
            | Self::ProtectedPattern { position, .. }
            | Self::TableArityMismatch { position, .. } => *position,
        }
    }

    pub fn into_diagnostic(self) -> Diagnostic {
        let position = self.position();
        Diagnostic::at(self.to_string(), position)
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.error_code().as_str()).as_str()
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.error_code().as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_codes() {
        let position = Position::start();

        let unknown = SyntaxError::unknown_command("FROB", position);
        assert_eq!(unknown.error_code().as_str(), "U040");

        let missing = SyntaxError::missing_clause("WHEN", "RULE", position);
        assert_eq!(missing.error_code().as_str(), "U041");

        let reserved = SyntaxError::reserved_word("THEN", position);
        assert_eq!(reserved.error_code().as_str(), "U045");
    }

    #[test]
    fn test_semantic_error_codes() {
        let position = Position::start();

        let with_variables =
            SemanticError::expression_with_variables(&["x".to_string()], position);
        assert_eq!(with_variables.error_code().as_str(), "U060");

        let unused = SemanticError::unused_alias("low", position);
        assert_eq!(unused.error_code().as_str(), "U066");
    }

    #[test]
    fn test_invalid_data_type_message() {
        let error = SemanticError::invalid_data_type("banana", Position::start());
        assert_eq!(error.to_string(), "Not a valid data type.");
    }

    #[test]
    fn test_into_diagnostic_keeps_position() {
        let position = Position::new(10, 3, 7);
        let diagnostic = SyntaxError::invalid_name("9lamp", position).into_diagnostic();
        assert_eq!(diagnostic.line, 3);
        assert_eq!(diagnostic.column, 7);
        assert!(diagnostic.message.contains("9lamp"));
    }

    #[test]
    fn test_error_messages_read_as_sentences() {
        let position = Position::start();
        let error = SyntaxError::missing_clause("THEN", "RULE", position);
        assert_eq!(error.to_string(), "Missing THEN clause in RULE command.");

        let delay = SyntaxError::InvalidDelay {
            found: "'soon'".to_string(),
            position,
        };
        assert_eq!(
            delay.to_string(),
            "AFTER requires a numeric delay, found 'soon'."
        );
    }

    #[test]
    fn test_severity_lookup() {
        let error = SemanticError::unused_alias("x", Position::start());
        assert_eq!(error.severity(), "Low");
    }
}
