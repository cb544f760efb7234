//! Expression evaluation seam.
//!
//! The transpiler never interprets expression semantics itself: WHEN/IF
//! bodies travel to the output as source text, and the only place a value
//! is needed at transpile time is a device CONFIG/INIT property. That need
//! goes through the [`Evaluator`] trait so embedders can plug in a real
//! expression engine. The bundled [`LiteralEvaluator`] resolves plain
//! literals, which covers ordinary device blocks.

use std::collections::BTreeSet;

use crate::config::runtime::LexicalPreferences;
use crate::diagnostics::Diagnostic;
use crate::grammar::language;
use crate::lexical::LexicalAnalyzer;
use crate::tokens::TokenKind;

/// A value an expression resolved to at transpile time
#[derive(Debug, Clone, PartialEq)]
pub enum ExprValue {
    Number(f64),
    Boolean(bool),
    Text(String),
}

impl ExprValue {
    /// Render the value back into literal source form
    pub fn as_literal_text(&self) -> String {
        match self {
            ExprValue::Number(value) => language::format_number(*value),
            ExprValue::Boolean(value) => value.to_string(),
            ExprValue::Text(text) => format!("\"{text}\""),
        }
    }
}

/// One compiled expression, queried for its static properties
pub trait CompiledExpression {
    /// Original source text the expression was built from
    fn source(&self) -> &str;

    /// Problems found while building; non-empty means the expression is unusable
    fn errors(&self) -> &[Diagnostic];

    /// Variables the expression reads but does not define
    fn free_variables(&self) -> &BTreeSet<String>;

    /// Evaluate to a value, when the expression can be resolved statically
    fn eval(&self) -> Option<ExprValue>;

    /// Whether the expression could resolve without outside input
    fn is_constant(&self) -> bool {
        self.errors().is_empty() && self.free_variables().is_empty()
    }
}

/// Builds compiled expressions from source text
pub trait Evaluator: Send + Sync {
    fn build(&self, source: &str) -> Box<dyn CompiledExpression>;
}

// ============================================================================
// LITERAL EVALUATOR
// ============================================================================

/// Minimal built-in evaluator: resolves single literals and flags every
/// bare name as a free variable. It does no arithmetic; a multi-token
/// expression builds cleanly but evaluates to `None`.
#[derive(Debug, Default, Clone)]
pub struct LiteralEvaluator;

impl Evaluator for LiteralEvaluator {
    fn build(&self, source: &str) -> Box<dyn CompiledExpression> {
        Box::new(LiteralExpression::analyze(source))
    }
}

struct LiteralExpression {
    source: String,
    errors: Vec<Diagnostic>,
    free_variables: BTreeSet<String>,
    value: Option<ExprValue>,
}

impl LiteralExpression {
    fn analyze(source: &str) -> Self {
        let preferences = LexicalPreferences {
            tab_width: 4,
            log_token_summary: false,
        };
        let mut analyzer = LexicalAnalyzer::with_preferences(preferences);
        let (tokens, errors) = analyzer.tokenize(source);

        let free_variables: BTreeSet<String> = tokens
            .iter()
            .filter(|token| token.kind == TokenKind::Name)
            .map(|token| token.text.clone())
            .collect();

        let significant: Vec<_> = tokens
            .iter()
            .filter(|token| token.kind != TokenKind::Delimiter)
            .collect();

        let value = if errors.is_empty() && free_variables.is_empty() && significant.len() == 1 {
            let token = significant[0];
            match token.kind {
                TokenKind::Number => token.text.parse::<f64>().ok().map(ExprValue::Number),
                TokenKind::Boolean => Some(ExprValue::Boolean(
                    token.text.eq_ignore_ascii_case("true"),
                )),
                TokenKind::String => Some(ExprValue::Text(token.string_content().to_string())),
                TokenKind::ExtendedLiteral => Some(ExprValue::Text(token.text.clone())),
                _ => None,
            }
        } else {
            None
        };

        Self {
            source: source.to_string(),
            errors,
            free_variables,
            value,
        }
    }
}

impl CompiledExpression for LiteralExpression {
    fn source(&self) -> &str {
        &self.source
    }

    fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    fn free_variables(&self) -> &BTreeSet<String> {
        &self.free_variables
    }

    fn eval(&self) -> Option<ExprValue> {
        self.value.clone()
    }
}

// ============================================================================
// TEST SUPPORT
// ============================================================================

#[cfg(test)]
pub mod testing {
    use super::*;

    /// Evaluator returning one canned answer for every build call
    pub struct StubEvaluator {
        value: Option<ExprValue>,
        free_variables: BTreeSet<String>,
        errors: Vec<Diagnostic>,
    }

    impl StubEvaluator {
        pub fn constant(value: ExprValue) -> Self {
            Self {
                value: Some(value),
                free_variables: BTreeSet::new(),
                errors: Vec::new(),
            }
        }

        pub fn with_free_variables<I>(names: I) -> Self
        where
            I: IntoIterator<Item = &'static str>,
        {
            Self {
                value: None,
                free_variables: names.into_iter().map(String::from).collect(),
                errors: Vec::new(),
            }
        }

        pub fn failing(message: &str) -> Self {
            Self {
                value: None,
                free_variables: BTreeSet::new(),
                errors: vec![Diagnostic::new(message, 1, 1)],
            }
        }
    }

    impl Evaluator for StubEvaluator {
        fn build(&self, source: &str) -> Box<dyn CompiledExpression> {
            Box::new(StubExpression {
                source: source.to_string(),
                value: self.value.clone(),
                free_variables: self.free_variables.clone(),
                errors: self.errors.clone(),
            })
        }
    }

    struct StubExpression {
        source: String,
        value: Option<ExprValue>,
        free_variables: BTreeSet<String>,
        errors: Vec<Diagnostic>,
    }

    impl CompiledExpression for StubExpression {
        fn source(&self) -> &str {
            &self.source
        }

        fn errors(&self) -> &[Diagnostic] {
            &self.errors
        }

        fn free_variables(&self) -> &BTreeSet<String> {
            &self.free_variables
        }

        fn eval(&self) -> Option<ExprValue> {
            self.value.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_literal_is_constant() {
        let expression = LiteralEvaluator.build("42");
        assert!(expression.is_constant());
        assert_eq!(expression.eval(), Some(ExprValue::Number(42.0)));
    }

    #[test]
    fn test_string_literal_strips_quotes() {
        let expression = LiteralEvaluator.build("\"hello there\"");
        assert!(expression.is_constant());
        assert_eq!(
            expression.eval(),
            Some(ExprValue::Text("hello there".to_string()))
        );
    }

    #[test]
    fn test_boolean_literal() {
        let expression = LiteralEvaluator.build("TRUE");
        assert_eq!(expression.eval(), Some(ExprValue::Boolean(true)));
    }

    #[test]
    fn test_bare_name_is_free_variable() {
        let expression = LiteralEvaluator.build("threshold");
        assert!(!expression.is_constant());
        assert!(expression.free_variables().contains("threshold"));
        assert_eq!(expression.eval(), None);
    }

    #[test]
    fn test_expression_with_variable() {
        let expression = LiteralEvaluator.build("x + 1");
        assert!(expression.free_variables().contains("x"));
        assert_eq!(expression.eval(), None);
    }

    #[test]
    fn test_constant_arithmetic_builds_but_does_not_resolve() {
        let expression = LiteralEvaluator.build("5 + 3");
        assert!(expression.errors().is_empty());
        assert!(expression.free_variables().is_empty());
        assert_eq!(expression.eval(), None);
    }

    #[test]
    fn test_invalid_characters_are_errors() {
        let expression = LiteralEvaluator.build("@@@");
        assert!(!expression.errors().is_empty());
        assert!(!expression.is_constant());
    }

    #[test]
    fn test_negative_number() {
        let expression = LiteralEvaluator.build("-7.5");
        assert_eq!(expression.eval(), Some(ExprValue::Number(-7.5)));
    }

    #[test]
    fn test_literal_text_rendering() {
        assert_eq!(ExprValue::Number(5000.0).as_literal_text(), "5000");
        assert_eq!(ExprValue::Boolean(false).as_literal_text(), "false");
        assert_eq!(
            ExprValue::Text("on".to_string()).as_literal_text(),
            "\"on\""
        );
    }

    #[test]
    fn test_stub_evaluator_canned_value() {
        use testing::StubEvaluator;
        let evaluator = StubEvaluator::constant(ExprValue::Number(8.0));
        let expression = evaluator.build("5 + 3");
        assert_eq!(expression.eval(), Some(ExprValue::Number(8.0)));
        assert_eq!(expression.source(), "5 + 3");
    }
}
