//! DEVICE command parser.
//!
//! `DEVICE <name> [DRIVER <name> [CONFIG k=v;...]] [INIT k=v;...]`
//!
//! CONFIG feeds the driver instance, INIT feeds the device itself. Both
//! accept only transpile-time constants: a literal directly, or anything
//! the expression evaluator can fold without free variables.

use std::collections::BTreeMap;

use crate::diagnostics::Diagnostic;
use crate::grammar::{language, Command, DeviceCommand, Keyword};
use crate::syntax::{
    bounded_items, report_semantic, report_syntax, validated_name, ParseContext, SemanticError,
    SyntaxError,
};
use crate::tokens::{join_source, Lexeme, TokenKind};

pub(crate) fn parse_device(
    context: &ParseContext,
    chunk: &[Lexeme],
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<Command> {
    let position = chunk.first()?.position;
    let clauses = crate::tokens::split_clauses(
        chunk,
        &[Keyword::Device, Keyword::Driver, Keyword::Config, Keyword::Init],
    );

    let name_clause = clauses.get(Keyword::Device)?;
    let name_token = match name_clause.tokens.first() {
        Some(token) => token,
        None => {
            report_syntax(
                SyntaxError::missing_clause("name", "DEVICE", position),
                diagnostics,
            );
            return None;
        }
    };
    if name_clause.tokens.len() > 1 {
        report_syntax(
            SyntaxError::unexpected_token(
                "a single device name",
                &name_clause.tokens[1].text,
                name_clause.tokens[1].position,
            ),
            diagnostics,
        );
    }
    let name = validated_name(name_token, diagnostics)?;

    let driver_name = clauses.get(Keyword::Driver).and_then(|clause| {
        match clause.tokens.first() {
            Some(token) => {
                if clause.tokens.len() > 1 {
                    report_syntax(
                        SyntaxError::unexpected_token(
                            "a single driver name",
                            &clause.tokens[1].text,
                            clause.tokens[1].position,
                        ),
                        diagnostics,
                    );
                }
                validated_name(token, diagnostics)
            }
            None => {
                report_syntax(
                    SyntaxError::empty_clause("DRIVER", clause.opener.position),
                    diagnostics,
                );
                None
            }
        }
    });

    let driver_init = match clauses.get(Keyword::Config) {
        Some(clause) => {
            if !clauses.has(Keyword::Driver) {
                report_syntax(
                    SyntaxError::missing_clause("DRIVER", "DEVICE", clause.opener.position),
                    diagnostics,
                );
            }
            parse_properties(context, "CONFIG", &clause.tokens, diagnostics)
        }
        None => BTreeMap::new(),
    };

    let device_init = match clauses.get(Keyword::Init) {
        Some(clause) => parse_properties(context, "INIT", &clause.tokens, diagnostics),
        None => BTreeMap::new(),
    };

    Some(Command::Device(DeviceCommand {
        name,
        driver_name,
        driver_init,
        device_init,
        position,
    }))
}

/// Parse `k=v` items; keys fold to lower case, first declaration wins.
fn parse_properties(
    context: &ParseContext,
    clause: &'static str,
    tokens: &[Lexeme],
    diagnostics: &mut Vec<Diagnostic>,
) -> BTreeMap<String, Lexeme> {
    let mut properties: BTreeMap<String, Lexeme> = BTreeMap::new();

    for item in bounded_items(clause, tokens, diagnostics) {
        let key_token = &item[0];
        if !language::is_valid_name(&key_token.text) {
            report_syntax(
                SyntaxError::invalid_name(&key_token.text, key_token.position),
                diagnostics,
            );
            continue;
        }
        match item.get(1) {
            Some(token) if token.kind == TokenKind::Operator && token.text == "=" => {}
            Some(token) => {
                report_syntax(
                    SyntaxError::unexpected_token("'='", &token.text, token.position),
                    diagnostics,
                );
                continue;
            }
            None => {
                report_syntax(
                    SyntaxError::unexpected_token("'='", "end of item", key_token.position),
                    diagnostics,
                );
                continue;
            }
        }
        let value = match const_value(context, &item[2..], key_token.position, diagnostics) {
            Some(value) => value,
            None => continue,
        };

        let key = key_token.text.to_lowercase();
        if properties.contains_key(&key) {
            report_semantic(
                SemanticError::duplicate_property(&key, key_token.position),
                diagnostics,
            );
            continue;
        }
        properties.insert(key, value);
    }

    properties
}

/// Resolve a property value to one literal lexeme. Single literals pass
/// through untouched; anything else goes to the evaluator and must fold
/// to a constant with no free variables.
fn const_value(
    context: &ParseContext,
    tokens: &[Lexeme],
    item_position: crate::utils::Position,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<Lexeme> {
    let first = match tokens.first() {
        Some(token) => token,
        None => {
            report_syntax(
                SyntaxError::unexpected_token("a value after '='", "end of item", item_position),
                diagnostics,
            );
            return None;
        }
    };

    if tokens.len() == 1
        && (first.is_basic_literal() || first.kind == TokenKind::ExtendedLiteral)
    {
        return Some(first.clone());
    }

    let source = join_source(tokens);
    let expression = context.evaluator().build(&source);

    if !expression.errors().is_empty() {
        let detail: Vec<String> = expression
            .errors()
            .iter()
            .map(|error| error.message.clone())
            .collect();
        report_semantic(
            SemanticError::expression_invalid(&source, &detail.join(" "), first.position),
            diagnostics,
        );
        return None;
    }
    if !expression.free_variables().is_empty() {
        let variables: Vec<String> = expression.free_variables().iter().cloned().collect();
        report_semantic(
            SemanticError::expression_with_variables(&variables, first.position),
            diagnostics,
        );
        return None;
    }
    match expression.eval() {
        Some(value) => Some(Lexeme::classified(value.as_literal_text(), first.position)),
        None => {
            report_semantic(
                SemanticError::expression_not_constant(&source, first.position),
                diagnostics,
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::testing::StubEvaluator;
    use crate::eval::{ExprValue, LiteralEvaluator};
    use crate::lexical::LexicalAnalyzer;

    fn parse(source: &str) -> (Option<Command>, Vec<Diagnostic>) {
        let (tokens, lex_diagnostics) = LexicalAnalyzer::new().tokenize(source);
        assert!(lex_diagnostics.is_empty(), "test source must lex cleanly");
        let tokens = crate::lexical::fold_unit_suffixes(tokens);
        let evaluator = LiteralEvaluator;
        let context = ParseContext::new(&evaluator);
        let mut diagnostics = Vec::new();
        let command = parse_device(&context, &tokens, &mut diagnostics);
        (command, diagnostics)
    }

    fn device(command: Option<Command>) -> DeviceCommand {
        match command {
            Some(Command::Device(device)) => device,
            other => panic!("expected device command, got {other:?}"),
        }
    }

    #[test]
    fn test_full_device() {
        let (command, diagnostics) = parse(
            "DEVICE lamp DRIVER relay CONFIG Pin = 5; mode = \"out\" INIT state = false",
        );
        assert!(diagnostics.is_empty());
        let device = device(command);
        assert_eq!(device.name, "lamp");
        assert_eq!(device.driver_name.as_deref(), Some("relay"));
        assert_eq!(device.driver_init["pin"].text, "5");
        assert_eq!(device.driver_init["mode"].text, "\"out\"");
        assert_eq!(device.device_init["state"].text, "false");
    }

    #[test]
    fn test_property_keys_fold_to_lower_case() {
        let (command, _) = parse("DEVICE lamp DRIVER relay CONFIG BaudRate = 9600");
        let device = device(command);
        assert!(device.driver_init.contains_key("baudrate"));
        assert!(!device.driver_init.contains_key("BaudRate"));
    }

    #[test]
    fn test_duplicate_property_keeps_first() {
        let (command, diagnostics) =
            parse("DEVICE lamp DRIVER relay CONFIG pin = 5; PIN = 6");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("Duplicate property"));
        let device = device(command);
        assert_eq!(device.driver_init["pin"].text, "5");
    }

    #[test]
    fn test_variable_value_rejected() {
        let (command, diagnostics) = parse("DEVICE lamp DRIVER relay CONFIG pin = unknown");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].message,
            "Expression with variables not allowed here."
        );
        // command still parses, property is just dropped
        let device = device(command);
        assert!(device.driver_init.is_empty());
    }

    #[test]
    fn test_config_without_driver_reported() {
        let (command, diagnostics) = parse("DEVICE lamp CONFIG pin = 5");
        assert!(command.is_some());
        assert!(diagnostics
            .iter()
            .any(|d| d.message.contains("Missing DRIVER clause")));
    }

    #[test]
    fn test_missing_name_fails() {
        let (command, diagnostics) = parse("DEVICE");
        assert!(command.is_none());
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("Missing name clause"));
    }

    #[test]
    fn test_reserved_name_fails() {
        let (command, diagnostics) = parse("DEVICE WHEN");
        assert!(command.is_none());
        assert!(diagnostics[0].message.contains("Reserved word"));
    }

    #[test]
    fn test_init_only_device() {
        let (command, diagnostics) = parse("DEVICE sensor INIT interval = 10s");
        assert!(diagnostics.is_empty());
        let device = device(command);
        assert!(device.driver_name.is_none());
        assert_eq!(device.device_init["interval"].text, "10000");
    }

    #[test]
    fn test_evaluator_folds_constant_expression() {
        let (tokens, _) = LexicalAnalyzer::new().tokenize("DEVICE lamp DRIVER relay CONFIG pin = 5 + 3");
        let evaluator = StubEvaluator::constant(ExprValue::Number(8.0));
        let context = ParseContext::new(&evaluator);
        let mut diagnostics = Vec::new();
        let command = parse_device(&context, &tokens, &mut diagnostics);
        assert!(diagnostics.is_empty());
        let device = device(command);
        assert_eq!(device.driver_init["pin"].text, "8");
        assert_eq!(device.driver_init["pin"].kind, TokenKind::Number);
    }

    #[test]
    fn test_non_constant_expression_reported() {
        let (_, diagnostics) = parse("DEVICE lamp DRIVER relay CONFIG pin = 5 + 3");
        // the literal evaluator does no arithmetic
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("is not constant"));
    }
}
