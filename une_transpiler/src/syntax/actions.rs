//! THEN clause action parsing.
//!
//! Each `;`/newline separated item becomes one [`Action`]. The shape of
//! the item decides its kind: a lone name invokes a rule or script, a
//! `target = ...` form assigns, anything else rides along as a bare
//! expression. An `AFTER <ms>` modifier may sit anywhere in the item and
//! is pulled out into the action's delay.

use crate::diagnostics::Diagnostic;
use crate::grammar::{Action, ActionKind, Keyword};
use crate::syntax::{bounded_items, report_syntax, SyntaxError};
use crate::tokens::{join_source, Lexeme, TokenKind};

pub(crate) fn parse_actions(
    tokens: &[Lexeme],
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<Action> {
    let mut actions = Vec::new();
    for item in bounded_items("THEN", tokens, diagnostics) {
        if let Some(action) = parse_action_item(&item, diagnostics) {
            actions.push(action);
        }
    }
    actions
}

fn parse_action_item(item: &[Lexeme], diagnostics: &mut Vec<Diagnostic>) -> Option<Action> {
    let original = join_source(item);
    let (tokens, delay_ms) = extract_delay(item, diagnostics);

    if tokens.is_empty() {
        report_syntax(
            SyntaxError::invalid_action(&original, item[0].position),
            diagnostics,
        );
        return None;
    }

    let kind = if is_assignment(&tokens) {
        let target = tokens[0].text.clone();
        let rhs = &tokens[2..];
        match rhs.len() {
            0 => {
                report_syntax(
                    SyntaxError::unexpected_token(
                        "a value after '='",
                        "end of item",
                        tokens[1].position,
                    ),
                    diagnostics,
                );
                return None;
            }
            1 => classify_single_assignment(target, &rhs[0]),
            _ => ActionKind::AssignExpression {
                target,
                code: join_source(rhs),
            },
        }
    } else if tokens.len() == 1 {
        let token = &tokens[0];
        if token.kind == TokenKind::Name {
            ActionKind::RuleOrScript {
                name: token.text.clone(),
            }
        } else if token.is_basic_literal() {
            // a bare literal does nothing; reject rather than emit a no-op
            report_syntax(
                SyntaxError::invalid_action(&original, token.position),
                diagnostics,
            );
            return None;
        } else {
            ActionKind::Expression {
                code: token.text.clone(),
            }
        }
    } else {
        ActionKind::Expression {
            code: join_source(&tokens),
        }
    };

    Some(Action { kind, delay_ms })
}

fn is_assignment(tokens: &[Lexeme]) -> bool {
    tokens.len() >= 2
        && tokens[0].kind == TokenKind::Name
        && tokens[1].kind == TokenKind::Operator
        && tokens[1].text == "="
}

fn classify_single_assignment(target: String, value: &Lexeme) -> ActionKind {
    if value.is_basic_literal() || value.kind == TokenKind::ExtendedLiteral {
        ActionKind::AssignBasicData {
            target,
            value: value.clone(),
        }
    } else if value.kind == TokenKind::Name {
        ActionKind::AssignDevice {
            target,
            source_device: value.text.clone(),
        }
    } else {
        ActionKind::AssignExpression {
            target,
            code: value.text.clone(),
        }
    }
}

/// Pull `AFTER <number>` out of the item, wherever it appears. The
/// delay has already been through suffix folding, so the operand is
/// plain milliseconds here.
fn extract_delay(item: &[Lexeme], diagnostics: &mut Vec<Diagnostic>) -> (Vec<Lexeme>, u64) {
    let mut remaining: Vec<Lexeme> = Vec::with_capacity(item.len());
    let mut delay_ms = 0u64;
    let mut index = 0;

    while index < item.len() {
        let token = &item[index];
        if token.keyword() == Some(Keyword::After) {
            match item.get(index + 1) {
                Some(operand) if operand.kind == TokenKind::Number => {
                    match operand.text.parse::<f64>() {
                        Ok(value) if value >= 0.0 => delay_ms = value as u64,
                        _ => report_syntax(
                            SyntaxError::InvalidDelay {
                                found: format!("'{}'", operand.text),
                                position: operand.position,
                            },
                            diagnostics,
                        ),
                    }
                    index += 2;
                    continue;
                }
                Some(operand) => {
                    report_syntax(
                        SyntaxError::InvalidDelay {
                            found: format!("'{}'", operand.text),
                            position: operand.position,
                        },
                        diagnostics,
                    );
                    index += 1;
                    continue;
                }
                None => {
                    report_syntax(
                        SyntaxError::InvalidDelay {
                            found: "end of item".to_string(),
                            position: token.position,
                        },
                        diagnostics,
                    );
                    index += 1;
                    continue;
                }
            }
        }
        remaining.push(token.clone());
        index += 1;
    }

    (remaining, delay_ms)
}
