//! RULE command parser.
//!
//! `[RULE <name>] WHEN <expr> [IF <expr>] THEN <actions> [USE <x> AS <e>;...]`
//!
//! The trailing USE clause is rule-local aliasing, not the global macro
//! table: each used alias `x` becomes a `get("<rule>-<x>")` call wherever
//! it appears in WHEN/IF/THEN, and the WHEN expression gains a leading
//! `put("<rule>-<x>", e) &&` so the value is bound before the test runs.
//! An alias that never occurs is reported and leaves WHEN untouched.

use crate::diagnostics::Diagnostic;
use crate::grammar::{language, Command, Keyword, RuleCommand};
use crate::syntax::{
    actions, bounded_items, report_semantic, report_syntax, validated_name, ParseContext,
    SemanticError, SyntaxError,
};
use crate::tokens::{Lexeme, TokenKind};
use crate::utils::Position;

pub(crate) fn parse_rule(
    context: &mut ParseContext,
    chunk: &[Lexeme],
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<Command> {
    let position = chunk.first()?.position;
    let clauses = crate::tokens::split_clauses(
        chunk,
        &[
            Keyword::Rule,
            Keyword::When,
            Keyword::If,
            Keyword::Then,
            Keyword::Use,
        ],
    );

    let name = match clauses.get(Keyword::Rule) {
        Some(clause) => match clause.tokens.first() {
            Some(token) => {
                if clause.tokens.len() > 1 {
                    report_syntax(
                        SyntaxError::unexpected_token(
                            "a single rule name",
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
                    SyntaxError::empty_clause("RULE", clause.opener.position),
                    diagnostics,
                );
                None
            }
        },
        None => None,
    };
    let generated_name = match &name {
        Some(name) => name.clone(),
        None => context.next_rule_name(),
    };

    let mut when = match clauses.get(Keyword::When) {
        Some(clause) if !clause.tokens.is_empty() => clause.tokens.clone(),
        Some(clause) => {
            report_syntax(
                SyntaxError::empty_clause("WHEN", clause.opener.position),
                diagnostics,
            );
            return None;
        }
        None => {
            report_syntax(
                SyntaxError::missing_clause("WHEN", "RULE", position),
                diagnostics,
            );
            return None;
        }
    };

    let mut if_clause = match clauses.get(Keyword::If) {
        Some(clause) if !clause.tokens.is_empty() => Some(clause.tokens.clone()),
        Some(clause) => {
            report_syntax(
                SyntaxError::empty_clause("IF", clause.opener.position),
                diagnostics,
            );
            None
        }
        None => None,
    };

    let mut then_tokens = match clauses.get(Keyword::Then) {
        Some(clause) if !clause.tokens.is_empty() => clause.tokens.clone(),
        Some(clause) => {
            report_syntax(
                SyntaxError::empty_clause("THEN", clause.opener.position),
                diagnostics,
            );
            return None;
        }
        None => {
            report_syntax(
                SyntaxError::missing_clause("THEN", "RULE", position),
                diagnostics,
            );
            return None;
        }
    };

    if let Some(use_clause) = clauses.get(Keyword::Use) {
        apply_aliases(
            &generated_name,
            &use_clause.tokens,
            &mut when,
            &mut if_clause,
            &mut then_tokens,
            diagnostics,
        );
    }

    let then = actions::parse_actions(&then_tokens, diagnostics);

    Some(Command::Rule(RuleCommand {
        name,
        generated_name,
        when,
        if_clause,
        then,
        position,
    }))
}

/// Process `<alias> AS <expr>` items in declaration order. Each used
/// alias contributes one `put(...) &&` prefix; prefixes land in front of
/// WHEN in the same order the aliases were declared.
fn apply_aliases(
    rule_name: &str,
    use_tokens: &[Lexeme],
    when: &mut Vec<Lexeme>,
    if_clause: &mut Option<Vec<Lexeme>>,
    then_tokens: &mut Vec<Lexeme>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let mut prefixes: Vec<Lexeme> = Vec::new();

    for item in bounded_items("USE", use_tokens, diagnostics) {
        let alias = match validated_name(&item[0], diagnostics) {
            Some(alias) => alias,
            None => continue,
        };

        match item.get(1) {
            Some(token) if token.keyword() == Some(Keyword::As) => {}
            Some(token) => {
                report_syntax(
                    SyntaxError::unexpected_token("AS", &token.text, token.position),
                    diagnostics,
                );
                continue;
            }
            None => {
                report_syntax(
                    SyntaxError::unexpected_token("AS", "end of item", item[0].position),
                    diagnostics,
                );
                continue;
            }
        }

        let replacement = &item[2..];
        match replacement {
            [] => {
                report_syntax(
                    SyntaxError::unexpected_token(
                        "an expression after AS",
                        "end of item",
                        item[0].position,
                    ),
                    diagnostics,
                );
                continue;
            }
            [single] if language::is_reserved_word(&single.text) => {
                report_syntax(
                    SyntaxError::reserved_word(&single.text, single.position),
                    diagnostics,
                );
                continue;
            }
            _ => {}
        }

        let key = format!("{rule_name}-{alias}");
        let mut replaced = splice_alias(when, &alias, &key);
        if let Some(tokens) = if_clause.as_mut() {
            replaced += splice_alias(tokens, &alias, &key);
        }
        replaced += splice_alias(then_tokens, &alias, &key);

        if replaced == 0 {
            report_semantic(
                SemanticError::unused_alias(&alias, item[0].position),
                diagnostics,
            );
        } else {
            prefixes.extend(put_prefix(&key, replacement, item[0].position));
        }
    }

    if !prefixes.is_empty() {
        prefixes.append(when);
        *when = prefixes;
    }
}

/// Replace every whole-token occurrence of the alias with a
/// `get("<key>")` call. Matching is case-insensitive and never rescans
/// spliced-in tokens.
fn splice_alias(tokens: &mut Vec<Lexeme>, alias: &str, key: &str) -> usize {
    let mut replaced = 0;
    let mut index = 0;
    while index < tokens.len() {
        if tokens[index].matches_text(alias) {
            let position = tokens[index].position;
            let call = get_call(key, position);
            let advance = call.len();
            tokens.splice(index..index + 1, call);
            index += advance;
            replaced += 1;
        } else {
            index += 1;
        }
    }
    replaced
}

fn get_call(key: &str, position: Position) -> Vec<Lexeme> {
    vec![
        Lexeme::new(TokenKind::Name, "get", position),
        Lexeme::new(TokenKind::Parenthesis, "(", position),
        Lexeme::new(TokenKind::String, format!("\"{key}\""), position),
        Lexeme::new(TokenKind::Parenthesis, ")", position),
    ]
}

fn put_prefix(key: &str, replacement: &[Lexeme], position: Position) -> Vec<Lexeme> {
    let mut tokens = vec![
        Lexeme::new(TokenKind::Name, "put", position),
        Lexeme::new(TokenKind::Parenthesis, "(", position),
        Lexeme::new(TokenKind::String, format!("\"{key}\""), position),
        Lexeme::new(TokenKind::Operator, ",", position),
    ];
    tokens.extend(replacement.iter().cloned());
    tokens.push(Lexeme::new(TokenKind::Parenthesis, ")", position));
    tokens.push(Lexeme::new(TokenKind::Operator, "&&", position));
    tokens
}
