//! USE command parser (global macro declarations).
//!
//! `USE <pattern> AS <replacement>[; <pattern> AS <replacement>...]`
//!
//! A pattern or replacement given as one quoted literal is unquoted and
//! re-classified word by word, so `USE "EQUALS" AS "=="` yields an
//! Operator-kind replacement. `INCLUDE` and `USE` themselves drive the
//! resolution process and stay rewrite-immune.

use crate::diagnostics::Diagnostic;
use crate::grammar::{Command, Keyword, RewriteRule, UseCommand};
use crate::syntax::{bounded_items, report_semantic, report_syntax, SemanticError, SyntaxError};
use crate::tokens::{join_source, Lexeme, TokenKind};

const PROTECTED_PATTERNS: [&str; 2] = ["INCLUDE", "USE"];

pub(crate) fn parse_use(chunk: &[Lexeme], diagnostics: &mut Vec<Diagnostic>) -> Option<Command> {
    let position = chunk.first()?.position;
    if chunk.len() == 1 {
        report_syntax(SyntaxError::empty_clause("USE", position), diagnostics);
        return None;
    }

    let mut rewrites = Vec::new();
    for item in bounded_items("USE", &chunk[1..], diagnostics) {
        let as_index = match item
            .iter()
            .position(|token| token.keyword() == Some(Keyword::As))
        {
            Some(index) => index,
            None => {
                report_syntax(
                    SyntaxError::unexpected_token("AS", "end of item", item[0].position),
                    diagnostics,
                );
                continue;
            }
        };

        let pattern = normalize(&item[..as_index]);
        if pattern.is_empty() {
            report_syntax(
                SyntaxError::unexpected_token("a pattern before AS", "nothing", item[0].position),
                diagnostics,
            );
            continue;
        }
        let replacement = normalize(&item[as_index + 1..]);
        if replacement.is_empty() {
            report_syntax(
                SyntaxError::unexpected_token(
                    "a replacement after AS",
                    "end of item",
                    item[as_index].position,
                ),
                diagnostics,
            );
            continue;
        }

        if is_protected(&pattern) {
            report_semantic(
                SemanticError::protected_pattern(&join_source(&pattern), pattern[0].position),
                diagnostics,
            );
            continue;
        }

        rewrites.push(RewriteRule {
            pattern,
            replacement,
        });
    }

    if rewrites.is_empty() {
        return None;
    }
    Some(Command::Use(UseCommand { rewrites, position }))
}

/// A single quoted token stands for its unquoted content, one classified
/// lexeme per whitespace-separated word. Anything else passes through.
fn normalize(tokens: &[Lexeme]) -> Vec<Lexeme> {
    if let [single] = tokens {
        if single.is_kind(TokenKind::String) {
            return single
                .string_content()
                .split_whitespace()
                .map(|word| Lexeme::classified(word, single.position))
                .collect();
        }
    }
    tokens.to_vec()
}

fn is_protected(pattern: &[Lexeme]) -> bool {
    pattern.len() == 1
        && PROTECTED_PATTERNS
            .iter()
            .any(|protected| pattern[0].matches_text(protected))
}
