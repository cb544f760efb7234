//! Command parsing layer.
//!
//! One parser per command form, all sharing the same contract: consume a
//! token chunk, append any problems to the unit's diagnostics, and return
//! the parsed command when enough of it survived to be useful. A parse
//! never throws past a command boundary.

pub mod actions;
pub mod device;
pub mod driver;
pub mod error;
pub mod include;
pub mod rule;
pub mod use_command;

pub use error::{SemanticError, SyntaxError};

use crate::config::constants::compile_time::syntax::MAX_CLAUSE_ITEMS;
use crate::diagnostics::Diagnostic;
use crate::eval::Evaluator;
use crate::grammar::{language, Command, Keyword};
use crate::tokens::{split_items, Lexeme};

/// Run-wide parsing state shared by every unit in one transpilation run
pub struct ParseContext<'a> {
    evaluator: &'a dyn Evaluator,
    rule_counter: u32,
}

impl<'a> ParseContext<'a> {
    pub fn new(evaluator: &'a dyn Evaluator) -> Self {
        Self {
            evaluator,
            rule_counter: 0,
        }
    }

    pub fn evaluator(&self) -> &dyn Evaluator {
        self.evaluator
    }

    /// Next generated name for an anonymous rule. Run-scoped, so generated
    /// names stay unique across every included file of one run.
    pub fn next_rule_name(&mut self) -> String {
        self.rule_counter += 1;
        format!("rule-{}", self.rule_counter)
    }
}

/// Parse one command chunk. `None` means nothing recognizable started the
/// chunk; a `Some` command may still have produced diagnostics.
pub fn parse_command(
    context: &mut ParseContext,
    chunk: &[Lexeme],
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<Command> {
    let first = chunk.first()?;
    match first.keyword() {
        Some(Keyword::Device) => device::parse_device(context, chunk, diagnostics),
        Some(Keyword::Driver) => driver::parse_driver(chunk, diagnostics),
        Some(Keyword::Rule) | Some(Keyword::When) => rule::parse_rule(context, chunk, diagnostics),
        Some(Keyword::Include) => include::parse_include(chunk, diagnostics),
        Some(Keyword::Use) => use_command::parse_use(chunk, diagnostics),
        _ => {
            report_syntax(
                SyntaxError::unknown_command(&first.text, first.position),
                diagnostics,
            );
            None
        }
    }
}

/// Whether a chunk starts a resolution-time command (Include or Use).
/// These are consumed in phase 1, before the macro table freezes.
pub fn is_resolution_chunk(chunk: &[Lexeme]) -> bool {
    matches!(
        chunk.first().and_then(|token| token.keyword()),
        Some(Keyword::Include) | Some(Keyword::Use)
    )
}

pub(crate) fn report_syntax(error: SyntaxError, diagnostics: &mut Vec<Diagnostic>) {
    crate::log_error!(error.error_code(), &error.to_string(), position = error.position());
    diagnostics.push(error.into_diagnostic());
}

pub(crate) fn report_semantic(error: SemanticError, diagnostics: &mut Vec<Diagnostic>) {
    crate::log_error!(error.error_code(), &error.to_string(), position = error.position());
    diagnostics.push(error.into_diagnostic());
}

/// Validate a declared name: reserved words first, then shape and length
pub(crate) fn validated_name(
    token: &Lexeme,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<String> {
    if language::is_reserved_word(&token.text) {
        report_syntax(
            SyntaxError::reserved_word(&token.text, token.position),
            diagnostics,
        );
        return None;
    }
    if !language::is_valid_name(&token.text) {
        report_syntax(
            SyntaxError::invalid_name(&token.text, token.position),
            diagnostics,
        );
        return None;
    }
    Some(token.text.clone())
}

/// Split clause tokens into `;`/newline separated items, capped at the
/// clause item ceiling.
pub(crate) fn bounded_items(
    clause: &'static str,
    tokens: &[Lexeme],
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<Vec<Lexeme>> {
    let mut items = split_items(tokens);
    if items.len() > MAX_CLAUSE_ITEMS {
        // SECURITY: cap per-clause item count; the remainder is dropped
        let position = tokens
            .first()
            .map(|token| token.position)
            .unwrap_or_else(crate::utils::Position::start);
        report_syntax(
            SyntaxError::TooManyItems {
                clause,
                limit: MAX_CLAUSE_ITEMS,
                position,
            },
            diagnostics,
        );
        items.truncate(MAX_CLAUSE_ITEMS);
    }
    items
}
