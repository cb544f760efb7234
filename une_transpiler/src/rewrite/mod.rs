//! Run-scoped macro rewrite engine.
//!
//! Phase 1 collects USE declarations from every unit into one
//! MacroContext; phase 2 applies the full table to every other command's
//! token stream. Whole tokens match a pattern as a contiguous,
//! case-insensitive subsequence and are spliced out for deep-cloned,
//! reclassified replacement tokens. String and inline-code tokens carry
//! the bracketed form `{*pattern*}` instead and get a text substitution.
//!
//! The context lives exactly one transpilation run and is never shared
//! between runs.

use std::collections::HashSet;

use regex::Regex;

use crate::config::constants::compile_time::resolution::{
    MAX_EXPANSIONS_PER_CHUNK, MAX_MACRO_RULES,
};
use crate::diagnostics::Diagnostic;
use crate::grammar::{RewriteRule, UseCommand};
use crate::logging::codes;
use crate::syntax::{report_semantic, SemanticError};
use crate::tokens::{join_source, Lexeme, TokenKind};
use crate::utils::Position;

// ===== Macro Rules =====

/// One registered rewrite rule in canonical form
#[derive(Debug, Clone)]
pub struct MacroRule {
    /// Uppercase canonical pattern text, the registration key
    key: String,
    /// Uppercase word per pattern token
    words: Vec<String>,
    replacement: Vec<Lexeme>,
    /// Canonical replacement text, used for in-string substitution
    replacement_source: String,
    /// Matches the bracketed in-string form of the pattern
    string_form: Option<Regex>,
}

impl MacroRule {
    fn from_rewrite(rewrite: &RewriteRule) -> Self {
        let words: Vec<String> = rewrite
            .pattern
            .iter()
            .map(|token| token.text.to_uppercase())
            .collect();
        let key = words.join(" ");
        let escaped: Vec<String> = words.iter().map(|word| regex::escape(word)).collect();
        // Words are escaped, so compilation only fails on pathological
        // pattern lengths; such a rule simply skips in-string matching.
        let string_form =
            Regex::new(&format!(r"(?i)\{{\*\s*{}\s*\*\}}", escaped.join(r"\s+"))).ok();
        Self {
            key,
            words,
            replacement: rewrite.replacement.clone(),
            replacement_source: join_source(&rewrite.replacement),
            string_form,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn matches_at(&self, tokens: &[Lexeme], index: usize) -> bool {
        tokens.len() - index >= self.words.len()
            && self
                .words
                .iter()
                .zip(&tokens[index..])
                .all(|(word, token)| token.matches_text(word))
    }

    /// Deep-cloned replacement, each token reclassified at the match site
    fn spliced(&self, site: Position) -> Vec<Lexeme> {
        self.replacement
            .iter()
            .map(|token| Lexeme::classified(token.text.clone(), site))
            .collect()
    }

    /// Rewrite `{*pattern*}` occurrences inside a literal's text
    fn substitute_in_text(&self, token: &Lexeme) -> Option<Lexeme> {
        let regex = self.string_form.as_ref()?;
        if !regex.is_match(&token.text) {
            return None;
        }
        let text = regex
            .replace_all(&token.text, regex::NoExpand(&self.replacement_source))
            .into_owned();
        Some(token.rewritten(text))
    }
}

// ===== Macro Context =====

/// Rewrite table scoped to one transpilation run
#[derive(Debug, Default)]
pub struct MacroContext {
    rules: Vec<MacroRule>,
    keys: HashSet<String>,
}

impl MacroContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> &[MacroRule] {
        &self.rules
    }

    /// Register every pair a USE command declares
    pub fn register_all(&mut self, command: &UseCommand, diagnostics: &mut Vec<Diagnostic>) {
        for rewrite in &command.rewrites {
            self.register(rewrite, command.position, diagnostics);
        }
    }

    /// Register one pattern/replacement pair. Duplicates and table
    /// overflow are reported against the registering unit.
    pub fn register(
        &mut self,
        rewrite: &RewriteRule,
        position: Position,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> bool {
        // SECURITY: cap the table so included files cannot grow it unboundedly.
        if self.rules.len() >= MAX_MACRO_RULES {
            crate::log_error!(codes::resolution::TOO_MANY_MACRO_RULES, "Macro table full",
                position = position,
                "limit" => MAX_MACRO_RULES
            );
            diagnostics.push(Diagnostic::at(
                format!("Macro table limit of {MAX_MACRO_RULES} rules exceeded."),
                position,
            ));
            return false;
        }

        let rule = MacroRule::from_rewrite(rewrite);
        if !self.keys.insert(rule.key.clone()) {
            report_semantic(
                SemanticError::duplicate_pattern(&rule.key, position),
                diagnostics,
            );
            return false;
        }

        crate::log_debug!("Macro registered",
            "pattern" => rule.key,
            "replacement" => rule.replacement_source
        );
        self.rules.push(rule);
        true
    }

    /// Apply every registered rule to one command's token stream
    pub fn apply(&self, tokens: Vec<Lexeme>, diagnostics: &mut Vec<Diagnostic>) -> Vec<Lexeme> {
        if self.rules.is_empty() {
            return tokens;
        }

        let mut tokens = tokens;
        let mut expansions = 0usize;
        for rule in &self.rules {
            if !apply_rule(rule, &mut tokens, &mut expansions, diagnostics) {
                break;
            }
        }
        tokens
    }
}

/// One full pass of a single rule. Spliced-in replacements are never
/// rescanned by the same pass, so a rule cannot rematch its own output.
fn apply_rule(
    rule: &MacroRule,
    tokens: &mut Vec<Lexeme>,
    expansions: &mut usize,
    diagnostics: &mut Vec<Diagnostic>,
) -> bool {
    let mut index = 0;
    while index < tokens.len() {
        let position = tokens[index].position;
        let kind = tokens[index].kind;

        if kind == TokenKind::String || kind == TokenKind::InlineCode {
            if let Some(replaced) = rule.substitute_in_text(&tokens[index]) {
                if !count_expansion(expansions, position, diagnostics) {
                    return false;
                }
                tokens[index] = replaced;
            }
            index += 1;
            continue;
        }

        if rule.matches_at(tokens, index) {
            if !count_expansion(expansions, position, diagnostics) {
                return false;
            }
            let spliced = rule.spliced(position);
            let advance = spliced.len();
            tokens.splice(index..index + rule.words.len(), spliced);
            index += advance;
        } else {
            index += 1;
        }
    }
    true
}

fn count_expansion(
    expansions: &mut usize,
    position: Position,
    diagnostics: &mut Vec<Diagnostic>,
) -> bool {
    *expansions += 1;
    // SECURITY: bound total rewrites per chunk.
    if *expansions > MAX_EXPANSIONS_PER_CHUNK {
        crate::log_error!(codes::resolution::TOO_MANY_EXPANSIONS, "Macro expansion limit exceeded",
            position = position,
            "limit" => MAX_EXPANSIONS_PER_CHUNK
        );
        diagnostics.push(Diagnostic::at(
            format!("Macro expansion limit of {MAX_EXPANSIONS_PER_CHUNK} exceeded."),
            position,
        ));
        return false;
    }
    true
}
