//! One unit of transpilation.
//!
//! Wraps a loaded source and everything derived from it: the command
//! chunks, the commands parsed out of them across the two phases, and
//! three append-only diagnostic buckets. Commands and diagnostics only
//! ever grow; nothing recorded against a unit is discarded later.

use crate::config::runtime::LexicalPreferences;
use crate::diagnostics::Diagnostic;
use crate::grammar::{Command, IncludeCommand, Keyword};
use crate::lexical::{create_analyzer_with_preferences, fold_unit_suffixes};
use crate::resolve::SourceUnit;
use crate::rewrite::MacroContext;
use crate::syntax::{self, ParseContext};
use crate::tokens::{split_commands, Lexeme};

#[derive(Debug)]
pub struct TranspilationUnit {
    source: SourceUnit,
    /// Seen-set key: resolved URI plus any parameter bindings
    key: String,
    /// Row bindings from a parameterized include; applied to every chunk
    /// before the run-wide macro table
    bindings: MacroContext,
    chunks: Vec<Vec<Lexeme>>,
    consumed: Vec<bool>,
    commands: Vec<Command>,
    lexer_diagnostics: Vec<Diagnostic>,
    command_diagnostics: Vec<Diagnostic>,
    /// Findings other stages charge to this unit, such as cross-file
    /// name collisions and include-expansion failures
    external_diagnostics: Vec<Diagnostic>,
}

impl TranspilationUnit {
    pub fn new(source: SourceUnit, key: String, bindings: MacroContext) -> Self {
        let mut lexer_diagnostics = Vec::new();
        if let Some(error) = &source.load_error {
            lexer_diagnostics.push(Diagnostic::new(error.to_string(), 1, 1));
        }
        Self {
            source,
            key,
            bindings,
            chunks: Vec::new(),
            consumed: Vec::new(),
            commands: Vec::new(),
            lexer_diagnostics,
            command_diagnostics: Vec::new(),
            external_diagnostics: Vec::new(),
        }
    }

    /// Lex the raw source, fold unit suffixes, and split the token
    /// stream into command chunks. Terminal units stay empty.
    pub fn tokenize(&mut self, preferences: &LexicalPreferences) {
        if self.source.is_terminal() {
            return;
        }
        let mut analyzer = create_analyzer_with_preferences(preferences.clone());
        let (tokens, diagnostics) = analyzer.tokenize(&self.source.raw_code);
        self.lexer_diagnostics.extend(diagnostics);
        let tokens = fold_unit_suffixes(tokens);
        self.chunks = split_commands(&tokens);
        self.consumed = vec![false; self.chunks.len()];
    }

    /// Phase 1: parse only INCLUDE and USE chunks. Includes are handed
    /// back for the resolver to recurse into; USE declarations go into
    /// the run-wide macro table.
    pub fn phase_one(&mut self, macros: &mut MacroContext) -> Vec<IncludeCommand> {
        let mut includes = Vec::new();
        for index in 0..self.chunks.len() {
            let keyword = self.chunks[index].first().and_then(|token| token.keyword());
            match keyword {
                Some(Keyword::Include) => {
                    self.consumed[index] = true;
                    let chunk = self
                        .bindings
                        .apply(self.chunks[index].clone(), &mut self.command_diagnostics);
                    if let Some(command) =
                        syntax::include::parse_include(&chunk, &mut self.command_diagnostics)
                    {
                        if let Command::Include(include) = &command {
                            includes.push(include.clone());
                        }
                        self.commands.push(command);
                    }
                }
                Some(Keyword::Use) => {
                    self.consumed[index] = true;
                    let chunk = self
                        .bindings
                        .apply(self.chunks[index].clone(), &mut self.command_diagnostics);
                    if let Some(command) =
                        syntax::use_command::parse_use(&chunk, &mut self.command_diagnostics)
                    {
                        if let Command::Use(use_command) = &command {
                            macros.register_all(use_command, &mut self.command_diagnostics);
                        }
                        self.commands.push(command);
                    }
                }
                _ => {}
            }
        }
        includes
    }

    /// Phase 2: parse every remaining chunk with the frozen macro table
    /// applied first.
    pub fn phase_two(&mut self, macros: &MacroContext, context: &mut ParseContext) {
        for index in 0..self.chunks.len() {
            if self.consumed[index] {
                continue;
            }
            self.consumed[index] = true;
            let chunk = self
                .bindings
                .apply(self.chunks[index].clone(), &mut self.command_diagnostics);
            let chunk = macros.apply(chunk, &mut self.command_diagnostics);
            if let Some(command) =
                syntax::parse_command(context, &chunk, &mut self.command_diagnostics)
            {
                self.commands.push(command);
            }
        }

        crate::log_debug!("Unit parsed",
            "commands" => self.commands.len(),
            "diagnostics" => self.diagnostic_count()
        );
    }

    pub fn uri(&self) -> &str {
        &self.source.uri
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn source(&self) -> &SourceUnit {
        &self.source
    }

    pub fn is_terminal(&self) -> bool {
        self.source.is_terminal()
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.lexer_diagnostics
            .iter()
            .chain(&self.command_diagnostics)
            .chain(&self.external_diagnostics)
    }

    pub fn diagnostic_count(&self) -> usize {
        self.lexer_diagnostics.len()
            + self.command_diagnostics.len()
            + self.external_diagnostics.len()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostic_count() > 0
    }

    /// Record a finding made outside this unit's own parse
    pub fn push_external(&mut self, diagnostic: Diagnostic) {
        self.external_diagnostics.push(diagnostic);
    }
}
