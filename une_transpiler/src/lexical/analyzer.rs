//! Lexical analyzer for Une source text.
//!
//! Turns raw source into a flat `Lexeme` sequence plus lexer-level
//! diagnostics. The scanner never aborts: unrecognized input becomes an
//! Error-kind lexeme and scanning continues past it, so downstream phases
//! always receive the full token picture of a unit.

use std::iter::Peekable;
use std::str::CharIndices;
use std::sync::OnceLock;

use regex::Regex;

use crate::config::constants::compile_time::lexical::{
    MAX_INLINE_CODE_LENGTH, MAX_LIST_LENGTH, MAX_SOURCE_SIZE, MAX_STRING_LENGTH, MAX_TOKEN_COUNT,
};
use crate::config::runtime::LexicalPreferences;
use crate::diagnostics::Diagnostic;
use crate::grammar::language;
use crate::logging::codes;
use crate::tokens::{Lexeme, TokenKind};
use crate::utils::Position;

// ============================================================================
// LOOKAHEAD PATTERNS
// ============================================================================

static DATE_LOOKAHEAD: OnceLock<Regex> = OnceLock::new();
static TIME_LOOKAHEAD: OnceLock<Regex> = OnceLock::new();

fn date_lookahead() -> &'static Regex {
    DATE_LOOKAHEAD.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}").unwrap())
}

fn time_lookahead() -> &'static Regex {
    TIME_LOOKAHEAD.get_or_init(|| Regex::new(r"^\d{1,2}:\d{2}(:\d{2})?").unwrap())
}

// ============================================================================
// METRICS
// ============================================================================

/// Counters collected during one tokenization pass
#[derive(Debug, Default, Clone)]
pub struct LexicalMetrics {
    pub total_tokens: usize,
    pub keyword_tokens: usize,
    pub name_tokens: usize,
    pub number_tokens: usize,
    pub string_tokens: usize,
    pub operator_tokens: usize,
    pub delimiter_tokens: usize,
    pub error_tokens: usize,
    pub max_string_length: usize,
    pub max_inline_code_length: usize,
    pub bytes_processed: usize,
    pub lines_processed: usize,
}

impl LexicalMetrics {
    pub(crate) fn record_token(&mut self, lexeme: &Lexeme) {
        self.total_tokens += 1;
        match lexeme.kind {
            TokenKind::Keyword => self.keyword_tokens += 1,
            TokenKind::Name => self.name_tokens += 1,
            TokenKind::Number => self.number_tokens += 1,
            TokenKind::String => {
                self.string_tokens += 1;
                self.max_string_length = self.max_string_length.max(lexeme.text.len());
            }
            TokenKind::InlineCode => {
                self.max_inline_code_length = self.max_inline_code_length.max(lexeme.text.len());
            }
            TokenKind::Operator => self.operator_tokens += 1,
            TokenKind::Delimiter => self.delimiter_tokens += 1,
            TokenKind::Error => self.error_tokens += 1,
            _ => {}
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Fraction of tokens that are Error-kind
    pub fn error_rate(&self) -> f64 {
        if self.total_tokens == 0 {
            0.0
        } else {
            self.error_tokens as f64 / self.total_tokens as f64
        }
    }
}

// ============================================================================
// SCANNER
// ============================================================================

/// Cursor over source text that keeps line/column/offset in step with
/// every consumed character.
struct Scanner<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
    position: Position,
    tab_width: u32,
}

impl<'a> Scanner<'a> {
    fn new(source: &'a str, tab_width: u32) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            position: Position::start(),
            tab_width,
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    /// Byte offset of the next unconsumed character
    fn next_offset(&mut self) -> usize {
        self.chars
            .peek()
            .map(|&(i, _)| i)
            .unwrap_or(self.source.len())
    }

    /// Unconsumed remainder of the source
    fn rest(&mut self) -> &'a str {
        let offset = self.next_offset();
        &self.source[offset..]
    }

    fn position(&self) -> Position {
        self.position
    }

    fn bump(&mut self) -> Option<char> {
        let (_, ch) = self.chars.next()?;
        self.position = if ch == '\t' {
            self.position.advance_tab(self.tab_width)
        } else {
            self.position.advance(ch)
        };
        Some(ch)
    }
}

// ============================================================================
// ANALYZER
// ============================================================================

/// Stateful tokenizer; one instance can tokenize many units and keeps the
/// metrics of the most recent pass.
pub struct LexicalAnalyzer {
    metrics: LexicalMetrics,
    preferences: LexicalPreferences,
}

impl LexicalAnalyzer {
    pub fn new() -> Self {
        Self::with_preferences(LexicalPreferences::default())
    }

    pub fn with_preferences(preferences: LexicalPreferences) -> Self {
        Self {
            metrics: LexicalMetrics::default(),
            preferences,
        }
    }

    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }

    pub fn preferences(&self) -> &LexicalPreferences {
        &self.preferences
    }

    pub fn set_preferences(&mut self, preferences: LexicalPreferences) {
        self.preferences = preferences;
    }

    /// Tokenize one source text. Problems become diagnostics, never a
    /// hard failure: the caller always gets every lexeme scanned so far.
    pub fn tokenize(&mut self, source: &str) -> (Vec<Lexeme>, Vec<Diagnostic>) {
        self.metrics.reset();
        self.metrics.bytes_processed = source.len();

        let mut tokens: Vec<Lexeme> = Vec::new();
        let mut diagnostics: Vec<Diagnostic> = Vec::new();

        // SECURITY: refuse oversized inputs before scanning anything
        if source.len() > MAX_SOURCE_SIZE {
            crate::log_error!(codes::loading::SOURCE_TOO_LARGE, "Source exceeds maximum size",
                "size" => source.len(),
                "limit" => MAX_SOURCE_SIZE
            );
            diagnostics.push(Diagnostic::new(
                format!("Source exceeds maximum size of {MAX_SOURCE_SIZE} bytes."),
                1,
                1,
            ));
            return (tokens, diagnostics);
        }

        let mut scanner = Scanner::new(source, self.preferences.tab_width);

        while let Some(ch) = scanner.peek() {
            // SECURITY: cap the token count so a pathological unit cannot
            // exhaust memory; everything scanned so far is still returned
            if tokens.len() >= MAX_TOKEN_COUNT {
                crate::log_error!(codes::lexical::TOO_MANY_TOKENS, "Token limit exceeded",
                    position = scanner.position(),
                    "limit" => MAX_TOKEN_COUNT
                );
                diagnostics.push(Diagnostic::at(
                    format!("Token limit of {MAX_TOKEN_COUNT} exceeded; lexing stopped."),
                    scanner.position(),
                ));
                break;
            }

            let start = scanner.position();
            match ch {
                ' ' | '\t' => {
                    scanner.bump();
                }
                '\r' => {
                    scanner.bump();
                    if scanner.peek() == Some('\n') {
                        scanner.bump();
                    }
                    self.push_token(&mut tokens, Lexeme::new(TokenKind::Delimiter, "\n", start));
                }
                '\n' => {
                    scanner.bump();
                    self.push_token(&mut tokens, Lexeme::new(TokenKind::Delimiter, "\n", start));
                }
                ';' => {
                    scanner.bump();
                    // a semicolon owns the rest of its line: the following
                    // line break folds into this one delimiter so `a=1;\nb=2`
                    // stays a single command
                    absorb_line_break(&mut scanner);
                    self.push_token(&mut tokens, Lexeme::new(TokenKind::Delimiter, ";", start));
                }
                '"' => self.scan_string(&mut scanner, start, &mut tokens, &mut diagnostics),
                '{' => self.scan_inline_code(&mut scanner, start, &mut tokens, &mut diagnostics),
                '[' => self.scan_list(&mut scanner, start, &mut tokens, &mut diagnostics),
                '(' | ')' => {
                    scanner.bump();
                    self.push_token(
                        &mut tokens,
                        Lexeme::new(TokenKind::Parenthesis, ch.to_string(), start),
                    );
                }
                c if c.is_ascii_digit() => self.scan_number(&mut scanner, start, &mut tokens),
                '-' if starts_negative_number(&mut scanner, &tokens) => {
                    self.scan_number(&mut scanner, start, &mut tokens)
                }
                c if language::is_operator_char(c) => self.scan_operator(&mut scanner, start, &mut tokens),
                c if c.is_ascii_alphabetic() || c == '_' => {
                    self.scan_word(&mut scanner, start, &mut tokens)
                }
                _ => self.scan_unrecognized(&mut scanner, start, &mut tokens, &mut diagnostics),
            }
        }

        self.metrics.lines_processed = scanner.position().line as usize;

        crate::log_debug!("Lexical analysis complete",
            "tokens" => self.metrics.total_tokens,
            "errors" => self.metrics.error_tokens,
            "lines" => self.metrics.lines_processed
        );
        if self.preferences.log_token_summary {
            crate::log_success!(codes::success::TOKENIZATION_COMPLETE, "Tokenization complete",
                "total_tokens" => self.metrics.total_tokens,
                "keywords" => self.metrics.keyword_tokens,
                "names" => self.metrics.name_tokens,
                "numbers" => self.metrics.number_tokens,
                "strings" => self.metrics.string_tokens,
                "operators" => self.metrics.operator_tokens,
                "errors" => self.metrics.error_tokens,
                "bytes" => self.metrics.bytes_processed
            );
        }

        (tokens, diagnostics)
    }

    fn push_token(&mut self, tokens: &mut Vec<Lexeme>, lexeme: Lexeme) {
        self.metrics.record_token(&lexeme);
        tokens.push(lexeme);
    }

    /// Double-quoted string, quotes kept, no escape processing. Macro
    /// placeholders like `{*name*}` ride along as plain text. A string
    /// must close on its own line.
    fn scan_string(
        &mut self,
        scanner: &mut Scanner,
        start: Position,
        tokens: &mut Vec<Lexeme>,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let mut text = String::from('"');
        scanner.bump();

        loop {
            match scanner.peek() {
                None | Some('\n') | Some('\r') => {
                    diagnostics.push(Diagnostic::at("Unterminated string literal.", start));
                    self.push_token(tokens, Lexeme::new(TokenKind::Error, text, start));
                    return;
                }
                Some('"') => {
                    scanner.bump();
                    text.push('"');
                    break;
                }
                Some(c) => {
                    scanner.bump();
                    text.push(c);
                }
            }
        }

        // SECURITY: bound single-literal size
        if text.len() > MAX_STRING_LENGTH {
            crate::log_error!(codes::lexical::STRING_TOO_LONG, "String literal too long",
                position = start,
                "length" => text.len(),
                "limit" => MAX_STRING_LENGTH
            );
            diagnostics.push(Diagnostic::at(
                format!("String literal exceeds {MAX_STRING_LENGTH} characters."),
                start,
            ));
            self.push_token(tokens, Lexeme::new(TokenKind::Error, text, start));
            return;
        }

        self.push_token(tokens, Lexeme::new(TokenKind::String, text, start));
    }

    /// Inline code: balanced braces, opaque payload, may span lines.
    fn scan_inline_code(
        &mut self,
        scanner: &mut Scanner,
        start: Position,
        tokens: &mut Vec<Lexeme>,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let mut text = String::new();
        let mut depth = 0usize;

        while let Some(c) = scanner.peek() {
            scanner.bump();
            text.push(c);
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        // SECURITY: bound inline payload size
                        if text.len() > MAX_INLINE_CODE_LENGTH {
                            crate::log_error!(
                                codes::lexical::INLINE_CODE_TOO_LONG,
                                "Inline code block too long",
                                position = start,
                                "length" => text.len(),
                                "limit" => MAX_INLINE_CODE_LENGTH
                            );
                            diagnostics.push(Diagnostic::at(
                                format!("Inline code block exceeds {MAX_INLINE_CODE_LENGTH} characters."),
                                start,
                            ));
                            self.push_token(tokens, Lexeme::new(TokenKind::Error, text, start));
                        } else {
                            self.push_token(
                                tokens,
                                Lexeme::new(TokenKind::InlineCode, text, start),
                            );
                        }
                        return;
                    }
                }
                _ => {}
            }
        }

        diagnostics.push(Diagnostic::at("Unterminated inline code block.", start));
        self.push_token(tokens, Lexeme::new(TokenKind::Error, text, start));
    }

    /// List literal: balanced brackets, kept as one extended literal.
    fn scan_list(
        &mut self,
        scanner: &mut Scanner,
        start: Position,
        tokens: &mut Vec<Lexeme>,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let mut text = String::new();
        let mut depth = 0usize;

        while let Some(c) = scanner.peek() {
            scanner.bump();
            text.push(c);
            match c {
                '[' => depth += 1,
                ']' => {
                    depth -= 1;
                    if depth == 0 {
                        // SECURITY: bound list literal size
                        if text.len() > MAX_LIST_LENGTH {
                            crate::log_error!(codes::lexical::LIST_TOO_LONG, "List literal too long",
                                position = start,
                                "length" => text.len(),
                                "limit" => MAX_LIST_LENGTH
                            );
                            diagnostics.push(Diagnostic::at(
                                format!("List literal exceeds {MAX_LIST_LENGTH} characters."),
                                start,
                            ));
                            self.push_token(tokens, Lexeme::new(TokenKind::Error, text, start));
                        } else {
                            self.push_token(
                                tokens,
                                Lexeme::new(TokenKind::ExtendedLiteral, text, start),
                            );
                        }
                        return;
                    }
                }
                _ => {}
            }
        }

        diagnostics.push(Diagnostic::at("Unterminated list literal.", start));
        self.push_token(tokens, Lexeme::new(TokenKind::Error, text, start));
    }

    /// Numbers plus the literal forms that begin with a digit: dates
    /// (`2026-08-23`) and clock times (`14:30`, `14:30:15`) win over plain
    /// number scanning when the whole shape matches. A trailing one-letter
    /// unit suffix becomes its own lexeme for the later folding pass.
    fn scan_number(&mut self, scanner: &mut Scanner, start: Position, tokens: &mut Vec<Lexeme>) {
        let rest = scanner.rest();

        for pattern in [date_lookahead(), time_lookahead()] {
            if let Some(found) = pattern.find(rest) {
                let after = rest[found.end()..].chars().next();
                let glued =
                    matches!(after, Some(c) if c.is_ascii_alphanumeric() || c == '_' || c == ':');
                if !glued {
                    let mut text = String::new();
                    for _ in 0..found.as_str().len() {
                        if let Some(c) = scanner.bump() {
                            text.push(c);
                        }
                    }
                    self.push_token(tokens, Lexeme::new(TokenKind::ExtendedLiteral, text, start));
                    return;
                }
            }
        }

        let mut text = String::new();
        if scanner.peek() == Some('-') {
            scanner.bump();
            text.push('-');
        }
        while matches!(scanner.peek(), Some(c) if c.is_ascii_digit()) {
            text.push(scanner.bump().unwrap_or_default());
        }
        if scanner.peek() == Some('.')
            && matches!(scanner.rest().chars().nth(1), Some(c) if c.is_ascii_digit())
        {
            scanner.bump();
            text.push('.');
            while matches!(scanner.peek(), Some(c) if c.is_ascii_digit()) {
                text.push(scanner.bump().unwrap_or_default());
            }
        }
        self.push_token(tokens, Lexeme::new(TokenKind::Number, text, start));

        if let Some(suffix) = scanner.peek() {
            if language::is_unit_suffix(suffix) {
                let follower = scanner.rest().chars().nth(1);
                let glued = matches!(follower, Some(c) if c.is_ascii_alphanumeric() || c == '_');
                if !glued {
                    let suffix_position = scanner.position();
                    scanner.bump();
                    self.push_token(
                        tokens,
                        Lexeme::new(TokenKind::UnitSuffix, suffix.to_string(), suffix_position),
                    );
                }
            }
        }
    }

    /// Longest-match operator scan over the 1-2 character operator forms.
    fn scan_operator(&mut self, scanner: &mut Scanner, start: Position, tokens: &mut Vec<Lexeme>) {
        let pair: String = scanner.rest().chars().take(2).collect();
        if pair.chars().count() == 2 && language::is_two_char_operator(&pair) {
            scanner.bump();
            scanner.bump();
            self.push_token(tokens, Lexeme::new(TokenKind::Operator, pair, start));
        } else {
            let c = scanner.bump().unwrap_or_default();
            self.push_token(tokens, Lexeme::new(TokenKind::Operator, c.to_string(), start));
        }
    }

    /// Bare word: keyword, boolean, lone unit suffix, or a name. Name
    /// validity (length, charset) is checked by the parsers, not here.
    fn scan_word(&mut self, scanner: &mut Scanner, start: Position, tokens: &mut Vec<Lexeme>) {
        let mut text = String::new();
        while matches!(scanner.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            text.push(scanner.bump().unwrap_or_default());
        }
        self.push_token(tokens, Lexeme::classified(text, start));
    }

    /// Coalesce a run of unrecognizable characters into one Error lexeme
    /// with one diagnostic, then keep scanning.
    fn scan_unrecognized(
        &mut self,
        scanner: &mut Scanner,
        start: Position,
        tokens: &mut Vec<Lexeme>,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let mut run = String::new();
        while let Some(c) = scanner.peek() {
            if is_recognized_start(c) || c.is_whitespace() {
                break;
            }
            scanner.bump();
            run.push(c);
        }
        crate::log_debug!("Unrecognized character run",
            "text" => &run,
            "position" => start
        );
        diagnostics.push(Diagnostic::at(
            format!("Unrecognized character sequence '{run}'."),
            start,
        ));
        self.push_token(tokens, Lexeme::new(TokenKind::Error, run, start));
    }
}

impl Default for LexicalAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// SCANNER HELPERS
// ============================================================================

/// Consume horizontal whitespace and at most one line break.
fn absorb_line_break(scanner: &mut Scanner) {
    while matches!(scanner.peek(), Some(' ') | Some('\t')) {
        scanner.bump();
    }
    if scanner.peek() == Some('\r') {
        scanner.bump();
    }
    if scanner.peek() == Some('\n') {
        scanner.bump();
    }
}

/// A `-` starts a negative number only where no value can end: at the
/// start of a chunk or after an operator, delimiter, keyword, or `(`.
/// After a name or literal it stays a subtraction operator.
fn starts_negative_number(scanner: &mut Scanner, tokens: &[Lexeme]) -> bool {
    if !matches!(scanner.rest().chars().nth(1), Some(c) if c.is_ascii_digit()) {
        return false;
    }
    match tokens.last() {
        None => true,
        Some(token) => match token.kind {
            TokenKind::Operator | TokenKind::Delimiter | TokenKind::Keyword => true,
            TokenKind::Parenthesis => token.text == "(",
            _ => false,
        },
    }
}

fn is_recognized_start(c: char) -> bool {
    c == '"'
        || c == '{'
        || c == '['
        || c == '('
        || c == ')'
        || c == ';'
        || c == '_'
        || c.is_ascii_digit()
        || c.is_ascii_alphabetic()
        || language::is_operator_char(c)
}

// ============================================================================
// SUFFIX FOLDING
// ============================================================================

/// Fold every `<number><unit-suffix>` lexeme pair into a single converted
/// Number lexeme. Runs after tokenization because suffixed values may
/// appear anywhere in source, not only inside expressions: `AFTER 5s`
/// becomes `AFTER 5000`, `72f` becomes the Celsius value.
pub fn fold_unit_suffixes(tokens: Vec<Lexeme>) -> Vec<Lexeme> {
    let mut folded: Vec<Lexeme> = Vec::with_capacity(tokens.len());
    let mut iter = tokens.into_iter().peekable();

    while let Some(token) = iter.next() {
        if token.kind == TokenKind::Number {
            let suffix = iter
                .peek()
                .filter(|next| next.kind == TokenKind::UnitSuffix)
                .and_then(|next| next.text.chars().next());
            if let (Some(suffix), Ok(value)) = (suffix, token.text.parse::<f64>()) {
                if let Some(converted) = language::convert_suffixed(value, suffix) {
                    folded.push(Lexeme::new(
                        TokenKind::Number,
                        language::format_number(converted),
                        token.position,
                    ));
                    iter.next();
                    continue;
                }
            }
        }
        folded.push(token);
    }

    folded
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> (Vec<Lexeme>, Vec<Diagnostic>) {
        LexicalAnalyzer::new().tokenize(source)
    }

    fn kinds(tokens: &[Lexeme]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    fn texts(tokens: &[Lexeme]) -> Vec<String> {
        tokens.iter().map(|t| t.text.clone()).collect()
    }

    #[test]
    fn test_tokenize_device_line() {
        let (tokens, diagnostics) = lex("DEVICE lamp DRIVER relay");
        assert!(diagnostics.is_empty());
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Keyword,
                TokenKind::Name,
                TokenKind::Keyword,
                TokenKind::Name
            ]
        );
        assert_eq!(texts(&tokens), vec!["DEVICE", "lamp", "DRIVER", "relay"]);
    }

    #[test]
    fn test_positions_track_lines_and_columns() {
        let (tokens, _) = lex("a\n  b");
        assert_eq!(tokens[0].position.line, 1);
        assert_eq!(tokens[0].position.column, 1);
        assert_eq!(tokens[1].kind, TokenKind::Delimiter);
        assert_eq!(tokens[2].position.line, 2);
        assert_eq!(tokens[2].position.column, 3);
    }

    #[test]
    fn test_newline_and_semicolon_are_delimiters() {
        let (tokens, diagnostics) = lex("a = 1\nb = 2");
        assert!(diagnostics.is_empty());
        assert_eq!(tokens[3].kind, TokenKind::Delimiter);
        assert_eq!(tokens[3].text, "\n");
    }

    #[test]
    fn test_semicolon_absorbs_one_line_break() {
        // `;` plus its line break must stay a single delimiter, otherwise
        // the pair would read as a command boundary
        let (tokens, _) = lex("a = 1;\nb = 2");
        let delimiters: Vec<&Lexeme> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Delimiter)
            .collect();
        assert_eq!(delimiters.len(), 1);
        assert_eq!(delimiters[0].text, ";");
    }

    #[test]
    fn test_blank_line_yields_two_delimiters() {
        let (tokens, _) = lex("a\n\nb");
        let delimiter_count = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Delimiter)
            .count();
        assert_eq!(delimiter_count, 2);
    }

    #[test]
    fn test_string_keeps_quotes_and_placeholders() {
        let (tokens, diagnostics) = lex(r#"say "hello {*who*}!""#);
        assert!(diagnostics.is_empty());
        assert_eq!(tokens[1].kind, TokenKind::String);
        assert_eq!(tokens[1].text, r#""hello {*who*}!""#);
    }

    #[test]
    fn test_unterminated_string_is_error_at_line_end() {
        let (tokens, diagnostics) = lex("a = \"oops\nb = 2");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("Unterminated string"));
        let error = tokens.iter().find(|t| t.kind == TokenKind::Error).unwrap();
        assert_eq!(error.text, "\"oops");
        // scanning continued on the next line
        assert!(tokens.iter().any(|t| t.text == "b"));
    }

    #[test]
    fn test_inline_code_balanced_braces() {
        let (tokens, diagnostics) = lex("run { if (x) { y(); } }");
        assert!(diagnostics.is_empty());
        assert_eq!(tokens[1].kind, TokenKind::InlineCode);
        assert_eq!(tokens[1].text, "{ if (x) { y(); } }");
    }

    #[test]
    fn test_unterminated_inline_code() {
        let (tokens, diagnostics) = lex("run { broken");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("inline code"));
        assert_eq!(tokens[1].kind, TokenKind::Error);
    }

    #[test]
    fn test_list_literal() {
        let (tokens, diagnostics) = lex("x = [1, 2, 3]");
        assert!(diagnostics.is_empty());
        assert_eq!(tokens[2].kind, TokenKind::ExtendedLiteral);
        assert_eq!(tokens[2].text, "[1, 2, 3]");
    }

    #[test]
    fn test_date_and_time_literals() {
        let (tokens, diagnostics) = lex("start 2026-08-23 at 14:30:15");
        assert!(diagnostics.is_empty());
        assert_eq!(tokens[1].kind, TokenKind::ExtendedLiteral);
        assert_eq!(tokens[1].text, "2026-08-23");
        assert_eq!(tokens[3].kind, TokenKind::ExtendedLiteral);
        assert_eq!(tokens[3].text, "14:30:15");
    }

    #[test]
    fn test_operators_longest_match() {
        let (tokens, _) = lex("a <= b == c < d");
        let operators: Vec<String> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Operator)
            .map(|t| t.text.clone())
            .collect();
        assert_eq!(operators, vec!["<=", "==", "<"]);
    }

    #[test]
    fn test_negative_number_after_equals() {
        let (tokens, _) = lex("x = -5");
        assert_eq!(tokens[2].kind, TokenKind::Number);
        assert_eq!(tokens[2].text, "-5");
    }

    #[test]
    fn test_minus_after_name_is_subtraction() {
        let (tokens, _) = lex("x - 5");
        assert_eq!(tokens[1].kind, TokenKind::Operator);
        assert_eq!(tokens[1].text, "-");
        assert_eq!(tokens[2].text, "5");
    }

    #[test]
    fn test_number_with_unit_suffix_splits() {
        let (tokens, _) = lex("AFTER 5s");
        assert_eq!(tokens[1].kind, TokenKind::Number);
        assert_eq!(tokens[1].text, "5");
        assert_eq!(tokens[2].kind, TokenKind::UnitSuffix);
        assert_eq!(tokens[2].text, "s");
    }

    #[test]
    fn test_suffix_glued_to_word_stays_word() {
        let (tokens, _) = lex("5second");
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[1].kind, TokenKind::Name);
        assert_eq!(tokens[1].text, "second");
    }

    #[test]
    fn test_unrecognized_run_single_error_and_diagnostic() {
        let (tokens, diagnostics) = lex("a @@@ b");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("@@@"));
        let errors: Vec<&Lexeme> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Error)
            .collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].text, "@@@");
        assert!(tokens.iter().any(|t| t.text == "b"));
    }

    #[test]
    fn test_keywords_case_insensitive() {
        let (tokens, _) = lex("when When WHEN");
        assert!(tokens.iter().all(|t| t.kind == TokenKind::Keyword));
    }

    #[test]
    fn test_lone_suffix_letter_is_unit_suffix() {
        let (tokens, _) = lex("s");
        assert_eq!(tokens[0].kind, TokenKind::UnitSuffix);
    }

    #[test]
    fn test_metrics_recorded() {
        let mut analyzer = LexicalAnalyzer::new();
        let (_, _) = analyzer.tokenize("DEVICE lamp\nx = \"hi\"");
        assert_eq!(analyzer.metrics().keyword_tokens, 1);
        assert_eq!(analyzer.metrics().name_tokens, 2);
        assert_eq!(analyzer.metrics().string_tokens, 1);
        assert!(analyzer.metrics().total_tokens >= 6);
        assert_eq!(analyzer.metrics().error_tokens, 0);
    }

    #[test]
    fn test_fold_time_suffixes() {
        let (tokens, _) = lex("AFTER 5s AND 2m");
        let folded = fold_unit_suffixes(tokens);
        let numbers: Vec<String> = folded
            .iter()
            .filter(|t| t.kind == TokenKind::Number)
            .map(|t| t.text.clone())
            .collect();
        assert_eq!(numbers, vec!["5000", "120000"]);
        assert!(!folded.iter().any(|t| t.kind == TokenKind::UnitSuffix));
    }

    #[test]
    fn test_fold_temperature_suffix() {
        let (tokens, _) = lex("212f");
        let folded = fold_unit_suffixes(tokens);
        assert_eq!(folded.len(), 1);
        assert_eq!(folded[0].text, "100");
    }

    #[test]
    fn test_fold_keeps_position_of_number() {
        let (tokens, _) = lex("wait 10s");
        let position = tokens[1].position;
        let folded = fold_unit_suffixes(tokens);
        assert_eq!(folded[1].text, "10000");
        assert_eq!(folded[1].position, position);
    }

    #[test]
    fn test_fold_leaves_lone_suffix_alone() {
        let (tokens, _) = lex("USE s AS seconds");
        let count = tokens.len();
        let folded = fold_unit_suffixes(tokens);
        assert_eq!(folded.len(), count);
        assert!(folded.iter().any(|t| t.kind == TokenKind::UnitSuffix));
    }

    #[test]
    fn test_tab_width_preference() {
        let preferences = LexicalPreferences {
            tab_width: 8,
            ..LexicalPreferences::default()
        };
        let mut analyzer = LexicalAnalyzer::with_preferences(preferences);
        let (tokens, _) = analyzer.tokenize("\tx");
        assert_eq!(tokens[0].position.column, 9);
    }

    #[test]
    fn test_crlf_counts_as_one_delimiter() {
        let (tokens, _) = lex("a\r\nb");
        let delimiter_count = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Delimiter)
            .count();
        assert_eq!(delimiter_count, 1);
        assert_eq!(tokens[2].position.line, 2);
    }
}
