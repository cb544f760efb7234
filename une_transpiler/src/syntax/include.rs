//! INCLUDE command parser.
//!
//! `INCLUDE "<uri>"... [USE <col>[,<col>...] AS <values>[;...]]`
//!
//! A bare `"*"` in the URI list requests the automatic standard library
//! instead of naming a file. The optional USE table turns one include
//! into one instantiation per row, with each column name rewritten to
//! that row's value inside the included unit.

use crate::config::constants::compile_time::syntax::MAX_TABLE_ROWS;
use crate::diagnostics::Diagnostic;
use crate::grammar::{language, Command, IncludeCommand, Keyword, TableValue, UseAsTable};
use crate::syntax::{report_syntax, SyntaxError};
use crate::tokens::{split_items, split_operator, Lexeme, TokenKind};

const AUTO_MARKER: &str = "*";

pub(crate) fn parse_include(
    chunk: &[Lexeme],
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<Command> {
    let position = chunk.first()?.position;
    let clauses = crate::tokens::split_clauses(chunk, &[Keyword::Include, Keyword::Use]);

    let uri_tokens = match clauses.get(Keyword::Include) {
        Some(clause) if !clause.tokens.is_empty() => &clause.tokens,
        _ => {
            report_syntax(SyntaxError::empty_clause("INCLUDE", position), diagnostics);
            return None;
        }
    };

    let mut uris = Vec::new();
    let mut auto = false;
    for token in uri_tokens {
        if !token.is_kind(TokenKind::String) {
            report_syntax(
                SyntaxError::unexpected_token("a quoted file name", &token.text, token.position),
                diagnostics,
            );
            continue;
        }
        let uri = token.string_content();
        if uri == AUTO_MARKER {
            auto = true;
        } else if uri.is_empty() {
            report_syntax(
                SyntaxError::unexpected_token("a quoted file name", &token.text, token.position),
                diagnostics,
            );
        } else {
            uris.push(uri.to_string());
        }
    }
    if uris.is_empty() && !auto {
        return None;
    }

    let use_table = clauses
        .get(Keyword::Use)
        .and_then(|clause| parse_table(&clause.tokens, clause.opener.position, diagnostics));

    Some(Command::Include(IncludeCommand {
        uris,
        auto,
        use_table,
        position,
    }))
}

fn parse_table(
    tokens: &[Lexeme],
    opener: crate::utils::Position,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<UseAsTable> {
    let as_index = match tokens
        .iter()
        .position(|token| token.keyword() == Some(Keyword::As))
    {
        Some(index) => index,
        None => {
            report_syntax(
                SyntaxError::unexpected_token("AS", "end of clause", opener),
                diagnostics,
            );
            return None;
        }
    };

    let mut columns = Vec::new();
    for group in split_operator(&tokens[..as_index], ",") {
        let token = &group[0];
        if group.len() > 1 || !language::is_valid_name(&token.text) {
            report_syntax(
                SyntaxError::invalid_name(&token.text, token.position),
                diagnostics,
            );
            continue;
        }
        columns.push(token.text.clone());
    }
    if columns.is_empty() {
        report_syntax(
            SyntaxError::unexpected_token("column names before AS", "nothing", opener),
            diagnostics,
        );
        return None;
    }

    let mut rows = Vec::new();
    for row_tokens in split_items(&tokens[as_index + 1..]) {
        // SECURITY: cap table size so one include cannot fan out unboundedly.
        if rows.len() >= MAX_TABLE_ROWS {
            report_syntax(
                SyntaxError::TooManyItems {
                    clause: "USE",
                    limit: MAX_TABLE_ROWS,
                    position: opener,
                },
                diagnostics,
            );
            break;
        }
        let row: Vec<TableValue> = split_operator(&row_tokens, ",")
            .iter()
            .map(|value| table_value(value, diagnostics))
            .collect();
        if row.len() != columns.len() {
            crate::syntax::report_semantic(
                crate::syntax::SemanticError::TableArityMismatch {
                    expected: columns.len(),
                    found: row.len(),
                    position: row_tokens[0].position,
                },
                diagnostics,
            );
        }
        rows.push(row);
    }
    if rows.is_empty() {
        report_syntax(
            SyntaxError::unexpected_token("a row of values after AS", "nothing", opener),
            diagnostics,
        );
        return None;
    }

    Some(UseAsTable { columns, rows })
}

fn table_value(tokens: &[Lexeme], diagnostics: &mut Vec<Diagnostic>) -> TableValue {
    if tokens.len() > 1 {
        report_syntax(
            SyntaxError::unexpected_token("a single value", &tokens[1].text, tokens[1].position),
            diagnostics,
        );
    }
    let token = &tokens[0];
    if token.is_kind(TokenKind::String) {
        TableValue {
            text: token.string_content().to_string(),
            is_string: true,
        }
    } else {
        TableValue {
            text: token.text.clone(),
            is_string: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::LexicalAnalyzer;

    fn parse(source: &str) -> (Option<Command>, Vec<Diagnostic>) {
        let (tokens, lex_diagnostics) = LexicalAnalyzer::new().tokenize(source);
        assert!(lex_diagnostics.is_empty(), "test source must lex cleanly");
        let mut diagnostics = Vec::new();
        let command = parse_include(&tokens, &mut diagnostics);
        (command, diagnostics)
    }

    fn include(command: Option<Command>) -> IncludeCommand {
        match command {
            Some(Command::Include(include)) => include,
            other => panic!("expected include command, got {other:?}"),
        }
    }

    #[test]
    fn test_single_uri() {
        let (command, diagnostics) = parse("INCLUDE \"lib.une\"");
        assert!(diagnostics.is_empty());
        let include = include(command);
        assert_eq!(include.uris, vec!["lib.une"]);
        assert!(!include.auto);
        assert!(include.use_table.is_none());
    }

    #[test]
    fn test_multiple_uris() {
        let (command, _) = parse("INCLUDE \"a.une\" \"b.une\"");
        assert_eq!(include(command).uris, vec!["a.une", "b.une"]);
    }

    #[test]
    fn test_star_requests_standard_library() {
        let (command, diagnostics) = parse("INCLUDE \"*\"");
        assert!(diagnostics.is_empty());
        let include = include(command);
        assert!(include.auto);
        assert!(include.uris.is_empty());
    }

    #[test]
    fn test_star_mixes_with_real_uris() {
        let (command, _) = parse("INCLUDE \"*\" \"extra.une\"");
        let include = include(command);
        assert!(include.auto);
        assert_eq!(include.uris, vec!["extra.une"]);
    }

    #[test]
    fn test_unquoted_uri_reported_and_skipped() {
        let (command, diagnostics) = parse("INCLUDE lib \"real.une\"");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("quoted file name"));
        assert_eq!(include(command).uris, vec!["real.une"]);
    }

    #[test]
    fn test_empty_include_fails() {
        let (command, diagnostics) = parse("INCLUDE");
        assert!(command.is_none());
        assert!(diagnostics[0].message.contains("Empty INCLUDE clause"));
    }

    #[test]
    fn test_use_table_rows_and_columns() {
        let (command, diagnostics) =
            parse("INCLUDE \"motor.une\" USE pin, label AS 1, \"left\"; 2, \"right\"");
        assert!(diagnostics.is_empty());
        let table = include(command).use_table.unwrap();
        assert_eq!(table.columns, vec!["pin", "label"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][0].text, "1");
        assert!(!table.rows[0][0].is_string);
        assert_eq!(table.rows[0][1].text, "left");
        assert!(table.rows[0][1].is_string);
        assert_eq!(table.rows[1][1].text, "right");
    }

    #[test]
    fn test_row_arity_mismatch_reported_but_kept() {
        let (command, diagnostics) =
            parse("INCLUDE \"motor.une\" USE pin, label AS 1; 2, \"right\"");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("expected 2"));
        let table = include(command).use_table.unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].len(), 1);
    }

    #[test]
    fn test_missing_as_drops_table_keeps_uris() {
        let (command, diagnostics) = parse("INCLUDE \"motor.une\" USE pin 1");
        assert!(diagnostics[0].message.contains("Expected AS"));
        let include = include(command);
        assert_eq!(include.uris, vec!["motor.une"]);
        assert!(include.use_table.is_none());
    }
}
