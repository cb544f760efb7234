//! Token stream splitting
//!
//! Groups a flat lexeme stream into per-command chunks, named clauses
//! within a command, and delimiter-separated items within a clause.

use super::lexeme::{Lexeme, TokenKind};
use crate::grammar::language::Keyword;

/// Split a token stream into command chunks
///
/// A run of two or more consecutive delimiters is a command boundary.
/// A single delimiter is an item separator and stays inside its chunk.
/// Empty chunks are dropped.
pub fn split_commands(tokens: &[Lexeme]) -> Vec<Vec<Lexeme>> {
    let mut chunks = Vec::new();
    let mut current: Vec<Lexeme> = Vec::new();
    let mut delimiter_run = 0usize;

    for token in tokens {
        if token.is_delimiter() {
            delimiter_run += 1;
            match delimiter_run {
                1 => current.push(token.clone()),
                2 => flush_chunk(&mut current, &mut chunks),
                // Further consecutive delimiters collapse into the boundary
                _ => {}
            }
        } else {
            delimiter_run = 0;
            current.push(token.clone());
        }
    }
    flush_chunk(&mut current, &mut chunks);

    chunks
}

fn flush_chunk(current: &mut Vec<Lexeme>, chunks: &mut Vec<Vec<Lexeme>>) {
    while current.last().is_some_and(|t| t.is_delimiter()) {
        current.pop();
    }
    while current.first().is_some_and(|t| t.is_delimiter()) {
        current.remove(0);
    }
    if !current.is_empty() {
        chunks.push(std::mem::take(current));
    }
}

/// One named clause within a command
#[derive(Debug, Clone)]
pub struct Clause {
    pub keyword: Keyword,
    /// The opener lexeme, kept for diagnostics positions
    pub opener: Lexeme,
    pub tokens: Vec<Lexeme>,
}

/// Clause buckets produced by [`split_clauses`]
#[derive(Debug, Clone, Default)]
pub struct ClauseMap {
    /// Tokens before the first clause keyword
    pub leading: Vec<Lexeme>,
    pub clauses: Vec<Clause>,
}

impl ClauseMap {
    pub fn get(&self, keyword: Keyword) -> Option<&Clause> {
        self.clauses.iter().find(|c| c.keyword == keyword)
    }

    pub fn has(&self, keyword: Keyword) -> bool {
        self.get(keyword).is_some()
    }
}

/// Split a command chunk into named clauses
///
/// Tokens before the first clause keyword land in the leading bucket.
/// Re-declaring a clause keyword appends into the existing bucket
/// instead of being rejected.
pub fn split_clauses(tokens: &[Lexeme], clause_keywords: &[Keyword]) -> ClauseMap {
    let mut map = ClauseMap::default();
    let mut current: Option<usize> = None;

    for token in tokens {
        let opener = token
            .keyword()
            .filter(|keyword| clause_keywords.contains(keyword));

        if let Some(keyword) = opener {
            if let Some(index) = map.clauses.iter().position(|c| c.keyword == keyword) {
                current = Some(index);
            } else {
                map.clauses.push(Clause {
                    keyword,
                    opener: token.clone(),
                    tokens: Vec::new(),
                });
                current = Some(map.clauses.len() - 1);
            }
            continue;
        }

        match current {
            Some(index) => map.clauses[index].tokens.push(token.clone()),
            None => map.leading.push(token.clone()),
        }
    }

    map
}

/// Split a token list on delimiters, dropping them and any empty items
pub fn split_items(tokens: &[Lexeme]) -> Vec<Vec<Lexeme>> {
    let mut items = Vec::new();
    let mut current: Vec<Lexeme> = Vec::new();

    for token in tokens {
        if token.is_delimiter() {
            if !current.is_empty() {
                items.push(std::mem::take(&mut current));
            }
        } else {
            current.push(token.clone());
        }
    }
    if !current.is_empty() {
        items.push(current);
    }

    items
}

/// Split a token list on a specific operator, dropping empty segments
pub fn split_operator(tokens: &[Lexeme], operator: &str) -> Vec<Vec<Lexeme>> {
    let mut segments = Vec::new();
    let mut current: Vec<Lexeme> = Vec::new();

    for token in tokens {
        if token.is_kind(TokenKind::Operator) && token.text == operator {
            if !current.is_empty() {
                segments.push(std::mem::take(&mut current));
            }
        } else {
            current.push(token.clone());
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Position;

    fn tokens_of(texts: &[&str]) -> Vec<Lexeme> {
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| Lexeme::classified(*text, Position::new(i as u32, 1, i as u32 + 1)))
            .collect()
    }

    #[test]
    fn test_split_commands_on_blank_line() {
        let tokens = tokens_of(&["DEVICE", "lamp", "\n", "\n", "DEVICE", "fan"]);
        let chunks = split_commands(&tokens);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), 2);
        assert_eq!(chunks[1][1].text, "fan");
    }

    #[test]
    fn test_split_commands_collapses_delimiter_runs() {
        let tokens = tokens_of(&["a", "\n", "\n", "\n", "\n", "b", "\n"]);
        let chunks = split_commands(&tokens);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0][0].text, "a");
        assert_eq!(chunks[1][0].text, "b");
        // Trailing delimiter is trimmed
        assert_eq!(chunks[1].len(), 1);
    }

    #[test]
    fn test_single_delimiter_stays_in_chunk() {
        let tokens = tokens_of(&["CONFIG", "a", "=", "1", ";", "b", "=", "2"]);
        let chunks = split_commands(&tokens);

        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].iter().any(|t| t.is_delimiter()));
    }

    #[test]
    fn test_split_commands_drops_empty_chunks() {
        let tokens = tokens_of(&["\n", "\n", "\n"]);
        assert!(split_commands(&tokens).is_empty());
    }

    #[test]
    fn test_split_clauses() {
        let tokens = tokens_of(&[
            "DEVICE", "lamp", "DRIVER", "dimmer", "CONFIG", "level", "=", "1", "INIT", "on", "=",
            "true",
        ]);
        let map = split_clauses(
            &tokens,
            &[Keyword::Driver, Keyword::Config, Keyword::Init],
        );

        assert_eq!(map.leading.len(), 2);
        assert_eq!(map.leading[1].text, "lamp");
        assert_eq!(map.clauses.len(), 3);
        assert_eq!(map.get(Keyword::Driver).unwrap().tokens.len(), 1);
        assert_eq!(map.get(Keyword::Config).unwrap().tokens.len(), 3);
        assert!(map.has(Keyword::Init));
        assert!(!map.has(Keyword::When));
    }

    #[test]
    fn test_redeclared_clause_appends() {
        let tokens = tokens_of(&["CONFIG", "a", "=", "1", "CONFIG", "b", "=", "2"]);
        let map = split_clauses(&tokens, &[Keyword::Config]);

        assert_eq!(map.clauses.len(), 1);
        assert_eq!(map.get(Keyword::Config).unwrap().tokens.len(), 6);
    }

    #[test]
    fn test_split_items() {
        let tokens = tokens_of(&["a", "=", "1", ";", ";", "b", "=", "2", "\n", "c", "=", "3"]);
        let items = split_items(&tokens);

        assert_eq!(items.len(), 3);
        assert_eq!(items[0][0].text, "a");
        assert_eq!(items[1][0].text, "b");
        assert_eq!(items[2][0].text, "c");
    }

    #[test]
    fn test_split_operator() {
        let tokens = tokens_of(&["host", ",", "port", ",", "name"]);
        let segments = split_operator(&tokens, ",");

        assert_eq!(segments.len(), 3);
        assert_eq!(segments[2][0].text, "name");
    }
}
