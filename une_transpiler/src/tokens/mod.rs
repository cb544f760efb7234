//! Token system for Une lexical analysis
//!
//! This module provides the lexeme model and the stream splitting used
//! by command parsing. A lexeme pairs a classified kind with the exact
//! source text and its position; the splitter groups a flat lexeme
//! stream into command chunks, named clauses, and clause items.
//!
//! ## Key Components
//!
//! - **[`Lexeme`]** - One classified fragment of source text
//! - **[`TokenKind`]** - Closed set of lexeme kinds
//! - **[`splitter`]** - Command, clause, and item splitting
//!
//! Kinds are recomputed from text whenever a macro rewrite changes a
//! token's value; see [`Lexeme::rewritten`].

pub mod lexeme;
pub mod splitter;

pub use lexeme::{join_source, Lexeme, TokenKind};
pub use splitter::{split_clauses, split_commands, split_items, split_operator, Clause, ClauseMap};

// Re-export position types from utils
pub use crate::utils::{Position, Span};
