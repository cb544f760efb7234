//! Une Utils - Shared types and utilities for the lexer and command parsers
//!
//! This crate provides dependency-free, shared primitive types and helper
//! utilities used by both the lexer and the parsing/reporting stages of the
//! Une transpiler.

pub mod span;

pub use span::{Position, SourceMap, Span};
