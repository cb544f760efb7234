//! Configuration module for the Une transpiler
//!
//! Resource ceilings are compile-time constants; user-facing preferences
//! are runtime structs with environment-variable-backed defaults.

pub mod constants;
pub mod runtime;
