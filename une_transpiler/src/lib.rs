// Internal modules
pub mod config;
pub mod diagnostics;
pub mod emit;
pub mod eval;
pub mod grammar;
pub mod lexical;
pub mod loader;
#[macro_use]
pub mod logging;
pub mod pipeline;
pub mod resolve;
pub mod rewrite;
pub mod syntax;
pub mod tokens;
pub mod utils;

// Re-export key types for library consumers
pub use diagnostics::Diagnostic;
pub use pipeline::{transpile, transpile_source, transpile_with, PipelineError, PipelineResult};

// Re-export the code channel for embedders that render their own reports
pub use emit::Document;
