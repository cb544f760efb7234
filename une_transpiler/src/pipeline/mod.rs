//! Whole-run orchestration.
//!
//! One call loads the root URI and every transitive include, runs both
//! parse phases, and returns a [`PipelineResult`] carrying the full
//! unit set. Nothing here fails early: every problem lands in a unit's
//! diagnostic bucket and the run verdict comes from
//! [`PipelineResult::require_success`].

mod error;
mod result;

pub use error::PipelineError;
pub use result::{PipelineResult, RunStats};

use std::time::Instant;

use crate::config::runtime::RuntimeConfig;
use crate::eval::{Evaluator, LiteralEvaluator};
use crate::loader::{FsLoader, MemoryLoader, SourceLoader};
use crate::resolve::Resolver;

/// URI assigned to source given directly rather than through a loader
pub const INLINE_URI: &str = "<input>";

/// Transpile a root URI and its transitive includes from the file system
pub fn transpile(root_uri: &str) -> PipelineResult {
    let config = RuntimeConfig::default();
    transpile_with(&FsLoader::new(), &LiteralEvaluator, &config, root_uri)
}

/// [`transpile`] with explicit configuration
pub fn transpile_with_config(root_uri: &str, config: &RuntimeConfig) -> PipelineResult {
    transpile_with(&FsLoader::new(), &LiteralEvaluator, config, root_uri)
}

/// Transpile source text held in memory.
///
/// Inline input has no directory to resolve a standard library
/// against, so auto-include is disabled for it.
pub fn transpile_source(source: &str) -> PipelineResult {
    let mut config = RuntimeConfig::default();
    config.resolver.standard_library = None;
    let loader = MemoryLoader::new().with_source(INLINE_URI, source);
    transpile_with(&loader, &LiteralEvaluator, &config, INLINE_URI)
}

/// Run the full pipeline with explicit collaborators
pub fn transpile_with(
    loader: &dyn SourceLoader,
    evaluator: &dyn Evaluator,
    config: &RuntimeConfig,
    root_uri: &str,
) -> PipelineResult {
    let start_time = Instant::now();
    crate::log_info!("Starting transpilation run", "root" => root_uri);

    let units = Resolver::new(loader, evaluator, config).run(root_uri);

    let result = PipelineResult::new(units, start_time.elapsed());
    result.log_summary();
    result
}

/// Verify the pipeline's diagnostic code registry is consistent
pub fn validate_pipeline() -> Result<(), String> {
    crate::log_debug!("Validating pipeline configuration");

    crate::lexical::init_lexical_logging()?;

    let required = [
        crate::logging::codes::resolution::INCLUDE_DEPTH_EXCEEDED,
        crate::logging::codes::resolution::TOO_MANY_UNITS,
        crate::logging::codes::emit::JSON_ENCODING_FAILED,
        crate::logging::codes::emit::OUTPUT_WRITE_FAILED,
    ];
    for code in &required {
        if crate::logging::codes::get_description(code.as_str()) == "Unknown error" {
            return Err(format!(
                "Pipeline error code {} has no description",
                code.as_str()
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::runtime::ResolverPreferences;
    use crate::loader::MemoryLoader;

    #[test]
    fn test_validate_pipeline() {
        assert!(validate_pipeline().is_ok());
    }

    #[test]
    fn test_transpile_source_parses_inline_text() {
        let result = transpile_source("DEVICE lamp DRIVER gpio CONFIG pin = 4");
        assert!(result.succeeded());
        assert_eq!(result.stats.units_loaded, 1);
        assert_eq!(result.units[0].uri(), INLINE_URI);
        assert_eq!(result.document().commands.len(), 1);
    }

    #[test]
    fn test_transpile_source_gets_no_standard_library() {
        // Even with UNE_STDLIB unset the default would be stdlib.une;
        // inline input must not try to load it.
        let result = transpile_source("DEVICE lamp");
        assert!(result.succeeded());
        assert_eq!(result.stats.units_loaded, 1);
    }

    #[test]
    fn test_transpile_with_memory_loader() {
        let loader = MemoryLoader::new()
            .with_source("main.une", "INCLUDE \"lib.une\"\n\nDEVICE lamp")
            .with_source("lib.une", "INCLUDE \"main.une\"\n\nDRIVER gpio SCRIPT g");
        let config = RuntimeConfig {
            resolver: ResolverPreferences {
                standard_library: None,
                default_charset: "utf-8".to_string(),
            },
            ..RuntimeConfig::default()
        };
        let result = transpile_with(&loader, &LiteralEvaluator, &config, "main.une");

        assert!(result.succeeded());
        assert_eq!(result.stats.units_loaded, 2);
        assert_eq!(result.document().commands.len(), 2);
        assert!(result.stats.duration.as_nanos() > 0);
    }
}
