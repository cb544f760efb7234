use std::time::Duration;

use crate::config::runtime::EmitPreferences;
use crate::emit::{self, Document, EmitError};
use crate::pipeline::PipelineError;
use crate::resolve::TranspilationUnit;

/// Aggregate counters for one transpilation run
#[derive(Debug, Clone)]
pub struct RunStats {
    pub units_loaded: usize,
    pub failed_units: usize,
    pub commands_parsed: usize,
    pub diagnostics_emitted: usize,
    pub duration: Duration,
}

impl RunStats {
    pub fn collect(units: &[TranspilationUnit], duration: Duration) -> Self {
        Self {
            units_loaded: units.len(),
            failed_units: units.iter().filter(|unit| unit.has_errors()).count(),
            commands_parsed: units.iter().map(|unit| unit.commands().len()).sum(),
            diagnostics_emitted: units.iter().map(|unit| unit.diagnostic_count()).sum(),
            duration,
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.units_loaded == 0 {
            0.0
        } else {
            (self.units_loaded - self.failed_units) as f64 / self.units_loaded as f64
        }
    }
}

/// Everything one run produced: the unit set in load order plus
/// aggregate counters
#[derive(Debug)]
pub struct PipelineResult {
    pub units: Vec<TranspilationUnit>,
    pub stats: RunStats,
}

impl PipelineResult {
    pub fn new(units: Vec<TranspilationUnit>, duration: Duration) -> Self {
        let stats = RunStats::collect(&units, duration);
        Self { units, stats }
    }

    /// A run succeeds only when no unit collected any diagnostic
    pub fn succeeded(&self) -> bool {
        self.stats.diagnostics_emitted == 0
    }

    /// `Ok` when the run succeeded, the run-failure verdict otherwise
    pub fn require_success(&self) -> Result<(), PipelineError> {
        if self.succeeded() {
            Ok(())
        } else {
            Err(PipelineError::RunFailed {
                error_count: self.stats.diagnostics_emitted,
            })
        }
    }

    /// Render the diagnostics channel
    pub fn report(&self, preferences: &EmitPreferences) -> String {
        emit::run_report(&self.units, preferences)
    }

    /// Assemble the code-channel document
    pub fn document(&self) -> Document {
        Document::assemble(&self.units)
    }

    /// Render the code channel as JSON text
    pub fn code(&self, preferences: &EmitPreferences) -> Result<String, EmitError> {
        self.document().to_json(preferences.pretty)
    }

    pub fn log_summary(&self) {
        crate::log_success!(
            crate::logging::codes::success::RUN_COMPLETE,
            "Transpilation run complete",
            "units" => self.stats.units_loaded,
            "failed_units" => self.stats.failed_units,
            "commands" => self.stats.commands_parsed,
            "diagnostics" => self.stats.diagnostics_emitted,
            "duration_ms" => format!("{:.2}", self.stats.duration.as_secs_f64() * 1000.0)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::runtime::{ResolverPreferences, RuntimeConfig};
    use crate::eval::LiteralEvaluator;
    use crate::loader::MemoryLoader;
    use crate::resolve::Resolver;

    fn result_for(source: &str) -> PipelineResult {
        let loader = MemoryLoader::new().with_source("main.une", source);
        let config = RuntimeConfig {
            resolver: ResolverPreferences {
                standard_library: None,
                default_charset: "utf-8".to_string(),
            },
            ..RuntimeConfig::default()
        };
        let evaluator = LiteralEvaluator;
        let units = Resolver::new(&loader, &evaluator, &config).run("main.une");
        PipelineResult::new(units, Duration::from_millis(1))
    }

    #[test]
    fn test_clean_run_succeeds() {
        let result = result_for("DEVICE lamp\n\nDRIVER gpio SCRIPT g");
        assert!(result.succeeded());
        assert!(result.require_success().is_ok());
        assert_eq!(result.stats.units_loaded, 1);
        assert_eq!(result.stats.commands_parsed, 2);
        assert_eq!(result.stats.failed_units, 0);
        assert_eq!(result.stats.success_rate(), 1.0);
    }

    #[test]
    fn test_any_diagnostic_fails_the_run() {
        let result = result_for("DEVICE lamp\n\nFROB x");
        assert!(!result.succeeded());
        match result.require_success() {
            Err(PipelineError::RunFailed { error_count }) => assert_eq!(error_count, 1),
            other => panic!("expected run failure, got {other:?}"),
        }
    }

    #[test]
    fn test_failed_unit_keeps_partial_commands() {
        // The erroring unit still counts its parsed commands even
        // though the code channel will exclude them.
        let result = result_for("DEVICE lamp\n\nFROB x\n\nDRIVER gpio SCRIPT g");
        assert_eq!(result.stats.commands_parsed, 2);
        assert_eq!(result.stats.failed_units, 1);
        assert!(result.document().commands.is_empty());
    }

    #[test]
    fn test_report_and_code_render() {
        let result = result_for("DEVICE lamp");
        let preferences = EmitPreferences::default();
        assert!(result.report(&preferences).contains("0 errors found"));
        let code = result.code(&preferences).unwrap();
        assert!(code.contains("\"commands\""));
        assert!(code.contains("\"lamp\""));
    }
}
