use crate::emit::EmitError;

/// Run-level failures
///
/// Per-command and per-unit problems never surface here; they stay in
/// the units' diagnostic buckets. This type covers the whole-run
/// verdict and output rendering only.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Transpilation failed with {error_count} diagnostics")]
    RunFailed { error_count: usize },

    #[error("Output rendering failed: {0}")]
    Emit(#[from] EmitError),
}
