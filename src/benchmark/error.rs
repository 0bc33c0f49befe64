//! Run-level benchmark errors

use thiserror::Error;

/// Errors surfaced to the caller instead of being recorded per sample
#[derive(Debug, Error)]
pub enum BenchmarkError {
    /// No samples to evaluate
    #[error("no samples to evaluate")]
    EmptyDataset,

    /// Method name not present in the registry
    #[error("unknown extractor '{name}'. Available: {available}")]
    UnknownMethod { name: String, available: String },

    /// Sample lacks an id or ground truth
    ///
    /// The runner records this as a per-sample failure; it is never returned
    /// from a run.
    #[error("sample '{sample_id}' cannot be evaluated: {reason}")]
    SampleResolution { sample_id: String, reason: String },
}
