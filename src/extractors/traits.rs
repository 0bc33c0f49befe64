//! Extractor trait abstraction
//!
//! Defines the common interface every OCR backend implements, so all backends
//! are benchmarked through the same runner.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

use crate::dataset::Sample;

/// Output of one extraction attempt
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Hypothesis transcription (may be empty)
    pub text: String,

    /// Wall-clock extraction time, stamped by the runner
    #[serde(default)]
    pub latency_seconds: f64,

    /// Backend-reported confidence in [0, 1], if the backend reports one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,

    /// Backend-specific details, passed through to reports
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl ExtractionResult {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence.clamp(0.0, 1.0));
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Failure reported by an extraction backend
///
/// `retryable` tells an outer policy whether a retry could succeed; the
/// runner itself never retries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct ExtractionError {
    pub reason: String,
    pub retryable: bool,
}

impl ExtractionError {
    /// Transient failure (throttling, timeouts, connection resets)
    pub fn retryable(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            retryable: true,
        }
    }

    /// Permanent failure for this sample (unreadable input, bad response)
    pub fn fatal(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            retryable: false,
        }
    }
}

impl From<anyhow::Error> for ExtractionError {
    fn from(err: anyhow::Error) -> Self {
        Self::fatal(format!("{:#}", err))
    }
}

/// Unified trait for OCR backends
///
/// All extraction implementations must implement this trait to participate
/// in the benchmark. Implementations must not share mutable state between
/// samples: the runner calls `extract` concurrently.
#[async_trait::async_trait]
pub trait Extractor: Send + Sync {
    /// Method name used in reports
    fn name(&self) -> &str;

    /// Extract text from a single sample
    async fn extract(&self, sample: &Sample) -> Result<ExtractionResult, ExtractionError>;

    /// Release backend resources after a method run
    async fn cleanup(&self) {}
}

/// Helper to measure duration of an async operation
pub async fn measure_async<F, T>(f: F) -> (T, Duration)
where
    F: std::future::Future<Output = T>,
{
    let start = std::time::Instant::now();
    let result = f.await;
    let duration = start.elapsed();
    (result, duration)
}
