//! Per-sample records and per-method aggregation
//!
//! Failed samples are kept in `per_sample` and counted, but excluded from
//! every mean. When nothing succeeded the aggregate is an explicit
//! `NoSuccessfulSamples` marker instead of NaN.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::dataset::Sample;
use crate::extractors::ExtractionResult;
use crate::metrics::calculator::{CHARACTER_ERROR_RATE, EXACT_MATCH, TOKEN_F1, WORD_ERROR_RATE};
use crate::metrics::TextMetrics;

/// Metrics for one successfully extracted sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleMetrics {
    #[serde(rename = "character_error_rate")]
    pub cer: f64,
    #[serde(rename = "word_error_rate")]
    pub wer: f64,
    #[serde(rename = "token_precision")]
    pub precision: f64,
    #[serde(rename = "token_recall")]
    pub recall: f64,
    #[serde(rename = "token_f1")]
    pub f1: f64,
    pub exact_match: f64,
    pub latency_seconds: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl SampleMetrics {
    pub fn new(text: TextMetrics, latency_seconds: f64, confidence: Option<f64>) -> Self {
        Self {
            cer: text.cer,
            wer: text.wer,
            precision: text.precision,
            recall: text.recall,
            f1: text.f1,
            exact_match: text.exact_match,
            latency_seconds: latency_seconds.max(0.0),
            confidence,
        }
    }

    pub fn text_metrics(&self) -> TextMetrics {
        TextMetrics {
            cer: self.cer,
            wer: self.wer,
            precision: self.precision,
            recall: self.recall,
            f1: self.f1,
            exact_match: self.exact_match,
        }
    }
}

/// Why a sample produced no metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Missing id or ground truth
    SampleResolution,
    /// The backend returned an error
    Extraction,
    /// The backend did not answer within the sample timeout
    Timeout,
}

/// Terminal state of one sample
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SampleOutcome {
    Succeeded {
        metrics: SampleMetrics,
        prediction: String,
        ground_truth: String,
        #[serde(default, skip_serializing_if = "Map::is_empty")]
        extractor_metadata: Map<String, Value>,
    },
    Failed {
        kind: FailureKind,
        reason: String,
        retryable: bool,
    },
}

/// One entry of `MethodReport::per_sample`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleRecord {
    pub sample_id: String,
    #[serde(flatten)]
    pub outcome: SampleOutcome,
    /// Manifest metadata of the sample
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl SampleRecord {
    pub fn succeeded(
        sample: &Sample,
        metrics: SampleMetrics,
        extraction: ExtractionResult,
        ground_truth: &str,
    ) -> Self {
        Self {
            sample_id: sample.id.clone(),
            outcome: SampleOutcome::Succeeded {
                metrics,
                prediction: extraction.text,
                ground_truth: ground_truth.to_string(),
                extractor_metadata: extraction.metadata,
            },
            metadata: sample.metadata.clone(),
        }
    }

    pub fn failed(sample: &Sample, kind: FailureKind, reason: impl Into<String>, retryable: bool) -> Self {
        Self {
            sample_id: sample.id.clone(),
            outcome: SampleOutcome::Failed {
                kind,
                reason: reason.into(),
                retryable,
            },
            metadata: sample.metadata.clone(),
        }
    }

    pub fn metrics(&self) -> Option<&SampleMetrics> {
        match &self.outcome {
            SampleOutcome::Succeeded { metrics, .. } => Some(metrics),
            SampleOutcome::Failed { .. } => None,
        }
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match &self.outcome {
            SampleOutcome::Failed { reason, .. } => Some(reason),
            SampleOutcome::Succeeded { .. } => None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.metrics().is_some()
    }
}

/// Means over the succeeded samples of one method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Aggregate {
    Computed {
        /// Metric name → arithmetic mean
        metrics: BTreeMap<String, f64>,
        /// Mean over samples that reported a confidence
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mean_confidence: Option<f64>,
        mean_latency_seconds: f64,
    },
    /// Every evaluated sample failed
    NoSuccessfulSamples,
}

impl Aggregate {
    pub fn metric(&self, name: &str) -> Option<f64> {
        match self {
            Self::Computed { metrics, .. } => metrics.get(name).copied(),
            Self::NoSuccessfulSamples => None,
        }
    }

    pub fn mean_confidence(&self) -> Option<f64> {
        match self {
            Self::Computed { mean_confidence, .. } => *mean_confidence,
            Self::NoSuccessfulSamples => None,
        }
    }

    pub fn mean_latency_seconds(&self) -> Option<f64> {
        match self {
            Self::Computed { mean_latency_seconds, .. } => Some(*mean_latency_seconds),
            Self::NoSuccessfulSamples => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Self::Computed { .. })
    }
}

/// Aggregated evaluation outcome for one extraction method
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodReport {
    pub method_name: String,
    /// Samples evaluated (succeeded + failed)
    pub sample_count: usize,
    pub failure_count: usize,
    /// Samples never issued because the run was cancelled
    #[serde(default)]
    pub skipped_count: usize,
    #[serde(default)]
    pub cancelled: bool,
    pub generated_at: DateTime<Utc>,
    pub aggregate: Aggregate,
    /// Records in input sample order
    pub per_sample: Vec<SampleRecord>,
}

impl MethodReport {
    pub fn success_count(&self) -> usize {
        self.sample_count - self.failure_count
    }

    /// True when at least one sample was evaluated and none succeeded
    pub fn all_failed(&self) -> bool {
        self.sample_count > 0 && self.failure_count == self.sample_count
    }

    /// Mark the report as partial after a cancelled run
    pub fn with_cancellation(mut self, skipped_count: usize) -> Self {
        self.skipped_count = skipped_count;
        self.cancelled = true;
        self
    }

    /// Format as a summary line
    pub fn format_summary(&self) -> String {
        match &self.aggregate {
            Aggregate::Computed { .. } => format!(
                "CER: {:.4} | WER: {:.4} | F1: {:.4} | EM: {:.1}% | Samples: {} (failed: {})",
                self.aggregate.metric(CHARACTER_ERROR_RATE).unwrap_or(0.0),
                self.aggregate.metric(WORD_ERROR_RATE).unwrap_or(0.0),
                self.aggregate.metric(TOKEN_F1).unwrap_or(0.0),
                self.aggregate.metric(EXACT_MATCH).unwrap_or(0.0) * 100.0,
                self.sample_count,
                self.failure_count
            ),
            Aggregate::NoSuccessfulSamples => format!(
                "no successful samples | Samples: {} (failed: {})",
                self.sample_count, self.failure_count
            ),
        }
    }
}

/// Fold per-sample records into a method report
pub fn aggregate(method_name: &str, per_sample: Vec<SampleRecord>) -> MethodReport {
    let sample_count = per_sample.len();
    let succeeded: Vec<&SampleMetrics> = per_sample.iter().filter_map(|r| r.metrics()).collect();
    let failure_count = sample_count - succeeded.len();

    let aggregate = if succeeded.is_empty() {
        Aggregate::NoSuccessfulSamples
    } else {
        let n = succeeded.len() as f64;

        let mut sums: BTreeMap<String, f64> = BTreeMap::new();
        for m in &succeeded {
            for (name, value) in m.text_metrics().named_values() {
                *sums.entry(name.to_string()).or_default() += value;
            }
        }
        let metrics = sums.into_iter().map(|(k, v)| (k, v / n)).collect();

        let confidences: Vec<f64> = succeeded.iter().filter_map(|m| m.confidence).collect();
        let mean_confidence = if confidences.is_empty() {
            None
        } else {
            Some(confidences.iter().sum::<f64>() / confidences.len() as f64)
        };

        let mean_latency_seconds = succeeded.iter().map(|m| m.latency_seconds).sum::<f64>() / n;

        Aggregate::Computed {
            metrics,
            mean_confidence,
            mean_latency_seconds,
        }
    };

    MethodReport {
        method_name: method_name.to_string(),
        sample_count,
        failure_count,
        skipped_count: 0,
        cancelled: false,
        generated_at: Utc::now(),
        aggregate,
        per_sample,
    }
}

/// All method reports of one invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub dataset_size: usize,
    pub generated_at: DateTime<Utc>,
    /// Method name → report
    pub methods: BTreeMap<String, MethodReport>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl BenchmarkReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Methods whose every evaluated sample failed
    pub fn fully_failed_methods(&self) -> Vec<&str> {
        self.methods
            .values()
            .filter(|m| m.all_failed())
            .map(|m| m.method_name.as_str())
            .collect()
    }
}
