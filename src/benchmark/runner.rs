//! Benchmark orchestration
//!
//! Runs extractors over a sample sequence, scores every output against its
//! ground truth and folds the records into reports.
//!
//! Per-sample extraction runs concurrently (bounded by a semaphore shared by
//! every method of one runner). Each result is tagged with its input index and
//! written back into that slot, so `per_sample` follows input order no matter
//! which call finishes first. A failed sample never stops the run.

use chrono::Utc;
use futures::stream::{self, StreamExt};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::config::BenchmarkConfig;
use crate::dataset::Sample;
use crate::extractors::{measure_async, ExtractionError, ExtractionResult, Extractor, ExtractorRegistry};
use crate::metrics::{compute_metrics_with, NormalizationOptions};

use super::error::BenchmarkError;
use super::report::{aggregate, BenchmarkReport, FailureKind, MethodReport, SampleMetrics, SampleRecord};

/// Runner settings
#[derive(Debug, Clone)]
pub struct RunnerOptions {
    /// Maximum extraction calls in flight
    pub concurrency: usize,
    /// Per-sample extraction timeout
    pub sample_timeout: Option<Duration>,
    pub normalization: NormalizationOptions,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            concurrency: 4,
            sample_timeout: None,
            normalization: NormalizationOptions::default(),
        }
    }
}

impl RunnerOptions {
    pub fn from_config(config: &BenchmarkConfig) -> anyhow::Result<Self> {
        let sample_timeout = config
            .runner
            .sample_timeout_secs
            .map(|secs| {
                Duration::try_from_secs_f64(secs)
                    .map_err(|e| anyhow::anyhow!("invalid runner.sample_timeout_secs {}: {}", secs, e))
            })
            .transpose()?;
        Ok(Self {
            concurrency: config.runner.concurrency.max(1),
            sample_timeout,
            normalization: config.normalization,
        })
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_sample_timeout(mut self, timeout: Duration) -> Self {
        self.sample_timeout = Some(timeout);
        self
    }
}

/// Runs OCR extractors on a dataset and aggregates metrics
pub struct BenchmarkRunner {
    options: RunnerOptions,
    permits: Arc<Semaphore>,
    cancel: CancellationToken,
}

/// Why an extraction attempt produced no text
struct SampleFailure {
    kind: FailureKind,
    error: ExtractionError,
}

impl BenchmarkRunner {
    pub fn new(options: RunnerOptions) -> Self {
        let permits = Arc::new(Semaphore::new(options.concurrency.max(1)));
        Self {
            options,
            permits,
            cancel: CancellationToken::new(),
        }
    }

    pub fn options(&self) -> &RunnerOptions {
        &self.options
    }

    /// Token that stops issuing new extraction calls when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Evaluate one method over `samples`
    ///
    /// Only an empty sample sequence is an error; everything that goes wrong
    /// for an individual sample is recorded in that sample's record.
    pub async fn run(
        &self,
        method_name: &str,
        extractor: &dyn Extractor,
        samples: &[Sample],
    ) -> Result<MethodReport, BenchmarkError> {
        if samples.is_empty() {
            return Err(BenchmarkError::EmptyDataset);
        }

        tracing::info!(
            "Evaluating '{}' on {} samples (concurrency {})",
            method_name,
            samples.len(),
            self.options.concurrency
        );

        let mut slots: Vec<Option<SampleRecord>> = (0..samples.len()).map(|_| None).collect();

        let mut completed = stream::iter(samples.iter().enumerate())
            .map(|(index, sample)| async move { (index, self.evaluate_sample(extractor, sample).await) })
            .buffer_unordered(self.options.concurrency.max(1));

        while let Some((index, record)) = completed.next().await {
            slots[index] = record;
        }

        let skipped = slots.iter().filter(|slot| slot.is_none()).count();
        let records: Vec<SampleRecord> = slots.into_iter().flatten().collect();

        let mut report = aggregate(method_name, records);
        if self.cancel.is_cancelled() {
            report = report.with_cancellation(skipped);
            tracing::warn!(
                "'{}' cancelled: {} evaluated, {} skipped",
                method_name,
                report.sample_count,
                skipped
            );
        }

        tracing::info!("'{}' done: {}", method_name, report.format_summary());
        Ok(report)
    }

    /// Evaluate several registered methods over the same samples
    ///
    /// Every name is resolved before any sample is processed. Methods run
    /// concurrently and share this runner's concurrency budget.
    pub async fn run_methods(
        &self,
        registry: &ExtractorRegistry,
        method_names: &[String],
        samples: &[Sample],
    ) -> Result<BenchmarkReport, BenchmarkError> {
        // Same folding as the registry keys
        let mut unique: Vec<String> = Vec::new();
        for name in method_names {
            let key = name.to_lowercase();
            if !unique.contains(&key) {
                unique.push(key);
            }
        }

        let extractors = registry.create_all(&unique)?;
        if samples.is_empty() {
            return Err(BenchmarkError::EmptyDataset);
        }

        // Reports are keyed by the requested method, not the extractor's own name
        let runs = unique.iter().zip(extractors.iter()).map(|(method, extractor)| async move {
            let report = self.run(method, extractor.as_ref(), samples).await;
            extractor.cleanup().await;
            report
        });

        let mut methods = BTreeMap::new();
        for report in futures::future::join_all(runs).await {
            let report = report?;
            methods.insert(report.method_name.clone(), report);
        }

        let mut metadata = Map::new();
        metadata.insert(
            "normalization".to_string(),
            Value::from(self.options.normalization.describe()),
        );
        metadata.insert("concurrency".to_string(), Value::from(self.options.concurrency));
        if let Some(timeout) = self.options.sample_timeout {
            metadata.insert("sample_timeout_secs".to_string(), Value::from(timeout.as_secs_f64()));
        }

        Ok(BenchmarkReport {
            dataset_size: samples.len(),
            generated_at: Utc::now(),
            methods,
            metadata,
        })
    }

    /// Evaluate one sample; `None` means it was never issued (cancelled)
    async fn evaluate_sample(&self, extractor: &dyn Extractor, sample: &Sample) -> Option<SampleRecord> {
        let _permit = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return None,
            permit = self.permits.acquire() => permit.ok()?,
        };
        if self.cancel.is_cancelled() {
            return None;
        }

        let ground_truth = match resolve_ground_truth(sample) {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!("{}", err);
                return Some(SampleRecord::failed(
                    sample,
                    FailureKind::SampleResolution,
                    err.to_string(),
                    false,
                ));
            }
        };

        let (outcome, elapsed) = measure_async(self.extract(extractor, sample)).await;
        match outcome {
            Ok(mut extraction) => {
                extraction.latency_seconds = elapsed.as_secs_f64();
                let text_metrics =
                    compute_metrics_with(ground_truth, &extraction.text, &self.options.normalization);
                let metrics =
                    SampleMetrics::new(text_metrics, extraction.latency_seconds, extraction.confidence);
                tracing::debug!(
                    "{} / {}: CER {:.4} WER {:.4} ({:.2}s)",
                    extractor.name(),
                    sample.id,
                    metrics.cer,
                    metrics.wer,
                    metrics.latency_seconds
                );
                Some(SampleRecord::succeeded(sample, metrics, extraction, ground_truth))
            }
            Err(failure) => {
                tracing::warn!(
                    "{} / {} failed ({:?}, retryable: {}): {}",
                    extractor.name(),
                    sample.id,
                    failure.kind,
                    failure.error.retryable,
                    failure.error.reason
                );
                Some(SampleRecord::failed(
                    sample,
                    failure.kind,
                    failure.error.reason,
                    failure.error.retryable,
                ))
            }
        }
    }

    async fn extract(&self, extractor: &dyn Extractor, sample: &Sample) -> Result<ExtractionResult, SampleFailure> {
        let call = extractor.extract(sample);
        let result = match self.options.sample_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => {
                    return Err(SampleFailure {
                        kind: FailureKind::Timeout,
                        error: ExtractionError::retryable(format!(
                            "extraction timed out after {:.1}s",
                            limit.as_secs_f64()
                        )),
                    })
                }
            },
            None => call.await,
        };
        result.map_err(|error| SampleFailure {
            kind: FailureKind::Extraction,
            error,
        })
    }
}

/// Ground truth of a sample that is fit for evaluation
fn resolve_ground_truth(sample: &Sample) -> Result<&str, BenchmarkError> {
    if sample.id.trim().is_empty() {
        return Err(BenchmarkError::SampleResolution {
            sample_id: sample.id.clone(),
            reason: "empty sample id".to_string(),
        });
    }
    sample
        .ground_truth
        .as_deref()
        .ok_or_else(|| BenchmarkError::SampleResolution {
            sample_id: sample.id.clone(),
            reason: "missing ground truth".to_string(),
        })
}
