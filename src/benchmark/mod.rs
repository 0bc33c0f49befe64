//! Benchmark infrastructure
//!
//! Runs extraction methods over a dataset and aggregates OCR quality metrics.
//!
//! ## Usage
//!
//! ```bash
//! ocr-benchmark run --manifest ./data/manifest.jsonl --methods plaintext textract
//! ```
//!
//! ## Modules
//!
//! - `runner` - Bounded-concurrency evaluation with per-sample failure isolation
//! - `report` - Per-sample records, per-method aggregates, top-level report
//! - `error` - Run-level errors

pub mod error;
pub mod report;
pub mod runner;


pub use error::BenchmarkError;
pub use report::{
    aggregate, Aggregate, BenchmarkReport, FailureKind, MethodReport, SampleMetrics, SampleOutcome,
    SampleRecord,
};
pub use runner::{BenchmarkRunner, RunnerOptions};
