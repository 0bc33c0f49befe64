//! OCR benchmark library
//!
//! Scores OCR extraction backends against ground-truth transcriptions with
//! CER, WER, token precision/recall/F1 and exact match.

pub mod benchmark;
pub mod config;
pub mod dataset;
pub mod extractors;
pub mod metrics;
pub mod reporting;
