//! Metric computation
//!
//! ## Modules
//!
//! - `normalize` - canonical text form shared by every metric
//! - `edit_distance` - Levenshtein distance over chars or tokens
//! - `calculator` - CER, WER, token precision/recall/F1, exact match

pub mod calculator;
pub mod edit_distance;
pub mod normalize;

pub use calculator::{
    compute_metrics, compute_metrics_with, token_precision_recall_f1, TextMetrics,
    METRIC_NAMES,
};
pub use edit_distance::{char_distance, edit_distance};
pub use normalize::{normalize, normalize_with, NormalizationOptions};
