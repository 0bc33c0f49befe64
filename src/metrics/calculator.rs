//! Per-sample accuracy metrics for OCR output
//!
//! ## Metrics Overview
//!
//! - **CER**: character edit distance / reference characters
//! - **WER**: token edit distance / reference tokens
//! - **Token P/R/F1**: bag-of-words overlap (duplicates counted)
//! - **Exact match**: normalized hypothesis equals normalized reference
//!
//! All families are derived from the same normalized strings, so
//! `exact_match == 1` always implies `cer == 0`, `wer == 0` and `f1 == 1`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::edit_distance::edit_distance;
use super::normalize::{normalize_with, NormalizationOptions};

pub const CHARACTER_ERROR_RATE: &str = "character_error_rate";
pub const WORD_ERROR_RATE: &str = "word_error_rate";
pub const TOKEN_PRECISION: &str = "token_precision";
pub const TOKEN_RECALL: &str = "token_recall";
pub const TOKEN_F1: &str = "token_f1";
pub const EXACT_MATCH: &str = "exact_match";

/// Metric names in reporting order
pub const METRIC_NAMES: [&str; 6] = [
    CHARACTER_ERROR_RATE,
    WORD_ERROR_RATE,
    TOKEN_PRECISION,
    TOKEN_RECALL,
    TOKEN_F1,
    EXACT_MATCH,
];

/// Accuracy metrics for one reference/hypothesis pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextMetrics {
    /// Character error rate (can exceed 1.0 for long hypotheses)
    pub cer: f64,
    /// Word error rate (can exceed 1.0 for long hypotheses)
    pub wer: f64,
    /// Token precision in [0, 1]
    pub precision: f64,
    /// Token recall in [0, 1]
    pub recall: f64,
    /// Token F1 in [0, 1]
    pub f1: f64,
    /// 1.0 on exact normalized match, else 0.0
    pub exact_match: f64,
}

impl TextMetrics {
    /// (name, value) pairs in `METRIC_NAMES` order
    pub fn named_values(&self) -> [(&'static str, f64); 6] {
        [
            (CHARACTER_ERROR_RATE, self.cer),
            (WORD_ERROR_RATE, self.wer),
            (TOKEN_PRECISION, self.precision),
            (TOKEN_RECALL, self.recall),
            (TOKEN_F1, self.f1),
            (EXACT_MATCH, self.exact_match),
        ]
    }

    pub fn is_exact_match(&self) -> bool {
        self.exact_match >= 1.0
    }
}

/// Compute metrics with default normalization
pub fn compute_metrics(reference: &str, hypothesis: &str) -> TextMetrics {
    compute_metrics_with(reference, hypothesis, &NormalizationOptions::default())
}

/// Compute metrics with explicit normalization options
pub fn compute_metrics_with(
    reference: &str,
    hypothesis: &str,
    options: &NormalizationOptions,
) -> TextMetrics {
    let norm_ref = normalize_with(reference, options);
    let norm_hyp = normalize_with(hypothesis, options);

    let ref_chars: Vec<char> = norm_ref.chars().collect();
    let hyp_chars: Vec<char> = norm_hyp.chars().collect();
    let cer = error_rate(edit_distance(&ref_chars, &hyp_chars), ref_chars.len());

    let ref_tokens: Vec<&str> = norm_ref.split(' ').filter(|t| !t.is_empty()).collect();
    let hyp_tokens: Vec<&str> = norm_hyp.split(' ').filter(|t| !t.is_empty()).collect();
    let wer = error_rate(edit_distance(&ref_tokens, &hyp_tokens), ref_tokens.len());

    let (precision, recall, f1) = token_precision_recall_f1(&ref_tokens, &hyp_tokens);

    TextMetrics {
        cer,
        wer,
        precision,
        recall,
        f1,
        exact_match: if norm_ref == norm_hyp { 1.0 } else { 0.0 },
    }
}

/// Edit distance over reference length, divisor guarded at 1
///
/// An empty reference therefore yields the hypothesis length as the rate.
fn error_rate(distance: usize, reference_len: usize) -> f64 {
    distance as f64 / reference_len.max(1) as f64
}

/// Bag-of-words precision, recall and F1
///
/// Two empty bags are a perfect match (1.0, 1.0, 1.0).
pub fn token_precision_recall_f1(reference: &[&str], hypothesis: &[&str]) -> (f64, f64, f64) {
    if reference.is_empty() && hypothesis.is_empty() {
        return (1.0, 1.0, 1.0);
    }

    let mut ref_counts: HashMap<&str, usize> = HashMap::new();
    for token in reference {
        *ref_counts.entry(*token).or_default() += 1;
    }
    let mut hyp_counts: HashMap<&str, usize> = HashMap::new();
    for token in hypothesis {
        *hyp_counts.entry(*token).or_default() += 1;
    }

    let overlap: usize = ref_counts
        .iter()
        .map(|(token, ref_n)| hyp_counts.get(token).map_or(0, |hyp_n| (*ref_n).min(*hyp_n)))
        .sum();

    let precision = overlap as f64 / hypothesis.len().max(1) as f64;
    let recall = overlap as f64 / reference.len().max(1) as f64;
    let f1 = if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    };
    (precision, recall, f1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < EPS
    }

    #[test]
    fn test_identity_metrics() {
        for s in ["", "hello", "The quick  brown fox", "a a a", "  spaced\tout\n"] {
            let m = compute_metrics(s, s);
            assert_eq!(m.cer, 0.0, "{:?}", s);
            assert_eq!(m.wer, 0.0, "{:?}", s);
            assert_eq!(m.exact_match, 1.0, "{:?}", s);
            assert_eq!(m.f1, 1.0, "{:?}", s);
        }
    }

    #[test]
    fn test_one_word_substitution() {
        let m = compute_metrics("the cat sat", "the cat sit");
        assert!(approx(m.wer, 1.0 / 3.0));
        assert!(approx(m.cer, 1.0 / 11.0));
        assert_eq!(m.exact_match, 0.0);
        assert!(approx(m.precision, 2.0 / 3.0));
        assert!(approx(m.recall, 2.0 / 3.0));
    }

    #[test]
    fn test_empty_reference_guard() {
        let m = compute_metrics("", "hello");
        assert!(approx(m.cer, 5.0));
        assert!(approx(m.wer, 1.0));
        assert_eq!(m.precision, 0.0);
        assert_eq!(m.recall, 0.0);
        assert_eq!(m.f1, 0.0);
        assert_eq!(m.exact_match, 0.0);
    }

    #[test]
    fn test_empty_hypothesis() {
        let m = compute_metrics("hello world", "");
        assert!(approx(m.cer, 1.0));
        assert!(approx(m.wer, 1.0));
        assert_eq!(m.f1, 0.0);
    }

    #[test]
    fn test_bag_of_words_duplicates() {
        let m = compute_metrics("a a b", "a b b");
        assert!(approx(m.precision, 2.0 / 3.0));
        assert!(approx(m.recall, 2.0 / 3.0));
        assert!(approx(m.f1, 2.0 / 3.0));
    }

    #[test]
    fn test_formatting_differences_ignored() {
        let m = compute_metrics("Hello   World", "  hello world\n");
        assert_eq!(m.exact_match, 1.0);
        assert_eq!(m.cer, 0.0);
    }

    #[test]
    fn test_cer_can_exceed_one() {
        let m = compute_metrics("ab", "abcdefgh");
        assert!(approx(m.cer, 3.0));
        assert!(m.precision < 1.0);
    }

    #[test]
    fn test_punctuation_option() {
        let strict = compute_metrics("Hello, world!", "hello world");
        assert_eq!(strict.exact_match, 0.0);

        let opts = NormalizationOptions::default().with_strip_punctuation(true);
        let lenient = compute_metrics_with("Hello, world!", "hello world", &opts);
        assert!(lenient.is_exact_match());
        assert_eq!(lenient.wer, 0.0);
    }

    #[test]
    fn test_exact_match_implies_perfect_scores() {
        let pairs = [("A  B", "a b"), ("x", "X"), ("", "   ")];
        for (r, h) in pairs {
            let m = compute_metrics(r, h);
            assert!(m.is_exact_match());
            assert_eq!(m.cer, 0.0);
            assert_eq!(m.wer, 0.0);
            assert_eq!(m.f1, 1.0);
        }
    }

    #[test]
    fn test_named_values_order() {
        let m = compute_metrics("a", "b");
        let names: Vec<&str> = m.named_values().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, METRIC_NAMES.to_vec());
    }

    #[test]
    fn test_disjoint_tokens() {
        let (p, r, f1) = token_precision_recall_f1(&["a", "b"], &["c"]);
        assert_eq!((p, r, f1), (0.0, 0.0, 0.0));
    }
}
