//! Text normalization applied before every comparison
//!
//! Every metric sees the same canonical form, so formatting noise (extra
//! spaces, letter case, compatibility glyphs) never counts as an OCR error.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Options controlling text normalization
///
/// Defaults: NFKC folding on, lowercase on, punctuation kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizationOptions {
    /// Apply Unicode NFKC compatibility folding (e.g. "ﬁ" → "fi")
    #[serde(default = "default_true")]
    pub unicode_nfkc: bool,

    /// Fold to lower case
    #[serde(default = "default_true")]
    pub lowercase: bool,

    /// Drop punctuation characters before whitespace collapsing
    #[serde(default)]
    pub strip_punctuation: bool,
}

fn default_true() -> bool { true }

impl Default for NormalizationOptions {
    fn default() -> Self {
        Self {
            unicode_nfkc: true,
            lowercase: true,
            strip_punctuation: false,
        }
    }
}

impl NormalizationOptions {
    pub fn with_strip_punctuation(mut self, strip: bool) -> Self {
        self.strip_punctuation = strip;
        self
    }

    /// Short label for reports, e.g. "nfkc+lower"
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if self.unicode_nfkc {
            parts.push("nfkc");
        }
        if self.lowercase {
            parts.push("lower");
        }
        if self.strip_punctuation {
            parts.push("strip-punct");
        }
        if parts.is_empty() {
            "whitespace-only".to_string()
        } else {
            parts.join("+")
        }
    }
}

/// Normalize text with the default options
pub fn normalize(text: &str) -> String {
    normalize_with(text, &NormalizationOptions::default())
}

/// Normalize text with explicit options
///
/// Collapses runs of Unicode whitespace to a single space and trims both ends.
/// Idempotent for every option combination.
pub fn normalize_with(text: &str, options: &NormalizationOptions) -> String {
    let mut current: String = if options.unicode_nfkc {
        text.nfkc().collect()
    } else {
        text.to_string()
    };

    if options.lowercase {
        current = current.to_lowercase();
    }
    if options.strip_punctuation {
        current = PUNCTUATION.replace_all(&current, "").into_owned();
    }
    // Lowercasing and removals can leave sequences that compose differently.
    if options.unicode_nfkc && (options.lowercase || options.strip_punctuation) {
        current = current.nfkc().collect();
    }

    current.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Unicode punctuation (general category P) plus ASCII punctuation symbols
static PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{P}[:punct:]]").expect("valid punctuation regex"));
