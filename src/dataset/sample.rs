//! Document samples with their reference transcriptions

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// A single document (page) to evaluate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sample {
    /// Unique identifier, stable across runs
    pub id: String,
    /// Path to the document/image, opaque to the metrics
    pub source: PathBuf,
    /// Reference transcription
    ///
    /// Always set by the manifest loader; `None` only for samples assembled
    /// by hand, which the runner records as a resolution failure.
    pub ground_truth: Option<String>,
    /// Any extra manifest keys, passed through to reports verbatim
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Sample {
    pub fn new(id: impl Into<String>, source: impl Into<PathBuf>, ground_truth: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            ground_truth: Some(ground_truth.into()),
            metadata: Map::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Dataset split from metadata, "unknown" when absent
    pub fn split(&self) -> String {
        match self.metadata.get("split") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => "unknown".to_string(),
        }
    }

    /// Source read as UTF-8 text, for text-based baselines
    pub fn load_text(&self) -> Result<String> {
        std::fs::read_to_string(&self.source)
            .with_context(|| format!("Failed to read source for sample {}: {}", self.id, self.source.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_defaults_to_unknown() {
        let sample = Sample::new("a", "a.txt", "text");
        assert_eq!(sample.split(), "unknown");

        let sample = sample.with_metadata("split", "test");
        assert_eq!(sample.split(), "test");
    }

    #[test]
    fn test_non_string_split() {
        let sample = Sample::new("a", "a.txt", "text").with_metadata("split", 3);
        assert_eq!(sample.split(), "3");
    }

    #[test]
    fn test_load_text_missing_file() {
        let sample = Sample::new("missing", "/definitely/not/here.txt", "");
        let err = sample.load_text().unwrap_err();
        assert!(err.to_string().contains("missing"));
    }
}
