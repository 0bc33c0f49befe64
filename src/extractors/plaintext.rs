//! Plain-text baseline backend
//!
//! Reads the sample source as UTF-8 text. Useful as a sanity baseline and for
//! tests: a manifest whose sources are the ground-truth files scores perfectly.

use crate::dataset::Sample;

use super::traits::{ExtractionError, ExtractionResult, Extractor};

pub const PLAINTEXT_METHOD: &str = "plaintext";

pub struct PlainTextExtractor {
    name: String,
}

impl PlainTextExtractor {
    pub fn new() -> Self {
        Self::named(PLAINTEXT_METHOD)
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for PlainTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Extractor for PlainTextExtractor {
    fn name(&self) -> &str {
        &self.name
    }

    async fn extract(&self, sample: &Sample) -> Result<ExtractionResult, ExtractionError> {
        let text = tokio::fs::read_to_string(&sample.source).await.map_err(|e| {
            ExtractionError::fatal(format!(
                "Failed to read {}: {}",
                sample.source.display(),
                e
            ))
        })?;

        Ok(ExtractionResult::new(text)
            .with_confidence(1.0)
            .with_metadata("strategy", "file-read"))
    }
}
