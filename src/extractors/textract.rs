//! Textract backend implementation
//!
//! Turns Textract `DetectDocumentText` / `AnalyzeDocument` responses into a
//! transcription. The service call sits behind [`TextractClient`], so the
//! backend can be driven by any client; [`CachedResponseClient`] replays
//! responses saved on disk as `<responses_dir>/<sample id>.json`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::{TextractApiMode, TextractConfig};
use crate::dataset::Sample;

use super::traits::{ExtractionError, ExtractionResult, Extractor};

pub const TEXTRACT_METHOD: &str = "textract";

/// One Textract block (only the fields the benchmark reads)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TextractBlock {
    #[serde(default)]
    pub block_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Percent confidence in [0, 100]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// Response document returned by both Textract APIs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TextractResponse {
    #[serde(default)]
    pub blocks: Vec<TextractBlock>,
}

/// What the backend asks the client for
#[derive(Debug, Clone)]
pub struct TextractRequest<'a> {
    pub sample_id: &'a str,
    pub document: Vec<u8>,
    pub api_mode: TextractApiMode,
    pub feature_types: &'a [String],
}

/// Seam for the Textract service
#[async_trait::async_trait]
pub trait TextractClient: Send + Sync {
    /// Whether `call` needs the document bytes (replay clients do not)
    fn needs_document(&self) -> bool {
        true
    }

    async fn call(&self, request: TextractRequest<'_>) -> Result<TextractResponse, ExtractionError>;
}

/// Client replaying saved responses from a directory
pub struct CachedResponseClient {
    responses_dir: PathBuf,
}

impl CachedResponseClient {
    pub fn new(responses_dir: impl Into<PathBuf>) -> Self {
        Self {
            responses_dir: responses_dir.into(),
        }
    }

    fn response_path(&self, sample_id: &str) -> PathBuf {
        self.responses_dir.join(format!("{}.json", sample_id))
    }
}

#[async_trait::async_trait]
impl TextractClient for CachedResponseClient {
    fn needs_document(&self) -> bool {
        false
    }

    async fn call(&self, request: TextractRequest<'_>) -> Result<TextractResponse, ExtractionError> {
        let path = self.response_path(request.sample_id);
        let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
            ExtractionError::fatal(format!(
                "No cached Textract response for {}: {} ({})",
                request.sample_id,
                path.display(),
                e
            ))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            ExtractionError::fatal(format!(
                "Malformed Textract response {}: {}",
                path.display(),
                e
            ))
        })
    }
}

/// Run OCR through Textract
pub struct TextractExtractor<C: TextractClient> {
    name: String,
    config: TextractConfig,
    client: C,
}

impl TextractExtractor<CachedResponseClient> {
    /// Backend replaying responses from `config.responses_dir`
    pub fn from_config(config: TextractConfig) -> Self {
        let client = CachedResponseClient::new(config.responses_dir.clone());
        Self::with_client(config, client)
    }
}

impl<C: TextractClient> TextractExtractor<C> {
    pub fn with_client(config: TextractConfig, client: C) -> Self {
        Self {
            name: TEXTRACT_METHOD.to_string(),
            config,
            client,
        }
    }

    /// Report under a name other than `textract`
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn config(&self) -> &TextractConfig {
        &self.config
    }
}

#[async_trait::async_trait]
impl<C: TextractClient> Extractor for TextractExtractor<C> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn extract(&self, sample: &Sample) -> Result<ExtractionResult, ExtractionError> {
        let document = if self.client.needs_document() {
            tokio::fs::read(&sample.source).await.map_err(|e| {
                ExtractionError::fatal(format!(
                    "Failed to read {}: {}",
                    sample.source.display(),
                    e
                ))
            })?
        } else {
            Vec::new()
        };

        let response = self
            .client
            .call(TextractRequest {
                sample_id: &sample.id,
                document,
                api_mode: self.config.api_mode,
                feature_types: &self.config.feature_types,
            })
            .await?;

        let (lines, confidences) = collect_lines(&response.blocks);

        let mut result = ExtractionResult::new(lines.join("\n"))
            .with_metadata("textract_api_mode", self.config.api_mode.name())
            .with_metadata("textract_feature_types", self.config.feature_types.clone());
        if let Some(region) = &self.config.region {
            result = result.with_metadata("textract_region", region.as_str());
        }
        if !confidences.is_empty() {
            let mean = confidences.iter().sum::<f64>() / confidences.len() as f64;
            result = result.with_confidence(mean);
        }
        Ok(result)
    }
}

/// Non-empty `LINE` block texts and their confidences scaled to [0, 1]
pub fn collect_lines(blocks: &[TextractBlock]) -> (Vec<String>, Vec<f64>) {
    let mut lines = Vec::new();
    let mut confidences = Vec::new();
    for block in blocks.iter().filter(|b| b.block_type == "LINE") {
        let Some(text) = block.text.as_deref().filter(|t| !t.is_empty()) else {
            continue;
        };
        lines.push(text.to_string());
        if let Some(conf) = block.confidence {
            confidences.push(conf / 100.0);
        }
    }
    (lines, confidences)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    const RESPONSE: &str = r#"{
        "Blocks": [
            {"BlockType": "PAGE"},
            {"BlockType": "LINE", "Text": "Invoice 42", "Confidence": 99.0},
            {"BlockType": "WORD", "Text": "Invoice", "Confidence": 99.5},
            {"BlockType": "LINE", "Text": "", "Confidence": 10.0},
            {"BlockType": "LINE", "Text": "Total: 10 EUR", "Confidence": 95.0}
        ]
    }"#;

    fn line(text: &str, confidence: Option<f64>) -> TextractBlock {
        TextractBlock {
            block_type: "LINE".to_string(),
            text: Some(text.to_string()),
            confidence,
        }
    }

    #[test]
    fn test_collect_lines() {
        let response: TextractResponse = serde_json::from_str(RESPONSE).unwrap();
        let (lines, confidences) = collect_lines(&response.blocks);
        assert_eq!(lines, vec!["Invoice 42", "Total: 10 EUR"]);
        assert_eq!(confidences, vec![0.99, 0.95]);
    }

    #[test]
    fn test_collect_lines_without_confidence() {
        let (lines, confidences) = collect_lines(&[line("a", None), line("b", Some(50.0))]);
        assert_eq!(lines.len(), 2);
        assert_eq!(confidences, vec![0.5]);
    }

    #[tokio::test]
    async fn test_cached_response_extraction() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("page-1.json"), RESPONSE).unwrap();

        let config = TextractConfig {
            responses_dir: dir.path().to_path_buf(),
            region: Some("us-east-1".to_string()),
            ..Default::default()
        };
        let extractor = TextractExtractor::from_config(config);
        let result = extractor
            .extract(&Sample::new("page-1", "page-1.png", "invoice 42"))
            .await
            .unwrap();

        assert_eq!(result.text, "Invoice 42\nTotal: 10 EUR");
        assert!((result.confidence.unwrap() - 0.97).abs() < 1e-9);
        assert_eq!(
            result.metadata.get("textract_api_mode").and_then(|v| v.as_str()),
            Some("detect_document_text")
        );
        assert_eq!(
            result.metadata.get("textract_region").and_then(|v| v.as_str()),
            Some("us-east-1")
        );
    }

    #[tokio::test]
    async fn test_missing_cached_response() {
        let dir = TempDir::new().unwrap();
        let extractor = TextractExtractor::from_config(TextractConfig {
            responses_dir: dir.path().to_path_buf(),
            ..Default::default()
        });
        let err = extractor
            .extract(&Sample::new("absent", "absent.png", ""))
            .await
            .unwrap_err();
        assert!(err.reason.contains("absent"));
        assert!(!err.retryable);
    }

    #[tokio::test]
    async fn test_no_lines_means_no_confidence() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("blank.json"), r#"{"Blocks": []}"#).unwrap();
        let extractor = TextractExtractor::from_config(TextractConfig {
            responses_dir: dir.path().to_path_buf(),
            ..Default::default()
        });
        let result = extractor.extract(&Sample::new("blank", "blank.png", "")).await.unwrap();
        assert_eq!(result.text, "");
        assert_eq!(result.confidence, None);
    }

    /// Records the request it receives
    struct RecordingClient {
        seen: Mutex<Vec<(String, usize, TextractApiMode, Vec<String>)>>,
    }

    #[async_trait::async_trait]
    impl TextractClient for RecordingClient {
        async fn call(&self, request: TextractRequest<'_>) -> Result<TextractResponse, ExtractionError> {
            self.seen.lock().unwrap().push((
                request.sample_id.to_string(),
                request.document.len(),
                request.api_mode,
                request.feature_types.to_vec(),
            ));
            Ok(TextractResponse {
                blocks: vec![line("ok", Some(80.0))],
            })
        }
    }

    #[tokio::test]
    async fn test_client_receives_document_and_mode() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("doc.png");
        std::fs::write(&source, [1u8, 2, 3, 4]).unwrap();

        let config = TextractConfig {
            api_mode: TextractApiMode::AnalyzeDocument,
            ..Default::default()
        };
        let client = RecordingClient { seen: Mutex::new(Vec::new()) };
        let extractor = TextractExtractor::with_client(config, client);

        let result = extractor.extract(&Sample::new("doc", &source, "ok")).await.unwrap();
        assert_eq!(result.text, "ok");

        let seen = extractor.client.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "doc");
        assert_eq!(seen[0].1, 4);
        assert_eq!(seen[0].2, TextractApiMode::AnalyzeDocument);
        assert_eq!(seen[0].3, vec!["TABLES", "FORMS"]);
    }

    #[test]
    fn test_with_name() {
        let extractor = TextractExtractor::from_config(TextractConfig::default());
        assert_eq!(extractor.name(), "textract");
        let renamed = extractor.with_name("textract-analyze");
        assert_eq!(renamed.name(), "textract-analyze");
    }

    #[tokio::test]
    async fn test_unreadable_document() {
        let client = RecordingClient { seen: Mutex::new(Vec::new()) };
        let extractor = TextractExtractor::with_client(TextractConfig::default(), client);
        let err = extractor
            .extract(&Sample::new("x", "/no/such/doc.png", ""))
            .await
            .unwrap_err();
        assert!(!err.retryable);
        assert!(extractor.client.seen.lock().unwrap().is_empty());
    }
}
