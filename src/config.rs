//! Configuration for the OCR benchmark
//!
//! Defines the `ocr-benchmark.toml` schema and the Textract API mode enum.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::metrics::NormalizationOptions;

/// Default config location, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "ocr-benchmark.toml";

/// Textract API mode
///
/// - `DetectDocumentText`: plain line/word detection
/// - `AnalyzeDocument`: detection plus tables/forms analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextractApiMode {
    #[default]
    DetectDocumentText,
    AnalyzeDocument,
}

impl TextractApiMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::DetectDocumentText => "detect_document_text",
            Self::AnalyzeDocument => "analyze_document",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "detect_document_text" | "detect" => Some(Self::DetectDocumentText),
            "analyze_document" | "analyze" => Some(Self::AnalyzeDocument),
            _ => None,
        }
    }
}

/// Top-level benchmark configuration loaded from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    #[serde(default)]
    pub runner: RunnerConfig,

    #[serde(default)]
    pub normalization: NormalizationOptions,

    #[serde(default)]
    pub textract: TextractConfig,
}

impl BenchmarkConfig {
    /// Load config from TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read benchmark config: {:?}", path))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse benchmark config: {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from default location (./ocr-benchmark.toml) or return defaults
    pub fn load_default() -> Result<Self> {
        let local_path = Path::new(DEFAULT_CONFIG_PATH);
        if local_path.exists() {
            return Self::load(local_path);
        }
        Ok(Self::default())
    }

    /// Save config to TOML file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.runner.concurrency == 0 {
            anyhow::bail!("runner.concurrency must be at least 1");
        }
        if let Some(timeout) = self.runner.sample_timeout_secs {
            if !(timeout.is_finite() && timeout > 0.0) {
                anyhow::bail!("runner.sample_timeout_secs must be a positive number");
            }
            if std::time::Duration::try_from_secs_f64(timeout).is_err() {
                anyhow::bail!("runner.sample_timeout_secs is too large: {}", timeout);
            }
        }
        Ok(())
    }
}

/// Runner settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Maximum extraction calls in flight, shared across methods
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Per-sample extraction timeout; a timeout is recorded as a failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_timeout_secs: Option<f64>,

    /// Evaluate only the first N manifest samples
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

fn default_concurrency() -> usize { 4 }

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            sample_timeout_secs: None,
            limit: None,
        }
    }
}

/// Textract backend configuration
///
/// Region and profile are forwarded to the client; the bundled replay client
/// only records them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextractConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Shared-credentials profile name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    #[serde(default)]
    pub api_mode: TextractApiMode,

    /// Feature types for `analyze_document`
    #[serde(default = "default_feature_types")]
    pub feature_types: Vec<String>,

    /// Directory holding `<sample id>.json` Textract responses
    #[serde(default = "default_responses_dir")]
    pub responses_dir: PathBuf,
}

fn default_feature_types() -> Vec<String> {
    vec!["TABLES".to_string(), "FORMS".to_string()]
}

fn default_responses_dir() -> PathBuf {
    PathBuf::from("textract_responses")
}

impl Default for TextractConfig {
    fn default() -> Self {
        Self {
            region: None,
            profile: None,
            api_mode: TextractApiMode::default(),
            feature_types: default_feature_types(),
            responses_dir: default_responses_dir(),
        }
    }
}
