//! Method name → extractor factory
//!
//! New backends register a factory here; the runner only ever sees
//! `Arc<dyn Extractor>`.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::benchmark::BenchmarkError;
use crate::config::BenchmarkConfig;

use super::plaintext::{PlainTextExtractor, PLAINTEXT_METHOD};
use super::textract::{TextractExtractor, TEXTRACT_METHOD};
use super::traits::Extractor;

type Factory = Box<dyn Fn() -> Arc<dyn Extractor> + Send + Sync>;

/// Registry of available extraction methods
#[derive(Default)]
pub struct ExtractorRegistry {
    factories: BTreeMap<String, Factory>,
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in `plaintext` and `textract` backends
    pub fn with_defaults(config: &BenchmarkConfig) -> Self {
        let mut registry = Self::new();
        registry.register(PLAINTEXT_METHOD, || Arc::new(PlainTextExtractor::new()));

        let textract = config.textract.clone();
        registry.register(TEXTRACT_METHOD, move || {
            Arc::new(TextractExtractor::from_config(textract.clone()))
        });
        registry
    }

    /// Register (or replace) a backend under a case-insensitive name
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn() -> Arc<dyn Extractor> + Send + Sync + 'static,
    {
        self.factories.insert(name.to_lowercase(), Box::new(factory));
    }

    /// Build the extractor registered under `name`
    pub fn create(&self, name: &str) -> Result<Arc<dyn Extractor>, BenchmarkError> {
        self.factories
            .get(&name.to_lowercase())
            .map(|factory| factory())
            .ok_or_else(|| BenchmarkError::UnknownMethod {
                name: name.to_string(),
                available: self.names().join(", "),
            })
    }

    /// Resolve all names up front; fails on the first unknown one
    pub fn create_all(&self, names: &[String]) -> Result<Vec<Arc<dyn Extractor>>, BenchmarkError> {
        names.iter().map(|name| self.create(name)).collect()
    }

    /// Registered method names, sorted
    pub fn names(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(&name.to_lowercase())
    }
}
