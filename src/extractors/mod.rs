//! OCR extraction backends
//!
//! Provides a unified trait for different extraction implementations:
//! - plaintext (reads the source file, baseline)
//! - textract (Textract response documents through a client seam)

pub mod plaintext;
pub mod registry;
pub mod textract;
pub mod traits;

pub use plaintext::PlainTextExtractor;
pub use registry::ExtractorRegistry;
pub use textract::{CachedResponseClient, TextractClient, TextractExtractor, TextractResponse};
pub use traits::{measure_async, ExtractionError, ExtractionResult, Extractor};
