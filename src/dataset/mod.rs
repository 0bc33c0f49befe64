//! Dataset loading
//!
//! Reads OmniDocBench-style JSONL manifests into [`Sample`]s.
//!
//! ```rust,ignore
//! use dataset::{load_manifest, limit_samples};
//!
//! let samples = load_manifest(Path::new("data/manifest.jsonl"))?;
//! let samples = limit_samples(samples, Some(50));
//! ```

pub mod loader;
pub mod sample;

pub use loader::{iter_batches, limit_samples, load_manifest};
pub use sample::Sample;
