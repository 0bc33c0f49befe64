//! Manifest loader for OCR benchmark datasets
//!
//! ## Manifest Format (JSON Lines)
//!
//! One JSON object per line:
//!
//! ```json
//! {"id": "page-001", "source": "images/page-001.png", "ground_truth": "Invoice #42", "split": "test"}
//! {"id": "page-002", "source": "images/page-002.png", "ground_truth_path": "gt/page-002.txt"}
//! ```
//!
//! - `id` and `source` are required; `source` is relative to the manifest.
//! - Exactly one of `ground_truth` (inline) or `ground_truth_path` (UTF-8 file
//!   relative to the manifest) must be present.
//! - All remaining keys are kept as sample metadata.
//! - Blank lines are skipped.

use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};
use std::path::Path;

use super::sample::Sample;

const RESERVED_KEYS: [&str; 4] = ["id", "source", "ground_truth", "ground_truth_path"];

/// Load every sample from a JSONL manifest
pub fn load_manifest(manifest_path: &Path) -> Result<Vec<Sample>> {
    if !manifest_path.exists() {
        bail!("Manifest not found: {}", manifest_path.display());
    }

    let content = std::fs::read_to_string(manifest_path)
        .with_context(|| format!("Failed to read manifest: {}", manifest_path.display()))?;
    let base_dir = manifest_path.parent().unwrap_or_else(|| Path::new("."));

    let mut samples = Vec::new();
    for (idx, raw_line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        let record: Value = serde_json::from_str(line).with_context(|| {
            format!("Invalid JSON on line {} of {}", line_no, manifest_path.display())
        })?;
        let Value::Object(record) = record else {
            bail!(
                "Line {} of {} is not a JSON object",
                line_no,
                manifest_path.display()
            );
        };

        let sample = parse_record(record, base_dir)
            .with_context(|| format!("Line {} of {}", line_no, manifest_path.display()))?;
        samples.push(sample);
    }

    if samples.is_empty() {
        bail!("Manifest {} did not yield any samples", manifest_path.display());
    }

    tracing::debug!(
        "Loaded {} samples from {}",
        samples.len(),
        manifest_path.display()
    );
    Ok(samples)
}

fn parse_record(mut record: Map<String, Value>, base_dir: &Path) -> Result<Sample> {
    let id = match record.get("id") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(_) => bail!("Key 'id' must be a non-empty string"),
        None => bail!("Missing required key 'id'"),
    };

    let source = match record.get("source") {
        Some(Value::String(s)) => base_dir.join(s),
        Some(_) => bail!("Key 'source' must be a string for sample {}", id),
        None => bail!("Missing required key 'source' for sample {}", id),
    };

    let ground_truth = match (record.get("ground_truth"), record.get("ground_truth_path")) {
        (Some(_), Some(_)) => bail!(
            "Sample {} has both 'ground_truth' and 'ground_truth_path'; provide exactly one",
            id
        ),
        (Some(Value::String(text)), None) => text.clone(),
        (Some(Value::Null), None) => bail!("Sample {} has a null 'ground_truth'", id),
        (Some(other), None) => other.to_string(),
        (None, Some(Value::String(rel))) => {
            let gt_path = base_dir.join(rel);
            if !gt_path.exists() {
                bail!(
                    "Ground truth file not found for {}: {}",
                    id,
                    gt_path.display()
                );
            }
            std::fs::read_to_string(&gt_path).with_context(|| {
                format!("Failed to read ground truth for {}: {}", id, gt_path.display())
            })?
        }
        (None, Some(_)) => bail!("Key 'ground_truth_path' must be a string for sample {}", id),
        (None, None) => bail!(
            "Either 'ground_truth' or 'ground_truth_path' must be provided for sample {}",
            id
        ),
    };

    for key in RESERVED_KEYS {
        record.remove(key);
    }

    Ok(Sample {
        id,
        source,
        ground_truth: Some(ground_truth),
        metadata: record,
    })
}

/// Return at most `limit` samples, preserving order
pub fn limit_samples(samples: Vec<Sample>, limit: Option<usize>) -> Vec<Sample> {
    match limit {
        Some(n) if n < samples.len() => samples.into_iter().take(n).collect(),
        _ => samples,
    }
}

/// Split samples into consecutive batches of `batch_size`
pub fn iter_batches(samples: &[Sample], batch_size: usize) -> Result<std::slice::Chunks<'_, Sample>> {
    if batch_size == 0 {
        bail!("batch_size must be positive");
    }
    Ok(samples.chunks(batch_size))
}
