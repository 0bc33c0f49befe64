//! Human-readable rendering of benchmark reports

use crate::benchmark::{Aggregate, BenchmarkReport, MethodReport};
use crate::metrics::METRIC_NAMES;

const NOT_AVAILABLE: &str = "n/a";

fn fmt_optional(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| format!("{:.4}", v))
}

/// Multi-line summary for one method
pub fn format_method_summary(method: &MethodReport) -> String {
    let mut lines = vec![format!("Method: {}", method.method_name)];
    lines.push(format!(
        "  Samples: {} (failed: {}{})",
        method.sample_count,
        method.failure_count,
        if method.cancelled {
            format!(", skipped: {}", method.skipped_count)
        } else {
            String::new()
        }
    ));

    match &method.aggregate {
        Aggregate::Computed { metrics, .. } => {
            lines.push("  Aggregated metrics:".to_string());
            for (name, value) in metrics {
                lines.push(format!("    - {}: {:.4}", name, value));
            }
        }
        Aggregate::NoSuccessfulSamples => {
            lines.push("  Aggregated metrics: n/a (no successful samples)".to_string());
        }
    }

    lines.push(format!(
        "  Average confidence: {}",
        fmt_optional(method.aggregate.mean_confidence())
    ));
    lines.push(format!(
        "  Average latency (s): {}",
        fmt_optional(method.aggregate.mean_latency_seconds())
    ));
    lines.join("\n")
}

/// Plain-text report for every method
pub fn format_report(report: &BenchmarkReport) -> String {
    let mut lines = vec![
        format!("Dataset size: {}", report.dataset_size),
        format!("Run timestamp: {}", report.generated_at.to_rfc3339()),
    ];
    for method in report.methods.values() {
        lines.push(String::new());
        lines.push(format_method_summary(method));
    }
    lines.join("\n")
}

/// Markdown table of aggregated metrics, one row per method
pub fn as_markdown_table(report: &BenchmarkReport) -> String {
    if report.methods.is_empty() {
        return "No methods evaluated".to_string();
    }

    let mut header: Vec<String> = vec!["Method".to_string()];
    header.extend(METRIC_NAMES.iter().map(|name| name.replace('_', " ")));
    header.push("Avg confidence".to_string());
    header.push("Avg latency (s)".to_string());
    header.push("Failures".to_string());

    let mut rows = vec![
        header.join(" | "),
        vec!["---"; header.len()].join(" | "),
    ];

    for method in report.methods.values() {
        let mut row = vec![method.method_name.clone()];
        row.extend(METRIC_NAMES.iter().map(|name| fmt_optional(method.aggregate.metric(name))));
        row.push(fmt_optional(method.aggregate.mean_confidence()));
        row.push(fmt_optional(method.aggregate.mean_latency_seconds()));
        row.push(format!("{}/{}", method.failure_count, method.sample_count));
        rows.push(row.join(" | "));
    }

    rows.join("\n")
}
