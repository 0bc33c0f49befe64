//! OCR Benchmark CLI
//!
//! Scores OCR extraction methods against ground-truth transcriptions.
//!
//! ## Quick Start
//!
//! ```bash
//! # Baseline: read the source files as text
//! ./ocr-benchmark run --manifest ./data/manifest.jsonl --methods plaintext
//!
//! # Compare against recorded Textract responses, print a Markdown table
//! ./ocr-benchmark run \
//!     --manifest ./data/manifest.jsonl \
//!     --methods plaintext textract \
//!     --textract-responses ./data/textract_responses \
//!     --output-json results/report.json \
//!     --markdown
//! ```
//!
//! ## Configuration
//!
//! Runner, normalization and Textract settings are read from
//! `ocr-benchmark.toml` when present (see `init-config`). Flags override the
//! file.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use ocr_benchmark::benchmark::{BenchmarkRunner, RunnerOptions};
use ocr_benchmark::config::{BenchmarkConfig, TextractApiMode, DEFAULT_CONFIG_PATH};
use ocr_benchmark::dataset::{limit_samples, load_manifest};
use ocr_benchmark::extractors::ExtractorRegistry;
use ocr_benchmark::reporting::{as_markdown_table, format_report};

/// Textract API mode for CLI
#[derive(Debug, Clone, Copy, ValueEnum)]
enum TextractModeArg {
    /// Plain line/word detection
    DetectDocumentText,
    /// Detection plus tables/forms analysis
    AnalyzeDocument,
}

impl From<TextractModeArg> for TextractApiMode {
    fn from(arg: TextractModeArg) -> Self {
        match arg {
            TextractModeArg::DetectDocumentText => TextractApiMode::DetectDocumentText,
            TextractModeArg::AnalyzeDocument => TextractApiMode::AnalyzeDocument,
        }
    }
}

#[derive(Parser)]
#[command(name = "ocr-benchmark")]
#[command(about = "Benchmark OCR extraction methods against ground truth")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the benchmark for one or more methods
    ///
    /// Every method sees the same samples. Exits with status 1 when a
    /// method failed on every sample.
    Run {
        /// Path to the JSONL sample manifest
        #[arg(short, long, default_value = "data/manifest.jsonl")]
        manifest: PathBuf,

        /// Extraction methods to benchmark (see `list`)
        #[arg(short = 'M', long, num_args = 1.., default_value = "plaintext")]
        methods: Vec<String>,

        /// Evaluate only the first N samples
        #[arg(short, long)]
        limit: Option<usize>,

        /// Write the detailed report to this JSON file
        #[arg(short, long)]
        output_json: Option<PathBuf>,

        /// Also print a Markdown table of aggregated metrics
        #[arg(long)]
        markdown: bool,

        /// Benchmark config file (TOML); defaults to ./ocr-benchmark.toml if present
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Maximum extraction calls in flight
        #[arg(long)]
        concurrency: Option<usize>,

        /// Per-sample extraction timeout in seconds
        #[arg(long)]
        sample_timeout: Option<f64>,

        /// Drop punctuation before comparing texts
        #[arg(long)]
        strip_punctuation: bool,

        /// Textract API mode
        #[arg(long, value_enum)]
        textract_mode: Option<TextractModeArg>,

        /// Feature types for Textract analyze_document (e.g. TABLES FORMS)
        #[arg(long, num_args = 0..)]
        textract_feature_types: Option<Vec<String>>,

        /// AWS region for Textract
        #[arg(long)]
        textract_region: Option<String>,

        /// AWS shared credentials profile for Textract
        #[arg(long)]
        textract_profile: Option<String>,

        /// Directory of recorded Textract responses (`<sample id>.json`)
        #[arg(long)]
        textract_responses: Option<PathBuf>,
    },

    /// Validate a manifest and show its split distribution
    ValidateManifest {
        /// Path to the JSONL sample manifest
        #[arg(short, long)]
        manifest: PathBuf,
    },

    /// List available extraction methods
    List,

    /// Write the default configuration to a TOML file
    InitConfig {
        /// Output path
        #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Command-line overrides applied on top of the config file
struct RunOverrides {
    limit: Option<usize>,
    concurrency: Option<usize>,
    sample_timeout: Option<f64>,
    strip_punctuation: bool,
    textract_mode: Option<TextractModeArg>,
    textract_feature_types: Option<Vec<String>>,
    textract_region: Option<String>,
    textract_profile: Option<String>,
    textract_responses: Option<PathBuf>,
}

impl RunOverrides {
    fn apply(self, config: &mut BenchmarkConfig) {
        if self.limit.is_some() {
            config.runner.limit = self.limit;
        }
        if let Some(concurrency) = self.concurrency {
            config.runner.concurrency = concurrency;
        }
        if self.sample_timeout.is_some() {
            config.runner.sample_timeout_secs = self.sample_timeout;
        }
        if self.strip_punctuation {
            config.normalization.strip_punctuation = true;
        }
        if let Some(mode) = self.textract_mode {
            config.textract.api_mode = mode.into();
        }
        if let Some(feature_types) = self.textract_feature_types {
            config.textract.feature_types = feature_types;
        }
        if self.textract_region.is_some() {
            config.textract.region = self.textract_region;
        }
        if self.textract_profile.is_some() {
            config.textract.profile = self.textract_profile;
        }
        if let Some(dir) = self.textract_responses {
            config.textract.responses_dir = dir;
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            manifest,
            methods,
            limit,
            output_json,
            markdown,
            config,
            concurrency,
            sample_timeout,
            strip_punctuation,
            textract_mode,
            textract_feature_types,
            textract_region,
            textract_profile,
            textract_responses,
        } => {
            let mut benchmark_config = match config {
                Some(path) => BenchmarkConfig::load(&path)?,
                None => BenchmarkConfig::load_default()?,
            };
            RunOverrides {
                limit,
                concurrency,
                sample_timeout,
                strip_punctuation,
                textract_mode,
                textract_feature_types,
                textract_region,
                textract_profile,
                textract_responses,
            }
            .apply(&mut benchmark_config);
            benchmark_config.validate()?;

            return run_benchmark(&manifest, &methods, output_json.as_deref(), markdown, &benchmark_config).await;
        }

        Commands::ValidateManifest { manifest } => {
            validate_manifest(&manifest)?;
        }

        Commands::List => {
            list_methods()?;
        }

        Commands::InitConfig { output, force } => {
            init_config(&output, force)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Run the benchmark and print results
async fn run_benchmark(
    manifest_path: &Path,
    methods: &[String],
    output_json: Option<&Path>,
    markdown: bool,
    config: &BenchmarkConfig,
) -> Result<ExitCode> {
    eprintln!("╔══════════════════════════════════════════════════════════════╗");
    eprintln!("║                       OCR BENCHMARK                          ║");
    eprintln!("╚══════════════════════════════════════════════════════════════╝\n");

    eprintln!("Loading manifest from {:?}...", manifest_path);
    let samples = limit_samples(load_manifest(manifest_path)?, config.runner.limit);
    eprintln!("  Samples: {}", samples.len());
    eprintln!("  Methods: {}", methods.join(", "));
    eprintln!(
        "  Normalization: {} | Concurrency: {}\n",
        config.normalization.describe(),
        config.runner.concurrency
    );

    let registry = ExtractorRegistry::with_defaults(config);
    let runner = BenchmarkRunner::new(RunnerOptions::from_config(config)?);

    let cancel = runner.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\n  Interrupted: finishing in-flight samples, skipping the rest...");
            cancel.cancel();
        }
    });

    let report = runner.run_methods(&registry, methods, &samples).await?;

    println!("{}", format_report(&report));
    if markdown {
        println!("\n{}", as_markdown_table(&report));
    }

    if let Some(output) = output_json {
        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create output directory: {:?}", parent))?;
        }
        let json = report.to_json()?;
        std::fs::write(output, &json)
            .with_context(|| format!("Failed to write report: {:?}", output))?;
        eprintln!("\nResults saved to {:?}", output);
    }

    let cancelled: Vec<&str> = report
        .methods
        .values()
        .filter(|m| m.cancelled)
        .map(|m| m.method_name.as_str())
        .collect();
    if !cancelled.is_empty() {
        eprintln!("\n  ⚠ Partial results (cancelled): {}", cancelled.join(", "));
    }

    let fully_failed = report.fully_failed_methods();
    if !fully_failed.is_empty() {
        eprintln!("\n  ✗ Every sample failed for: {}", fully_failed.join(", "));
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}

/// Validate a manifest file
fn validate_manifest(path: &Path) -> Result<()> {
    println!("Validating {:?}...", path);

    let samples = load_manifest(path)?;

    println!("✓ Valid manifest");
    println!("  Samples: {}", samples.len());

    let mut splits: BTreeMap<String, usize> = BTreeMap::new();
    for sample in &samples {
        *splits.entry(sample.split()).or_default() += 1;
    }

    println!("  Split distribution:");
    for (split, count) in &splits {
        println!("    {}: {}", split, count);
    }

    Ok(())
}

fn list_methods() -> Result<()> {
    let config = BenchmarkConfig::load_default()?;
    let registry = ExtractorRegistry::with_defaults(&config);

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║              AVAILABLE EXTRACTION METHODS                    ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    for name in registry.names() {
        let description = match name.as_str() {
            "plaintext" => "Reads the source file as UTF-8 text (baseline)",
            "textract" => "Amazon Textract LINE blocks from recorded responses",
            _ => "",
        };
        println!("  {:12} {}", name, description);
    }

    println!("\nTextract mode: {}", config.textract.api_mode.name());
    println!("Textract responses: {:?}", config.textract.responses_dir);

    Ok(())
}

fn init_config(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        anyhow::bail!("{:?} already exists (use --force to overwrite)", output);
    }
    BenchmarkConfig::default().save(output)?;
    println!("Wrote default configuration to {:?}", output);
    Ok(())
}
