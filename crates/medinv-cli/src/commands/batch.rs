//! Batch command - scan many label text files at once.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use medinv_core::inventory::{self, SqliteStore};
use medinv_core::label::{ExtractionResult, LabelParser};
use medinv_core::models::medication::MedicationDraft;
use medinv_core::Field;

use super::config::load_config;
use super::scan::{format_fields, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern matching OCR text files (*.txt)
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Validate each scan and add it to the inventory
    #[arg(long)]
    save: bool,
}

/// Result of scanning a single file.
struct ScanFileResult {
    path: PathBuf,
    scan: Option<ExtractionResult>,
    saved_id: Option<i64>,
    save_error: Option<String>,
    error: Option<String>,
    processing_time_ms: u64,
}

impl ScanFileResult {
    fn status(&self) -> &'static str {
        match (&self.scan, &self.save_error) {
            (None, _) => "error",
            (Some(_), Some(_)) => "save_failed",
            (Some(_), None) => "success",
        }
    }

    fn failure(&self) -> Option<&str> {
        self.error.as_deref().or(self.save_error.as_deref())
    }
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            ext.eq_ignore_ascii_case("txt")
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    eprintln!(
        "{} Found {} files to scan",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let mut store = if args.save {
        Some(SqliteStore::open(&config.inventory.database)?)
    } else {
        None
    };

    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let parser = LabelParser::from_config(&config.extraction);
    let mut results = Vec::with_capacity(files.len());

    for path in files {
        let file_start = Instant::now();
        let result = scan_file(path, &parser, store.as_mut()).await;

        if let (Some(output_dir), Some(scan)) = (&args.output_dir, &result.scan) {
            write_output(output_dir, &result.path, scan, args.format)?;
        }

        let result = ScanFileResult {
            processing_time_ms: file_start.elapsed().as_millis() as u64,
            ..result
        };

        if let Some(failure) = result.failure() {
            if !args.continue_on_error {
                progress.finish_and_clear();
                error!("Failed to scan {}: {}", result.path.display(), failure);
                anyhow::bail!("Scanning failed: {}", failure);
            }
            warn!("Failed to scan {}: {}", result.path.display(), failure);
        }

        results.push(result);
        progress.inc(1);
    }

    progress.finish_and_clear();

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        eprintln!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<_> = results.iter().filter(|r| r.failure().is_some()).collect();
    let empty = results
        .iter()
        .filter(|r| r.scan.as_ref().is_some_and(|s| s.fields.is_empty()))
        .count();

    eprintln!();
    eprintln!(
        "{} Scanned {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    eprintln!(
        "   {} scanned, {} without any field, {} failed",
        style(results.len() - failed.len()).green(),
        style(empty).yellow(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        eprintln!();
        eprintln!("{}", style("Failed files:").red());
        for result in &failed {
            eprintln!(
                "  - {}: {}",
                result.path.display(),
                result.failure().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

async fn scan_file(
    path: PathBuf,
    parser: &LabelParser,
    store: Option<&mut SqliteStore>,
) -> ScanFileResult {
    let mut result = ScanFileResult {
        path,
        scan: None,
        saved_id: None,
        save_error: None,
        error: None,
        processing_time_ms: 0,
    };

    let text = match tokio::fs::read_to_string(&result.path).await {
        Ok(text) => text,
        Err(e) => {
            result.error = Some(e.to_string());
            return result;
        }
    };
    let scan = parser.parse(&text);

    if let Some(store) = store {
        match inventory::submit(store, &MedicationDraft::from(&scan.fields)) {
            Ok(stored) => result.saved_id = Some(stored.id),
            Err(e) => result.save_error = Some(e.to_string()),
        }
    }

    result.scan = Some(scan);
    result
}

fn write_output(
    output_dir: &Path,
    path: &Path,
    scan: &ExtractionResult,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("label");
    let output_path = output_dir.join(format!("{}.{}", stem, format.extension()));

    fs::write(&output_path, format_fields(&scan.fields, format)?)?;
    debug!("Wrote output to {}", output_path.display());
    Ok(())
}

fn write_summary(path: &Path, results: &[ScanFileResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    let mut header = vec!["filename", "status", "found"];
    header.extend(Field::ALL.iter().map(|field| field.key()));
    header.extend(["saved_id", "save_error", "processing_time_ms", "error"]);
    wtr.write_record(&header)?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_string();

        let mut record = vec![filename, result.status().to_string()];
        match &result.scan {
            Some(scan) => {
                record.push(scan.fields.found_count().to_string());
                record.extend(
                    Field::ALL
                        .iter()
                        .map(|field| scan.fields.get(*field).unwrap_or_default()),
                );
            }
            None => {
                record.push(String::new());
                record.extend(Field::ALL.iter().map(|_| String::new()));
            }
        }
        record.push(result.saved_id.map(|id| id.to_string()).unwrap_or_default());
        record.push(result.save_error.clone().unwrap_or_default());
        record.push(result.processing_time_ms.to_string());
        record.push(result.error.clone().unwrap_or_default());

        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}
