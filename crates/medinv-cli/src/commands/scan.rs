//! Scan command - extract form fields from one label's recognized text.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tokio::io::AsyncReadExt;
use tracing::{debug, info, warn};

use medinv_core::inventory::{self, SqliteStore};
use medinv_core::label::rules::dates::format_display;
use medinv_core::label::{ExtractionResult, LabelParser, ScanOutcome};
use medinv_core::models::medication::{ExtractedFields, MedicationDraft};
use medinv_core::Field;

use super::config::load_config;

/// Arguments for the scan command.
#[derive(Args)]
pub struct ScanArgs {
    /// Text file produced by OCR ("-" reads stdin)
    #[arg(default_value = "-")]
    input: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Show which rule filled each field
    #[arg(long)]
    explain: bool,

    /// Validate the scanned fields and add them to the inventory
    #[arg(long)]
    save: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ScanArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let text = read_input(&args.input).await?;
    info!("Scanning {} characters of label text", text.chars().count());

    let parser = LabelParser::from_config(&config.extraction);
    let result = parser.parse(&text);
    for warning in &result.warnings {
        warn!("{}", warning);
    }

    let output = format_fields(&result.fields, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    print_outcome(&result);

    if args.explain {
        print_sources(&result);
    }

    if args.save {
        let mut store = SqliteStore::open(&config.inventory.database)?;
        let stored = inventory::submit(&mut store, &MedicationDraft::from(&result.fields))?;
        eprintln!(
            "{} Saved as #{} in {}",
            style("✓").green(),
            stored.id,
            config.inventory.database.display()
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

async fn read_input(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut text = String::new();
        tokio::io::stdin().read_to_string(&mut text).await?;
        return Ok(text);
    }

    tokio::fs::read_to_string(input)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", input, e))
}

fn print_outcome(result: &ExtractionResult) {
    let outcome = result.outcome();
    match outcome {
        ScanOutcome::Prefilled(_) => eprintln!("{} {}", style("ℹ").blue(), outcome),
        ScanOutcome::NothingFound => eprintln!("{} {}", style("!").yellow(), outcome),
    }
}

fn print_sources(result: &ExtractionResult) {
    for field in Field::ALL {
        match result.source_of(field) {
            Some(rule) => eprintln!("  {:<18} {}", field.key(), rule),
            None => eprintln!("  {:<18} {}", field.key(), style("not found").dim()),
        }
    }
    for warning in &result.warnings {
        eprintln!("  {} {}", style("warning:").yellow(), warning);
    }
}

pub fn format_fields(fields: &ExtractedFields, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(fields)?),
        OutputFormat::Csv => format_csv(fields),
        OutputFormat::Text => Ok(format_text(fields)),
    }
}

fn format_csv(fields: &ExtractedFields) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(Field::ALL.iter().map(|field| field.key()))?;
    wtr.write_record(
        Field::ALL
            .iter()
            .map(|field| fields.get(*field).unwrap_or_default()),
    )?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(fields: &ExtractedFields) -> String {
    let mut output = String::new();
    let missing = "-".to_string();

    output.push_str(&format!(
        "Name:              {}\n",
        fields.name.as_ref().unwrap_or(&missing)
    ));
    output.push_str(&format!(
        "Manufacturer:      {}\n",
        fields.manufacturer.as_ref().unwrap_or(&missing)
    ));
    output.push_str(&format!(
        "Active ingredient: {}\n",
        fields.active_ingredient.as_ref().unwrap_or(&missing)
    ));
    match &fields.expiry_date {
        Some(date) => output.push_str(&format!(
            "Expiry date:       {} ({})\n",
            format_display(date),
            date
        )),
        None => output.push_str(&format!("Expiry date:       {}\n", missing)),
    }

    output
}
