//! Inventory command - add, list and remove stored medications.

use std::fs;
use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::{Args, Subcommand};
use console::style;
use serde::Serialize;
use tokio::io::AsyncReadExt;
use tracing::info;

use medinv_core::inventory::{self, parse_medication_id, MedicationStore, SqliteStore};
use medinv_core::label::rules::dates::{format_canonical, format_display, normalize_date};
use medinv_core::models::medication::{ExpiryStatus, Medication, MedicationDraft};

use super::config::load_config;
use super::scan::OutputFormat;

/// Arguments for the inventory command.
#[derive(Args)]
pub struct InventoryArgs {
    /// Database file (default: from config)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: InventoryCommand,
}

#[derive(Subcommand)]
enum InventoryCommand {
    /// Add a medication
    Add(AddArgs),

    /// List medications, soonest expiry first
    List(ListArgs),

    /// Remove a medication
    Remove {
        /// Medication id
        id: String,
    },
}

#[derive(Args)]
struct AddArgs {
    /// Medication name
    #[arg(long, required_unless_present = "json")]
    name: Option<String>,

    /// Manufacturer
    #[arg(long, required_unless_present = "json")]
    manufacturer: Option<String>,

    /// Active ingredient
    #[arg(long, required_unless_present = "json")]
    ingredient: Option<String>,

    /// Expiry date (any format the date command accepts)
    #[arg(long, required_unless_present = "json")]
    expiry: Option<String>,

    /// Read the record from a JSON file instead ("-" reads stdin)
    #[arg(long, conflicts_with_all = ["name", "manufacturer", "ingredient", "expiry"])]
    json: Option<String>,
}

#[derive(Args)]
struct ListArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Reference day for expiry status (default: today)
    #[arg(long)]
    today: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListedMedication<'a> {
    #[serde(flatten)]
    medication: &'a Medication,
    status: ExpiryStatus,
}

pub async fn run(args: InventoryArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let database = args
        .database
        .unwrap_or_else(|| config.inventory.database.clone());
    let mut store = SqliteStore::open(&database)?;
    info!("Using inventory {}", database.display());

    match args.command {
        InventoryCommand::Add(add) => add_medication(&mut store, add).await,
        InventoryCommand::List(list) => {
            list_medications(&store, list, config.inventory.warn_within_days)
        }
        InventoryCommand::Remove { id } => remove_medication(&mut store, &id),
    }
}

async fn add_medication(store: &mut SqliteStore, args: AddArgs) -> anyhow::Result<()> {
    let medication = match &args.json {
        Some(source) => {
            let body = if source == "-" {
                let mut body = String::new();
                tokio::io::stdin().read_to_string(&mut body).await?;
                body
            } else {
                fs::read_to_string(source)?
            };
            inventory::validate_json(&body)?
        }
        None => inventory::validate(&MedicationDraft {
            name: args.name.unwrap_or_default(),
            manufacturer: args.manufacturer.unwrap_or_default(),
            active_ingredient: args.ingredient.unwrap_or_default(),
            expiry_date: args.expiry.unwrap_or_default(),
        })?,
    };

    let stored = store.create(medication)?;

    println!(
        "{} Added #{} {} (expires {})",
        style("✓").green(),
        stored.id,
        stored.name,
        format_display(&stored.expiry_date)
    );

    Ok(())
}

fn list_medications(
    store: &SqliteStore,
    args: ListArgs,
    warn_within_days: i64,
) -> anyhow::Result<()> {
    let today = match &args.today {
        Some(raw) => normalize_date(raw)
            .ok_or_else(|| anyhow::anyhow!("Invalid reference day: {}", raw))?,
        None => Local::now().date_naive(),
    };

    let items = store.list()?;

    match args.format {
        OutputFormat::Json => {
            let listed: Vec<ListedMedication> = items
                .iter()
                .map(|medication| ListedMedication {
                    medication,
                    status: medication.status(today, warn_within_days),
                })
                .collect();
            println!("{}", serde_json::to_string(&listed)?);
        }
        OutputFormat::Csv => print!("{}", format_csv(&items, today, warn_within_days)?),
        OutputFormat::Text => print_text(&items, today, warn_within_days),
    }

    Ok(())
}

fn format_csv(
    items: &[Medication],
    today: NaiveDate,
    warn_within_days: i64,
) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "id",
        "name",
        "manufacturer",
        "active_ingredient",
        "expiry_date",
        "status",
        "days_left",
    ])?;

    for item in items {
        let status = item.status(today, warn_within_days);
        wtr.write_record([
            &item.id.to_string(),
            &item.name,
            &item.manufacturer,
            &item.active_ingredient,
            &format_canonical(&item.expiry_date),
            &status.label(),
            &status.days().to_string(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn print_text(items: &[Medication], today: NaiveDate, warn_within_days: i64) {
    if items.is_empty() {
        println!("No medications stored yet.");
        return;
    }

    for item in items {
        let status = item.status(today, warn_within_days);
        let label = format!("{:<10}", status.label());
        let badge = match status {
            ExpiryStatus::Expired { .. } => style(label).red(),
            ExpiryStatus::ExpiringSoon { .. } => style(label).yellow(),
            ExpiryStatus::Ok { .. } => style(label).green(),
        };
        println!(
            "#{:<4} {}  {} {}",
            item.id,
            format_display(&item.expiry_date),
            badge,
            item.name
        );
        println!("      Manufacturer: {}", item.manufacturer);
        println!("      Active ingredient: {}", item.active_ingredient);
    }
}

fn remove_medication(store: &mut SqliteStore, raw_id: &str) -> anyhow::Result<()> {
    let Some(id) = parse_medication_id(raw_id) else {
        anyhow::bail!("Invalid medication id: {}", raw_id);
    };

    store.delete(id)?;
    println!("{} Removed #{}", style("✓").green(), id);

    Ok(())
}
