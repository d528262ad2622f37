//! Date command - normalize expiry date tokens.

use clap::Args;
use console::style;

use medinv_core::label::rules::dates::{format_canonical, format_display, normalize_date};

/// Arguments for the date command.
#[derive(Args)]
pub struct DateArgs {
    /// Date tokens (e.g. "12/2025", "31.01.26", "2025-12-31")
    #[arg(required = true)]
    tokens: Vec<String>,

    /// Print DD.MM.YYYY instead of YYYY-MM-DD
    #[arg(long)]
    display: bool,
}

pub async fn run(args: DateArgs) -> anyhow::Result<()> {
    let mut failed = 0;

    for token in &args.tokens {
        match normalize_date(token) {
            Some(date) if args.display => println!("{}", format_display(&date)),
            Some(date) => println!("{}", format_canonical(&date)),
            None => {
                failed += 1;
                eprintln!("{} {:?} is not a valid date", style("✗").red(), token);
            }
        }
    }

    if failed > 0 {
        anyhow::bail!(
            "{} of {} tokens could not be normalized",
            failed,
            args.tokens.len()
        );
    }

    Ok(())
}
