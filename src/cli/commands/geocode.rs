//! Geocode command.

use std::path::PathBuf;

use console::style;

use crate::cli::helpers::geocode_records;
use crate::config::Config;
use crate::models::RawRecord;
use crate::storage::{read_json, write_json};

/// Geocode a raw record file into the enriched record file.
pub async fn cmd_geocode(
    config: &Config,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    resume_from: Option<PathBuf>,
) -> anyhow::Result<()> {
    let input = input.unwrap_or_else(|| config.raw_path());
    let raws: Vec<RawRecord> = read_json(&input)?;
    println!(
        "{} Loaded {} raw records from {}",
        style("→").cyan(),
        raws.len(),
        input.display()
    );

    let report = geocode_records(config, &raws, resume_from.as_deref()).await?;

    let path = output.unwrap_or_else(|| config.records_path());
    write_json(&path, &report.records)?;
    println!("{} Saved {}", style("✓").green(), path.display());
    Ok(())
}
