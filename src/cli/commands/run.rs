//! Full pipeline command.

use std::path::PathBuf;

use console::style;

use crate::cli::helpers::{emit_kotlin, geocode_records, scrape_directory};
use crate::config::Config;
use crate::storage::write_json;

/// Scrape, geocode and emit, writing every intermediate file.
pub async fn cmd_run(config: &Config, install: Option<PathBuf>) -> anyhow::Result<()> {
    // Fail before scraping rather than after.
    config.api_key()?;

    let scraped = scrape_directory(config).await?;
    let raw_path = config.raw_path();
    write_json(&raw_path, &scraped.records)?;
    println!("{} Saved {}", style("✓").green(), raw_path.display());

    let report = geocode_records(config, &scraped.records, None).await?;
    let records_path = config.records_path();
    write_json(&records_path, &report.records)?;
    println!("{} Saved {}", style("✓").green(), records_path.display());

    emit_kotlin(config, &report.records, &config.kotlin_path(), install)
}
