//! Scrape command.

use std::path::PathBuf;

use console::style;

use crate::cli::helpers::scrape_directory;
use crate::config::Config;
use crate::storage::write_json;

/// Scrape the directory and write the raw record file.
pub async fn cmd_scrape(config: &Config, output: Option<PathBuf>) -> anyhow::Result<()> {
    let report = scrape_directory(config).await?;
    let path = output.unwrap_or_else(|| config.raw_path());
    write_json(&path, &report.records)?;
    println!("{} Saved {}", style("✓").green(), path.display());
    Ok(())
}
