//! Shared helper functions for CLI commands.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::Config;
use crate::emit::render_kotlin;
use crate::geocoding::{
    load_checkpoint, CheckpointWriter, GeocodingDriver, GeocodingReport, PlacesGeocoder,
};
use crate::models::{EnrichedRecord, RawRecord};
use crate::scrapers::{
    dedup_by_phone, ListingFetcher, ListingParser, PaginationDriver, ScrapeReport,
};
use crate::storage::{install_copy, write_atomic};

/// Determinate bar in the style used by every pipeline stage.
pub fn progress_bar(len: u64, message: &str) -> anyhow::Result<ProgressBar> {
    let progress = ProgressBar::new(len);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}")?
            .progress_chars("#>-"),
    );
    progress.set_message(message.to_string());
    Ok(progress)
}

/// Walk the configured page range and return the raw records found.
pub async fn scrape_directory(config: &Config) -> anyhow::Result<ScrapeReport> {
    let directory = &config.directory;
    let fetcher = ListingFetcher::new(directory)?;
    let parser = ListingParser::new(&directory.listing)?;
    let pages = directory.start_page..=directory.end_page;

    println!(
        "{} Scraping pages {}-{} of {}",
        style("→").cyan(),
        directory.start_page,
        directory.end_page,
        directory.base_url
    );

    let progress = progress_bar(pages.clone().count() as u64, "pages")?;
    let mut report = PaginationDriver::new(
        &fetcher,
        &parser,
        Duration::from_millis(directory.page_delay_ms),
    )
    .with_progress(progress)
    .run(pages)
    .await;

    if directory.dedup_by_phone {
        let (records, removed) = dedup_by_phone(report.records);
        report.records = records;
        println!(
            "  {} Removed {} duplicate phone numbers",
            style("✓").green(),
            removed
        );
    }

    println!(
        "{} {} pharmacies from {} pages",
        style("✓").green(),
        report.records.len(),
        report.pages_visited
    );
    if !report.failed_pages.is_empty() {
        println!(
            "{} {} pages failed: {:?}",
            style("!").yellow(),
            report.failed_pages.len(),
            report.failed_pages
        );
    }
    Ok(report)
}

/// Geocode raw records, optionally continuing from a checkpoint.
pub async fn geocode_records(
    config: &Config,
    raws: &[RawRecord],
    resume_from: Option<&Path>,
) -> anyhow::Result<GeocodingReport> {
    let api_key = config.api_key()?;
    let geocoder = PlacesGeocoder::new(&config.geocoding, api_key)?;
    let checkpoints = CheckpointWriter::new(config.checkpoint_dir(), &config.output.checkpoint_prefix);
    let progress = progress_bar(raws.len() as u64, "geocoding")?;

    let driver = GeocodingDriver::new(&geocoder, &config.geocoding)
        .with_checkpoints(checkpoints)
        .with_progress(progress);

    let report = match resume_from {
        Some(path) => {
            let done = load_checkpoint(path)?;
            println!(
                "{} Resuming from {} ({} records done)",
                style("→").cyan(),
                path.display(),
                done.len()
            );
            driver.resume(done, raws).await?
        }
        None => driver.run(raws).await,
    };

    println!(
        "{} Geocoded {} of {} pharmacies ({} failed)",
        style("✓").green(),
        report.ok,
        report.records.len(),
        report.not_ok
    );
    for path in &report.checkpoints {
        println!("  {} Checkpoint {}", style("·").dim(), path.display());
    }
    Ok(report)
}

/// Render and write the Kotlin file, then copy it into `install` when given.
pub fn emit_kotlin(
    config: &Config,
    records: &[EnrichedRecord],
    output: &Path,
    install: Option<PathBuf>,
) -> anyhow::Result<()> {
    let source = render_kotlin(records, &config.emitter, Utc::now());
    write_atomic(output, source.as_bytes())?;
    println!(
        "{} Wrote {} entries to {}",
        style("✓").green(),
        records.len(),
        output.display()
    );

    if let Some(dir) = install.or_else(|| config.install_dir()) {
        let installed = install_copy(output, &dir)?;
        println!("{} Installed {}", style("✓").green(), installed.display());
    }
    Ok(())
}
