//! Stats command.

use std::path::PathBuf;

use console::style;

use crate::config::Config;
use crate::geo::within_radius;
use crate::models::EnrichedRecord;
use crate::stats::PipelineStats;
use crate::storage::read_json;

/// Print summary figures for an enriched record file.
pub async fn cmd_stats(
    config: &Config,
    input: Option<PathBuf>,
    near: Option<(f64, f64)>,
    radius_km: f64,
) -> anyhow::Result<()> {
    let input = input.unwrap_or_else(|| config.records_path());
    let records: Vec<EnrichedRecord> = read_json(&input)?;
    let bounds = &config.stats.bounds;
    let stats = PipelineStats::compute(&records, bounds);

    println!("{}", style(input.display()).bold());
    println!("  Total:        {}", stats.total);
    println!(
        "  Geocoded:     {} ({:.1}%)",
        stats.geocoded,
        stats.geocoded_percent()
    );
    println!("  With phone:   {}", stats.with_phone);
    println!(
        "  In region:    {} (lat {}..{}, lon {}..{})",
        stats.in_region, bounds.min_lat, bounds.max_lat, bounds.min_lon, bounds.max_lon
    );
    println!("  Dup. phones:  {}", stats.duplicate_phones);
    println!("  Status:");
    for (status, count) in &stats.by_status {
        println!("    {:<18} {}", status.as_str(), count);
    }

    if stats.geocoded < stats.total {
        println!(
            "{} {} records have no coordinates",
            style("!").yellow(),
            stats.total - stats.geocoded
        );
    }

    if let Some(origin) = near {
        let found = within_radius(
            records.iter().filter(|r| r.geocoded),
            origin,
            radius_km,
            |r| (r.latitude, r.longitude),
        );
        println!(
            "{} {} pharmacies within {} km of {},{}",
            style("→").cyan(),
            found.len(),
            radius_km,
            origin.0,
            origin.1
        );
        for (record, distance) in found {
            println!(
                "  {:>6.2} km  {}  {}",
                distance,
                record.name,
                style(&record.phone).dim()
            );
        }
    }

    Ok(())
}
