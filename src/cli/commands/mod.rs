//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod emit;
mod geocode;
mod run;
mod scrape;
mod stats;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::geocoding::MatchMode;

#[derive(Parser)]
#[command(name = "pharma")]
#[command(about = "Pharmacy directory scraper, geocoder and Kotlin data generator")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true, env = "PHARMACOLLECT_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

/// Page range overrides shared by `scrape` and `run`.
#[derive(clap::Args, Debug, Clone, Copy)]
pub struct PageRange {
    /// First directory page to visit
    #[arg(long)]
    start_page: Option<u32>,
    /// Last directory page to visit (inclusive)
    #[arg(long)]
    end_page: Option<u32>,
}

impl PageRange {
    fn apply(&self, config: &mut Config) {
        if let Some(start) = self.start_page {
            config.directory.start_page = start;
        }
        if let Some(end) = self.end_page {
            config.directory.end_page = end;
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape directory pages into a raw record file
    Scrape {
        #[command(flatten)]
        pages: PageRange,
        /// Raw record output file (default: output.raw_file)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Geocode a raw record file into enriched records
    Geocode {
        /// Raw record input file (default: output.raw_file)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Enriched record output file (default: output.records_file)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Records between checkpoints
        #[arg(short, long)]
        batch_size: Option<usize>,
        /// Continue from a checkpoint file, geocoding only the remaining records
        #[arg(long)]
        resume_from: Option<PathBuf>,
        /// How to choose among several search results
        #[arg(long, value_enum)]
        match_mode: Option<MatchMode>,
    },

    /// Generate the Kotlin data file from enriched records
    Emit {
        /// Enriched record input file (default: output.records_file)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Kotlin output file (default: output.kotlin_file)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Copy the generated file into this application source directory
        #[arg(long)]
        install: Option<PathBuf>,
    },

    /// Scrape, geocode and emit in one go
    Run {
        #[command(flatten)]
        pages: PageRange,
        /// Records between checkpoints
        #[arg(short, long)]
        batch_size: Option<usize>,
        /// Copy the generated file into this application source directory
        #[arg(long)]
        install: Option<PathBuf>,
    },

    /// Summarize an enriched record file
    Stats {
        /// Enriched record input file (default: output.records_file)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// List records near a point, given as LAT,LON
        #[arg(long, value_parser = parse_lat_lon, allow_hyphen_values = true)]
        near: Option<(f64, f64)>,
        /// Search radius in kilometres for --near
        #[arg(long, default_value = "5.0")]
        radius: f64,
    },
}

fn parse_lat_lon(s: &str) -> Result<(f64, f64), String> {
    let (lat, lon) = s
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LON, got '{}'", s))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|e| format!("invalid latitude '{}': {}", lat.trim(), e))?;
    let lon: f64 = lon
        .trim()
        .parse()
        .map_err(|e| format!("invalid longitude '{}': {}", lon.trim(), e))?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(format!("coordinates out of range: {},{}", lat, lon));
    }
    Ok((lat, lon))
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref()).await?;

    match cli.command {
        Commands::Scrape { pages, output } => {
            pages.apply(&mut config);
            scrape::cmd_scrape(&config, output).await
        }
        Commands::Geocode {
            input,
            output,
            batch_size,
            resume_from,
            match_mode,
        } => {
            if let Some(size) = batch_size {
                config.geocoding.batch_size = size;
            }
            if let Some(mode) = match_mode {
                config.geocoding.match_mode = mode;
            }
            geocode::cmd_geocode(&config, input, output, resume_from).await
        }
        Commands::Emit {
            input,
            output,
            install,
        } => emit::cmd_emit(&config, input, output, install).await,
        Commands::Run {
            pages,
            batch_size,
            install,
        } => {
            pages.apply(&mut config);
            if let Some(size) = batch_size {
                config.geocoding.batch_size = size;
            }
            run::cmd_run(&config, install).await
        }
        Commands::Stats {
            input,
            near,
            radius,
        } => stats::cmd_stats(&config, input, near, radius).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lat_lon() {
        assert_eq!(parse_lat_lon("34.26,-6.58").unwrap(), (34.26, -6.58));
        assert_eq!(parse_lat_lon(" 34.26 , -6.58 ").unwrap(), (34.26, -6.58));
        assert!(parse_lat_lon("34.26").is_err());
        assert!(parse_lat_lon("abc,1").is_err());
        assert!(parse_lat_lon("95,1").is_err());
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from([
            "pharma",
            "-v",
            "scrape",
            "--start-page",
            "2",
            "--end-page",
            "4",
        ])
        .unwrap();
        assert!(cli.verbose);
        let Commands::Scrape { pages, output } = cli.command else {
            panic!("expected scrape");
        };
        assert_eq!((pages.start_page, pages.end_page), (Some(2), Some(4)));
        assert!(output.is_none());

        let cli = Cli::try_parse_from(["pharma", "stats", "--near", "34.26,-6.58"]).unwrap();
        let Commands::Stats { near, radius, .. } = cli.command else {
            panic!("expected stats");
        };
        assert_eq!(near, Some((34.26, -6.58)));
        assert_eq!(radius, 5.0);

        let cli = Cli::try_parse_from(["pharma", "geocode", "--match-mode", "name", "-b", "10"]).unwrap();
        let Commands::Geocode {
            match_mode,
            batch_size,
            ..
        } = cli.command
        else {
            panic!("expected geocode");
        };
        assert_eq!(match_mode, Some(MatchMode::Name));
        assert_eq!(batch_size, Some(10));
    }

    #[test]
    fn test_page_range_overrides_config() {
        let mut config = Config::default();
        PageRange {
            start_page: None,
            end_page: Some(3),
        }
        .apply(&mut config);
        assert_eq!((config.directory.start_page, config.directory.end_page), (1, 3));
    }
}
