//! Emit command.

use std::path::PathBuf;

use crate::cli::helpers::emit_kotlin;
use crate::config::Config;
use crate::models::EnrichedRecord;
use crate::storage::read_json;

/// Generate the Kotlin source file from an enriched record file.
pub async fn cmd_emit(
    config: &Config,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    install: Option<PathBuf>,
) -> anyhow::Result<()> {
    let input = input.unwrap_or_else(|| config.records_path());
    let records: Vec<EnrichedRecord> = read_json(&input)?;
    let output = output.unwrap_or_else(|| config.kotlin_path());
    emit_kotlin(config, &records, &output, install)
}
