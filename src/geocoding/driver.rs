//! Sequential geocoding of a raw record list with periodic checkpoints.

use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use indicatif::ProgressBar;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::checkpoint::CheckpointWriter;
use super::config::GeocodingConfig;
use super::{GeocodeQuery, Geocoder};
use crate::models::{record_id, EnrichedRecord, GeocodeOutcome, GeocodeStatus, RawRecord};

/// A resume snapshot that does not fit the raw list it should continue.
#[derive(Debug, Error)]
#[error("checkpoint holds {checkpoint} records but only {raw} raw records were given")]
pub struct ResumeError {
    pub checkpoint: usize,
    pub raw: usize,
}

/// Outcome of a geocoding run.
#[derive(Debug, Default)]
pub struct GeocodingReport {
    /// Every record, in input order.
    pub records: Vec<EnrichedRecord>,
    pub ok: usize,
    pub not_ok: usize,
    /// Snapshot files written during this run.
    pub checkpoints: Vec<PathBuf>,
}

impl GeocodingReport {
    fn new(records: Vec<EnrichedRecord>, checkpoints: Vec<PathBuf>) -> Self {
        let ok = records.iter().filter(|r| r.geocode_status.is_ok()).count();
        Self {
            not_ok: records.len() - ok,
            ok,
            records,
            checkpoints,
        }
    }
}

/// Drives a [`Geocoder`] over raw records one at a time.
pub struct GeocodingDriver<'a, G: Geocoder + ?Sized> {
    geocoder: &'a G,
    checkpoints: Option<CheckpointWriter>,
    batch_size: usize,
    delay: Duration,
    country: String,
    id_prefix: String,
    opening_hours_default: String,
    progress: ProgressBar,
}

impl<'a, G: Geocoder + ?Sized> GeocodingDriver<'a, G> {
    pub fn new(geocoder: &'a G, config: &GeocodingConfig) -> Self {
        Self {
            geocoder,
            checkpoints: None,
            batch_size: config.batch_size,
            delay: Duration::from_millis(config.delay_ms),
            country: config.country.clone(),
            id_prefix: config.id_prefix.clone(),
            opening_hours_default: config.opening_hours_default.clone(),
            progress: ProgressBar::hidden(),
        }
    }

    /// Write a snapshot every `batch_size` records.
    pub fn with_checkpoints(mut self, writer: CheckpointWriter) -> Self {
        self.checkpoints = Some(writer);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Geocode every record from scratch.
    pub async fn run(&self, raws: &[RawRecord]) -> GeocodingReport {
        let (records, checkpoints) = self.process(Vec::new(), raws).await;
        GeocodingReport::new(records, checkpoints)
    }

    /// Continue after a checkpoint: its records are kept verbatim and only
    /// `raws[done.len()..]` is geocoded. Ids and checkpoint numbering carry on
    /// from the checkpoint.
    pub async fn resume(
        &self,
        done: Vec<EnrichedRecord>,
        raws: &[RawRecord],
    ) -> Result<GeocodingReport, ResumeError> {
        if done.len() > raws.len() {
            return Err(ResumeError {
                checkpoint: done.len(),
                raw: raws.len(),
            });
        }

        let mismatched = done
            .iter()
            .zip(raws)
            .filter(|(record, raw)| record.name != raw.name)
            .count();
        if mismatched > 0 {
            warn!(
                "{} checkpoint records do not match the raw list by name; was it scraped again?",
                mismatched
            );
        }

        info!("Resuming after {} of {} records", done.len(), raws.len());
        let (records, checkpoints) = self.process(done, raws).await;
        Ok(GeocodingReport::new(records, checkpoints))
    }

    async fn process(
        &self,
        mut records: Vec<EnrichedRecord>,
        raws: &[RawRecord],
    ) -> (Vec<EnrichedRecord>, Vec<PathBuf>) {
        let start = records.len();
        let mut checkpoints = Vec::new();
        records.reserve(raws.len() - start);
        self.progress.set_length(raws.len() as u64);
        self.progress.set_position(start as u64);

        for (position, raw) in raws.iter().enumerate().skip(start).map(|(i, r)| (i + 1, r)) {
            let text = raw.query(&self.country);
            let query = GeocodeQuery {
                text: &text,
                name: &raw.name,
            };

            let outcome = match self.geocoder.lookup(&query).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!("Geocoding {} failed: {}", raw.name, e);
                    GeocodeOutcome::failed(GeocodeStatus::Error)
                }
            };
            debug!("{}/{} {} -> {}", position, raws.len(), raw.name, outcome.status);

            records.push(EnrichedRecord::merge(
                raw,
                record_id(&self.id_prefix, position),
                &text,
                outcome,
                &self.opening_hours_default,
                Utc::now(),
            ));
            self.progress.inc(1);

            if self.batch_size > 0 && position % self.batch_size == 0 {
                if let Some(writer) = &self.checkpoints {
                    match writer.write(&records) {
                        Ok(path) => {
                            info!("Checkpoint {} saved: {}", position, path.display());
                            checkpoints.push(path);
                        }
                        Err(e) => warn!("Checkpoint {} not saved: {}", position, e),
                    }
                }
            }

            tokio::time::sleep(self.delay).await;
        }

        self.progress.finish_and_clear();
        (records, checkpoints)
    }
}
