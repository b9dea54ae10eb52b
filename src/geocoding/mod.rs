//! Geocoding of scraped listings through a places search API.

pub mod checkpoint;
pub mod config;
pub mod driver;
pub mod places;

use async_trait::async_trait;
use thiserror::Error;

pub use checkpoint::{load_checkpoint, CheckpointWriter};
pub use config::{GeocodingConfig, MatchMode};
pub use driver::{GeocodingDriver, GeocodingReport};
pub use places::PlacesGeocoder;

use crate::models::GeocodeOutcome;
use crate::scrapers::FetchError;

/// Errors from a single geocoder call. The driver turns these into an
/// `ERROR` record rather than aborting the run.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("undecodable search response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// One lookup request.
#[derive(Debug, Clone, Copy)]
pub struct GeocodeQuery<'a> {
    /// Free text sent to the API: name, locality and country.
    pub text: &'a str,
    /// Listing name alone, used to pick among several results.
    pub name: &'a str,
}

/// A backend that turns a free-text query into coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Look up one query. API-level failures (`ZERO_RESULTS`, denied keys)
    /// come back as `Ok` outcomes; only transport and decoding problems are
    /// errors.
    async fn lookup(&self, query: &GeocodeQuery<'_>) -> Result<GeocodeOutcome, GeocodeError>;
}
