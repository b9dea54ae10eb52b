//! Pharmacy records as they move through the pipeline.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder coordinates for a listing that could not be geocoded.
pub const SENTINEL_COORDINATES: (f64, f64) = (0.0, 0.0);

/// A scraped, not yet geocoded pharmacy listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub name: String,
    /// Normalized phone number, empty when the listing had none.
    #[serde(default)]
    pub phone: String,
    pub locality: String,
    /// Directory page the listing was found on.
    pub source_page: u32,
    pub source_url: String,
}

impl RawRecord {
    /// Free-text search query for this listing.
    pub fn query(&self, country: &str) -> String {
        format!("{}, {}, {}", self.name, self.locality, country)
    }
}

/// Outcome status of a single geocoding call.
///
/// `Ok`, `ZeroResults` and `Error` are produced by the pipeline itself; the
/// remaining variants mirror statuses reported verbatim by the search API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GeocodeStatus {
    Ok,
    ZeroResults,
    OverQueryLimit,
    RequestDenied,
    InvalidRequest,
    Error,
}

impl GeocodeStatus {
    /// Map a status string reported by the search API.
    /// Unknown statuses collapse to `Error`.
    pub fn from_api(status: &str) -> Self {
        match status {
            "OK" => Self::Ok,
            "ZERO_RESULTS" => Self::ZeroResults,
            "OVER_QUERY_LIMIT" => Self::OverQueryLimit,
            "REQUEST_DENIED" => Self::RequestDenied,
            "INVALID_REQUEST" => Self::InvalidRequest,
            _ => Self::Error,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::ZeroResults => "ZERO_RESULTS",
            Self::OverQueryLimit => "OVER_QUERY_LIMIT",
            Self::RequestDenied => "REQUEST_DENIED",
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::Error => "ERROR",
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl fmt::Display for GeocodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a geocoder call produced for one query.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeOutcome {
    pub status: GeocodeStatus,
    pub latitude: f64,
    pub longitude: f64,
    pub formatted_address: Option<String>,
    pub rating: Option<f64>,
    pub review_count: Option<u32>,
    pub place_id: Option<String>,
}

impl GeocodeOutcome {
    /// A located result.
    pub fn located(latitude: f64, longitude: f64) -> Self {
        Self {
            status: GeocodeStatus::Ok,
            latitude,
            longitude,
            formatted_address: None,
            rating: None,
            review_count: None,
            place_id: None,
        }
    }

    /// A failed lookup carrying sentinel coordinates.
    pub fn failed(status: GeocodeStatus) -> Self {
        let (latitude, longitude) = SENTINEL_COORDINATES;
        Self {
            status,
            latitude,
            longitude,
            formatted_address: None,
            rating: None,
            review_count: None,
            place_id: None,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        (self.latitude, self.longitude) == SENTINEL_COORDINATES
    }
}

/// A raw record merged with its geocoding result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    /// Sequence-derived id, e.g. `pharmacy_kenitra_0001`.
    pub id: String,
    pub name: String,
    pub address: String,
    pub locality: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub phone: String,
    pub opening_hours_default: String,
    pub geocoded: bool,
    pub geocode_status: GeocodeStatus,
    pub last_updated: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
}

impl EnrichedRecord {
    /// Merge a raw record with a geocoder outcome.
    ///
    /// An `OK` outcome that still carries sentinel coordinates is recorded as
    /// `ZERO_RESULTS` so `geocoded` always agrees with the status.
    pub fn merge(
        raw: &RawRecord,
        id: String,
        query: &str,
        outcome: GeocodeOutcome,
        opening_hours_default: &str,
        last_updated: DateTime<Utc>,
    ) -> Self {
        let status = match outcome.status {
            GeocodeStatus::Ok if outcome.is_sentinel() => GeocodeStatus::ZeroResults,
            other => other,
        };
        let geocoded = status.is_ok();
        let (latitude, longitude) = if geocoded {
            (outcome.latitude, outcome.longitude)
        } else {
            SENTINEL_COORDINATES
        };

        Self {
            id,
            name: raw.name.clone(),
            address: outcome
                .formatted_address
                .filter(|a| geocoded && !a.trim().is_empty())
                .unwrap_or_else(|| query.to_string()),
            locality: raw.locality.clone(),
            latitude,
            longitude,
            phone: raw.phone.clone(),
            opening_hours_default: opening_hours_default.to_string(),
            geocoded,
            geocode_status: status,
            last_updated,
            rating: if geocoded { outcome.rating } else { None },
            review_count: if geocoded { outcome.review_count } else { None },
            place_id: if geocoded { outcome.place_id } else { None },
        }
    }

    pub fn has_phone(&self) -> bool {
        !self.phone.is_empty()
    }
}

/// Build the stable id for the record at 1-based `position`.
pub fn record_id(prefix: &str, position: usize) -> String {
    format!("{}_{:04}", prefix, position)
}
