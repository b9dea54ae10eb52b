//! Geocoding configuration types.

use serde::{Deserialize, Serialize};

/// How to choose among several search results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// First result wins.
    #[default]
    First,
    /// Prefer the first result whose name matches the listing name,
    /// falling back to the first result.
    Name,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    /// Places text search endpoint.
    pub endpoint: String,
    /// API credential. Usually supplied through `PLACES_API_KEY`.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Region bias code sent as `region`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Place type filter sent as `type`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place_type: Option<String>,
    /// Appended to every query after the locality.
    pub country: String,
    pub timeout_secs: u64,
    /// Fixed pause after every call, sized to the API's request ceiling.
    pub delay_ms: u64,
    /// Checkpoint cadence in processed records.
    pub batch_size: usize,
    pub match_mode: MatchMode,
    /// Record ids are `{id_prefix}_{position:04}`.
    pub id_prefix: String,
    pub opening_hours_default: String,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://maps.googleapis.com/maps/api/place/textsearch/json".to_string(),
            api_key: None,
            region: Some("ma".to_string()),
            place_type: Some("pharmacy".to_string()),
            country: "Morocco".to_string(),
            timeout_secs: 10,
            delay_ms: 150,
            batch_size: 50,
            match_mode: MatchMode::First,
            id_prefix: "pharmacy_kenitra".to_string(),
            opening_hours_default: "Lun-Ven: 09:00-19:00 | Sam: 09:00-13:00".to_string(),
        }
    }
}
