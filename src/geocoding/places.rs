//! Places text search client.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use super::config::{GeocodingConfig, MatchMode};
use super::{GeocodeError, GeocodeQuery, Geocoder};
use crate::models::{GeocodeOutcome, GeocodeStatus};
use crate::scrapers::{FetchError, HttpClient};

/// Leading category words that carry no identity ("Pharmacie Al Amal").
static CATEGORY_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:para)?pharmac(?:ie|y)\s+(?:de\s+la\s+|du\s+|des\s+|de\s+)?").unwrap()
});

/// Search response body. Only the fields the pipeline reads.
#[derive(Debug, Clone, Deserialize)]
pub struct PlacesResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<PlaceResult>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaceResult {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    pub geometry: Geometry,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub user_ratings_total: Option<u32>,
    #[serde(default)]
    pub place_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// Lowercased listing name without its category prefix.
fn distinctive_name(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    CATEGORY_PREFIX.replace(&lower, "").trim().to_string()
}

/// Index of the result to use for `name` under `mode`.
pub fn select_result(results: &[PlaceResult], mode: MatchMode, name: &str) -> Option<usize> {
    if results.is_empty() {
        return None;
    }

    match mode {
        MatchMode::First => Some(0),
        MatchMode::Name => {
            let wanted = distinctive_name(name);
            if wanted.is_empty() {
                return Some(0);
            }
            let matched = results.iter().position(|result| {
                result.name.as_deref().is_some_and(|candidate| {
                    let candidate = distinctive_name(candidate);
                    !candidate.is_empty()
                        && (candidate.contains(&wanted) || wanted.contains(&candidate))
                })
            });
            if matched.is_none() {
                debug!("No result named like {:?}, using first", name);
            }
            Some(matched.unwrap_or(0))
        }
    }
}

/// Turn a decoded response into an outcome for the listing called `name`.
pub fn outcome_from_response(response: PlacesResponse, mode: MatchMode, name: &str) -> GeocodeOutcome {
    let status = GeocodeStatus::from_api(&response.status);
    if !status.is_ok() {
        if let Some(message) = &response.error_message {
            warn!("Search API returned {}: {}", response.status, message);
        }
        return GeocodeOutcome::failed(status);
    }

    let Some(index) = select_result(&response.results, mode, name) else {
        return GeocodeOutcome::failed(GeocodeStatus::ZeroResults);
    };
    let Some(result) = response.results.into_iter().nth(index) else {
        return GeocodeOutcome::failed(GeocodeStatus::ZeroResults);
    };

    GeocodeOutcome {
        status: GeocodeStatus::Ok,
        latitude: result.geometry.location.lat,
        longitude: result.geometry.location.lng,
        formatted_address: result.formatted_address,
        rating: result.rating,
        review_count: result.user_ratings_total,
        place_id: result.place_id,
    }
}

/// Geocoder backed by the Places text search endpoint.
pub struct PlacesGeocoder {
    client: HttpClient,
    endpoint: Url,
    api_key: String,
    region: Option<String>,
    place_type: Option<String>,
    match_mode: MatchMode,
}

impl PlacesGeocoder {
    pub fn new(config: &GeocodingConfig, api_key: String) -> Result<Self, FetchError> {
        let endpoint =
            Url::parse(&config.endpoint).map_err(|_| FetchError::InvalidUrl(config.endpoint.clone()))?;
        let client = HttpClient::new(Duration::from_secs(config.timeout_secs), None)?;

        Ok(Self {
            client,
            endpoint,
            api_key,
            region: config.region.clone(),
            place_type: config.place_type.clone(),
            match_mode: config.match_mode,
        })
    }
}

#[async_trait]
impl Geocoder for PlacesGeocoder {
    async fn lookup(&self, query: &GeocodeQuery<'_>) -> Result<GeocodeOutcome, GeocodeError> {
        let mut params = vec![("query", query.text), ("key", self.api_key.as_str())];
        if let Some(region) = &self.region {
            params.push(("region", region.as_str()));
        }
        if let Some(place_type) = &self.place_type {
            params.push(("type", place_type.as_str()));
        }

        let body = self
            .client
            .get_text_with_query(self.endpoint.as_str(), &params)
            .await?;
        let response: PlacesResponse = serde_json::from_str(&body)?;
        Ok(outcome_from_response(response, self.match_mode, query.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::serve_once;

    fn response(json: &str) -> PlacesResponse {
        serde_json::from_str(json).unwrap()
    }

    const TWO_RESULTS: &str = r#"{
        "status": "OK",
        "results": [
            {
                "name": "Pharmacie Centrale",
                "formatted_address": "1 Bd Mohammed V, Kénitra, Maroc",
                "geometry": {"location": {"lat": 34.2610, "lng": -6.5802}},
                "rating": 4.2,
                "user_ratings_total": 17,
                "place_id": "abc"
            },
            {
                "name": "Pharmacie Al Amal",
                "geometry": {"location": {"lat": 34.2500, "lng": -6.5700}}
            }
        ]
    }"#;

    #[test]
    fn test_first_result_wins() {
        let outcome = outcome_from_response(response(TWO_RESULTS), MatchMode::First, "Pharmacie Al Amal");
        assert_eq!(outcome.status, GeocodeStatus::Ok);
        assert_eq!((outcome.latitude, outcome.longitude), (34.2610, -6.5802));
        assert_eq!(outcome.formatted_address.as_deref(), Some("1 Bd Mohammed V, Kénitra, Maroc"));
        assert_eq!(outcome.rating, Some(4.2));
        assert_eq!(outcome.review_count, Some(17));
        assert_eq!(outcome.place_id.as_deref(), Some("abc"));
    }

    #[test]
    fn test_name_mode_prefers_matching_result() {
        let outcome = outcome_from_response(response(TWO_RESULTS), MatchMode::Name, "PHARMACIE AL AMAL");
        assert_eq!((outcome.latitude, outcome.longitude), (34.25, -6.57));
        assert_eq!(outcome.formatted_address, None);
    }

    #[test]
    fn test_name_mode_falls_back_to_first() {
        let outcome = outcome_from_response(response(TWO_RESULTS), MatchMode::Name, "Pharmacie Ibn Sina");
        assert_eq!((outcome.latitude, outcome.longitude), (34.2610, -6.5802));
    }

    #[test]
    fn test_distinctive_name_strips_category() {
        assert_eq!(distinctive_name("Pharmacie de la Gare"), "gare");
        assert_eq!(distinctive_name("  Parapharmacie Atlas "), "atlas");
        assert_eq!(distinctive_name("Pharmacy Hope"), "hope");
    }

    #[test]
    fn test_zero_results_status() {
        let outcome = outcome_from_response(
            response(r#"{"status": "ZERO_RESULTS", "results": []}"#),
            MatchMode::First,
            "x",
        );
        assert_eq!(outcome.status, GeocodeStatus::ZeroResults);
        assert!(outcome.is_sentinel());
    }

    #[test]
    fn test_ok_with_empty_results_is_zero_results() {
        let outcome = outcome_from_response(response(r#"{"status": "OK"}"#), MatchMode::First, "x");
        assert_eq!(outcome.status, GeocodeStatus::ZeroResults);
    }

    #[test]
    fn test_api_error_status_is_carried() {
        let outcome = outcome_from_response(
            response(r#"{"status": "REQUEST_DENIED", "error_message": "The provided API key is invalid."}"#),
            MatchMode::First,
            "x",
        );
        assert_eq!(outcome.status, GeocodeStatus::RequestDenied);
        assert!(outcome.is_sentinel());
    }

    #[test]
    fn test_new_rejects_bad_endpoint() {
        let config = GeocodingConfig {
            endpoint: "not a url".to_string(),
            ..GeocodingConfig::default()
        };
        assert!(matches!(
            PlacesGeocoder::new(&config, "k".to_string()),
            Err(FetchError::InvalidUrl(_))
        ));
    }

    fn live_config(base_url: &str) -> GeocodingConfig {
        GeocodingConfig {
            endpoint: format!("{}/maps/api/place/textsearch/json", base_url),
            timeout_secs: 5,
            ..GeocodingConfig::default()
        }
    }

    const QUERY: GeocodeQuery<'static> = GeocodeQuery {
        text: "Pharmacie X, Kénitra, Morocco",
        name: "Pharmacie X",
    };

    #[tokio::test]
    async fn test_lookup_sends_query_key_region_and_type() {
        let server = serve_once(
            "200 OK",
            r#"{"status": "OK", "results": [{"geometry": {"location": {"lat": 34.26, "lng": -6.58}}}]}"#,
        )
        .await;
        let geocoder = PlacesGeocoder::new(&live_config(&server.url), "KEY".to_string()).unwrap();

        let outcome = geocoder.lookup(&QUERY).await.unwrap();

        assert_eq!(outcome.status, GeocodeStatus::Ok);
        assert_eq!((outcome.latitude, outcome.longitude), (34.26, -6.58));
        let request = server.request.await.unwrap();
        assert!(request.starts_with(
            "GET /maps/api/place/textsearch/json?query=Pharmacie+X%2C+K%C3%A9nitra%2C+Morocco&key=KEY&region=ma&type=pharmacy HTTP/1.1\r\n"
        ));
    }

    #[tokio::test]
    async fn test_lookup_omits_unset_region_and_type() {
        let server = serve_once("200 OK", r#"{"status": "ZERO_RESULTS", "results": []}"#).await;
        let config = GeocodingConfig {
            region: None,
            place_type: None,
            ..live_config(&server.url)
        };
        let geocoder = PlacesGeocoder::new(&config, "KEY".to_string()).unwrap();

        let outcome = geocoder.lookup(&QUERY).await.unwrap();

        assert_eq!(outcome.status, GeocodeStatus::ZeroResults);
        let request = server.request.await.unwrap();
        assert!(request.contains("&key=KEY HTTP/1.1\r\n"));
    }

    #[tokio::test]
    async fn test_lookup_http_error_is_fetch_error() {
        let server = serve_once("500 Internal Server Error", "").await;
        let geocoder = PlacesGeocoder::new(&live_config(&server.url), "KEY".to_string()).unwrap();

        let err = geocoder.lookup(&QUERY).await.unwrap_err();

        assert!(matches!(
            err,
            GeocodeError::Fetch(FetchError::Status { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn test_lookup_malformed_body_is_decode_error() {
        let server = serve_once("200 OK", "<html>quota page</html>").await;
        let geocoder = PlacesGeocoder::new(&live_config(&server.url), "KEY".to_string()).unwrap();

        let err = geocoder.lookup(&QUERY).await.unwrap_err();

        assert!(matches!(err, GeocodeError::Decode(_)));
    }
}
