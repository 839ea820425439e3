//! Forward and reverse geocoding
//!
//! Both directions are degradable by contract: city search returns an
//! empty list on any failure and reverse geocoding falls back to a fixed
//! placeholder, so callers can invoke them speculatively without a
//! fallback branch of their own.

use anyhow::{Result, bail};
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::GeocodingConfig;
use crate::models::GeoLocation;

/// Name used when reverse geocoding cannot produce one
pub const PLACEHOLDER_NAME: &str = "Текущее место";

/// Queries shorter than this never reach the network
const MIN_QUERY_CHARS: usize = 2;

/// Client for the geocoding search and reverse geocoding endpoints
#[derive(Clone)]
pub struct GeocodingClient {
    http: ClientWithMiddleware,
    config: GeocodingConfig,
}

impl GeocodingClient {
    #[must_use]
    pub fn new(http: ClientWithMiddleware, config: GeocodingConfig) -> Self {
        Self { http, config }
    }

    /// Free-text city search returning ranked candidates
    ///
    /// Safe to call on every keystroke: single-character queries are
    /// answered locally and failures collapse to an empty list.
    #[instrument(skip(self))]
    pub async fn search_cities(&self, query: &str) -> Vec<GeoLocation> {
        if query.chars().count() < MIN_QUERY_CHARS {
            return Vec::new();
        }

        match self.try_search(query).await {
            Ok(results) => results,
            Err(error) => {
                debug!("City search for '{query}' failed: {error:#}");
                Vec::new()
            }
        }
    }

    async fn try_search(&self, query: &str) -> Result<Vec<GeoLocation>> {
        let url = format!(
            "{}?name={}&count={}&language={}&format=json",
            self.config.search_url,
            urlencoding::encode(query),
            self.config.max_results,
            self.config.language
        );

        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            bail!("geocoding search returned {}", response.status());
        }

        let body: GeocodingResponse = response.json().await?;
        let results: Vec<GeoLocation> = body
            .results
            .unwrap_or_default()
            .into_iter()
            .map(GeoLocation::from)
            .collect();

        debug!("Found {} candidates for '{query}'", results.len());
        Ok(results)
    }

    /// Coordinates → place name
    ///
    /// Never fails; the placeholder with an empty country stands in when
    /// the lookup cannot complete.
    #[instrument(skip(self))]
    pub async fn reverse_geocode(&self, lat: f64, lon: f64) -> GeoLocation {
        match self.try_reverse(lat, lon).await {
            Ok(location) => location,
            Err(error) => {
                debug!("Reverse geocoding of {lat:.4}, {lon:.4} failed: {error:#}");
                GeoLocation::new(lat, lon, PLACEHOLDER_NAME)
            }
        }
    }

    async fn try_reverse(&self, lat: f64, lon: f64) -> Result<GeoLocation> {
        let url = format!(
            "{}?lat={lat}&lon={lon}&format=json&accept-language={}",
            self.config.reverse_url, self.config.language
        );

        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            bail!("reverse geocoding returned {}", response.status());
        }

        let body: ReverseResponse = response.json().await?;
        Ok(body.into_location(lat, lon))
    }
}

/// Geocoding search response
#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    name: String,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
    admin1: Option<String>,
}

impl From<GeocodingResult> for GeoLocation {
    fn from(result: GeocodingResult) -> Self {
        GeoLocation {
            name: result.name,
            country: result.country.unwrap_or_default(),
            lat: result.latitude,
            lon: result.longitude,
            admin1: result.admin1,
        }
    }
}

/// Reverse geocoding response
#[derive(Debug, Deserialize)]
struct ReverseResponse {
    address: Option<ReverseAddress>,
}

#[derive(Debug, Default, Deserialize)]
struct ReverseAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    state: Option<String>,
    country: Option<String>,
}

impl ReverseResponse {
    /// Most specific populated-place name, falling back to the placeholder
    fn into_location(self, lat: f64, lon: f64) -> GeoLocation {
        let address = self.address.unwrap_or_default();
        let name = address
            .city
            .or(address.town)
            .or(address.village)
            .or(address.state)
            .unwrap_or_else(|| PLACEHOLDER_NAME.to_string());

        GeoLocation {
            name,
            country: address.country.unwrap_or_default(),
            lat,
            lon,
            admin1: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_result_mapping() {
        let body: GeocodingResponse = serde_json::from_str(
            r#"{"results": [
                {"name": "Ярославль", "latitude": 57.6261, "longitude": 39.8845,
                 "country": "Россия", "admin1": "Ярославская область"},
                {"name": "Yars", "latitude": 1.0, "longitude": 2.0}
            ]}"#,
        )
        .unwrap();

        let locations: Vec<GeoLocation> = body
            .results
            .unwrap()
            .into_iter()
            .map(GeoLocation::from)
            .collect();

        assert_eq!(locations[0].name, "Ярославль");
        assert_eq!(locations[0].admin1.as_deref(), Some("Ярославская область"));
        assert_eq!(locations[1].country, "");
        assert_eq!(locations[1].admin1, None);
    }

    #[test]
    fn test_empty_results_field_maps_to_empty_list() {
        let body: GeocodingResponse = serde_json::from_str("{}").unwrap();
        assert!(body.results.is_none());
    }

    #[test]
    fn test_reverse_name_preference_order() {
        let body: ReverseResponse = serde_json::from_str(
            r#"{"address": {"town": "Клин", "state": "Московская область", "country": "Россия"}}"#,
        )
        .unwrap();
        let location = body.into_location(56.33, 36.71);
        assert_eq!(location.name, "Клин");
        assert_eq!(location.country, "Россия");

        let body: ReverseResponse =
            serde_json::from_str(r#"{"address": {"state": "Московская область"}}"#).unwrap();
        assert_eq!(body.into_location(56.0, 37.0).name, "Московская область");
    }

    #[test]
    fn test_reverse_without_address_uses_placeholder() {
        let body: ReverseResponse = serde_json::from_str("{}").unwrap();
        let location = body.into_location(56.0, 37.0);
        assert_eq!(location.name, PLACEHOLDER_NAME);
        assert_eq!(location.country, "");
        assert_eq!(location.lat, 56.0);
    }
}
