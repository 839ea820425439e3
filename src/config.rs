//! Configuration for the weather data core
//!
//! Plain serde structs with per-field defaults. The defaults are the
//! production endpoints and contract constants; tests override the URLs to
//! point at local stubs.

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PogodaConfig {
    /// Shared HTTP transport settings
    #[serde(default)]
    pub http: HttpConfig,
    /// Forecast provider settings
    #[serde(default)]
    pub forecast: ForecastConfig,
    /// Forward/reverse geocoding settings
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    /// IP geolocation fallback providers
    #[serde(default)]
    pub ip_lookup: IpLookupConfig,
    /// Snapshot cache settings
    #[serde(default)]
    pub cache: CacheConfig,
    /// Device positioning settings
    #[serde(default)]
    pub gps: GpsConfig,
}

/// HTTP transport settings shared by all upstream calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_http_timeout")]
    pub timeout_seconds: u32,
    /// Maximum number of retries for transient failures
    #[serde(default = "default_http_max_retries")]
    pub max_retries: u32,
}

/// Forecast provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Base URL of the forecast endpoint
    #[serde(default = "default_forecast_base_url")]
    pub base_url: String,
    /// Number of forecast days to request
    #[serde(default = "default_forecast_days")]
    pub forecast_days: u8,
}

/// Geocoding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Base URL of the city search endpoint
    #[serde(default = "default_search_url")]
    pub search_url: String,
    /// Base URL of the reverse geocoding endpoint
    #[serde(default = "default_reverse_url")]
    pub reverse_url: String,
    /// Result language for both directions
    #[serde(default = "default_language")]
    pub language: String,
    /// Maximum number of search candidates to request
    #[serde(default = "default_max_results")]
    pub max_results: u8,
}

/// IP geolocation provider URLs, tried in order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpLookupConfig {
    #[serde(default = "default_ip_primary_url")]
    pub primary_url: String,
    #[serde(default = "default_ip_secondary_url")]
    pub secondary_url: String,
}

/// Snapshot cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Entry time-to-live in milliseconds (15 minutes)
    #[serde(default = "default_cache_ttl_ms")]
    pub ttl_ms: u64,
    /// Persistent store directory
    #[serde(default = "default_cache_location")]
    pub location: String,
}

/// Device positioning settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GpsConfig {
    /// Request a high-accuracy fix (slower, more battery)
    #[serde(default)]
    pub high_accuracy: bool,
    /// Positioning timeout in seconds
    #[serde(default = "default_gps_timeout")]
    pub timeout_seconds: u32,
    /// Accept previously obtained fixes up to this age in seconds
    #[serde(default = "default_gps_maximum_age")]
    pub maximum_age_seconds: u32,
}

// Default value functions
fn default_http_timeout() -> u32 {
    30
}

fn default_http_max_retries() -> u32 {
    3
}

fn default_forecast_base_url() -> String {
    "https://api.open-meteo.com/v1/forecast".to_string()
}

fn default_forecast_days() -> u8 {
    10
}

fn default_search_url() -> String {
    "https://geocoding-api.open-meteo.com/v1/search".to_string()
}

fn default_reverse_url() -> String {
    "https://nominatim.openstreetmap.org/reverse".to_string()
}

fn default_language() -> String {
    "ru".to_string()
}

fn default_max_results() -> u8 {
    8
}

fn default_ip_primary_url() -> String {
    "http://ip-api.com/json/".to_string()
}

fn default_ip_secondary_url() -> String {
    "https://ipapi.co/json/".to_string()
}

fn default_cache_ttl_ms() -> u64 {
    15 * 60 * 1000
}

fn default_cache_location() -> String {
    "~/.cache/pogoda".to_string()
}

fn default_gps_timeout() -> u32 {
    5
}

fn default_gps_maximum_age() -> u32 {
    600
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_http_timeout(),
            max_retries: default_http_max_retries(),
        }
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            base_url: default_forecast_base_url(),
            forecast_days: default_forecast_days(),
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            search_url: default_search_url(),
            reverse_url: default_reverse_url(),
            language: default_language(),
            max_results: default_max_results(),
        }
    }
}

impl Default for IpLookupConfig {
    fn default() -> Self {
        Self {
            primary_url: default_ip_primary_url(),
            secondary_url: default_ip_secondary_url(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_ms: default_cache_ttl_ms(),
            location: default_cache_location(),
        }
    }
}

impl Default for GpsConfig {
    fn default() -> Self {
        Self {
            high_accuracy: false,
            timeout_seconds: default_gps_timeout(),
            maximum_age_seconds: default_gps_maximum_age(),
        }
    }
}

impl Default for PogodaConfig {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            forecast: ForecastConfig::default(),
            geocoding: GeocodingConfig::default(),
            ip_lookup: IpLookupConfig::default(),
            cache: CacheConfig::default(),
            gps: GpsConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_contract() {
        let config = PogodaConfig::default();
        assert_eq!(config.cache.ttl_ms, 900_000);
        assert_eq!(config.forecast.forecast_days, 10);
        assert_eq!(config.geocoding.max_results, 8);
        assert_eq!(config.gps.timeout_seconds, 5);
        assert_eq!(config.gps.maximum_age_seconds, 600);
        assert!(!config.gps.high_accuracy);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: PogodaConfig = serde_json::from_str(
            r#"{"geocoding": {"language": "en"}}"#,
        )
        .unwrap();
        assert_eq!(config.geocoding.language, "en");
        assert_eq!(config.geocoding.max_results, 8);
        assert_eq!(config.cache.ttl_ms, 900_000);
    }
}
