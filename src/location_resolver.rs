//! Location detection with an ordered fallback chain
//!
//! The fallback order is data, not nested error handling: the resolver
//! walks a list of strategies (GPS, IP primary, IP secondary) and
//! short-circuits on the first success. When everything fails it returns a
//! fixed default city, so `detect_location` always yields a usable
//! location and callers need no fallback branch of their own.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::config::PogodaConfig;
use crate::geocoding::GeocodingClient;
use crate::models::GeoLocation;

/// Name used when an IP lookup response carries no usable place name
const UNKNOWN_PLACE: &str = "Неизвестно";

/// The city every resolution failure bottoms out at
#[must_use]
pub fn default_location() -> GeoLocation {
    GeoLocation::with_country(55.7558, 37.6173, "Москва", "Россия")
}

/// Raw device fix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
}

/// Positioning request options handed to the device layer
#[derive(Debug, Clone)]
pub struct PositionRequest {
    /// Request a high-accuracy fix (slower, more battery)
    pub high_accuracy: bool,
    /// Give up after this long
    pub timeout: Duration,
    /// A previously obtained fix no older than this is acceptable
    pub maximum_age: Duration,
}

/// Device positioning seam; the embedding app supplies the implementation
#[async_trait]
pub trait GpsProvider: Send + Sync {
    async fn current_position(&self, request: &PositionRequest) -> Result<Position>;
}

/// One way of obtaining the user's location
#[async_trait]
pub trait LocationStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    async fn resolve(&self) -> Result<GeoLocation>;
}

/// Device GPS, with the coordinates named via reverse geocoding
struct GpsStrategy {
    provider: Arc<dyn GpsProvider>,
    geocoder: GeocodingClient,
    request: PositionRequest,
}

#[async_trait]
impl LocationStrategy for GpsStrategy {
    fn name(&self) -> &'static str {
        "gps"
    }

    async fn resolve(&self) -> Result<GeoLocation> {
        let position = tokio::time::timeout(
            self.request.timeout,
            self.provider.current_position(&self.request),
        )
        .await
        .context("GPS positioning timed out")??;

        debug!("GPS fix at {:.4}, {:.4}", position.lat, position.lon);

        // Naming is cosmetic; the geocoder degrades to a placeholder and
        // the coordinates stay usable either way.
        Ok(self
            .geocoder
            .reverse_geocode(position.lat, position.lon)
            .await)
    }
}

/// ip-api.com lookup
struct PrimaryIpStrategy {
    http: ClientWithMiddleware,
    url: String,
    language: String,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    country: Option<String>,
    city: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    #[serde(rename = "regionName")]
    region_name: Option<String>,
}

#[async_trait]
impl LocationStrategy for PrimaryIpStrategy {
    fn name(&self) -> &'static str {
        "ip-primary"
    }

    async fn resolve(&self) -> Result<GeoLocation> {
        let url = format!(
            "{}?lang={}&fields=status,country,city,lat,lon,regionName",
            self.url, self.language
        );

        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            bail!("primary IP lookup returned {}", response.status());
        }

        let body: IpApiResponse = response.json().await?;
        if body.status != "success" {
            bail!("primary IP lookup reported status '{}'", body.status);
        }
        let (Some(lat), Some(lon)) = (body.lat, body.lon) else {
            bail!("primary IP lookup response carried no coordinates");
        };

        Ok(GeoLocation {
            name: body
                .city
                .or(body.region_name)
                .unwrap_or_else(|| UNKNOWN_PLACE.to_string()),
            country: body.country.unwrap_or_default(),
            lat,
            lon,
            admin1: None,
        })
    }
}

/// ipapi.co lookup
struct SecondaryIpStrategy {
    http: ClientWithMiddleware,
    url: String,
}

#[derive(Debug, Deserialize)]
struct IpapiCoResponse {
    city: Option<String>,
    region: Option<String>,
    country_name: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[async_trait]
impl LocationStrategy for SecondaryIpStrategy {
    fn name(&self) -> &'static str {
        "ip-secondary"
    }

    async fn resolve(&self) -> Result<GeoLocation> {
        let response = self.http.get(&self.url).send().await?;
        if !response.status().is_success() {
            bail!("secondary IP lookup returned {}", response.status());
        }

        let body: IpapiCoResponse = response.json().await?;
        let (Some(lat), Some(lon)) = (body.latitude, body.longitude) else {
            bail!("secondary IP lookup response carried no coordinates");
        };

        Ok(GeoLocation {
            name: body
                .city
                .or(body.region)
                .unwrap_or_else(|| UNKNOWN_PLACE.to_string()),
            country: body.country_name.unwrap_or_default(),
            lat,
            lon,
            admin1: None,
        })
    }
}

/// Resolves the user's location through the fallback chain
pub struct GeoResolver {
    strategies: Vec<Box<dyn LocationStrategy>>,
    fallback: GeoLocation,
}

impl GeoResolver {
    /// Standard chain: GPS (when the app provides a device seam), then
    /// the two IP geolocation providers
    #[must_use]
    pub fn new(
        http: ClientWithMiddleware,
        geocoder: GeocodingClient,
        gps: Option<Arc<dyn GpsProvider>>,
        config: &PogodaConfig,
    ) -> Self {
        let mut strategies: Vec<Box<dyn LocationStrategy>> = Vec::new();

        if let Some(provider) = gps {
            strategies.push(Box::new(GpsStrategy {
                provider,
                geocoder,
                request: PositionRequest {
                    high_accuracy: config.gps.high_accuracy,
                    timeout: Duration::from_secs(config.gps.timeout_seconds.into()),
                    maximum_age: Duration::from_secs(config.gps.maximum_age_seconds.into()),
                },
            }));
        }

        strategies.push(Box::new(PrimaryIpStrategy {
            http: http.clone(),
            url: config.ip_lookup.primary_url.clone(),
            language: config.geocoding.language.clone(),
        }));
        strategies.push(Box::new(SecondaryIpStrategy {
            http,
            url: config.ip_lookup.secondary_url.clone(),
        }));

        Self {
            strategies,
            fallback: default_location(),
        }
    }

    /// Custom chain; tests use this to pin the order
    #[must_use]
    pub fn with_strategies(
        strategies: Vec<Box<dyn LocationStrategy>>,
        fallback: GeoLocation,
    ) -> Self {
        Self {
            strategies,
            fallback,
        }
    }

    /// Resolve the user's location
    ///
    /// Never fails: each strategy's failure is absorbed and the chain
    /// bottoms out at the fixed default city.
    #[instrument(skip(self))]
    pub async fn detect_location(&self) -> GeoLocation {
        for strategy in &self.strategies {
            match strategy.resolve().await {
                Ok(location) => {
                    info!("Resolved location via {}: {}", strategy.name(), location.name);
                    return location;
                }
                Err(error) => {
                    debug!("Location strategy {} failed: {error:#}", strategy.name());
                }
            }
        }

        info!("All location strategies failed, using the default city");
        self.fallback.clone()
    }
}
