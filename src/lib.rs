//! Pogoda - location-keyed weather data core
//!
//! This library turns a coordinate pair into a validated, normalized,
//! time-bounded weather snapshot: cache-first retrieval from the forecast
//! provider, free-text city search, and location detection through a
//! GPS → IP geolocation → fixed-default fallback chain. Presentation is a
//! consumer of the snapshot model, not part of this crate.

pub mod cache;
pub mod category;
pub mod config;
pub mod error;
pub mod geocoding;
pub mod http;
pub mod location_resolver;
pub mod models;
pub mod weather;

// Re-export core types for public API
pub use cache::{FjallStore, MemoryStore, SnapshotStore, WeatherCache};
pub use category::{WeatherCategory, classify, describe};
pub use config::PogodaConfig;
pub use error::WeatherError;
pub use geocoding::GeocodingClient;
pub use location_resolver::{
    GeoResolver, GpsProvider, LocationStrategy, Position, PositionRequest, default_location,
};
pub use models::{CurrentConditions, DailyPoint, GeoLocation, HourlyPoint, WeatherSnapshot};
pub use weather::WeatherFetcher;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type of the fetch pipeline
pub type Result<T> = std::result::Result<T, WeatherError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
