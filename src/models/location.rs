//! Location model for geographic coordinates and metadata

use serde::{Deserialize, Serialize};

/// A named geographic location
///
/// Produced by city search and the location resolver. Identity is the
/// coordinate pair; the name is cosmetic and may be a placeholder.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GeoLocation {
    /// Location name (city, region, etc.)
    pub name: String,
    /// Country name, empty when unknown
    pub country: String,
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lon: f64,
    /// First-level administrative division, when the geocoder reports one
    pub admin1: Option<String>,
}

impl GeoLocation {
    /// Create a new location with an empty country
    #[must_use]
    pub fn new(lat: f64, lon: f64, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            country: String::new(),
            lat,
            lon,
            admin1: None,
        }
    }

    /// Create a location with a country
    #[must_use]
    pub fn with_country(
        lat: f64,
        lon: f64,
        name: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            country: country.into(),
            lat,
            lon,
            admin1: None,
        }
    }

    /// Format location as a coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.lat, self.lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_has_empty_country() {
        let location = GeoLocation::new(55.7558, 37.6173, "Москва");
        assert_eq!(location.country, "");
        assert_eq!(location.admin1, None);
    }

    #[test]
    fn test_format_coordinates() {
        let location = GeoLocation::new(46.818_234, 8.227_456, "Test");
        assert_eq!(location.format_coordinates(), "46.8182, 8.2275");
    }
}
