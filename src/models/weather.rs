//! Normalized weather snapshot model
//!
//! Every numeric field here is already unit-converted and rounded by the
//! fetcher; consumers never see raw provider values.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::GeoLocation;

/// Conditions at the observation instant
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CurrentConditions {
    /// Air temperature in °C
    pub temperature: i32,
    /// Apparent temperature in °C
    pub feels_like: i32,
    /// Relative humidity percentage (0-100)
    pub humidity: u8,
    /// Wind speed in km/h
    pub wind_speed: f64,
    /// WMO weather code
    pub weather_code: u8,
    /// UV index, 0 when the provider reports none
    pub uv_index: u8,
    /// Surface pressure in hPa
    pub pressure: u16,
    /// Visibility in km
    pub visibility: f64,
    /// Whether the observation instant is in daylight
    pub is_day: bool,
}

/// One hour of forecast
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HourlyPoint {
    /// Forecast instant
    pub time: DateTime<Utc>,
    /// Air temperature in °C
    pub temperature: i32,
    /// WMO weather code
    pub weather_code: u8,
    /// Precipitation probability percentage (0-100)
    pub precipitation_probability: u8,
}

/// One calendar day of forecast, in the location's local timezone
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DailyPoint {
    pub date: NaiveDate,
    /// Daily maximum temperature in °C
    pub temp_max: i32,
    /// Daily minimum temperature in °C
    pub temp_min: i32,
    /// WMO weather code
    pub weather_code: u8,
    /// Total precipitation in mm
    pub precipitation_sum: f64,
    /// Daily maximum UV index
    pub uv_index_max: u8,
}

/// One fetched-and-normalized weather result for a location
///
/// This is the unit the cache stores. `hourly` is chronological with one
/// point per hour; `daily` starts at today in the location's local
/// timezone. Neither is empty in a snapshot the fetcher hands out.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherSnapshot {
    pub location: GeoLocation,
    pub current: CurrentConditions,
    pub hourly: Vec<HourlyPoint>,
    pub daily: Vec<DailyPoint>,
    /// IANA timezone name reported by the provider
    pub timezone: String,
}

impl WeatherSnapshot {
    /// Today's forecast day
    #[must_use]
    pub fn today(&self) -> Option<&DailyPoint> {
        self.daily.first()
    }

    /// The next `count` hourly points (fewer when the tail is shorter)
    #[must_use]
    pub fn upcoming_hours(&self, count: usize) -> &[HourlyPoint] {
        &self.hourly[..count.min(self.hourly.len())]
    }
}
