//! Cache-first weather retrieval from the Open-Meteo forecast API
//!
//! One request per cache miss covers current conditions, 48 hours of
//! hourly forecast, and up to 10 forecast days, all in the location's
//! local timezone. The raw payload is normalized into the canonical
//! snapshot before anything else sees it.

use futures::join;
use reqwest_middleware::ClientWithMiddleware;
use tracing::{debug, instrument, warn};

use crate::cache::WeatherCache;
use crate::config::ForecastConfig;
use crate::error::WeatherError;
use crate::geocoding::GeocodingClient;
use crate::models::{CurrentConditions, DailyPoint, GeoLocation, HourlyPoint, WeatherSnapshot};

/// Hourly points kept per snapshot (48 hours)
const HOURLY_WINDOW: usize = 48;

/// Visibility assumed when the provider reports none, in meters
const DEFAULT_VISIBILITY_M: f64 = 10_000.0;

const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,weather_code,wind_speed_10m,uv_index,surface_pressure,visibility,is_day";
const HOURLY_FIELDS: &str = "temperature_2m,weather_code,precipitation_probability";
const DAILY_FIELDS: &str =
    "weather_code,temperature_2m_max,temperature_2m_min,precipitation_sum,uv_index_max";

/// Cache-first weather retrieval
pub struct WeatherFetcher {
    http: ClientWithMiddleware,
    geocoder: GeocodingClient,
    cache: WeatherCache,
    config: ForecastConfig,
}

impl WeatherFetcher {
    #[must_use]
    pub fn new(
        http: ClientWithMiddleware,
        geocoder: GeocodingClient,
        cache: WeatherCache,
        config: ForecastConfig,
    ) -> Self {
        Self {
            http,
            geocoder,
            cache,
            config,
        }
    }

    /// Weather snapshot for a coordinate pair
    ///
    /// Served from cache when a fresh entry exists; otherwise one forecast
    /// request plus one best-effort reverse geocode. Only the forecast
    /// call can fail the fetch — a failed reverse geocode degrades to the
    /// placeholder location name.
    #[instrument(skip(self))]
    pub async fn fetch(&self, lat: f64, lon: f64) -> Result<WeatherSnapshot, WeatherError> {
        if let Some(snapshot) = self.cache.get(lat, lon) {
            debug!("Serving weather for {lat:.2}, {lon:.2} from cache");
            return Ok(snapshot);
        }

        // Naming must not gate the forecast, so both requests run
        // concurrently and the geocoder absorbs its own failures.
        let (response, location) = join!(
            self.request_forecast(lat, lon),
            self.geocoder.reverse_geocode(lat, lon)
        );
        let snapshot = normalize(response?, location)?;

        self.cache.put(lat, lon, &snapshot);
        Ok(snapshot)
    }

    async fn request_forecast(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<open_meteo::ForecastResponse, WeatherError> {
        let url = format!(
            "{}?latitude={lat}&longitude={lon}&current={CURRENT_FIELDS}&hourly={HOURLY_FIELDS}&daily={DAILY_FIELDS}&timezone=auto&forecast_days={}",
            self.config.base_url, self.config.forecast_days
        );
        debug!("Forecast request URL: {url}");

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!("Forecast provider answered {status}");
            return Err(WeatherError::Upstream { status });
        }

        Ok(response.json().await?)
    }
}

/// Convert the raw provider payload into the canonical snapshot
fn normalize(
    response: open_meteo::ForecastResponse,
    location: GeoLocation,
) -> Result<WeatherSnapshot, WeatherError> {
    let current = response
        .current
        .ok_or(WeatherError::MissingData { field: "current" })?;
    let hourly = response
        .hourly
        .ok_or(WeatherError::MissingData { field: "hourly" })?;
    let daily = response
        .daily
        .ok_or(WeatherError::MissingData { field: "daily" })?;

    let current = CurrentConditions {
        temperature: round_i32(current.temperature),
        feels_like: round_i32(current.apparent_temperature),
        humidity: current.relative_humidity,
        wind_speed: current.wind_speed.round(),
        weather_code: current.weather_code,
        uv_index: round_u8(current.uv_index.unwrap_or(0.0)),
        pressure: current.surface_pressure.round() as u16,
        visibility: (current.visibility.unwrap_or(DEFAULT_VISIBILITY_M) / 1000.0).round(),
        is_day: current.is_day == 1,
    };

    let mut hourly_points = Vec::with_capacity(HOURLY_WINDOW.min(hourly.time.len()));
    for (i, raw_time) in hourly.time.iter().take(HOURLY_WINDOW).enumerate() {
        let time = chrono::NaiveDateTime::parse_from_str(raw_time, "%Y-%m-%dT%H:%M")
            .map_err(|_| WeatherError::MissingData { field: "hourly.time" })?
            .and_utc();
        hourly_points.push(HourlyPoint {
            time,
            temperature: round_i32(value_at(&hourly.temperature, i)),
            weather_code: code_at(&hourly.weather_code, i),
            precipitation_probability: hourly
                .precipitation_probability
                .as_ref()
                .and_then(|probabilities| probabilities.get(i).copied().flatten())
                .unwrap_or(0),
        });
    }
    if hourly_points.is_empty() {
        return Err(WeatherError::MissingData { field: "hourly" });
    }

    let mut daily_points = Vec::with_capacity(daily.time.len());
    for (i, raw_date) in daily.time.iter().enumerate() {
        let date = chrono::NaiveDate::parse_from_str(raw_date, "%Y-%m-%d")
            .map_err(|_| WeatherError::MissingData { field: "daily.time" })?;
        daily_points.push(DailyPoint {
            date,
            temp_max: round_i32(value_at(&daily.temperature_max, i)),
            temp_min: round_i32(value_at(&daily.temperature_min, i)),
            weather_code: code_at(&daily.weather_code, i),
            precipitation_sum: value_at(&daily.precipitation_sum, i),
            uv_index_max: round_u8(
                daily
                    .uv_index_max
                    .as_ref()
                    .and_then(|values| values.get(i).copied().flatten())
                    .unwrap_or(0.0),
            ),
        });
    }
    if daily_points.is_empty() {
        return Err(WeatherError::MissingData { field: "daily" });
    }

    Ok(WeatherSnapshot {
        location,
        current,
        hourly: hourly_points,
        daily: daily_points,
        timezone: response.timezone,
    })
}

fn round_i32(value: f64) -> i32 {
    value.round() as i32
}

fn round_u8(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

fn value_at(values: &[Option<f64>], index: usize) -> f64 {
    values.get(index).copied().flatten().unwrap_or(0.0)
}

fn code_at(codes: &[Option<u8>], index: usize) -> u8 {
    codes.get(index).copied().flatten().unwrap_or(0)
}

/// Open-Meteo API response structures
mod open_meteo {
    use serde::Deserialize;

    /// Forecast response with the requested variable blocks
    #[derive(Debug, Deserialize)]
    pub struct ForecastResponse {
        pub timezone: String,
        pub current: Option<CurrentData>,
        pub hourly: Option<HourlyData>,
        pub daily: Option<DailyData>,
    }

    #[derive(Debug, Deserialize)]
    pub struct CurrentData {
        #[serde(rename = "temperature_2m")]
        pub temperature: f64,
        #[serde(rename = "relative_humidity_2m")]
        pub relative_humidity: u8,
        pub apparent_temperature: f64,
        pub weather_code: u8,
        #[serde(rename = "wind_speed_10m")]
        pub wind_speed: f64,
        pub uv_index: Option<f64>,
        pub surface_pressure: f64,
        pub visibility: Option<f64>,
        pub is_day: u8,
    }

    /// Hourly arrays, aligned by index with `time`
    #[derive(Debug, Deserialize)]
    pub struct HourlyData {
        pub time: Vec<String>,
        #[serde(rename = "temperature_2m")]
        pub temperature: Vec<Option<f64>>,
        pub weather_code: Vec<Option<u8>>,
        pub precipitation_probability: Option<Vec<Option<u8>>>,
    }

    /// Daily arrays, aligned by index with `time`
    #[derive(Debug, Deserialize)]
    pub struct DailyData {
        pub time: Vec<String>,
        pub weather_code: Vec<Option<u8>>,
        #[serde(rename = "temperature_2m_max")]
        pub temperature_max: Vec<Option<f64>>,
        #[serde(rename = "temperature_2m_min")]
        pub temperature_min: Vec<Option<f64>>,
        pub precipitation_sum: Vec<Option<f64>>,
        pub uv_index_max: Option<Vec<Option<f64>>>,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn provider_body(hours: usize, days: usize) -> serde_json::Value {
        let hour_times: Vec<String> = (0..hours)
            .map(|h| format!("2025-06-{:02}T{:02}:00", 1 + h / 24, h % 24))
            .collect();
        let day_times: Vec<String> = (0..days).map(|d| format!("2025-06-{:02}", 1 + d)).collect();

        json!({
            "timezone": "Europe/Moscow",
            "current": {
                "temperature_2m": 21.6,
                "relative_humidity_2m": 54,
                "apparent_temperature": 20.4,
                "weather_code": 2,
                "wind_speed_10m": 12.4,
                "uv_index": 4.3,
                "surface_pressure": 1013.4,
                "visibility": 24140.0,
                "is_day": 1
            },
            "hourly": {
                "time": hour_times,
                "temperature_2m": vec![Some(18.5); hours],
                "weather_code": vec![Some(61u8); hours],
                "precipitation_probability": vec![Some(35u8); hours]
            },
            "daily": {
                "time": day_times,
                "weather_code": vec![Some(2u8); days],
                "temperature_2m_max": vec![Some(23.7); days],
                "temperature_2m_min": vec![Some(13.2); days],
                "precipitation_sum": vec![Some(0.4); days],
                "uv_index_max": vec![Some(5.6); days]
            }
        })
    }

    fn parse(body: serde_json::Value) -> open_meteo::ForecastResponse {
        serde_json::from_value(body).unwrap()
    }

    fn placeholder() -> GeoLocation {
        GeoLocation::new(55.75, 37.62, "Москва")
    }

    #[test]
    fn test_normalize_rounds_numeric_fields() {
        let snapshot = normalize(parse(provider_body(48, 10)), placeholder()).unwrap();

        assert_eq!(snapshot.current.temperature, 22);
        assert_eq!(snapshot.current.feels_like, 20);
        assert_eq!(snapshot.current.humidity, 54);
        assert_eq!(snapshot.current.wind_speed, 12.0);
        assert_eq!(snapshot.current.uv_index, 4);
        assert_eq!(snapshot.current.pressure, 1013);
        // 24 140 m → 24 km
        assert_eq!(snapshot.current.visibility, 24.0);
        assert!(snapshot.current.is_day);

        assert_eq!(snapshot.hourly[0].temperature, 19);
        assert_eq!(snapshot.daily[0].temp_max, 24);
        assert_eq!(snapshot.daily[0].temp_min, 13);
        assert_eq!(snapshot.daily[0].uv_index_max, 6);
        assert_eq!(snapshot.timezone, "Europe/Moscow");
    }

    #[test]
    fn test_normalize_defaults_missing_uv_and_visibility() {
        let mut body = provider_body(24, 5);
        body["current"]["uv_index"] = json!(null);
        body["current"]["visibility"] = json!(null);

        let snapshot = normalize(parse(body), placeholder()).unwrap();

        assert_eq!(snapshot.current.uv_index, 0);
        assert_eq!(snapshot.current.visibility, 10.0);
    }

    #[test]
    fn test_normalize_truncates_hourly_window() {
        let snapshot = normalize(parse(provider_body(72, 10)), placeholder()).unwrap();
        assert_eq!(snapshot.hourly.len(), 48);

        let short = normalize(parse(provider_body(24, 10)), placeholder()).unwrap();
        assert_eq!(short.hourly.len(), 24);
    }

    #[test]
    fn test_normalize_defaults_missing_precipitation_probability() {
        let mut body = provider_body(24, 5);
        body["hourly"]
            .as_object_mut()
            .unwrap()
            .remove("precipitation_probability");

        let snapshot = normalize(parse(body), placeholder()).unwrap();
        assert!(snapshot.hourly.iter().all(|h| h.precipitation_probability == 0));
    }

    #[test]
    fn test_normalize_rejects_missing_blocks() {
        let mut body = provider_body(24, 5);
        body.as_object_mut().unwrap().remove("current");
        let err = normalize(parse(body), placeholder()).unwrap_err();
        assert!(matches!(err, WeatherError::MissingData { field: "current" }));

        let mut body = provider_body(24, 5);
        body["hourly"]["time"] = json!([]);
        body["hourly"]["temperature_2m"] = json!([]);
        body["hourly"]["weather_code"] = json!([]);
        body["hourly"]["precipitation_probability"] = json!([]);
        let err = normalize(parse(body), placeholder()).unwrap_err();
        assert!(matches!(err, WeatherError::MissingData { field: "hourly" }));
    }

    #[test]
    fn test_normalize_keeps_chronological_hourly_order() {
        let snapshot = normalize(parse(provider_body(48, 10)), placeholder()).unwrap();
        assert!(
            snapshot
                .hourly
                .windows(2)
                .all(|pair| pair[0].time < pair[1].time)
        );
        assert_eq!(snapshot.daily[0].date, snapshot.hourly[0].time.date_naive());
    }
}
