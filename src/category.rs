//! Coarse visual/semantic weather categories
//!
//! Maps the WMO weather code enumeration to the handful of categories the
//! presentation layer keys scenes and advisories on. The code ranges are a
//! fixed contract; changing them silently breaks every consumer.

use serde::{Deserialize, Serialize};

/// Coarse category for a weather code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherCategory {
    Sunny,
    Cloudy,
    Foggy,
    Rainy,
    Snowy,
    Stormy,
    Night,
}

/// Base category for a code, before the day/night override
fn base_category(weather_code: u8) -> Option<WeatherCategory> {
    use WeatherCategory::{Cloudy, Foggy, Rainy, Snowy, Stormy, Sunny};

    match weather_code {
        0 | 1 => Some(Sunny),
        2 | 3 => Some(Cloudy),
        45 | 48 => Some(Foggy),
        51 | 53 | 55 => Some(Rainy),
        56 | 57 => Some(Snowy),
        61 | 63 | 65 => Some(Rainy),
        66 | 67 => Some(Snowy),
        71 | 73 | 75 | 77 => Some(Snowy),
        80 | 81 | 82 => Some(Rainy),
        85 | 86 => Some(Snowy),
        95 | 96 | 99 => Some(Stormy),
        _ => None,
    }
}

/// Classify a weather code for display
///
/// Night replaces only the benign sky categories; precipitation and storm
/// categories stay code-driven after dark.
#[must_use]
pub fn classify(weather_code: u8, is_day: bool) -> WeatherCategory {
    let Some(base) = base_category(weather_code) else {
        return if is_day {
            WeatherCategory::Sunny
        } else {
            WeatherCategory::Night
        };
    };

    if !is_day && matches!(base, WeatherCategory::Sunny | WeatherCategory::Cloudy) {
        return WeatherCategory::Night;
    }

    base
}

/// Human-readable description of a WMO weather code
#[must_use]
pub fn describe(weather_code: u8) -> &'static str {
    match weather_code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        56 => "Light freezing drizzle",
        57 => "Dense freezing drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 => "Light freezing rain",
        67 => "Heavy freezing rain",
        71 => "Slight snow fall",
        73 => "Moderate snow fall",
        75 => "Heavy snow fall",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, WeatherCategory::Sunny)]
    #[case(1, WeatherCategory::Sunny)]
    #[case(2, WeatherCategory::Cloudy)]
    #[case(3, WeatherCategory::Cloudy)]
    #[case(45, WeatherCategory::Foggy)]
    #[case(48, WeatherCategory::Foggy)]
    #[case(51, WeatherCategory::Rainy)]
    #[case(55, WeatherCategory::Rainy)]
    #[case(56, WeatherCategory::Snowy)]
    #[case(57, WeatherCategory::Snowy)]
    #[case(61, WeatherCategory::Rainy)]
    #[case(65, WeatherCategory::Rainy)]
    #[case(66, WeatherCategory::Snowy)]
    #[case(67, WeatherCategory::Snowy)]
    #[case(71, WeatherCategory::Snowy)]
    #[case(77, WeatherCategory::Snowy)]
    #[case(80, WeatherCategory::Rainy)]
    #[case(82, WeatherCategory::Rainy)]
    #[case(85, WeatherCategory::Snowy)]
    #[case(86, WeatherCategory::Snowy)]
    #[case(95, WeatherCategory::Stormy)]
    #[case(96, WeatherCategory::Stormy)]
    #[case(99, WeatherCategory::Stormy)]
    fn test_daytime_categories(#[case] code: u8, #[case] expected: WeatherCategory) {
        assert_eq!(classify(code, true), expected);
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(2)]
    #[case(3)]
    fn test_night_overrides_benign_categories(#[case] code: u8) {
        assert_eq!(classify(code, false), WeatherCategory::Night);
    }

    #[rstest]
    #[case(45, WeatherCategory::Foggy)]
    #[case(65, WeatherCategory::Rainy)]
    #[case(75, WeatherCategory::Snowy)]
    #[case(95, WeatherCategory::Stormy)]
    fn test_night_keeps_weather_driven_categories(#[case] code: u8, #[case] expected: WeatherCategory) {
        assert_eq!(classify(code, false), expected);
    }

    #[test]
    fn test_unknown_code_defaults_by_daylight() {
        assert_eq!(classify(42, true), WeatherCategory::Sunny);
        assert_eq!(classify(42, false), WeatherCategory::Night);
    }

    #[test]
    fn test_describe_known_and_unknown() {
        assert_eq!(describe(0), "Clear sky");
        assert_eq!(describe(95), "Thunderstorm");
        assert_eq!(describe(42), "Unknown");
    }
}
