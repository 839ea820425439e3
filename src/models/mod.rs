//! Data models for the weather data core
//!
//! This module contains the core domain models organized by concern:
//! - Location: Geographic coordinates and metadata
//! - Weather: Normalized current conditions, forecast points, and the
//!   snapshot unit that gets cached

pub mod location;
pub mod weather;

// Re-export all public types for convenient access
pub use location::GeoLocation;
pub use weather::{CurrentConditions, DailyPoint, HourlyPoint, WeatherSnapshot};
