//! Irrigation advisor - skip watering when rain is forecast
//!
//! This library provides the screen pipeline: location, concurrent weather
//! fetch, the rain-based irrigation decision and its presentation.

pub mod api;
pub mod config;
pub mod error;
pub mod irrigation;
pub mod location;
pub mod models;
pub mod render;
pub mod screen;
pub mod telemetry;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use config::AdvisorConfig;
pub use error::{AdvisorError, FetchError, FetchErrorKind};
pub use irrigation::{AdvisoryState, RainAdvisory};
pub use location::{Authorization, CoordinateParser, LocationProvider, StaticLocationProvider};
pub use models::{Coordinate, CurrentConditions, ForecastEntry, ForecastWindow};
pub use screen::{AdvisorScreen, ScreenHandle, ScreenSnapshot};
pub use weather::{OpenWeatherMapClient, WeatherReport, WeatherSource};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, AdvisorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
