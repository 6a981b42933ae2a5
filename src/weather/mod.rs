//! Weather Fetcher Module
//!
//! Retrieves current conditions, the location display name and the
//! 3-hour forecast for one coordinate. The three requests run concurrently
//! and each one degrades on its own: a failed section never aborts the others.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{FetchError, FetchErrorKind};
use crate::irrigation::RainAdvisory;
use crate::models::{Coordinate, CurrentConditions, ForecastWindow};

pub mod openweathermap;

pub use openweathermap::OpenWeatherMapClient;

/// Result of a single weather request
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Weather collaborator
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Current conditions in metric units
    async fn current_conditions(&self, coordinate: Coordinate) -> FetchResult<CurrentConditions>;

    /// Display name of the place at the coordinate
    async fn location_name(&self, coordinate: Coordinate) -> FetchResult<String>;

    /// Forecast window in metric units
    async fn forecast(&self, coordinate: Coordinate) -> FetchResult<ForecastWindow>;
}

/// The section of the screen a request feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    CurrentConditions,
    LocationName,
    Forecast,
}

/// A section whose data is unavailable
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionError {
    pub section: Section,
    pub kind: FetchErrorKind,
    pub message: String,
}

impl SectionError {
    fn new(section: Section, error: &FetchError) -> Self {
        Self {
            section,
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Outcome of the three weather requests for one coordinate
#[derive(Debug, Clone)]
pub struct WeatherReport {
    pub current: FetchResult<CurrentConditions>,
    pub location_name: FetchResult<String>,
    pub forecast: FetchResult<ForecastWindow>,
}

impl WeatherReport {
    /// Advisory derived from the forecast section; fails open when it is missing
    #[must_use]
    pub fn rain_advisory(&self) -> RainAdvisory {
        RainAdvisory::from_fetch(self.forecast.as_ref())
    }

    /// Every degraded section, in screen order
    #[must_use]
    pub fn section_errors(&self) -> Vec<SectionError> {
        let mut errors = Vec::new();
        if let Err(e) = &self.current {
            errors.push(SectionError::new(Section::CurrentConditions, e));
        }
        if let Err(e) = &self.location_name {
            errors.push(SectionError::new(Section::LocationName, e));
        }
        if let Err(e) = &self.forecast {
            errors.push(SectionError::new(Section::Forecast, e));
        }
        errors
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.current.is_ok() && self.location_name.is_ok() && self.forecast.is_ok()
    }
}

/// Fan out the three requests, each bounded by `call_timeout`, and join them
pub async fn fetch_report(
    source: &dyn WeatherSource,
    coordinate: Coordinate,
    call_timeout: Duration,
) -> WeatherReport {
    info!(
        "Fetching weather for coordinates: {:.4}, {:.4}",
        coordinate.latitude, coordinate.longitude
    );

    let (current, location_name, forecast) = tokio::join!(
        bounded(call_timeout, source.current_conditions(coordinate)),
        bounded(call_timeout, source.location_name(coordinate)),
        bounded(call_timeout, source.forecast(coordinate)),
    );

    let report = WeatherReport {
        current,
        location_name,
        forecast,
    };

    for failure in report.section_errors() {
        warn!(
            "Section {:?} unavailable ({:?}): {}",
            failure.section, failure.kind, failure.message
        );
    }

    report
}

async fn bounded<T>(
    limit: Duration,
    call: impl Future<Output = FetchResult<T>>,
) -> FetchResult<T> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout(limit)),
    }
}
