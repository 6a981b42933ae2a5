//! OpenWeatherMap client
//!
//! Three GET calls keyed by (lat, lon, units, appid): current conditions in
//! metric units, current conditions in default units (only the place name is
//! read) and the 5-day / 3-hour forecast in metric units.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, instrument, warn};

use super::{FetchResult, WeatherSource};
use crate::config::WeatherConfig;
use crate::error::FetchError;
use crate::models::{Coordinate, CurrentConditions, ForecastEntry, ForecastWindow};
use crate::{AdvisorError, Result};

const USER_AGENT: &str = concat!("irrigation-advisor/", env!("CARGO_PKG_VERSION"));
const RETRY_MIN_INTERVAL: Duration = Duration::from_millis(250);
const RETRY_MAX_INTERVAL: Duration = Duration::from_secs(2);

/// Unit system requested from the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Units {
    Metric,
    /// Provider default (Kelvin); used only where no measurement is read
    Standard,
}

/// HTTP client for the OpenWeatherMap API
#[derive(Clone)]
pub struct OpenWeatherMapClient {
    client: ClientWithMiddleware,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl std::fmt::Debug for OpenWeatherMapClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherMapClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl OpenWeatherMapClient {
    /// Create a new client from the weather configuration.
    ///
    /// Fails with a configuration error when no API key is set.
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                AdvisorError::config(
                    "Weather API key is not configured (set weather.api_key or IRRIGATION_WEATHER__API_KEY)",
                )
            })?;

        let timeout = Duration::from_secs(config.timeout_seconds.into());

        let http = reqwest::Client::builder()
            .connect_timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AdvisorError::config(format!("Failed to create HTTP client: {e}")))?;

        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(RETRY_MIN_INTERVAL, RETRY_MAX_INTERVAL)
            .build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(http)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            timeout,
        })
    }

    /// Bound applied to one call by the fetcher
    #[must_use]
    pub fn call_timeout(&self) -> Duration {
        self.timeout
    }

    fn endpoint(&self, path: &str, coordinate: Coordinate, units: Units) -> FetchResult<Url> {
        let mut params = vec![
            ("lat", coordinate.latitude.to_string()),
            ("lon", coordinate.longitude.to_string()),
            ("appid", self.api_key.clone()),
        ];
        if units == Units::Metric {
            params.push(("units", "metric".to_string()));
        }

        Url::parse_with_params(&format!("{}/{}", self.base_url, path), &params)
            .map_err(|e| FetchError::Network(format!("invalid request URL: {e}")))
    }

    /// Send a GET request and decode the JSON body, bounded by the call timeout
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> FetchResult<T> {
        // the query string carries the API key, log the path only
        let path = url.path().to_string();

        match tokio::time::timeout(self.timeout, self.request_json(url, &path)).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Request to {} timed out", path);
                Err(FetchError::Timeout(self.timeout))
            }
        }
    }

    async fn request_json<T: DeserializeOwned>(&self, url: Url, path: &str) -> FetchResult<T> {
        let start_time = Instant::now();

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!("Network error calling {}: {}", path, e);
            FetchError::Network(e.to_string())
        })?;

        let status = response.status();
        debug!(
            "HTTP response received: {} in {:.3}s",
            status,
            start_time.elapsed().as_secs_f64()
        );

        if status == StatusCode::UNAUTHORIZED {
            error!("API authentication failed (HTTP 401)");
            return Err(FetchError::Status {
                status: status.as_u16(),
                message: "Invalid API key. Please check your OpenWeatherMap API key.".to_string(),
            });
        }
        if !status.is_success() {
            warn!("HTTP error calling {}: {}", path, status);
            return Err(FetchError::Status {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown error").to_string(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        serde_json::from_slice(&body).map_err(|e| {
            error!("Failed to parse response from {}: {}", path, e);
            FetchError::Malformed(e.to_string())
        })
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherMapClient {
    #[instrument(skip_all, fields(lat = coordinate.latitude, lon = coordinate.longitude))]
    async fn current_conditions(&self, coordinate: Coordinate) -> FetchResult<CurrentConditions> {
        let url = self.endpoint("weather", coordinate, Units::Metric)?;
        let response: owm::CurrentResponse = self.get_json(url).await?;
        let conditions = response.into_conditions()?;

        info!(
            "Current conditions: {} at {:.1}°C",
            conditions.description, conditions.temperature_celsius
        );
        Ok(conditions)
    }

    #[instrument(skip_all, fields(lat = coordinate.latitude, lon = coordinate.longitude))]
    async fn location_name(&self, coordinate: Coordinate) -> FetchResult<String> {
        let url = self.endpoint("weather", coordinate, Units::Standard)?;
        let response: owm::NameResponse = self.get_json(url).await?;

        match response.name {
            Some(name) if !name.is_empty() => {
                debug!("Location name: {}", name);
                Ok(name)
            }
            _ => Err(FetchError::Malformed(
                "response carries no location name".to_string(),
            )),
        }
    }

    #[instrument(skip_all, fields(lat = coordinate.latitude, lon = coordinate.longitude))]
    async fn forecast(&self, coordinate: Coordinate) -> FetchResult<ForecastWindow> {
        let url = self.endpoint("forecast", coordinate, Units::Metric)?;
        let response: owm::ForecastResponse = self.get_json(url).await?;
        let window = response.into_window()?;

        info!("Retrieved forecast with {} entries", window.len());
        Ok(window)
    }
}

/// OpenWeatherMap response structures, limited to the consumed fields
mod owm {
    use super::{CurrentConditions, FetchError, ForecastEntry, ForecastWindow};
    use chrono::DateTime;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct CurrentResponse {
        pub weather: Vec<Condition>,
        pub main: Main,
        pub wind: Wind,
    }

    #[derive(Debug, Deserialize)]
    pub struct Condition {
        pub description: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct Main {
        pub temp: f64,
        pub humidity: u8,
    }

    #[derive(Debug, Deserialize)]
    pub struct Wind {
        pub speed: f64,
    }

    #[derive(Debug, Deserialize)]
    pub struct NameResponse {
        #[serde(default)]
        pub name: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ForecastResponse {
        #[serde(default)]
        pub list: Vec<ForecastItem>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ForecastItem {
        pub dt: i64,
        #[serde(default)]
        pub rain: Option<Rain>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Rain {
        #[serde(rename = "3h", default)]
        pub three_hours: Option<f64>,
    }

    impl CurrentResponse {
        pub fn into_conditions(self) -> Result<CurrentConditions, FetchError> {
            let description = self
                .weather
                .into_iter()
                .next()
                .map(|condition| condition.description)
                .ok_or_else(|| FetchError::Malformed("empty `weather` array".to_string()))?;

            Ok(CurrentConditions {
                description,
                temperature_celsius: self.main.temp,
                humidity_percent: self.main.humidity,
                wind_speed_ms: self.wind.speed,
            })
        }
    }

    impl ForecastResponse {
        pub fn into_window(self) -> Result<ForecastWindow, FetchError> {
            let entries = self
                .list
                .into_iter()
                .map(|item| {
                    let timestamp = DateTime::from_timestamp(item.dt, 0).ok_or_else(|| {
                        FetchError::Malformed(format!("invalid forecast timestamp: {}", item.dt))
                    })?;
                    Ok(match item.rain {
                        Some(rain) => ForecastEntry::with_rain_object(timestamp, rain.three_hours),
                        None => ForecastEntry::new(timestamp, None),
                    })
                })
                .collect::<Result<Vec<_>, FetchError>>()?;

            Ok(ForecastWindow::new(entries))
        }
    }
}
