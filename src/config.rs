//! Advisor configuration
//!
//! Layered from an optional TOML file and `IRRIGATION_*` environment
//! variables (`__` separates nested keys, e.g. `IRRIGATION_WEATHER__API_KEY`).

use crate::models::Coordinate;
use anyhow::{Context, Result, ensure};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
const DEFAULT_TIMEOUT_SECONDS: u32 = 10;
const MAX_TIMEOUT_SECONDS: u32 = 300;
const DEFAULT_MAX_RETRIES: u32 = 1;
const MAX_RETRIES_LIMIT: u32 = 10;
const DEFAULT_LOG_LEVEL: &str = "info";
const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
const DEFAULT_TITLE: &str = "AI BASED IRRIGATION PLANNER";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    pub weather: WeatherConfig,
    pub location: LocationConfig,
    pub logging: LoggingConfig,
    pub presentation: PresentationConfig,
    pub server: ServerConfig,
}

/// OpenWeatherMap access
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// API key sent as `appid`
    pub api_key: Option<String>,
    pub base_url: String,
    /// Bound on one weather call, retries included
    pub timeout_seconds: u32,
    /// Retries on transient failures (5xx, 429, connection errors)
    pub max_retries: u32,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

/// Whether the user lets the advisor read the location
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationPermission {
    #[default]
    Granted,
    Denied,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub permission: LocationPermission,
    /// Decimal degrees, set together with `longitude`
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl LocationConfig {
    /// Configured coordinate, if both components are set and in range
    #[must_use]
    pub fn coordinate(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Coordinate::new(lat, lon).ok(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            format: LogFormat::default(),
        }
    }
}

/// Screen header
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationConfig {
    pub title: String,
    /// Static logo reference (URL or path), shown as-is and never fetched
    pub logo_uri: Option<String>,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            logo_uri: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

impl AdvisorConfig {
    /// Load from the default config path and the environment
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load from `config_path` (or the default path) and the environment.
    ///
    /// A missing file is not an error.
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let file = config_path
            .or_else(Self::get_config_path)
            .unwrap_or_else(|| PathBuf::from("config.toml"));

        let settings = Config::builder()
            .add_source(File::from(file).format(FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix("IRRIGATION")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read configuration sources")?;

        let mut config: AdvisorConfig = settings
            .try_deserialize()
            .context("Configuration has an invalid shape")?;

        config.apply_defaults();
        config.validate()?;
        Ok(config)
    }

    /// `<config dir>/irrigation-advisor/config.toml`
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("irrigation-advisor").join("config.toml"))
    }

    /// Replace zero or empty values with defaults
    pub fn apply_defaults(&mut self) {
        let defaults = Self::default();
        if self.weather.base_url.is_empty() {
            self.weather.base_url = defaults.weather.base_url;
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = defaults.weather.timeout_seconds;
        }
        if self.logging.level.is_empty() {
            self.logging.level = defaults.logging.level;
        }
        if self.presentation.title.is_empty() {
            self.presentation.title = defaults.presentation.title;
        }
        if self.server.port == 0 {
            self.server.port = defaults.server.port;
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.validate_weather()?;

        ensure!(
            LOG_LEVELS.contains(&self.logging.level.as_str()),
            "Invalid log level '{}', expected one of: {}",
            self.logging.level,
            LOG_LEVELS.join(", ")
        );

        match (self.location.latitude, self.location.longitude) {
            (Some(lat), Some(lon)) => {
                Coordinate::new(lat, lon).context("Invalid location in configuration")?;
            }
            (None, None) => {}
            _ => anyhow::bail!("location.latitude and location.longitude must be set together"),
        }

        Ok(())
    }

    fn validate_weather(&self) -> Result<()> {
        let weather = &self.weather;

        if let Some(key) = &weather.api_key {
            ensure!(
                !key.is_empty(),
                "weather.api_key is empty; remove it or set a valid key"
            );
            ensure!(
                (8..=100).contains(&key.len()),
                "weather.api_key has an unexpected length ({} characters)",
                key.len()
            );
        }

        ensure!(
            weather.base_url.starts_with("http://") || weather.base_url.starts_with("https://"),
            "weather.base_url must be an http(s) URL"
        );
        ensure!(
            weather.timeout_seconds <= MAX_TIMEOUT_SECONDS,
            "weather.timeout_seconds cannot exceed {MAX_TIMEOUT_SECONDS}"
        );
        ensure!(
            weather.max_retries <= MAX_RETRIES_LIMIT,
            "weather.max_retries cannot exceed {MAX_RETRIES_LIMIT}"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = AdvisorConfig::default();
        assert_eq!(config.weather.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.weather.timeout_seconds, 10);
        assert_eq!(config.weather.max_retries, 1);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.location.permission, LocationPermission::Granted);
        assert_eq!(config.presentation.title, "AI BASED IRRIGATION PLANNER");
        assert_eq!(config.server.port, 8080);
        assert!(config.validate().is_ok());
    }

    #[rstest]
    #[case::empty_key(|c: &mut AdvisorConfig| c.weather.api_key = Some(String::new()), "api_key is empty")]
    #[case::short_key(|c: &mut AdvisorConfig| c.weather.api_key = Some("short".into()), "unexpected length")]
    #[case::long_timeout(|c: &mut AdvisorConfig| c.weather.timeout_seconds = 500, "timeout_seconds cannot exceed")]
    #[case::many_retries(|c: &mut AdvisorConfig| c.weather.max_retries = 11, "max_retries cannot exceed")]
    #[case::ftp_url(|c: &mut AdvisorConfig| c.weather.base_url = "ftp://example.com".into(), "http(s) URL")]
    #[case::bad_level(|c: &mut AdvisorConfig| c.logging.level = "loud".into(), "Invalid log level")]
    #[case::half_location(|c: &mut AdvisorConfig| c.location.latitude = Some(12.9716), "set together")]
    fn test_validation_rejects(#[case] mutate: fn(&mut AdvisorConfig), #[case] expected: &str) {
        let mut config = AdvisorConfig::default();
        mutate(&mut config);

        let message = config.validate().unwrap_err().to_string();
        assert!(message.contains(expected), "unexpected error: {message}");
    }

    #[test]
    fn test_out_of_range_location_is_rejected() {
        let mut config = AdvisorConfig::default();
        config.location.latitude = Some(95.0);
        config.location.longitude = Some(77.5946);
        assert!(config.validate().is_err());
        assert!(config.location.coordinate().is_none());
    }

    #[test]
    fn test_apply_defaults_fills_empty_values() {
        let mut config = AdvisorConfig::default();
        config.weather.base_url.clear();
        config.weather.timeout_seconds = 0;
        config.server.port = 0;
        config.apply_defaults();
        assert_eq!(config.weather.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.weather.timeout_seconds, 10);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_load_from_toml_file() {
        let path = std::env::temp_dir().join(format!(
            "irrigation-advisor-test-{}.toml",
            std::process::id()
        ));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[weather]
api_key = "0123456789abcdef"
max_retries = 0

[location]
permission = "denied"
latitude = 12.9716
longitude = 77.5946

[logging]
format = "json"
"#
        )
        .unwrap();

        let config = AdvisorConfig::load_from_path(Some(path.clone())).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.weather.api_key.as_deref(), Some("0123456789abcdef"));
        assert_eq!(config.weather.max_retries, 0);
        assert_eq!(config.weather.timeout_seconds, 10);
        assert_eq!(config.location.permission, LocationPermission::Denied);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(
            config.location.coordinate(),
            Some(Coordinate {
                latitude: 12.9716,
                longitude: 77.5946
            })
        );
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = AdvisorConfig::get_config_path() {
            assert!(path.ends_with("irrigation-advisor/config.toml"));
        }
    }
}
