//! Location Provider Module
//!
//! Supplies the single coordinate sample of a session after an
//! authorization check.

use crate::config::{LocationConfig, LocationPermission};
use crate::models::Coordinate;
use crate::{AdvisorError, Result};
use async_trait::async_trait;
use tracing::{debug, info};

/// Outcome of an authorization request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    Granted,
    Denied,
}

/// Source of the device coordinate
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Ask for permission to read the location
    async fn request_authorization(&self) -> Authorization;

    /// Read exactly one coordinate sample
    async fn current_coordinate(&self) -> Result<Coordinate>;
}

/// Location provider backed by a fixed coordinate from configuration or the command line
#[derive(Debug, Clone)]
pub struct StaticLocationProvider {
    permission: LocationPermission,
    coordinate: Option<Coordinate>,
}

impl StaticLocationProvider {
    #[must_use]
    pub fn new(permission: LocationPermission, coordinate: Option<Coordinate>) -> Self {
        Self {
            permission,
            coordinate,
        }
    }

    /// Build from configuration; `override_input` (e.g. `--at "lat,lon"`) wins over the config file
    pub fn from_config(config: &LocationConfig, override_input: Option<&str>) -> Result<Self> {
        let coordinate = match override_input {
            Some(input) => Some(CoordinateParser::parse(input)?),
            None => config.coordinate(),
        };

        Ok(Self::new(config.permission, coordinate))
    }
}

#[async_trait]
impl LocationProvider for StaticLocationProvider {
    async fn request_authorization(&self) -> Authorization {
        match self.permission {
            LocationPermission::Granted => Authorization::Granted,
            LocationPermission::Denied => {
                info!("Location permission denied by configuration");
                Authorization::Denied
            }
        }
    }

    async fn current_coordinate(&self) -> Result<Coordinate> {
        let coordinate = self.coordinate.ok_or_else(|| {
            AdvisorError::location_unavailable(
                "No coordinate configured. Pass --at \"lat,lon\" or set location.latitude/longitude",
            )
        })?;
        debug!(
            "Using coordinate ({}, {})",
            coordinate.latitude, coordinate.longitude
        );
        Ok(coordinate)
    }
}

/// Coordinate parsing utilities
pub struct CoordinateParser;

impl CoordinateParser {
    /// Parse coordinates from string like "12.9716,77.5946" or "12.9716 77.5946"
    pub fn parse(input: &str) -> Result<Coordinate> {
        let parts: Vec<&str> = input
            .trim()
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .collect();

        if parts.len() != 2 {
            return Err(AdvisorError::validation(
                "Coordinates must be in format 'lat,lon'",
            ));
        }

        let lat = parts[0]
            .parse::<f64>()
            .map_err(|_| AdvisorError::validation(format!("Invalid latitude: {}", parts[0])))?;
        let lon = parts[1]
            .parse::<f64>()
            .map_err(|_| AdvisorError::validation(format!("Invalid longitude: {}", parts[1])))?;

        Coordinate::new(lat, lon)
    }
}
