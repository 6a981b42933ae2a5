//! Coordinate model for the single location sample of a session

use crate::AdvisorError;
use serde::{Deserialize, Serialize};

/// Geographic coordinate in decimal degrees
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinate {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Coordinate {
    /// Create a coordinate, rejecting values outside the valid ranges
    pub fn new(latitude: f64, longitude: f64) -> crate::Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(AdvisorError::validation(format!(
                "Latitude must be between -90 and 90, got: {latitude}"
            )));
        }

        if !(-180.0..=180.0).contains(&longitude) {
            return Err(AdvisorError::validation(format!(
                "Longitude must be between -180 and 180, got: {longitude}"
            )));
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Format latitude the way the screen shows it
    #[must_use]
    pub fn format_latitude(&self) -> String {
        format!("{:.6}", self.latitude)
    }

    /// Format longitude the way the screen shows it
    #[must_use]
    pub fn format_longitude(&self) -> String {
        format!("{:.6}", self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_in_range() {
        let coordinate = Coordinate::new(12.9716, 77.5946).unwrap();
        assert_eq!(coordinate.latitude, 12.9716);
        assert_eq!(coordinate.longitude, 77.5946);
    }

    #[test]
    fn test_coordinate_out_of_range() {
        assert!(Coordinate::new(91.0, 0.0).is_err());
        assert!(Coordinate::new(-91.0, 0.0).is_err());
        assert!(Coordinate::new(0.0, 180.5).is_err());
        assert!(Coordinate::new(0.0, -181.0).is_err());
    }

    #[test]
    fn test_coordinate_display_precision() {
        let coordinate = Coordinate::new(12.9716, 77.5946).unwrap();
        assert_eq!(coordinate.format_latitude(), "12.971600");
        assert_eq!(coordinate.format_longitude(), "77.594600");
    }
}
