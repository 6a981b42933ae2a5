//! Current conditions model and display methods

use serde::{Deserialize, Serialize};

/// Current weather conditions in metric units
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CurrentConditions {
    /// Human-readable description of weather conditions
    pub description: String,
    /// Temperature in Celsius
    pub temperature_celsius: f64,
    /// Relative humidity (0-100)
    pub humidity_percent: u8,
    /// Wind speed in m/s
    pub wind_speed_ms: f64,
}

impl CurrentConditions {
    /// Temperature with unit, printed as the provider reports it
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{}°C", self.temperature_celsius)
    }

    /// Headline shown on the screen, e.g. `light rain - 24.3°C`
    #[must_use]
    pub fn headline(&self) -> String {
        format!("{} - {}", self.description, self.format_temperature())
    }

    #[must_use]
    pub fn format_humidity(&self) -> String {
        format!("Humidity: {}%", self.humidity_percent)
    }

    #[must_use]
    pub fn format_wind(&self) -> String {
        format!("Wind Speed: {} m/s", self.wind_speed_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn light_rain() -> CurrentConditions {
        CurrentConditions {
            description: "light rain".to_string(),
            temperature_celsius: 24.3,
            humidity_percent: 80,
            wind_speed_ms: 3.1,
        }
    }

    #[test]
    fn test_headline() {
        assert_eq!(light_rain().headline(), "light rain - 24.3°C");
    }

    #[test]
    fn test_detail_lines() {
        let conditions = light_rain();
        assert_eq!(conditions.format_humidity(), "Humidity: 80%");
        assert_eq!(conditions.format_wind(), "Wind Speed: 3.1 m/s");
    }

    #[test]
    fn test_temperature_is_not_rounded() {
        let conditions = CurrentConditions {
            temperature_celsius: 24.37,
            ..light_rain()
        };
        assert_eq!(conditions.format_temperature(), "24.37°C");
        assert_eq!(conditions.headline(), "light rain - 24.37°C");
    }
}
