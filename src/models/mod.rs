//! Data models for the irrigation advisor
//!
//! This module contains the core domain models organized by concern:
//! - Location: the captured coordinate
//! - Weather: current conditions at that coordinate
//! - Forecast: the ordered 3-hour forecast window

pub mod forecast;
pub mod location;
pub mod weather;

// Re-export all public types for convenient access
pub use forecast::{ForecastEntry, ForecastWindow};
pub use location::Coordinate;
pub use weather::CurrentConditions;
