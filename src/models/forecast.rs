//! Forecast window model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One 3-hour forecast bucket
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ForecastEntry {
    /// Start of the bucket
    pub timestamp: DateTime<Utc>,
    /// Rain accumulated over the 3-hour bucket in mm
    pub rain_3h_mm: Option<f64>,
    /// The provider attached a rain object, with or without a volume
    pub rain_annotated: bool,
}

impl ForecastEntry {
    /// Bucket annotated exactly when a volume is given
    #[must_use]
    pub fn new(timestamp: DateTime<Utc>, rain_3h_mm: Option<f64>) -> Self {
        Self {
            timestamp,
            rain_3h_mm,
            rain_annotated: rain_3h_mm.is_some(),
        }
    }

    /// Bucket carrying a rain object; the volume may still be missing
    #[must_use]
    pub fn with_rain_object(timestamp: DateTime<Utc>, rain_3h_mm: Option<f64>) -> Self {
        Self {
            timestamp,
            rain_3h_mm,
            rain_annotated: true,
        }
    }

    #[must_use]
    pub fn has_rain(&self) -> bool {
        self.rain_annotated
    }
}

/// Forecast entries in provider order (nearest-future first).
///
/// The window is never re-sorted.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ForecastWindow {
    pub entries: Vec<ForecastEntry>,
}

impl ForecastWindow {
    #[must_use]
    pub fn new(entries: Vec<ForecastEntry>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// First entry carrying a rain annotation, in provider order
    #[must_use]
    pub fn first_rain(&self) -> Option<&ForecastEntry> {
        self.entries.iter().find(|entry| entry.has_rain())
    }
}
