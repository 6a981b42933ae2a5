//! Irrigation Decision Module
//!
//! Derives the rain advisory from a forecast window and the default
//! advisory state shown to the user. The advisory is only a suggestion:
//! the manual override stays available whatever it says.

use crate::error::FetchError;
use crate::models::ForecastWindow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Rain expected according to the forecast
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RainAdvisory {
    /// Volume of the first rain-annotated bucket in mm; `None` means no rain expected
    pub expected_rain_mm: Option<f64>,
    /// Start of that bucket
    pub expected_at: Option<DateTime<Utc>>,
}

impl RainAdvisory {
    /// Advisory for "no rain expected"
    #[must_use]
    pub fn no_rain() -> Self {
        Self::default()
    }

    /// Scan the window in provider order and report the first rain annotation.
    ///
    /// First match wins: a later, larger bucket never replaces it and
    /// volumes are not summed. A matched bucket without a positive `3h`
    /// volume ends the scan with no advisory.
    #[must_use]
    pub fn from_window(window: &ForecastWindow) -> Self {
        match window.first_rain() {
            Some(entry) => match entry.rain_3h_mm.filter(|mm| *mm > 0.0) {
                Some(mm) => {
                    debug!("Rain annotation found: {} mm at {}", mm, entry.timestamp);
                    Self {
                        expected_rain_mm: Some(mm),
                        expected_at: Some(entry.timestamp),
                    }
                }
                None => {
                    debug!(
                        "First rain annotation at {} has no volume ({:?})",
                        entry.timestamp, entry.rain_3h_mm
                    );
                    Self::no_rain()
                }
            },
            None => {
                debug!("No rain annotation in {} forecast entries", window.len());
                Self::no_rain()
            }
        }
    }

    /// Advisory for a forecast fetch outcome. A failed fetch fails open.
    #[must_use]
    pub fn from_fetch(forecast: Result<&ForecastWindow, &FetchError>) -> Self {
        match forecast {
            Ok(window) => Self::from_window(window),
            Err(e) => {
                warn!("Forecast unavailable ({}), assuming no rain", e);
                Self::no_rain()
            }
        }
    }

    #[must_use]
    pub fn rain_expected(&self) -> bool {
        self.expected_rain_mm.is_some()
    }

    /// Default advisory state derived from this advisory
    #[must_use]
    pub fn advisory_state(&self) -> AdvisoryState {
        if self.rain_expected() {
            AdvisoryState::WateringSkipped
        } else {
            AdvisoryState::WateringScheduled
        }
    }

    /// Detail line shown under the advisory
    #[must_use]
    pub fn format_detail(&self) -> String {
        match self.expected_rain_mm {
            Some(mm) => format!("Rain in next 3 hours: {mm} mm"),
            None => "No significant rain expected".to_string(),
        }
    }
}

/// Default messaging of the advisory panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryState {
    WateringSkipped,
    WateringScheduled,
}

impl AdvisoryState {
    #[must_use]
    pub fn headline(&self) -> &'static str {
        match self {
            AdvisoryState::WateringSkipped => "Watering skipped",
            AdvisoryState::WateringScheduled => "Watering scheduled",
        }
    }

    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            AdvisoryState::WateringSkipped => "It's raining",
            AdvisoryState::WateringScheduled => "No rain in the forecast",
        }
    }

    /// Whether "run anyway" may be triggered. Never depends on the advisory.
    #[must_use]
    pub fn override_available(&self) -> bool {
        true
    }
}
