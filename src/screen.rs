//! Advisor screen
//!
//! One state holder per screen activation. The pipeline runs once
//! (permission, coordinate, concurrent weather fetch, decision) and publishes
//! immutable snapshots to the rendering layer through a watch channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

use crate::AdvisorError;
use crate::irrigation::{AdvisoryState, RainAdvisory};
use crate::location::{Authorization, LocationProvider};
use crate::models::{Coordinate, CurrentConditions};
use crate::weather::{SectionError, WeatherReport, WeatherSource, fetch_report};

/// Where the pipeline is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Loading,
    Ready,
    Failed,
}

/// Error category shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    PermissionDenied,
    LocationUnavailable,
    WeatherUnavailable,
    Configuration,
    Internal,
}

/// User-visible error notice
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorState {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&AdvisorError> for ErrorState {
    fn from(error: &AdvisorError) -> Self {
        let kind = match error {
            AdvisorError::PermissionDenied => ErrorKind::PermissionDenied,
            AdvisorError::LocationUnavailable { .. } => ErrorKind::LocationUnavailable,
            AdvisorError::Fetch { .. } => ErrorKind::WeatherUnavailable,
            AdvisorError::Config { .. } | AdvisorError::Validation { .. } => {
                ErrorKind::Configuration
            }
            AdvisorError::Io { .. } => ErrorKind::Internal,
        };
        Self {
            kind,
            message: error.user_message(),
        }
    }
}

/// Read-only view of the screen handed to the rendering layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreenSnapshot {
    pub phase: Phase,
    pub coordinate: Option<Coordinate>,
    pub current_conditions: Option<CurrentConditions>,
    pub location_name: Option<String>,
    pub rain_advisory: RainAdvisory,
    pub advisory_state: AdvisoryState,
    pub error_state: Option<ErrorState>,
    pub section_errors: Vec<SectionError>,
    pub override_available: bool,
    pub override_requested: bool,
}

impl ScreenSnapshot {
    /// Snapshot shown before the pipeline completes
    #[must_use]
    pub fn loading() -> Self {
        let rain_advisory = RainAdvisory::no_rain();
        let advisory_state = rain_advisory.advisory_state();
        Self {
            phase: Phase::Loading,
            coordinate: None,
            current_conditions: None,
            location_name: None,
            rain_advisory,
            advisory_state,
            error_state: None,
            section_errors: Vec::new(),
            override_available: advisory_state.override_available(),
            override_requested: false,
        }
    }

    /// Terminal snapshot for a session that could not get a coordinate
    #[must_use]
    pub fn failed(error: &AdvisorError) -> Self {
        Self {
            phase: Phase::Failed,
            error_state: Some(ErrorState::from(error)),
            ..Self::loading()
        }
    }

    /// Snapshot assembled from the weather report; missing sections stay empty
    #[must_use]
    pub fn from_report(coordinate: Coordinate, report: WeatherReport) -> Self {
        let rain_advisory = report.rain_advisory();
        let advisory_state = rain_advisory.advisory_state();
        let section_errors = report.section_errors();

        // one generic notice for the screen, details stay in section_errors
        let error_state = report
            .current
            .as_ref()
            .err()
            .or(report.location_name.as_ref().err())
            .or(report.forecast.as_ref().err())
            .map(|e| ErrorState::from(&AdvisorError::from(e.clone())));

        Self {
            phase: Phase::Ready,
            coordinate: Some(coordinate),
            current_conditions: report.current.ok(),
            location_name: report.location_name.ok(),
            rain_advisory,
            advisory_state,
            error_state,
            section_errors,
            override_available: advisory_state.override_available(),
            override_requested: false,
        }
    }

    #[must_use]
    pub fn is_terminal_error(&self) -> bool {
        self.phase == Phase::Failed
    }
}

/// State holder scoped to the lifetime of one screen
pub struct AdvisorScreen {
    location: Arc<dyn LocationProvider>,
    weather: Arc<dyn WeatherSource>,
    call_timeout: Duration,
    state: Arc<watch::Sender<ScreenSnapshot>>,
    activated: AtomicBool,
}

impl AdvisorScreen {
    /// Mount the screen in the loading state
    #[must_use]
    pub fn mount(
        location: Arc<dyn LocationProvider>,
        weather: Arc<dyn WeatherSource>,
        call_timeout: Duration,
    ) -> Self {
        debug!("Mounting advisor screen");
        let (state, _) = watch::channel(ScreenSnapshot::loading());
        Self {
            location,
            weather,
            call_timeout,
            state: Arc::new(state),
            activated: AtomicBool::new(false),
        }
    }

    /// Handle for the rendering layer
    #[must_use]
    pub fn handle(&self) -> ScreenHandle {
        ScreenHandle {
            snapshots: self.state.subscribe(),
            state: Arc::downgrade(&self.state),
        }
    }

    /// Run the pipeline once. Later calls return the current snapshot without refetching.
    pub async fn activate(&self) -> ScreenSnapshot {
        if self.activated.swap(true, Ordering::SeqCst) {
            debug!("Screen already activated, returning current snapshot");
            return self.state.borrow().clone();
        }

        let snapshot = self.run_pipeline().await;
        self.publish(snapshot);
        self.state.borrow().clone()
    }

    /// Tear the screen down; handles keep the last snapshot but overrides become no-ops
    pub fn unmount(self) {
        debug!("Unmounting advisor screen");
    }

    #[instrument(skip_all)]
    async fn run_pipeline(&self) -> ScreenSnapshot {
        if self.location.request_authorization().await == Authorization::Denied {
            warn!("Location permission denied, skipping weather fetch");
            return ScreenSnapshot::failed(&AdvisorError::PermissionDenied);
        }

        let coordinate = match self.location.current_coordinate().await {
            Ok(coordinate) => coordinate,
            Err(e) => {
                error!("Could not read location: {}", e);
                return ScreenSnapshot::failed(&e);
            }
        };

        self.publish(ScreenSnapshot {
            coordinate: Some(coordinate),
            ..ScreenSnapshot::loading()
        });

        let report = fetch_report(self.weather.as_ref(), coordinate, self.call_timeout).await;
        let snapshot = ScreenSnapshot::from_report(coordinate, report);

        info!(
            "Advisory: {:?} (expected rain: {:?} mm)",
            snapshot.advisory_state, snapshot.rain_advisory.expected_rain_mm
        );
        snapshot
    }

    /// Replace the published snapshot, keeping an override already requested
    fn publish(&self, snapshot: ScreenSnapshot) {
        self.state.send_modify(|current| {
            let override_requested = current.override_requested;
            *current = snapshot;
            current.override_requested = override_requested;
        });
    }
}

/// Read access to the snapshot plus the manual override intent
#[derive(Debug, Clone)]
pub struct ScreenHandle {
    snapshots: watch::Receiver<ScreenSnapshot>,
    state: Weak<watch::Sender<ScreenSnapshot>>,
}

impl ScreenHandle {
    /// Handle on a fixed snapshot with no screen behind it; overrides are ignored
    #[must_use]
    pub fn detached(snapshot: ScreenSnapshot) -> Self {
        let (_, snapshots) = watch::channel(snapshot);
        Self {
            snapshots,
            state: Weak::new(),
        }
    }

    /// Latest published snapshot
    #[must_use]
    pub fn snapshot(&self) -> ScreenSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified on every published snapshot
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ScreenSnapshot> {
        self.snapshots.clone()
    }

    /// "Run anyway": fire-and-forget intent, accepted whatever the advisory says
    pub fn run_anyway(&self) {
        match self.state.upgrade() {
            Some(state) => {
                state.send_modify(|snapshot| {
                    info!(
                        "Manual override requested: run irrigation anyway (advisory: {:?})",
                        snapshot.advisory_state
                    );
                    snapshot.override_requested = true;
                });
            }
            None => debug!("Screen unmounted, override ignored"),
        }
    }
}
