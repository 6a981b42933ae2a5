//! Terminal rendering of the screen snapshot

use std::fmt::Write;

use crate::Result;
use crate::config::PresentationConfig;
use crate::screen::{Phase, ScreenSnapshot};

/// Output format for the `check` command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Render a snapshot in the requested format
pub fn render(
    snapshot: &ScreenSnapshot,
    presentation: &PresentationConfig,
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(snapshot, presentation)),
        OutputFormat::Json => serde_json::to_string_pretty(snapshot).map_err(|e| {
            crate::AdvisorError::validation(format!("Failed to serialize snapshot: {e}"))
        }),
    }
}

/// Plain text screen: header, conditions, location, advisory panel
#[must_use]
pub fn render_text(snapshot: &ScreenSnapshot, presentation: &PresentationConfig) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", presentation.title);
    if let Some(logo) = &presentation.logo_uri {
        let _ = writeln!(out, "[logo: {logo}]");
    }
    out.push('\n');

    match snapshot.phase {
        Phase::Loading => {
            out.push_str("Loading...\n");
            return out;
        }
        Phase::Failed => {
            if let Some(error) = &snapshot.error_state {
                let _ = writeln!(out, "{}", error.message);
            }
            return out;
        }
        Phase::Ready => {}
    }

    match &snapshot.current_conditions {
        Some(conditions) => {
            let _ = writeln!(out, "{}", conditions.headline());
            let _ = writeln!(out, "{}", conditions.format_humidity());
            let _ = writeln!(out, "{}", conditions.format_wind());
        }
        None => out.push_str("Current conditions unavailable\n"),
    }
    out.push('\n');

    match &snapshot.location_name {
        Some(name) => {
            let _ = writeln!(out, "{name}");
        }
        None => out.push_str("Location name unavailable\n"),
    }
    if let Some(coordinate) = &snapshot.coordinate {
        let _ = writeln!(out, "Latitude: {}", coordinate.format_latitude());
        let _ = writeln!(out, "Longitude: {}", coordinate.format_longitude());
    }
    out.push('\n');

    let _ = writeln!(out, "{}", snapshot.advisory_state.headline());
    let _ = writeln!(out, "{}", snapshot.advisory_state.reason());
    let _ = writeln!(out, "{}", snapshot.rain_advisory.format_detail());
    if snapshot.override_available {
        out.push_str("[RUN ANYWAY]\n");
    }
    if snapshot.override_requested {
        out.push_str("Override requested: irrigation will run\n");
    }

    if let Some(error) = &snapshot.error_state {
        out.push('\n');
        let _ = writeln!(out, "{}", error.message);
        for failure in &snapshot.section_errors {
            let _ = writeln!(out, "  {:?}: {}", failure.section, failure.message);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AdvisorError;
    use crate::models::{Coordinate, CurrentConditions, ForecastEntry, ForecastWindow};
    use crate::weather::WeatherReport;
    use chrono::Utc;

    fn ready_snapshot() -> ScreenSnapshot {
        let report = WeatherReport {
            current: Ok(CurrentConditions {
                description: "light rain".to_string(),
                temperature_celsius: 24.3,
                humidity_percent: 80,
                wind_speed_ms: 3.1,
            }),
            location_name: Ok("Bengaluru".to_string()),
            forecast: Ok(ForecastWindow::new(vec![
                ForecastEntry::new(Utc::now(), None),
                ForecastEntry::new(Utc::now(), Some(1.2)),
            ])),
        };
        ScreenSnapshot::from_report(
            Coordinate {
                latitude: 12.9716,
                longitude: 77.5946,
            },
            report,
        )
    }

    #[test]
    fn test_render_ready_screen() {
        let text = render_text(&ready_snapshot(), &PresentationConfig::default());

        assert!(text.starts_with("AI BASED IRRIGATION PLANNER\n"));
        assert!(text.contains("light rain - 24.3°C"));
        assert!(text.contains("Humidity: 80%"));
        assert!(text.contains("Wind Speed: 3.1 m/s"));
        assert!(text.contains("Bengaluru"));
        assert!(text.contains("Latitude: 12.971600"));
        assert!(text.contains("Longitude: 77.594600"));
        assert!(text.contains("Watering skipped"));
        assert!(text.contains("Rain in next 3 hours: 1.2 mm"));
        assert!(text.contains("[RUN ANYWAY]"));
        assert!(!text.contains("Failed to fetch weather data"));
    }

    #[test]
    fn test_render_permission_denied() {
        let snapshot = ScreenSnapshot::failed(&AdvisorError::PermissionDenied);
        let text = render_text(&snapshot, &PresentationConfig::default());

        assert!(text.contains("Permission to access location was denied"));
        assert!(!text.contains("Latitude"));
        assert!(!text.contains("Watering"));
    }

    #[test]
    fn test_render_json() {
        let json = render(
            &ready_snapshot(),
            &PresentationConfig::default(),
            OutputFormat::Json,
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["phase"], "ready");
        assert_eq!(value["advisory_state"], "watering_skipped");
        assert_eq!(value["rain_advisory"]["expected_rain_mm"], 1.2);
        assert_eq!(value["override_available"], true);
    }
}
