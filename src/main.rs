use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use irrigation_advisor::config::AdvisorConfig;
use irrigation_advisor::render::{self, OutputFormat};
use irrigation_advisor::{
    AdvisorError, AdvisorScreen, Authorization, LocationProvider, OpenWeatherMapClient,
    ScreenHandle, ScreenSnapshot, StaticLocationProvider, telemetry, web,
};

#[derive(Parser)]
#[command(
    name = "irrigation-advisor",
    version,
    about = "Irrigation advisor - skip watering when rain is forecast"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, env = "IRRIGATION_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the advisor once and print the screen
    Check {
        /// Coordinate to use instead of the configured one, e.g. "12.9716,77.5946"
        #[arg(long, value_name = "LAT,LON", allow_hyphen_values = true)]
        at: Option<String>,

        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,

        /// Request the manual override after the advisory is shown
        #[arg(long)]
        run_anyway: bool,
    },
    /// Run the advisor once and serve the snapshot over HTTP
    Serve {
        /// Coordinate to use instead of the configured one, e.g. "12.9716,77.5946"
        #[arg(long, value_name = "LAT,LON", allow_hyphen_values = true)]
        at: Option<String>,

        /// Port to listen on (defaults to server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = AdvisorConfig::load_from_path(cli.config.clone())
        .context("Failed to load configuration")?;
    telemetry::init(&config.logging, cli.verbose)?;

    let command = cli.command.unwrap_or(Commands::Check {
        at: None,
        json: false,
        run_anyway: false,
    });

    match command {
        Commands::Check {
            at,
            json,
            run_anyway,
        } => {
            let format = if json {
                OutputFormat::Json
            } else {
                OutputFormat::Text
            };
            check(&config, at.as_deref(), format, run_anyway).await
        }
        Commands::Serve { at, port } => {
            serve(&config, at.as_deref(), port.unwrap_or(config.server.port)).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// A mounted screen, or a session that ended before the weather client was needed
enum Session {
    Mounted(AdvisorScreen),
    Ended(ScreenSnapshot),
}

/// Permission is asked before the weather client is built, so a denied
/// session never requires an API key.
async fn open(config: &AdvisorConfig, at: Option<&str>) -> Result<Session> {
    let location = StaticLocationProvider::from_config(&config.location, at)?;
    if location.request_authorization().await == Authorization::Denied {
        warn!("Location permission denied, weather client not built");
        return Ok(Session::Ended(ScreenSnapshot::failed(&AdvisorError::PermissionDenied)));
    }

    let weather = OpenWeatherMapClient::new(&config.weather)?;
    let call_timeout = weather.call_timeout();

    Ok(Session::Mounted(AdvisorScreen::mount(
        Arc::new(location),
        Arc::new(weather),
        call_timeout,
    )))
}

async fn check(
    config: &AdvisorConfig,
    at: Option<&str>,
    format: OutputFormat,
    run_anyway: bool,
) -> Result<ExitCode> {
    let snapshot = match open(config, at).await? {
        Session::Mounted(screen) => {
            let handle = screen.handle();
            let mut snapshot = screen.activate().await;
            if run_anyway {
                handle.run_anyway();
                snapshot = handle.snapshot();
            }
            screen.unmount();
            snapshot
        }
        Session::Ended(snapshot) => snapshot,
    };

    println!("{}", render::render(&snapshot, &config.presentation, format)?);

    if snapshot.is_terminal_error() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

async fn serve(config: &AdvisorConfig, at: Option<&str>, port: u16) -> Result<()> {
    let screen = match open(config, at).await? {
        Session::Mounted(screen) => screen,
        Session::Ended(snapshot) => {
            warn!("Serving a screen that ended in an error state");
            web::run(port, ScreenHandle::detached(snapshot)).await?;
            return Ok(());
        }
    };

    let snapshot = screen.activate().await;
    if snapshot.is_terminal_error() {
        warn!("Serving a screen that ended in an error state");
    } else {
        info!("Advisory ready: {}", snapshot.advisory_state.headline());
    }

    web::run(port, screen.handle()).await?;
    screen.unmount();
    Ok(())
}
