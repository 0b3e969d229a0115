//! SkyCast command-line interface.
//!
//! Drives the dashboard core from the terminal: manage the tracked-city
//! list, run one-off fetches, or watch the selected city continuously.

mod format;

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use skycast_core::{
    Dashboard, FORECAST_DAYS, PollEvent, ServiceClient, WeatherClient, client_id,
};
use skycast_store::{SqliteStorage, Storage};
use skycast_types::{GeoPoint, PollInterval, ProviderId, TemperatureUnit};

use crate::format::{print_city, print_forecast, print_snapshot};

#[derive(Parser)]
#[command(name = "skycast")]
#[command(author, version, about = "CLI for the SkyCast weather dashboard", long_about = None)]
struct Cli {
    /// Base URL of the weather gateway
    #[arg(long, global = true, default_value = "http://localhost:8080", env = "SKYCAST_URL")]
    service_url: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Track a new city and select it
    Add {
        /// Display name of the city
        name: String,

        /// Country of the city
        #[arg(short, long)]
        country: String,

        /// Latitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },

    /// Stop tracking a city
    Remove {
        /// Name of the tracked city
        name: String,
    },

    /// List tracked cities
    List,

    /// Select a tracked city
    Select {
        /// Name of the tracked city
        name: String,
    },

    /// Fetch and display current weather for the selected city
    Current,

    /// Fetch and display the forecast for the selected city
    Forecast {
        /// Forecast horizon in days
        #[arg(short, long, default_value_t = FORECAST_DAYS)]
        days: u32,
    },

    /// Continuously watch the selected city
    Watch,

    /// Change a setting (provider, unit, interval)
    Set {
        /// Setting name
        setting: String,

        /// Setting value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let storage: Arc<dyn Storage> =
        Arc::new(SqliteStorage::open_default().context("failed to open local state database")?);
    let token = client_id::get_or_create(storage.as_ref());
    debug!("Using weather gateway at {}", cli.service_url);
    let client = Arc::new(ServiceClient::new(&cli.service_url, token)?);

    let (mut dashboard, mut events) =
        Dashboard::new(Arc::clone(&client) as Arc<dyn WeatherClient>, storage, 32);

    match cli.command {
        Commands::Add {
            name,
            country,
            lat,
            lon,
        } => {
            let location = GeoPoint::new(lat, lon)?;
            dashboard.add_city(&name, &country, location).await?;
            println!("Tracking {name}, {country} {location}");
        }

        Commands::Remove { name } => {
            dashboard.delete_city(&name)?;
            println!("Removed {name}");
        }

        Commands::List => {
            if dashboard.cities().is_empty() {
                println!("No tracked cities. Add one with `skycast add`.");
            }
            let unit = dashboard.settings().temperature_unit;
            let selected = dashboard.selected_city().map(|c| c.location);
            for city in dashboard.cities() {
                print_city(city, selected == Some(city.location), unit);
            }
        }

        Commands::Select { name } => {
            dashboard.select_city(&name)?;
            println!("Selected {name}");
        }

        Commands::Current => {
            let city = selected(&dashboard)?;
            let snapshot = client
                .current_weather(city.location, dashboard.settings().provider)
                .await?;
            println!("{}, {}", city.name, city.country);
            print_snapshot(&snapshot, dashboard.settings().temperature_unit);
            dashboard.apply_current(&snapshot);
        }

        Commands::Forecast { days } => {
            let city = selected(&dashboard)?;
            let forecast = dashboard.forecast(city.location, days).await?;
            println!("{}, {}: {}-day forecast", city.name, city.country, forecast.len());
            print_forecast(&forecast, dashboard.settings().temperature_unit);
        }

        Commands::Watch => {
            let city = selected(&dashboard)?.clone();
            let unit = dashboard.settings().temperature_unit;
            println!(
                "Watching {}, {} every {} min. Press Ctrl-C to stop.",
                city.name,
                city.country,
                dashboard.settings().poll_interval.as_millis() / 60_000,
            );
            dashboard.resume();

            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        println!("Stopped.");
                        break;
                    }
                    event = events.recv() => {
                        let Some(event) = event else { break };
                        match event {
                            PollEvent::Current(snapshot) => {
                                print_snapshot(&snapshot, unit);
                                dashboard.apply_current(&snapshot);
                            }
                            PollEvent::Forecast(days) => print_forecast(&days, unit),
                            PollEvent::Failed { operation, error } => {
                                warn!("{operation} fetch failed: {error}");
                            }
                        }
                    }
                }
            }
        }

        Commands::Set { setting, value } => {
            match setting.as_str() {
                "provider" => {
                    let provider: ProviderId = value.parse()?;
                    dashboard.set_provider(provider);
                    println!("Provider set to {provider}");
                }
                "unit" => {
                    let unit: TemperatureUnit = value.parse()?;
                    dashboard.set_temperature_unit(unit);
                    println!("Temperature unit set to {unit}");
                }
                "interval" => {
                    let minutes: u64 = value
                        .parse()
                        .context("interval must be a number of minutes")?;
                    let Some(interval) = PollInterval::from_millis(minutes * 60_000) else {
                        bail!(
                            "unsupported interval: {minutes} min (supported: 5, 15, 30, 60)"
                        );
                    };
                    dashboard.set_poll_interval(interval);
                    println!("Poll interval set to {minutes} min");
                }
                other => bail!("unknown setting '{other}' (expected provider, unit, or interval)"),
            }
        }
    }

    Ok(())
}

fn selected(dashboard: &Dashboard) -> Result<&skycast_types::TrackedCity> {
    dashboard
        .selected_city()
        .context("no city selected; add or select one first")
}
