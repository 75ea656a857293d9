mod app;
mod prompt;

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    path::Path,
    sync::Mutex,
};

use fleet_core::{
    config::{self, AppConfig},
    sample_fleet, Fleet, FleetStore, SharedFleet,
};
use tracing_subscriber::{prelude::*, EnvFilter};

const LOG_FILE: &str = "fleetctl.log";

fn main() -> Result<()> {
    config::ensure_default_config()?;
    let config = AppConfig::load()?;
    init_logging(&config.log_dir)?;

    let store = FleetStore::from_config(&config);
    let (fleet, startup) = initial_fleet(&config, &store)?;
    tracing::info!(vehicles = fleet.len(), "{startup}");

    let mut app = app::FleetApp::new(config, SharedFleet::new(fleet), store);
    app.note(startup);
    app.run()
}

fn initial_fleet(config: &AppConfig, store: &FleetStore) -> Result<(Fleet, String)> {
    let path = &config.fleet_file;
    if path.exists() {
        let (fleet, summary) = store.open(path)?;
        let mut message = format!("Loaded {} vehicle(s) from {}", summary.loaded, path.display());
        if !summary.skipped.is_empty() {
            message.push_str(&format!(", {} line(s) skipped", summary.skipped.len()));
        }
        return Ok((fleet, message));
    }
    if config.seed_sample_fleet {
        let fleet = sample_fleet().context("failed to build sample fleet")?;
        return Ok((fleet, "Seeded the demonstration fleet".to_string()));
    }
    Ok((Fleet::new(), "Starting with an empty fleet".to_string()))
}

fn init_logging(log_dir: &Path) -> Result<()> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create {}", log_dir.display()))?;
    let log_path = log_dir.join(LOG_FILE);
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open {}", log_path.display()))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}
