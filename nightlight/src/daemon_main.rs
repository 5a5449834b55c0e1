// SPDX-License-Identifier: GPL-3.0-only

//! Process entry point: argument handling, one-shot commands and the
//! polling daemon.

use crate::cli;
use crate::config::DaemonConfig;
use crate::poller::IntensityPoller;
use crate::sampler::SamplerKind;
use anyhow::{Context, Result};
use clap::parser::ValueSource;
use log::{error, info};
use nightlight_shared::record::fixtures;
use nightlight_shared::{BlobStore, BlueLightFilter, FileStore, FilterError, RecordKey};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;

type SharedStore = Arc<dyn BlobStore>;

/// Main entry point
///
/// # Errors
///
/// Returns an error if the night light records are unavailable or a
/// requested operation fails.
pub async fn run() -> Result<()> {
    let matches = cli::build().get_matches();
    init_logging(matches.get_flag("verbose"));

    let mut config = DaemonConfig::load();
    apply_cli_overrides(&mut config, &matches);

    match matches.subcommand() {
        Some(("seed", _)) => return handle_seed_command(&config),
        Some(("save-config", _)) => {
            config
                .save()
                .map_err(|e| anyhow::anyhow!("Failed to save config: {e}"))?;
            info!("Configuration saved");
            return Ok(());
        }
        _ => {}
    }

    let filter = BlueLightFilter::new(open_store(&config)?)
        .context("Night light is not available on this system")?;

    match matches.subcommand() {
        Some(("on", _)) => {
            filter.turn_on().context("Failed to turn night light on")?;
            info!("Night light on");
        }
        Some(("off", _)) => {
            filter.turn_off().context("Failed to turn night light off")?;
            info!("Night light off");
        }
        Some(("get", _)) => {
            let percent = filter.intensity_percent()?;
            println!("{}", percent.value());
        }
        Some(("set", set_matches)) => {
            let percent = set_matches
                .get_one::<i64>("percent")
                .copied()
                .context("Missing percent")?;
            filter
                .set_intensity_percent(percent)
                .with_context(|| format!("Failed to set intensity to {percent}%"))?;
            info!("Night light intensity set to {percent}%");
        }
        Some(("status", _)) => print_status(&filter)?,
        _ => run_daemon(filter, &config).await?,
    }

    Ok(())
}

/// Respect `RUST_LOG` if set, otherwise fall back to the verbose flag
fn init_logging(verbose: bool) {
    if std::env::var("RUST_LOG").is_ok() {
        env_logger::init();
    } else {
        let log_level = if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        };
        env_logger::Builder::from_default_env()
            .filter_level(log_level)
            .init();
    }
}

/// Only arguments given explicitly on the command line win over the config file
fn apply_cli_overrides(config: &mut DaemonConfig, matches: &clap::ArgMatches) {
    let explicit = |id: &str| matches.value_source(id) == Some(ValueSource::CommandLine);

    if explicit("interval") {
        if let Some(interval) = matches.get_one::<u64>("interval") {
            config.poller.interval_ms = *interval;
        }
    }
    if explicit("sampler") {
        if let Some(sampler) = matches.get_one::<SamplerKind>("sampler") {
            config.poller.sampler = *sampler;
        }
    }
    if matches.get_flag("no-restore") {
        config.poller.restore_on_exit = false;
    }
    if let Some(dir) = matches.get_one::<PathBuf>("store-dir") {
        config.store.directory = Some(dir.clone());
    }
}

fn open_store(config: &DaemonConfig) -> Result<SharedStore, FilterError> {
    if let Some(dir) = &config.store.directory {
        info!("Using record files in {}", dir.display());
        return Ok(Arc::new(FileStore::new(dir)));
    }
    platform_store()
}

#[cfg(windows)]
#[allow(clippy::unnecessary_wraps)]
fn platform_store() -> Result<SharedStore, FilterError> {
    Ok(Arc::new(nightlight_shared::RegistryStore::new()))
}

#[cfg(not(windows))]
fn platform_store() -> Result<SharedStore, FilterError> {
    Err(FilterError::UnsupportedEnvironment(format!(
        "night light records only exist in the Windows registry (running on {}); use --store-dir",
        std::env::consts::OS
    )))
}

/// Write synthetic records so the daemon can run without a registry
fn handle_seed_command(config: &DaemonConfig) -> Result<()> {
    let dir = config
        .store
        .directory
        .as_ref()
        .context("seed needs --store-dir (or [store] directory in the config)")?;
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create store directory {}", dir.display()))?;

    let store = FileStore::new(dir);
    store.write_blob(RecordKey::State, &fixtures::inactive_state())?;
    store.write_blob(RecordKey::Settings, &fixtures::settings())?;
    info!("Seeded night light records in {}", dir.display());
    Ok(())
}

fn print_status(filter: &BlueLightFilter<SharedStore>) -> Result<()> {
    let record = filter.state_record()?;
    let percent = filter.intensity_percent()?;
    let strength = filter.strength()?;

    let changed = i64::try_from(record.timestamp)
        .ok()
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
        .map_or_else(|| "unknown".to_string(), |t| t.to_rfc3339());

    info!("Night light status:");
    info!("  State: {}", record.status);
    info!("  Last changed: {changed}");
    info!("  Intensity: {percent} (strength {strength})");
    Ok(())
}

async fn run_daemon(filter: BlueLightFilter<SharedStore>, config: &DaemonConfig) -> Result<()> {
    info!("Starting night light daemon");
    info!("Sampler: {}", config.poller.sampler);
    info!("Interval: {}ms", config.poller.interval().as_millis());
    info!("Restore on exit: {}", config.poller.restore_on_exit);

    let poller = IntensityPoller::new(
        filter,
        config.poller.sampler.build(),
        config.poller.interval(),
        config.poller.restore_on_exit,
    );

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

    // Set up Ctrl+C handler
    let signal_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl+C, initiating shutdown...");
                let _ = signal_tx.send(());
            }
            Err(e) => error!("Failed to listen for Ctrl+C: {e}"),
        }
    });

    let report = tokio::spawn(poller.run(shutdown_rx))
        .await
        .context("Poller task failed")?;
    drop(shutdown_tx);

    info!(
        "Daemon stopped after {} cycles ({} failed), state restored: {}",
        report.cycles, report.failed_cycles, report.restored
    );
    Ok(())
}
