//! Driver binary for the Fief world simulation.
//!
//! Wires together configuration, the storage backend, and the two tick
//! engines, then drives them on a fixed cadence. The engines themselves
//! never self-schedule; this loop is the only place that reads a clock
//! and decides when "now" is.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `fief-config.yaml` (path overridable via
//!    `FIEF_CONFIG`; defaults apply when the file is absent)
//! 3. Construct the configured storage backend and assemble the engine
//! 4. Seed the starting state if the backend is empty
//! 5. Run the tick loop until the configured tick budget is spent

use std::path::{Path, PathBuf};

use tracing::info;
use tracing_subscriber::EnvFilter;

use fief_core::clock::{Clock, SystemClock};
use fief_core::config::EngineConfig;
use fief_core::engine::GameEngine;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, backend construction, or a tick
/// fails; business rejections never surface here.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone())),
        )
        .with_target(true)
        .init();

    info!("fief-engine starting");
    info!(
        backend = ?config.storage.backend,
        tick_interval_ms = config.driver.tick_interval_ms,
        max_ticks = config.driver.max_ticks,
        "configuration loaded"
    );

    let mut engine = GameEngine::from_config(&config)?;

    let clock = SystemClock;
    if config.driver.seed_on_empty && engine.seed_if_empty(clock.now())? {
        info!("starting state seeded");
    }

    run_loop(&mut engine, &clock, &config)?;

    info!("fief-engine stopped");
    Ok(())
}

/// Resolve and load the configuration file.
///
/// Reads the path from `FIEF_CONFIG` (default `fief-config.yaml`). A
/// missing file is not an error; defaults apply.
fn load_config() -> Result<EngineConfig, Box<dyn std::error::Error>> {
    let path = std::env::var("FIEF_CONFIG")
        .map_or_else(|_| PathBuf::from("fief-config.yaml"), PathBuf::from);
    if Path::new(&path).exists() {
        Ok(EngineConfig::from_file(&path)?)
    } else {
        Ok(EngineConfig::parse("{}")?)
    }
}

/// Drive both engines until the tick budget is spent.
fn run_loop(
    engine: &mut GameEngine,
    clock: &impl Clock,
    config: &EngineConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let interval = std::time::Duration::from_millis(config.driver.tick_interval_ms);
    let mut ticks_run: u64 = 0;

    loop {
        let now = clock.now();
        let delta = engine.tick(now)?;
        let report = engine.diplomacy_tick(now)?;

        info!(
            tick = ticks_run,
            villages_changed = delta.resources_changed.len(),
            builds_completed = delta.builds_completed.len(),
            relations_updated = report.updated_relations.len(),
            treaties_expired = report.expired_treaties.len(),
            "tick complete"
        );

        ticks_run = ticks_run.saturating_add(1);
        if config.driver.max_ticks > 0 && ticks_run >= config.driver.max_ticks {
            break;
        }
        std::thread::sleep(interval);
    }

    Ok(())
}
