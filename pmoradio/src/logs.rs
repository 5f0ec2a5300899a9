//! Initialisation des logs.
//!
//! Le niveau minimum vient de `host.logger.min_level` et reste modifiable à
//! chaud via [`LogHandle::set_level`] ; la sortie console est activée par
//! `host.logger.enable_console`.

use std::io::IsTerminal;

use pmoconfig::Config;
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{Registry, reload};

/// Poignée sur le filtre de niveau installé par [`init_logging`].
#[derive(Clone)]
pub struct LogHandle {
    reload_handle: reload::Handle<LevelFilter, Registry>,
}

impl LogHandle {
    pub fn set_level(&self, level: Level) -> anyhow::Result<()> {
        self.reload_handle
            .reload(LevelFilter::from_level(level))
            .map_err(|e| anyhow::anyhow!("Failed to reload log level filter: {}", e))?;
        tracing::info!(level=%level, "Log level changed");
        Ok(())
    }

    pub fn level(&self) -> Option<LevelFilter> {
        self.reload_handle.clone_current()
    }
}

/// Installe le subscriber global.
///
/// Si un subscriber est déjà installé (tests, double appel), il est conservé
/// et la poignée retournée reste sans effet.
pub fn init_logging(config: &Config) -> LogHandle {
    let log_level = config
        .get_log_min_level()
        .ok()
        .and_then(|l| string_to_level(&l))
        .map(LevelFilter::from_level)
        .unwrap_or(LevelFilter::INFO);

    let (filter, reload_handle) = reload::Layer::new(log_level);

    let enable_console = config.get_log_enable_console().unwrap_or(true);
    let console = enable_console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_ansi(std::io::stderr().is_terminal())
            .with_writer(std::io::stderr)
    });

    let installed = Registry::default().with(filter).with(console).try_init();
    if let Err(err) = installed {
        eprintln!("Logging already initialised: {}", err);
    }

    LogHandle { reload_handle }
}

/// `"info"`, `"WARN"`... → [`Level`].
pub fn string_to_level(s: &str) -> Option<Level> {
    match s.trim().to_uppercase().as_str() {
        "ERROR" => Some(Level::ERROR),
        "WARN" | "WARNING" => Some(Level::WARN),
        "INFO" => Some(Level::INFO),
        "DEBUG" => Some(Level::DEBUG),
        "TRACE" => Some(Level::TRACE),
        _ => None,
    }
}
