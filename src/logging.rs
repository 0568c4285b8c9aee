//! Log subscriber setup.
//!
//! The terminal UI owns stdout and stderr, so events go to a file in the
//! profile directory.
//!
//! # Filter priority (highest to lowest)
//!
//! 1. `HOME_MENU_LOG` env var (directives, e.g. `home_menu_maker::store=debug,warn`)
//! 2. `RUST_LOG`
//! 3. settings flags: `debug_log` gives debug, `log` gives info
//! 4. `warn`

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::Level;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::{ConfigContext, Settings};
use crate::error::LogInitError;

const ENV_LOG: &str = "HOME_MENU_LOG";

/// Level used when no filter comes from the environment.
pub fn settings_level(settings: &Settings) -> Level {
    if settings.debug_log {
        Level::DEBUG
    } else if settings.log {
        Level::INFO
    } else {
        Level::WARN
    }
}

fn build_env_filter(settings: &Settings) -> EnvFilter {
    if let Ok(directives) = std::env::var(ENV_LOG) {
        if let Ok(filter) = EnvFilter::try_new(&directives) {
            return filter;
        }
    }
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    EnvFilter::new(settings_level(settings).as_str().to_ascii_lowercase())
}

/// Install the global subscriber writing to `ctx.log_path()`. Returns the
/// log file path.
pub fn init(ctx: &ConfigContext) -> Result<PathBuf, LogInitError> {
    let path = ctx.log_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| LogInitError::Open {
            path: path.clone(),
            source,
        })?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|source| LogInitError::Open {
            path: path.clone(),
            source,
        })?;

    let fmt_layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_level(true);

    tracing_subscriber::registry()
        .with(build_env_filter(&ctx.settings))
        .with(fmt_layer)
        .try_init()
        .map_err(|_| LogInitError::AlreadyInstalled)?;
    Ok(path)
}
