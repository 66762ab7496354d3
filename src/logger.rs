//! File logging setup.
//!
//! Logging is opt-in through `[logging] enabled` in the config file. When
//! enabled, all `log` macro output is written to a file under the platform
//! data directory; when disabled, nothing is installed and the macros are
//! no-ops.

use anyhow::{Context, Result};
use log::LevelFilter;
use once_cell::sync::OnceCell;

use crate::config::Config;
use crate::constants::LOG_FILE;

static LOGGER: OnceCell<()> = OnceCell::new();

/// Install the file logger. Safe to call more than once: the global logger
/// is installed on the first enabled call and later calls are no-ops.
pub fn init(config: &Config) -> Result<()> {
    if !config.logging.enabled {
        return Ok(());
    }

    LOGGER.get_or_try_init(|| -> Result<()> {
        let log_path = Config::get_data_dir()?.join(LOG_FILE);
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
        }

        fern::Dispatch::new()
            .format(|out, message, record| {
                out.finish(format_args!(
                    "[{}][{}][{}] {}",
                    chrono::Local::now().format("%H:%M:%S%.3f"),
                    record.level(),
                    record.target(),
                    message
                ))
            })
            .level(LevelFilter::Debug)
            .chain(
                fern::log_file(&log_path)
                    .with_context(|| format!("Failed to open log file: {}", log_path.display()))?,
            )
            .apply()
            .context("Failed to install logger")?;

        Ok(())
    })?;

    Ok(())
}
