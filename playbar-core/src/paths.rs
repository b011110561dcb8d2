//! Path constants for configuration and log files.

use std::path::PathBuf;

/// The name of the configuration directory under ~/.config/
pub const CONFIG_DIR_NAME: &str = "playbar";

/// The name of the main configuration file
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// The name of the log file written when file logging is enabled
pub const LOG_FILE_NAME: &str = "playbar.log";

/// Get the configuration directory path (~/.config/playbar/)
#[must_use]
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join(CONFIG_DIR_NAME)
}

/// Get the config file path (~/.config/playbar/config.toml)
#[must_use]
pub fn config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE_NAME)
}

/// Get the log file path (`<cache dir>/playbar/playbar.log`, falling back to the config dir)
#[must_use]
pub fn log_file_path() -> PathBuf {
    dirs::cache_dir()
        .map_or_else(config_dir, |cache| cache.join(CONFIG_DIR_NAME))
        .join(LOG_FILE_NAME)
}
