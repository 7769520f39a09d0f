use std::path::{Path, PathBuf};

use thiserror::Error;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "TRELLOL_DATA_DIR";

const LOG_FILE_NAME: &str = "trellol.log";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine data directory: no HOME directory or system data directory found")]
    NoDataDir,
}

/// Resolve the data directory based on priority:
/// 1. Explicit path (with tilde expansion)
/// 2. TRELLOL_DATA_DIR environment variable (with tilde expansion)
/// 3. System data directory
/// 4. ~/.trellol
pub fn resolve_data_dir(explicit: Option<&str>) -> Result<PathBuf, ConfigError> {
    resolve_data_dir_with(explicit, std::env::var(DATA_DIR_ENV).ok().as_deref())
}

fn resolve_data_dir_with(explicit: Option<&str>, env: Option<&str>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = explicit {
        return Ok(expand_tilde(path));
    }

    if let Some(path) = env.filter(|p| !p.is_empty()) {
        return Ok(expand_tilde(path));
    }

    if let Some(data_dir) = dirs::data_dir() {
        return Ok(data_dir.join("trellol"));
    }

    if let Some(home) = std::env::var_os("HOME") {
        return Ok(PathBuf::from(home).join(".trellol"));
    }

    Err(ConfigError::NoDataDir)
}

/// Default log file location inside the data directory.
pub fn default_log_file(data_dir: &Path) -> PathBuf {
    data_dir.join(LOG_FILE_NAME)
}

/// Expand tilde (~) in paths to the user's home directory
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(stripped);
    }
    PathBuf::from(path)
}
