//! Configuration loading and database path resolution

use crate::{Error, Result};
use std::path::PathBuf;

/// Environment variable consulted when no CLI flag is given.
pub const DATABASE_ENV_VAR: &str = "BOOKLOG_DATABASE";

/// Database path resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. `BOOKLOG_DATABASE` environment variable
/// 3. `database` key in the TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_database_path(cli_arg: Option<&str>) -> Result<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Ok(PathBuf::from(path));
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(DATABASE_ENV_VAR) {
        return Ok(PathBuf::from(path));
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = find_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(database) = config.get("database").and_then(|v| v.as_str()) {
                    return Ok(PathBuf::from(database));
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    Ok(default_database_path())
}

/// Locate the platform config file, `<config dir>/booklog/config.toml`.
///
/// On Linux the system-wide `/etc/booklog/config.toml` is consulted when no
/// per-user file exists.
fn find_config_file() -> Result<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("booklog").join("config.toml"));

    if let Some(path) = user_config {
        if path.exists() {
            return Ok(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/booklog/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
    }

    Err(Error::Config("no config file found".to_string()))
}

/// Default database location under the platform data directory.
fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("booklog"))
        .unwrap_or_else(|| PathBuf::from("/var/lib/booklog"))
        .join("booklog.db")
}
