//! Configuration loading and database path resolution

use crate::{Error, Result};
use std::path::PathBuf;

/// Environment variable consulted when no CLI path is given
pub const DATABASE_ENV_VAR: &str = "MELODEX_DATABASE";

/// Database path resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
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
    Ok(get_default_database_path())
}

/// Get default configuration file path for the platform
fn find_config_file() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/melodex/config.toml first, then /etc/melodex/config.toml
        let user_config = dirs::config_dir().map(|d| d.join("melodex").join("config.toml"));
        let system_config = PathBuf::from("/etc/melodex/config.toml");

        if let Some(path) = user_config {
            if path.exists() {
                return Ok(path);
            }
        }
        if system_config.exists() {
            return Ok(system_config);
        }
        Err(Error::Config("No config file found".to_string()))
    } else {
        let config_path = dirs::config_dir()
            .map(|d| d.join("melodex").join("config.toml"))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;
        if config_path.exists() {
            Ok(config_path)
        } else {
            Err(Error::Config(format!("Config file not found: {:?}", config_path)))
        }
    }
}

/// Get OS-dependent default database path
fn get_default_database_path() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/melodex (or /var/lib/melodex for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("melodex"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/melodex"))
            .join("melodex.db")
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/melodex
        dirs::data_dir()
            .map(|d| d.join("melodex"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/melodex"))
            .join("melodex.db")
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\melodex
        dirs::data_local_dir()
            .map(|d| d.join("melodex"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\melodex"))
            .join("melodex.db")
    } else {
        PathBuf::from("./melodex.db")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_argument_wins() {
        let path = resolve_database_path(Some("/tmp/custom.db")).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/custom.db"));
    }

    #[test]
    fn default_path_ends_with_database_file() {
        let path = get_default_database_path();
        assert_eq!(path.file_name().unwrap(), "melodex.db");
    }
}
