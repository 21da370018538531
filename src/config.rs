// src/config.rs
use directories::ProjectDirs;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use toml;

use crate::error::{ConfigError, ConfigResult};

/// Roughly what a browser grants a single origin's local storage.
pub const DEFAULT_QUOTA_BYTES: u64 = 5 * 1024 * 1024;
const FALLBACK_DATA_DIR: &str = "junk-journal-data";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Where the journal records live. Defaults to the platform data directory.
    pub data_dir: Option<PathBuf>,
    /// Combined size cap for all records; 0 disables it.
    pub quota_bytes: u64,
    pub currency_symbol: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: None,
            quota_bytes: DEFAULT_QUOTA_BYTES,
            currency_symbol: "₹".to_string(),
        }
    }
}

impl Config {
    pub fn resolve_data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(FALLBACK_DATA_DIR))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "JunkJournal", "JunkJournal")
}

fn get_config_path() -> Option<PathBuf> {
    project_dirs().map(|proj_dirs| proj_dirs.config_dir().join("config.toml"))
}

/// Reads the config file. `Ok(None)` means there is no file yet.
pub fn read_config(config_path: &Path) -> ConfigResult<Option<Config>> {
    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Io {
                path: config_path.to_path_buf(),
                source,
            })
        }
    };
    Ok(Some(toml::from_str(&content)?))
}

/// Writes `config` as TOML, creating parent directories as needed.
pub fn write_config(config_path: &Path, config: &Config) -> ConfigResult<()> {
    let io_error = |source| ConfigError::Io {
        path: config_path.to_path_buf(),
        source,
    };
    if let Some(parent_dir) = config_path.parent() {
        fs::create_dir_all(parent_dir).map_err(io_error)?;
    }
    let toml_string = toml::to_string_pretty(config)?;
    fs::write(config_path, toml_string).map_err(io_error)?;
    info!("Saved configuration to {:?}", config_path);
    Ok(())
}

/// Loads the config at `config_path`, writing out defaults if the file does not exist.
/// A file that cannot be read or parsed falls back to defaults.
pub fn load_config_from(config_path: &Path) -> Config {
    match read_config(config_path) {
        Ok(Some(config)) => {
            info!("Configuration loaded from {:?}", config_path);
            config
        }
        Ok(None) => {
            info!("No config file at {:?}; writing defaults", config_path);
            let config = Config::default();
            if let Err(e) = write_config(config_path, &config) {
                warn!("Failed to save default configuration: {}", e);
            }
            config
        }
        Err(e) => {
            warn!("{}. Using default configuration.", e);
            Config::default()
        }
    }
}

pub fn load_config() -> Config {
    match get_config_path() {
        Some(config_path) => load_config_from(&config_path),
        None => {
            warn!("Could not determine config directory. Using default configuration.");
            Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.quota_bytes, 5 * 1024 * 1024);
        assert_eq!(config.currency_symbol, "₹");
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_missing_config_is_created_with_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("nested").join("config.toml");

        let config = load_config_from(&config_path);
        assert_eq!(config, Config::default());
        assert!(config_path.exists());

        let content = fs::read_to_string(&config_path).unwrap();
        let reloaded: Config = toml::from_str(&content).unwrap();
        assert_eq!(reloaded, Config::default());
    }

    #[test]
    fn test_partial_config_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(
            &config_path,
            r#"
currency_symbol = "$"
data_dir = "/tmp/journal"
"#,
        )
        .unwrap();

        let config = load_config_from(&config_path);
        assert_eq!(config.currency_symbol, "$");
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/journal")));
        assert_eq!(config.quota_bytes, DEFAULT_QUOTA_BYTES);
        assert_eq!(config.resolve_data_dir(), PathBuf::from("/tmp/journal"));
    }

    #[test]
    fn test_write_then_read_config() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("a").join("b").join("config.toml");
        assert!(read_config(&config_path).unwrap().is_none());

        let config = Config {
            data_dir: Some(PathBuf::from("/srv/journal")),
            quota_bytes: 0,
            currency_symbol: "€".to_string(),
        };
        write_config(&config_path, &config).unwrap();
        assert_eq!(read_config(&config_path).unwrap(), Some(config));
    }

    #[test]
    fn test_config_errors_are_typed() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "quota_bytes = [").unwrap();
        assert!(matches!(read_config(&config_path), Err(ConfigError::Parse(_))));

        // A plain file where the parent directory should be.
        let blocked = config_path.join("config.toml");
        assert!(matches!(
            write_config(&blocked, &Config::default()),
            Err(ConfigError::Io { .. })
        ));
        assert!(matches!(read_config(dir.path()), Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_invalid_config_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "this is not valid toml content = definitely_broken").unwrap();
        assert_eq!(load_config_from(&config_path), Config::default());

        fs::write(&config_path, "quota_bytes = \"lots\"").unwrap();
        assert_eq!(load_config_from(&config_path), Config::default());
    }
}
