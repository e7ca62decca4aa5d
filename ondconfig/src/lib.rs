//! # Ondes Configuration Module
//!
//! Configuration management for the Ondes playback engine:
//! - Loading configuration from a YAML file
//! - Merging with the embedded default configuration
//! - Thread-safe singleton access pattern
//! - Generic dotted-path getters and setters, persisted on write
//!
//! Domain-specific accessors (catalog credentials, playback volume) live in
//! the crates that own those concerns, as extension traits over [`Config`].
//!
//! ## Usage
//!
//! ```no_run
//! use ondconfig::get_config;
//! use serde_yaml::Value;
//!
//! let config = get_config();
//! let limit = config.get_value(&["catalog", "limit"])?;
//! config.set_value(&["catalog", "limit"], Value::Number(30.into()))?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{anyhow, Result};
use dirs::home_dir;
use lazy_static::lazy_static;
use serde_yaml::{Mapping, Value};
use std::{
    env, fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tracing::info;

// Configuration par défaut intégrée
const DEFAULT_CONFIG: &str = include_str!("ondes.yaml");

const ENV_CONFIG_DIR: &str = "ONDES_CONFIG";
const CONFIG_FILE_NAME: &str = "config.yaml";

lazy_static! {
    static ref CONFIG: Arc<Config> =
        Arc::new(Config::load_config("").expect("Failed to load Ondes configuration"));
}

/// Returns the global configuration singleton.
///
/// The configuration is loaded once, on first access, from the directory
/// resolution order documented on [`Config::load_config`].
pub fn get_config() -> Arc<Config> {
    CONFIG.clone()
}

/// Configuration manager for the Ondes engine.
///
/// Holds the merged YAML document behind a mutex; every setter persists the
/// whole document back to disk so preferences survive restarts.
#[derive(Debug)]
pub struct Config {
    path: PathBuf,
    data: Mutex<Value>,
}

impl Config {
    /// Finds a config directory by trying different locations in order.
    fn find_config_dir(directory: &str) -> PathBuf {
        // 1. Provided directory
        if !directory.is_empty() {
            return PathBuf::from(directory);
        }

        // 2. Environment variable
        if let Ok(env_path) = env::var(ENV_CONFIG_DIR) {
            info!(env_var = ENV_CONFIG_DIR, path = %env_path, "Trying to load config from env");
            return PathBuf::from(env_path);
        }

        // 3. ~/.config/ondes
        if let Some(home) = home_dir() {
            return home.join(".config").join("ondes");
        }

        // Fallback: current directory
        PathBuf::from(".ondes")
    }

    /// Validates and prepares a config directory.
    fn validate_config_dir(path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        if !path.is_dir() {
            return Err(anyhow!(
                "Config path is not a directory: {}",
                path.display()
            ));
        }
        Ok(())
    }

    /// Loads the configuration from the specified directory.
    ///
    /// The directory is searched in the following order:
    /// 1. The provided `directory` parameter if not empty
    /// 2. The `ONDES_CONFIG` environment variable
    /// 3. `.config/ondes` in the user's home directory
    ///
    /// The embedded default configuration is merged with the external
    /// `config.yaml` file when present, then the merged result is saved back.
    pub fn load_config(directory: &str) -> Result<Self> {
        let config_dir = Self::find_config_dir(directory);
        Self::validate_config_dir(&config_dir)?;
        info!(config_dir = %config_dir.display(), "Using config directory");

        let path = config_dir.join(CONFIG_FILE_NAME);

        let mut merged: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;
        match fs::read(&path) {
            Ok(data) => {
                info!(config_file = %path.display(), "Loaded config file");
                let external: Value = serde_yaml::from_slice(&data)?;
                merge_yaml(&mut merged, &external);
            }
            Err(_) => {
                info!(config_file = %path.display(), "Config file not found, using default embedded config");
            }
        }

        let config = Config {
            path,
            data: Mutex::new(merged),
        };
        config.save()?;
        Ok(config)
    }

    /// Saves the current configuration to its `config.yaml` file.
    pub fn save(&self) -> Result<()> {
        let data = self.data.lock().unwrap();
        let yaml = serde_yaml::to_string(&*data)?;
        fs::write(&self.path, yaml)?;
        Ok(())
    }

    /// Gets a configuration value at the specified path.
    ///
    /// `path` is an array of keys, e.g. `&["playback", "volume"]`. Returns an
    /// error when the path does not exist.
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let data = self.data.lock().unwrap();
        Self::get_value_internal(&data, path)
    }

    fn get_value_internal(data: &Value, path: &[&str]) -> Result<Value> {
        let mut current = data;
        for (i, key) in path.iter().enumerate() {
            if let Value::Mapping(map) = current {
                if let Some(next) = map.get(Value::String((*key).to_string())) {
                    current = next;
                } else {
                    return Err(anyhow!("Path {} does not exist", path[..=i].join(".")));
                }
            } else {
                return Err(anyhow!("Path {} is not a mapping", path[..i].join(".")));
            }
        }
        Ok(current.clone())
    }

    /// Sets a configuration value at the specified path and saves it.
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        {
            let mut data = self.data.lock().unwrap();
            Self::set_value_internal(&mut data, path, value)?;
        }
        self.save()?;
        Ok(())
    }

    fn set_value_internal(data: &mut Value, path: &[&str], value: Value) -> Result<()> {
        if path.is_empty() {
            *data = value;
            return Ok(());
        }
        if let Value::Mapping(map) = data {
            let key = Value::String(path[0].to_string());
            if path.len() == 1 {
                map.insert(key, value);
            } else {
                let entry = map.entry(key).or_insert(Value::Mapping(Mapping::new()));
                Self::set_value_internal(entry, &path[1..], value)?;
            }
            Ok(())
        } else {
            Err(anyhow!("Current node is not a mapping"))
        }
    }
}

/// Recursively overlays `external` onto `default`.
///
/// Mappings are merged key by key; any other value type replaces the default
/// wholesale.
fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(default_map), Value::Mapping(external_map)) => {
            for (key, ext_value) in external_map {
                match default_map.get_mut(key) {
                    Some(def_value) => merge_yaml(def_value, ext_value),
                    None => {
                        default_map.insert(key.clone(), ext_value.clone());
                    }
                }
            }
        }
        (default, external) => {
            *default = external.clone();
        }
    }
}
