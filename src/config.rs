use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use yada_core::DEFAULT_METHOD;

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Directory holding foods.txt, logs.json and profile.json
    pub data_dir: ConfigValue<PathBuf>,
    /// Calorie formula used until a profile is saved
    pub calorie_method: ConfigValue<String>,
    /// Number of undoable edits kept by the shell
    pub history_limit: ConfigValue<usize>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    calorie_method: Option<String>,
    history_limit: Option<usize>,
}

const DEFAULT_HISTORY_LIMIT: usize = 100;

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut data_dir = ConfigValue::new(Self::default_data_dir(), ConfigSource::Default);
        let mut calorie_method =
            ConfigValue::new(DEFAULT_METHOD.to_string(), ConfigSource::Default);
        let mut history_limit = ConfigValue::new(DEFAULT_HISTORY_LIMIT, ConfigSource::Default);
        let mut config_file = None;

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(dir) = file_config.data_dir {
                // Resolve relative paths against config file's directory
                let resolved = if dir.is_relative() {
                    path.parent().map(|p| p.join(&dir)).unwrap_or(dir)
                } else {
                    dir
                };
                data_dir = ConfigValue::new(resolved, ConfigSource::File);
            }
            if let Some(method) = file_config.calorie_method {
                calorie_method = ConfigValue::new(method, ConfigSource::File);
            }
            if let Some(limit) = file_config.history_limit {
                if limit == 0 {
                    return Err(ConfigError::InvalidValue(
                        path,
                        "history_limit must be at least 1".to_string(),
                    ));
                }
                history_limit = ConfigValue::new(limit, ConfigSource::File);
            }
        }

        if let Ok(dir) = std::env::var("YADA_DATA_DIR") {
            data_dir = ConfigValue::new(PathBuf::from(dir), ConfigSource::Environment);
        }
        if let Ok(method) = std::env::var("YADA_CALORIE_METHOD") {
            calorie_method = ConfigValue::new(method, ConfigSource::Environment);
        }

        Ok(Self {
            data_dir,
            calorie_method,
            history_limit,
            config_file,
        })
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/yada/
    /// - macOS: ~/Library/Application Support/yada/
    /// - Windows: %APPDATA%/yada/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("yada")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/yada/
    /// - macOS: ~/Library/Application Support/yada/
    /// - Windows: %APPDATA%/yada/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("yada")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    InvalidValue(PathBuf, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::InvalidValue(path, message) => {
                write!(f, "Invalid value in config file '{}': {}", path.display(), message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
