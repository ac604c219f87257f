//! Configuration module for the thumbnail extractor
//!
//! Supports loading configuration from a TOML file.
//! Configuration is stored in a standard location:
//! - Windows: %APPDATA%\shell_thumbnail\config.toml
//! - Linux: ~/.config/shell_thumbnail/config.toml
//! - macOS: ~/Library/Application Support/shell_thumbnail/config.toml

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Application name used for config directory
const APP_NAME: &str = "shell_thumbnail";

/// Default config file name
const CONFIG_FILE_NAME: &str = "config.toml";

/// Channel the host application talks to
pub const DEFAULT_CHANNEL_NAME: &str = "com.mymeta/thumbnail";

/// Largest thumbnail bucket the shell cache keeps
pub const DEFAULT_MAX_SIZE: u32 = 2560;

/// Edge length used by the CLI when no size is given
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 256;

/// Get the standard configuration directory for the application.
pub fn get_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME))
}

/// Get the standard configuration file path.
pub fn get_config_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

/// Ensure the configuration directory exists.
pub fn ensure_config_dir() -> Result<PathBuf, ConfigError> {
    let config_dir = get_config_dir().ok_or(ConfigError::ConfigDirNotFound)?;

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)
            .map_err(|e| ConfigError::WriteError(config_dir.clone(), e.to_string()))?;
    }

    Ok(config_dir)
}

/// Initialize the configuration file if it doesn't exist.
///
/// With `reset` set, an existing file is overwritten with the defaults.
/// Returns the path to the config file.
pub fn init_config(reset: bool) -> Result<PathBuf, ConfigError> {
    let config_dir = ensure_config_dir()?;
    let config_path = config_dir.join(CONFIG_FILE_NAME);

    if reset || !config_path.exists() {
        fs::write(&config_path, Config::generate_default_config())
            .map_err(|e| ConfigError::WriteError(config_path.clone(), e.to_string()))?;
    }

    Ok(config_path)
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Thumbnail request limits and encoding
    pub thumbnail: ThumbnailSettings,

    /// Method channel settings
    pub channel: ChannelConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Thumbnail request and encoding settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ThumbnailSettings {
    /// Edge length used when the CLI is not given one
    pub default_size: u32,

    /// Largest edge length a caller may ask for
    pub max_size: u32,

    /// JPEG quality (1-100). Unset means the encoder default.
    pub jpeg_quality: Option<u8>,
}

/// Method channel configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChannelConfig {
    /// Channel name the thumbnail handler is registered under
    pub name: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log to file
    pub log_to_file: bool,

    /// Log file path
    pub log_file: PathBuf,
}

impl Default for ThumbnailSettings {
    fn default() -> Self {
        Self {
            default_size: DEFAULT_THUMBNAIL_SIZE,
            max_size: DEFAULT_MAX_SIZE,
            jpeg_quality: None,
        }
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_CHANNEL_NAME.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_to_file: false,
            log_file: PathBuf::from("shell_thumbnail.log"),
        }
    }
}

impl ThumbnailSettings {
    /// Quality clamped to the range the JPEG encoder accepts
    pub fn effective_quality(&self) -> Option<u8> {
        self.jpeg_quality.map(|q| q.clamp(1, 100))
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_path_buf(), e.to_string()))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;

        Ok(config)
    }

    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./config.toml
    /// 2. ./shell_thumbnail.toml
    /// 3. Standard config location
    ///
    /// If no config file is found, returns default configuration.
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::find_existing_config() {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Get the path where the config file is (or would be) located.
    pub fn get_active_config_path() -> PathBuf {
        Self::find_existing_config().unwrap_or_else(|| {
            get_config_path().unwrap_or_else(|| PathBuf::from("./config.toml"))
        })
    }

    fn find_existing_config() -> Option<PathBuf> {
        let local_paths = [
            PathBuf::from("./config.toml"),
            PathBuf::from("./shell_thumbnail.toml"),
        ];

        local_paths
            .into_iter()
            .chain(get_config_path())
            .find(|path| path.exists())
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        fs::write(path.as_ref(), content)
            .map_err(|e| ConfigError::WriteError(path.as_ref().to_path_buf(), e.to_string()))?;

        Ok(())
    }

    /// Generate a default config file with comments
    pub fn generate_default_config() -> String {
        include_str!("../../config.example.toml").to_string()
    }
}

/// Configuration error types
#[derive(Debug)]
pub enum ConfigError {
    /// Configuration file was not found at the specified path
    FileNotFound(PathBuf),
    /// Failed to read the configuration file
    ReadError(PathBuf, String),
    /// Failed to parse the configuration file (invalid TOML)
    ParseError(PathBuf, String),
    /// Failed to serialize configuration to TOML
    SerializeError(String),
    /// Failed to write configuration file
    WriteError(PathBuf, String),
    /// Could not determine config directory
    ConfigDirNotFound,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            ConfigError::ReadError(path, err) => {
                write!(
                    f,
                    "Failed to read config file '{}': {}",
                    path.display(),
                    err
                )
            }
            ConfigError::ParseError(path, err) => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    err
                )
            }
            ConfigError::SerializeError(err) => {
                write!(f, "Failed to serialize configuration: {}", err)
            }
            ConfigError::WriteError(path, err) => {
                write!(
                    f,
                    "Failed to write config file '{}': {}",
                    path.display(),
                    err
                )
            }
            ConfigError::ConfigDirNotFound => {
                write!(f, "Could not determine configuration directory")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.thumbnail.default_size, 256);
        assert_eq!(config.thumbnail.max_size, 2560);
        assert_eq!(config.thumbnail.jpeg_quality, None);
        assert_eq!(config.channel.name, "com.mymeta/thumbnail");
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.log_to_file);
    }

    #[test]
    fn test_example_config_parses_to_defaults() {
        let config: Config = toml::from_str(&Config::generate_default_config()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [thumbnail]
            jpeg_quality = 90
            "#,
        )
        .unwrap();

        assert_eq!(config.thumbnail.jpeg_quality, Some(90));
        assert_eq!(config.thumbnail.max_size, DEFAULT_MAX_SIZE);
        assert_eq!(config.channel.name, DEFAULT_CHANNEL_NAME);
    }

    #[test]
    fn test_effective_quality_is_clamped() {
        let mut settings = ThumbnailSettings::default();
        assert_eq!(settings.effective_quality(), None);

        settings.jpeg_quality = Some(0);
        assert_eq!(settings.effective_quality(), Some(1));

        settings.jpeg_quality = Some(250);
        assert_eq!(settings.effective_quality(), Some(100));
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.thumbnail.max_size = 1024;
        config.channel.name = "test/thumbnail".to_string();
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[thumbnail\nmax_size = ").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_, _)));
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
