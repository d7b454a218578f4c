use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Failed to read config: {0}")]
    ReadError(String),

    #[error("Failed to parse config: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

impl From<ConfigError> for crate::ProfileBitError {
    fn from(err: ConfigError) -> Self {
        crate::ProfileBitError::Config(err.to_string())
    }
}

/// Main configuration for ProfileBit
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProfileBitConfig {
    /// Result cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Result cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Key prefix shared by every cached progress entry
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Disable to compute progress on every request
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Drop the viewer's cached entry before each render
    #[serde(default = "default_true")]
    pub always_invalidate_on_render: bool,

    /// JSON file backing the cache; in-memory when unset
    #[serde(default)]
    pub store_path: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            enabled: true,
            always_invalidate_on_render: true,
            store_path: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: "pretty", "json", "compact"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Default value functions
fn default_namespace() -> String {
    "elementorbbprofilecompletion".to_string()
}
fn default_true() -> bool {
    true
}
fn default_log_level() -> String {
    "warn".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}

fn env_flag(value: &str) -> bool {
    value.to_lowercase() == "true" || value == "1"
}

/// Configuration manager with layered sources
pub struct ConfigManager {
    config: ProfileBitConfig,
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Load configuration with the following precedence:
    /// 1. Environment variables (.env file)
    /// 2. Config file (.profilebit.toml)
    /// 3. Sensible defaults
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_dotenv();
        let (config, config_path) = Self::load_config_file()?;
        Self::finish(config, config_path)
    }

    /// Load a specific config file, still honouring environment overrides.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        Self::load_dotenv();
        let config = Self::read_toml_file(path)?;
        Self::finish(config, Some(path.to_path_buf()))
    }

    fn finish(config: ProfileBitConfig, config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let config = Self::apply_env_overrides(config);
        Self::validate_config(&config)?;

        match config_path {
            Some(ref path) => info!("Config file: {}", path.display()),
            None => info!("Config file: NONE (using defaults)"),
        }
        info!(
            namespace = %config.cache.namespace,
            enabled = config.cache.enabled,
            always_invalidate_on_render = config.cache.always_invalidate_on_render,
            "Progress cache configured"
        );

        Ok(Self {
            config,
            config_path,
        })
    }

    /// Load .env file if it exists
    fn load_dotenv() {
        if Path::new(".env").exists() {
            if let Err(e) = dotenv::from_filename(".env") {
                warn!("Failed to load .env file: {}", e);
            }
            return;
        }

        if let Some(home) = dirs::home_dir() {
            let home_env = home.join(".profilebit.env");
            if home_env.exists() {
                if let Err(e) = dotenv::from_path(&home_env) {
                    warn!("Failed to load .profilebit.env: {}", e);
                }
            }
        }
    }

    /// Find and load config file
    /// Search order:
    /// 1. ./.profilebit.toml (current directory)
    /// 2. ~/.profilebit/config.toml (user config)
    /// 3. Use defaults
    fn load_config_file() -> Result<(ProfileBitConfig, Option<PathBuf>), ConfigError> {
        let local_config = Path::new(".profilebit.toml");
        if local_config.exists() {
            let config = Self::read_toml_file(local_config)?;
            return Ok((config, Some(local_config.to_path_buf())));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".profilebit").join("config.toml");
            if user_config.exists() {
                let config = Self::read_toml_file(&user_config)?;
                return Ok((config, Some(user_config)));
            }
        }

        Ok((ProfileBitConfig::default(), None))
    }

    fn read_toml_file(path: &Path) -> Result<ProfileBitConfig, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    fn apply_env_overrides(mut config: ProfileBitConfig) -> ProfileBitConfig {
        if let Ok(namespace) = std::env::var("PROFILEBIT_CACHE_NAMESPACE") {
            config.cache.namespace = namespace;
        }
        if let Ok(enabled) = std::env::var("PROFILEBIT_CACHE_ENABLED") {
            config.cache.enabled = env_flag(&enabled);
        }
        if let Ok(always) = std::env::var("PROFILEBIT_ALWAYS_INVALIDATE_ON_RENDER") {
            config.cache.always_invalidate_on_render = env_flag(&always);
        }
        if let Ok(path) = std::env::var("PROFILEBIT_CACHE_STORE") {
            config.cache.store_path = Some(PathBuf::from(path));
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.logging.level = level;
        }
        if let Ok(format) = std::env::var("PROFILEBIT_LOG_FORMAT") {
            config.logging.format = format;
        }

        config
    }

    fn validate_config(config: &ProfileBitConfig) -> Result<(), ConfigError> {
        if config.cache.namespace.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Cache namespace must not be empty".to_string(),
            ));
        }
        if config.cache.namespace.ends_with(|c: char| c.is_ascii_digit()) {
            return Err(ConfigError::ValidationError(format!(
                "Cache namespace must not end with a digit: {}",
                config.cache.namespace
            )));
        }

        match config.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" | "off" => {}
            other if other.contains('=') => {} // full EnvFilter directive
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    other
                )))
            }
        }

        match config.logging.format.as_str() {
            "pretty" | "json" | "compact" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log format: {}. Must be one of: pretty, json, compact",
                    other
                )))
            }
        }

        Ok(())
    }

    pub fn config(&self) -> &ProfileBitConfig {
        &self.config
    }

    pub fn into_config(self) -> ProfileBitConfig {
        self.config
    }

    /// Get the path to the config file that was loaded, if any
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Create a default config file
    pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        let config = ProfileBitConfig::default();
        let toml_str =
            toml::to_string_pretty(&config).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ConfigError::ReadError(e.to_string()))?;
            }
        }

        std::fs::write(path, toml_str).map_err(|e| ConfigError::ReadError(e.to_string()))?;

        Ok(())
    }
}
