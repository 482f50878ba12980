//! Configuration management for setup-graalvm

pub mod schema;

pub use schema::Config;

use crate::error::{SetupError, SetupResult};
use crate::platform::{Platform, PlatformLayout};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("setup-graalvm")
            .join("config.toml")
    }

    /// Root for per-run scratch directories
    pub fn temp_dir(config: &Config) -> PathBuf {
        if let Some(ref dir) = config.paths.temp_dir {
            return dir.clone();
        }
        match std::env::var_os("RUNNER_TEMP") {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => Self::default_temp_dir(Platform::detect()),
        }
    }

    /// Fallback scratch root when not running on a hosted runner
    pub fn default_temp_dir(platform: Platform) -> PathBuf {
        let base = match platform {
            Platform::Windows => std::env::var_os("USERPROFILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("C:\\")),
            Platform::MacOS => PathBuf::from("/Users"),
            Platform::Linux => PathBuf::from("/home"),
        };
        base.join("actions").join("temp")
    }

    /// Root of the tool cache
    pub fn tool_cache_dir(config: &Config) -> PathBuf {
        if let Some(ref dir) = config.paths.cache_dir {
            return dir.clone();
        }
        match std::env::var_os("RUNNER_TOOL_CACHE") {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("setup-graalvm")
                .join("tool-cache"),
        }
    }

    /// Host layout with the configured overrides applied
    pub fn layout(config: &Config, platform: Platform) -> PlatformLayout {
        PlatformLayout::for_platform(platform).with_overrides(
            config.layout.app_dir.as_deref(),
            config.layout.bin_dir.as_deref(),
        )
    }

    /// Load configuration, using defaults if the file does not exist
    pub async fn load(&self) -> SetupResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> SetupResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| SetupError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| SetupError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Save configuration to file
    pub async fn save(&self, config: &Config) -> SetupResult<()> {
        self.ensure_config_dir().await?;

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            SetupError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Ensure the config directory exists
    async fn ensure_config_dir(&self) -> SetupResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| SetupError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        Ok(())
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
