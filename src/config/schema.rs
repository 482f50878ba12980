//! Configuration schema for setup-graalvm
//!
//! Configuration is stored at `~/.config/setup-graalvm/config.toml`

use crate::install::EnvNames;
use crate::resolve::DEFAULT_BASE_URL;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Scratch and cache locations
    pub paths: PathsConfig,

    /// Installation layout overrides
    pub layout: LayoutConfig,

    /// Published variable names
    pub env: EnvConfig,

    /// Download settings
    pub download: DownloadConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable verbose logging
    pub verbose: bool,

    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            log_format: "text".to_string(),
        }
    }
}

/// Filesystem locations. Unset values fall back to the runner's
/// `RUNNER_TEMP` / `RUNNER_TOOL_CACHE` or a per-user default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root for per-run scratch directories
    pub temp_dir: Option<PathBuf>,

    /// Root of the tool cache
    pub cache_dir: Option<PathBuf>,
}

/// Layout overrides. Unset values use the platform defaults
/// (`Contents/Home` on macOS, `bin` everywhere).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// JDK home below the installation root (nested layouts only)
    pub app_dir: Option<String>,

    /// Executable directory below the JDK home
    pub bin_dir: Option<String>,
}

/// Names of the published variables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    pub java_home: String,
    pub graalvm_home: String,
}

impl Default for EnvConfig {
    fn default() -> Self {
        let names = EnvNames::default();
        Self {
            java_home: names.java_home,
            graalvm_home: names.graalvm_home,
        }
    }
}

impl EnvConfig {
    pub fn names(&self) -> EnvNames {
        EnvNames {
            java_home: self.java_home.clone(),
            graalvm_home: self.graalvm_home.clone(),
        }
    }
}

/// Download settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Release download base URL
    pub base_url: String,

    /// Request timeout in seconds (0 = wait indefinitely)
    pub timeout_secs: u64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 0,
        }
    }
}

impl DownloadConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}
