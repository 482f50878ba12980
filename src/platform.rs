//! Host platform detection and the per-platform layout table
//!
//! Every platform-specific value (distribution names, archive format,
//! nested home directory, executable directory) lives in [`PlatformLayout`]
//! so the rest of the crate never branches on the OS itself.

use crate::archive::CompressionKind;
use std::fmt;
use std::path::{Path, PathBuf};

/// Host operating system, as GraalVM names its release assets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Linux,
    /// macOS ships the JDK inside a `.app`-style bundle
    MacOS,
    Windows,
}

impl Platform {
    /// Detect the current platform; anything unknown is treated as Linux
    pub fn detect() -> Self {
        match std::env::consts::OS {
            "macos" => Platform::MacOS,
            "windows" => Platform::Windows,
            _ => Platform::Linux,
        }
    }

    /// Parse a platform name given on the command line
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "linux" => Some(Platform::Linux),
            "darwin" | "macos" | "mac" => Some(Platform::MacOS),
            "windows" | "win32" => Some(Platform::Windows),
            _ => None,
        }
    }

    /// Name used inside GraalVM release asset names
    pub fn name(&self) -> &'static str {
        match self {
            Platform::Linux => "linux",
            Platform::MacOS => "darwin",
            Platform::Windows => "windows",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Host architecture, normalized to the two names GraalVM publishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    Amd64,
    Aarch64,
}

impl Arch {
    /// Detect the current architecture
    pub fn detect() -> Self {
        Self::from_name(std::env::consts::ARCH)
    }

    /// Map a host architecture name. 64-bit ARM becomes `aarch64`, every
    /// other name falls back to `amd64`.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "aarch64" | "arm64" => Arch::Aarch64,
            _ => Arch::Amd64,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Arch::Amd64 => "amd64",
            Arch::Aarch64 => "aarch64",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Platform-specific installation layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformLayout {
    /// Platform this layout describes
    pub platform: Platform,
    /// Archive format GraalVM publishes for this platform
    pub archive: CompressionKind,
    /// Path from the installation root to the JDK home (empty when flat)
    pub home_subpath: PathBuf,
    /// Path from the JDK home to the executables
    pub bin_subpath: PathBuf,
    /// Whether the scratch directory is removed before publishing
    pub removes_scratch: bool,
}

impl PlatformLayout {
    /// Default layout for a platform
    pub fn for_platform(platform: Platform) -> Self {
        match platform {
            Platform::MacOS => Self {
                platform,
                archive: CompressionKind::TarGz,
                home_subpath: PathBuf::from("Contents").join("Home"),
                bin_subpath: PathBuf::from("bin"),
                removes_scratch: true,
            },
            Platform::Windows => Self {
                platform,
                archive: CompressionKind::Zip,
                home_subpath: PathBuf::new(),
                bin_subpath: PathBuf::from("bin"),
                removes_scratch: false,
            },
            Platform::Linux => Self {
                platform,
                archive: CompressionKind::TarGz,
                home_subpath: PathBuf::new(),
                bin_subpath: PathBuf::from("bin"),
                removes_scratch: false,
            },
        }
    }

    /// Layout for the host
    pub fn detect() -> Self {
        Self::for_platform(Platform::detect())
    }

    /// Apply configured overrides. The home override only affects
    /// platforms with a nested bundle layout.
    pub fn with_overrides(mut self, app_dir: Option<&str>, bin_dir: Option<&str>) -> Self {
        if let Some(app_dir) = app_dir {
            if self.is_nested() {
                self.home_subpath = relative(app_dir);
            }
        }
        if let Some(bin_dir) = bin_dir {
            self.bin_subpath = relative(bin_dir);
        }
        self
    }

    /// Whether the JDK home sits below the installation root
    pub fn is_nested(&self) -> bool {
        !self.home_subpath.as_os_str().is_empty()
    }

    /// File extension of the published archive
    pub fn archive_extension(&self) -> &'static str {
        self.archive.extension()
    }

    /// JDK home for an installation root
    pub fn java_home(&self, installation_root: &Path) -> PathBuf {
        if self.is_nested() {
            installation_root.join(&self.home_subpath)
        } else {
            installation_root.to_path_buf()
        }
    }

    /// Executable directory for an installation root
    pub fn bin_dir(&self, installation_root: &Path) -> PathBuf {
        self.java_home(installation_root).join(&self.bin_subpath)
    }

    /// File name of the GraalVM updater on this platform
    pub fn updater_executable(&self) -> &'static str {
        match self.platform {
            Platform::Windows => "gu.cmd",
            _ => "gu",
        }
    }
}

/// Strip leading separators so configured values like `/Contents/Home`
/// join below the root instead of replacing it
fn relative(value: &str) -> PathBuf {
    PathBuf::from(value.trim_start_matches(['/', '\\']))
}
