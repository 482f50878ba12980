//! Environment installation
//!
//! Turns an installation root into a published toolchain: both home
//! variables point at the JDK home and its executable directory is
//! prepended to the search path. On macOS the home is nested inside the
//! bundle (`Contents/Home`); consumers of the variables never see that.

use crate::error::{SetupError, SetupResult};
use crate::platform::{Platform, PlatformLayout};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Destination for exported variables and path entries
pub trait EnvPublisher {
    fn export_variable(&mut self, name: &str, value: &Path) -> SetupResult<()>;

    /// Prepend `dir` to the executable search path
    fn add_path(&mut self, dir: &Path) -> SetupResult<()>;
}

/// Names of the two published home variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvNames {
    pub java_home: String,
    pub graalvm_home: String,
}

impl Default for EnvNames {
    fn default() -> Self {
        Self {
            java_home: "JAVA_HOME".to_string(),
            graalvm_home: "GRAALVM_HOME".to_string(),
        }
    }
}

/// Paths that were published
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledToolchain {
    pub home: PathBuf,
    pub bin_dir: PathBuf,
}

/// Publishes an installation root according to the platform layout
#[derive(Debug, Clone)]
pub struct EnvironmentInstaller {
    layout: PlatformLayout,
    names: EnvNames,
}

impl EnvironmentInstaller {
    pub fn new(layout: PlatformLayout, names: EnvNames) -> Self {
        Self { layout, names }
    }

    /// Publish `root`. On nested layouts `scratch_dir` is removed first.
    pub async fn install(
        &self,
        root: &Path,
        scratch_dir: &Path,
        publisher: &mut dyn EnvPublisher,
    ) -> SetupResult<InstalledToolchain> {
        if self.layout.removes_scratch {
            remove_scratch(scratch_dir).await?;
        }

        let home = self.layout.java_home(root);
        let bin_dir = self.layout.bin_dir(root);

        publisher.export_variable(&self.names.java_home, &home)?;
        publisher.export_variable(&self.names.graalvm_home, &home)?;
        publisher.add_path(&bin_dir)?;

        info!("{} set to {}", self.names.java_home, home.display());
        Ok(InstalledToolchain { home, bin_dir })
    }
}

async fn remove_scratch(dir: &Path) -> SetupResult<()> {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => {
            debug!("Removed scratch directory {}", dir.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(SetupError::io(format!("removing {}", dir.display()), e)),
    }
}

/// Publishes through the GitHub Actions environment files. The current
/// process environment is left untouched.
#[derive(Debug, Clone, Default)]
pub struct ActionsPublisher {
    env_file: Option<PathBuf>,
    path_file: Option<PathBuf>,
}

impl ActionsPublisher {
    pub fn new(env_file: Option<PathBuf>, path_file: Option<PathBuf>) -> Self {
        Self {
            env_file,
            path_file,
        }
    }

    /// Read `GITHUB_ENV` and `GITHUB_PATH`
    pub fn from_env() -> Self {
        Self::new(
            std::env::var_os("GITHUB_ENV").map(PathBuf::from),
            std::env::var_os("GITHUB_PATH").map(PathBuf::from),
        )
    }

    fn append(file: &Path, line: &str, what: &str) -> SetupResult<()> {
        let mut handle = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file)
            .map_err(|e| SetupError::Publish {
                name: what.to_string(),
                reason: format!("{}: {}", file.display(), e),
            })?;
        writeln!(handle, "{}", line).map_err(|e| SetupError::Publish {
            name: what.to_string(),
            reason: format!("{}: {}", file.display(), e),
        })
    }
}

impl EnvPublisher for ActionsPublisher {
    fn export_variable(&mut self, name: &str, value: &Path) -> SetupResult<()> {
        let value_str = value.to_string_lossy();
        match &self.env_file {
            Some(file) => Self::append(file, &format!("{}={}", name, value_str), name)?,
            None => warn!("GITHUB_ENV is not set, {} is not published", name),
        }
        Ok(())
    }

    fn add_path(&mut self, dir: &Path) -> SetupResult<()> {
        match &self.path_file {
            Some(file) => Self::append(file, &dir.to_string_lossy(), "PATH")?,
            None => warn!("GITHUB_PATH is not set, {} is not published", dir.display()),
        }
        Ok(())
    }
}

/// Prints shell statements suitable for `eval`
pub struct ShellPublisher<W: Write> {
    out: W,
    platform: Platform,
}

impl<W: Write> ShellPublisher<W> {
    pub fn new(out: W, platform: Platform) -> Self {
        Self { out, platform }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, line: String) -> SetupResult<()> {
        writeln!(self.out, "{}", line).map_err(|e| SetupError::io("writing shell output", e))
    }
}

impl<W: Write> EnvPublisher for ShellPublisher<W> {
    fn export_variable(&mut self, name: &str, value: &Path) -> SetupResult<()> {
        let value = value.to_string_lossy();
        let line = match self.platform {
            Platform::Windows => format!("$env:{} = {}", name, powershell_quote(&value)),
            _ => format!("export {}={}", name, posix_quote(&value)),
        };
        self.emit(line)
    }

    fn add_path(&mut self, dir: &Path) -> SetupResult<()> {
        let dir = dir.to_string_lossy();
        let line = match self.platform {
            Platform::Windows => {
                format!("$env:Path = {} + $env:Path", powershell_quote(&format!("{};", dir)))
            }
            _ => format!("export PATH={}:\"$PATH\"", posix_quote(&dir)),
        };
        self.emit(line)
    }
}

/// Single-quote for POSIX shells; nothing inside is expanded
fn posix_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}

/// Single-quote for PowerShell, where `'` is escaped by doubling
fn powershell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
