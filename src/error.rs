//! Error types for setup-graalvm
//!
//! All modules use `SetupResult<T>` as their return type.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for setup-graalvm operations
pub type SetupResult<T> = Result<T, SetupError>;

/// Failure category, for callers that branch on what went wrong
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Resolution,
    Download,
    Extraction,
    Layout,
    Cache,
    Environment,
    Config,
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Resolution => "resolution",
            Self::Download => "download",
            Self::Extraction => "extraction",
            Self::Layout => "layout",
            Self::Cache => "cache",
            Self::Environment => "environment",
            Self::Config => "config",
            Self::Io => "io",
        };
        write!(f, "{}", name)
    }
}

/// All errors that can occur while provisioning a toolchain
#[derive(Error, Debug)]
pub enum SetupError {
    // Resolution errors
    #[error("Cannot resolve version: {0}")]
    Resolution(String),

    // Download errors
    #[error("Download of {url} failed: {reason}")]
    Download { url: String, reason: String },

    #[error("Download of {url} failed with HTTP status {status}")]
    DownloadStatus { url: String, status: u16 },

    // Extraction errors
    #[error("{0} does not exist")]
    ArchiveNotFound(PathBuf),

    #[error("Failed to extract {0} which is not a file")]
    ArchiveNotFile(PathBuf),

    #[error("Failed to extract {path} which is in an unrecognized compression format ({extension})")]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error("Failed to extract {path}: {reason}")]
    Extraction { path: PathBuf, reason: String },

    // Layout errors
    #[error("Extraction into {0} produced no entries")]
    EmptyExtraction(PathBuf),

    #[error("Extraction into {dir} produced {} top-level entries, expected exactly one", entries.len())]
    AmbiguousLayout { dir: PathBuf, entries: Vec<String> },

    // Cache errors
    #[error("Failed to register {path} in the tool cache: {reason}")]
    CacheRegister { path: PathBuf, reason: String },

    // Environment errors
    #[error("Failed to publish {name}: {reason}")]
    Publish { name: String, reason: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command execution error: {command}, stderr: {stderr}")]
    CommandExecution { command: String, stderr: String },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl SetupError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create a command execution error
    pub fn command_exec(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::CommandExecution {
            command: command.into(),
            stderr: stderr.into(),
        }
    }

    /// Create an extraction error
    pub fn extraction(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Extraction {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a cache registration error
    pub fn cache_register(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::CacheRegister {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Failure category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Resolution(_) => ErrorKind::Resolution,
            Self::Download { .. } | Self::DownloadStatus { .. } => ErrorKind::Download,
            Self::ArchiveNotFound(_)
            | Self::ArchiveNotFile(_)
            | Self::UnsupportedFormat { .. }
            | Self::Extraction { .. } => ErrorKind::Extraction,
            Self::EmptyExtraction(_) | Self::AmbiguousLayout { .. } => ErrorKind::Layout,
            Self::CacheRegister { .. } => ErrorKind::Cache,
            Self::Publish { .. } | Self::CommandFailed { .. } | Self::CommandExecution { .. } => {
                ErrorKind::Environment
            }
            Self::ConfigInvalid { .. }
            | Self::ConfigDirCreate { .. }
            | Self::TomlParse(_)
            | Self::TomlSerialize(_)
            | Self::User(_) => ErrorKind::Config,
            Self::Io { .. } | Self::Json(_) | Self::Internal(_) => ErrorKind::Io,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::DownloadStatus { status: 404, .. } => {
                Some("Check that the java-version and graalvm-version combination was published")
            }
            Self::CommandFailed { .. } => {
                Some("The GraalVM updater (gu) ships with GraalVM releases before 23.0")
            }
            Self::CacheRegister { .. } => Some("Check free disk space in the tool cache directory"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = SetupError::ArchiveNotFound(PathBuf::from("/tmp/graalvm.tar.gz"));
        assert_eq!(err.to_string(), "/tmp/graalvm.tar.gz does not exist");
    }

    #[test]
    fn error_kind() {
        let err = SetupError::UnsupportedFormat {
            path: PathBuf::from("a.rar"),
            extension: ".rar".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Extraction);

        let err = SetupError::AmbiguousLayout {
            dir: PathBuf::from("/tmp/x"),
            entries: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(err.kind(), ErrorKind::Layout);
        assert!(err.to_string().contains("2 top-level entries"));
    }

    #[test]
    fn error_hint() {
        let err = SetupError::DownloadStatus {
            url: "https://example.com".to_string(),
            status: 404,
        };
        assert!(err.hint().is_some());
        assert_eq!(err.kind(), ErrorKind::Download);

        let err = SetupError::DownloadStatus {
            url: "https://example.com".to_string(),
            status: 500,
        };
        assert!(err.hint().is_none());
    }
}
