//! Cache entry records
//!
//! An entry is complete only once its marker file has been written, which
//! happens after the extracted tree has been moved into place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Suffix of the marker written next to a completed entry
pub const MARKER_SUFFIX: &str = ".complete";

/// Format bytes as human-readable size (e.g., "1.5 GB")
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Total size of regular files below `path`
pub fn dir_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}

/// State of a cache entry on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheState {
    /// Directory exists without a marker (interrupted copy)
    Partial,
    /// Marker written, safe to use
    Complete,
}

impl fmt::Display for CacheState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Partial => write!(f, "partial"),
            Self::Complete => write!(f, "complete"),
        }
    }
}

/// Contents of the completion marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheMarker {
    pub tool: String,
    pub version: String,
    pub arch: String,
    pub created_at: DateTime<Utc>,
}

impl CacheMarker {
    pub fn new(tool: &str, version: &str, arch: &str) -> Self {
        Self {
            tool: tool.to_string(),
            version: version.to_string(),
            arch: arch.to_string(),
            created_at: Utc::now(),
        }
    }

    /// Marker path for an entry directory: `<version>/<arch>.complete`
    pub fn path_for(entry_dir: &Path) -> PathBuf {
        let mut name = entry_dir
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(MARKER_SUFFIX);
        entry_dir.with_file_name(name)
    }
}

/// A cached installation found on disk
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub tool: String,
    pub version: String,
    pub arch: String,
    pub path: PathBuf,
    pub state: CacheState,
    /// From the marker, if complete
    pub created_at: Option<DateTime<Utc>>,
}

impl CacheEntry {
    /// Size of the entry on disk
    pub fn size_bytes(&self) -> u64 {
        dir_size(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn format_bytes_units() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024 / 2), "1.5 GB");
    }

    #[test]
    fn marker_is_sibling_of_entry() {
        let path = CacheMarker::path_for(Path::new("/cache/GraalVM/java17-linux-amd64-22.3.0/amd64"));
        assert_eq!(
            path,
            Path::new("/cache/GraalVM/java17-linux-amd64-22.3.0/amd64.complete")
        );
    }

    #[test]
    fn marker_serializes() {
        let marker = CacheMarker::new("GraalVM", "java17-linux-amd64-22.3.0", "amd64");
        let json = serde_json::to_string(&marker).unwrap();
        let back: CacheMarker = serde_json::from_str(&json).unwrap();
        assert_eq!(marker, back);
    }

    #[test]
    fn dir_size_counts_files() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("bin")).unwrap();
        std::fs::write(dir.path().join("bin/java"), b"12345").unwrap();
        std::fs::write(dir.path().join("release"), b"123").unwrap();
        assert_eq!(dir_size(dir.path()), 8);
    }
}
