//! Filesystem-backed tool cache

use crate::cache::entry::{dir_size, CacheEntry, CacheMarker, CacheState};
use crate::cache::CacheStore;
use crate::error::{SetupError, SetupResult};
use crate::platform::Arch;
use crate::resolve::ToolIdentity;
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;
use walkdir::WalkDir;

/// Tool cache rooted at a directory shared by all runs on the host
#[derive(Debug, Clone)]
pub struct ToolCache {
    root: PathBuf,
    arch: Arch,
}

impl ToolCache {
    pub fn new(root: impl Into<PathBuf>, arch: Arch) -> Self {
        Self {
            root: root.into(),
            arch,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory an entry lives in, whether or not it exists
    pub fn entry_path(&self, identity: &ToolIdentity) -> PathBuf {
        self.root
            .join(identity.tool_name())
            .join(identity.canonical_version())
            .join(self.arch.name())
    }

    fn is_complete(entry_dir: &Path) -> bool {
        CacheMarker::path_for(entry_dir).is_file() && entry_dir.is_dir()
    }

    /// Blocking registration, run on the blocking pool
    fn register_blocking(&self, source: &Path, identity: &ToolIdentity) -> SetupResult<PathBuf> {
        let dest = self.entry_path(identity);

        if Self::is_complete(&dest) {
            debug!("{} already cached at {}", identity, dest.display());
            return Ok(dest);
        }

        if !source.is_dir() {
            return Err(SetupError::cache_register(source, "source is not a directory"));
        }

        let parent = dest
            .parent()
            .ok_or_else(|| SetupError::Internal(format!("cache path {} has no parent", dest.display())))?;
        fs::create_dir_all(parent).map_err(|e| SetupError::cache_register(parent, e))?;

        let staging = parent.join(format!(".{}-{}", self.arch.name(), Uuid::new_v4().simple()));
        debug!("Copying {} to {}", source.display(), staging.display());
        if let Err(e) = copy_tree(source, &staging) {
            let _ = fs::remove_dir_all(&staging);
            return Err(e);
        }

        // Another run may have finished the same key while we copied
        if Self::is_complete(&dest) {
            debug!("{} registered concurrently, discarding copy", identity);
            let _ = fs::remove_dir_all(&staging);
            return Ok(dest);
        }

        if dest.exists() {
            warn!("Replacing incomplete cache entry {}", dest.display());
            retire(&dest, parent)?;
        }

        if let Err(e) = fs::rename(&staging, &dest) {
            let _ = fs::remove_dir_all(&staging);
            if Self::is_complete(&dest) || dest.is_dir() {
                debug!("{} moved into place concurrently", identity);
            } else {
                return Err(SetupError::cache_register(&dest, e));
            }
        }

        let marker = CacheMarker::new(
            identity.tool_name(),
            identity.canonical_version(),
            self.arch.name(),
        );
        let json = serde_json::to_string_pretty(&marker)?;
        let marker_path = CacheMarker::path_for(&dest);
        fs::write(&marker_path, json).map_err(|e| SetupError::cache_register(&marker_path, e))?;

        Ok(dest)
    }

    /// All entries below the root, complete or not
    pub fn entries(&self) -> SetupResult<Vec<CacheEntry>> {
        let mut entries = Vec::new();
        if !self.root.is_dir() {
            return Ok(entries);
        }

        for tool in read_dirs(&self.root)? {
            for version in read_dirs(&tool)? {
                for arch in read_dirs(&version)? {
                    let arch_name = file_name(&arch);
                    if arch_name.starts_with('.') {
                        continue;
                    }

                    let marker = fs::read_to_string(CacheMarker::path_for(&arch))
                        .ok()
                        .and_then(|s| serde_json::from_str::<CacheMarker>(&s).ok());

                    entries.push(CacheEntry {
                        tool: file_name(&tool),
                        version: file_name(&version),
                        arch: arch_name,
                        state: if marker.is_some() {
                            CacheState::Complete
                        } else {
                            CacheState::Partial
                        },
                        created_at: marker.map(|m| m.created_at),
                        path: arch,
                    });
                }
            }
        }

        entries.sort_by(|a, b| (&a.tool, &a.version).cmp(&(&b.tool, &b.version)));
        Ok(entries)
    }

    /// Remove the whole cache, returning the number of bytes freed
    pub fn clear(&self) -> SetupResult<u64> {
        if !self.root.exists() {
            return Ok(0);
        }
        let size = dir_size(&self.root);
        fs::remove_dir_all(&self.root)
            .map_err(|e| SetupError::io(format!("removing {}", self.root.display()), e))?;
        Ok(size)
    }
}

#[async_trait]
impl CacheStore for ToolCache {
    async fn lookup(&self, identity: &ToolIdentity) -> Option<PathBuf> {
        let dest = self.entry_path(identity);
        let marker = CacheMarker::path_for(&dest);

        let marker_ok = tokio::fs::metadata(&marker)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        let dir_ok = tokio::fs::metadata(&dest)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);

        (marker_ok && dir_ok).then_some(dest)
    }

    async fn register(&self, source: &Path, identity: &ToolIdentity) -> SetupResult<PathBuf> {
        let cache = self.clone();
        let source = source.to_path_buf();
        let identity = identity.clone();

        tokio::task::spawn_blocking(move || cache.register_blocking(&source, &identity))
            .await
            .map_err(|e| SetupError::Internal(format!("cache registration task failed: {}", e)))?
    }
}

/// Move an unmarked entry out of the way before deleting it, so a racing
/// run never observes a half-removed tree at the entry path
fn retire(dest: &Path, parent: &Path) -> SetupResult<()> {
    let aside = parent.join(format!(".stale-{}", Uuid::new_v4().simple()));
    match fs::rename(dest, &aside) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(SetupError::cache_register(dest, e)),
    }

    match fs::remove_dir_all(&aside) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => {
            warn!("Could not remove {}: {}", aside.display(), e);
            Ok(())
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn read_dirs(dir: &Path) -> SetupResult<Vec<PathBuf>> {
    let read = fs::read_dir(dir)
        .map_err(|e| SetupError::io(format!("reading directory {}", dir.display()), e))?;

    let mut dirs = Vec::new();
    for entry in read.filter_map(|e| e.ok()) {
        let path = entry.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Recursively copy `source` to `dest`, recreating symlinks on unix
fn copy_tree(source: &Path, dest: &Path) -> SetupResult<()> {
    for entry in WalkDir::new(source).follow_links(false) {
        let entry = entry.map_err(|e| SetupError::cache_register(source, e))?;
        let rel = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| SetupError::Internal(e.to_string()))?;
        let target = dest.join(rel);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target).map_err(|e| SetupError::cache_register(&target, e))?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| SetupError::cache_register(&target, e))?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(link: &Path, target: &Path) -> SetupResult<()> {
    let points_to = fs::read_link(link).map_err(|e| SetupError::cache_register(link, e))?;
    std::os::unix::fs::symlink(&points_to, target).map_err(|e| SetupError::cache_register(target, e))
}

#[cfg(not(unix))]
fn copy_symlink(link: &Path, target: &Path) -> SetupResult<()> {
    if link.is_dir() {
        copy_tree(link, target)
    } else {
        fs::copy(link, target)
            .map(|_| ())
            .map_err(|e| SetupError::cache_register(target, e))
    }
}
