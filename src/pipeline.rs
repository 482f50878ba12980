//! Acquisition pipeline
//!
//! Resolve → cache lookup → (download → extract → register) → installation
//! root. Repeated runs with the same version tuple short-circuit on the
//! cache; distinct tuples never share an entry because the canonical
//! version is the cache key.

use crate::archive;
use crate::cache::CacheStore;
use crate::download::Downloader;
use crate::error::{SetupError, SetupResult};
use crate::platform::{Arch, PlatformLayout};
use crate::resolve::{self, Resolved, ToolIdentity, DEFAULT_BASE_URL};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Source of the random suffix that scopes each run's scratch directory
pub trait SuffixSource: Send + Sync {
    fn next_suffix(&self) -> String;
}

/// Random UUID suffixes
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidSuffix;

impl SuffixSource for UuidSuffix {
    fn next_suffix(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}

/// Values the pipeline needs from configuration
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Root under which per-run scratch directories are created
    pub temp_dir: PathBuf,
    /// Release download base URL
    pub base_url: String,
    pub layout: PlatformLayout,
    pub arch: Arch,
}

impl PipelineOptions {
    /// Options for the host with default base URL
    pub fn new(temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            temp_dir: temp_dir.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            layout: PlatformLayout::detect(),
            arch: Arch::detect(),
        }
    }
}

/// Outcome of one acquisition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acquisition {
    pub identity: ToolIdentity,
    pub url: String,
    /// Cached installation root
    pub root: PathBuf,
    /// This run's scratch directory (may not exist on a cache hit)
    pub scratch_dir: PathBuf,
    pub from_cache: bool,
}

/// Orchestrates resolution, caching, download and extraction
pub struct Pipeline {
    options: PipelineOptions,
    store: Arc<dyn CacheStore>,
    downloader: Arc<dyn Downloader>,
    suffix: Box<dyn SuffixSource>,
}

impl Pipeline {
    pub fn new(
        options: PipelineOptions,
        store: Arc<dyn CacheStore>,
        downloader: Arc<dyn Downloader>,
    ) -> Self {
        Self {
            options,
            store,
            downloader,
            suffix: Box::new(UuidSuffix),
        }
    }

    /// Replace the scratch-directory suffix source
    pub fn with_suffix_source(mut self, suffix: impl SuffixSource + 'static) -> Self {
        self.suffix = Box::new(suffix);
        self
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Resolve the identity and URL for a version request
    pub fn resolve(&self, java_version: &str, graalvm_version: &str) -> Resolved {
        resolve::resolve(
            java_version,
            graalvm_version,
            &self.options.layout,
            self.options.arch,
            &self.options.base_url,
        )
    }

    /// Make the requested distribution available and return its root
    pub async fn acquire(
        &self,
        java_version: &str,
        graalvm_version: &str,
    ) -> SetupResult<Acquisition> {
        let Resolved { identity, url } = self.resolve(java_version, graalvm_version);
        let scratch_dir = self
            .options
            .temp_dir
            .join(format!("temp_{}", self.suffix.next_suffix()));

        if let Some(root) = self.store.lookup(&identity).await {
            debug!("{} found in cache {}", identity.tool_name(), root.display());
            return Ok(Acquisition {
                identity,
                url,
                root,
                scratch_dir,
                from_cache: true,
            });
        }

        info!("Downloading {} from {}", identity.tool_name(), url);

        let download_dir = scratch_dir.join("download");
        tokio::fs::create_dir_all(&download_dir).await.map_err(|e| {
            SetupError::io(format!("creating directory {}", download_dir.display()), e)
        })?;

        let extension = self.options.layout.archive_extension();
        let archive_path = download_dir.join(format!(
            "graalvm-ce-{}{}",
            identity.canonical_version(),
            extension
        ));
        self.downloader.download(&url, &archive_path).await?;

        let extract_dir = scratch_dir.join("extract");
        let extracted = {
            let archive_path = archive_path.clone();
            let extract_dir = extract_dir.clone();
            tokio::task::spawn_blocking(move || unpack_distribution(&archive_path, extension, &extract_dir))
                .await
                .map_err(|e| SetupError::Internal(format!("extraction task failed: {}", e)))??
        };
        debug!("{} extracted to {}", identity.tool_name(), extracted.display());

        let root = self.store.register(&extracted, &identity).await?;
        info!("Cached {} at {}", identity, root.display());

        Ok(Acquisition {
            identity,
            url,
            root,
            scratch_dir,
            from_cache: false,
        })
    }
}

/// Extract `archive` into `dest` and return its single top-level entry.
/// The format is taken from `extension` (e.g. `.tar.gz`).
pub fn unpack_distribution(archive: &Path, extension: &str, dest: &Path) -> SetupResult<PathBuf> {
    archive::extract_as(archive, extension, dest)?;

    let mut entries = archive::top_level_entries(dest)?;
    match entries.len() {
        0 => Err(SetupError::EmptyExtraction(dest.to_path_buf())),
        1 => Ok(entries.remove(0)),
        _ => Err(SetupError::AmbiguousLayout {
            dir: dest.to_path_buf(),
            entries: entries
                .iter()
                .filter_map(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .collect(),
        }),
    }
}
