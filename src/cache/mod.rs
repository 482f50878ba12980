//! Persistent tool cache
//!
//! Extracted distributions are stored once per (tool, canonical version)
//! and reused by every later run on the same host.
//!
//! # Layout
//!
//! ```text
//! <root>/<tool>/<canonical-version>/<arch>/            extracted tree
//! <root>/<tool>/<canonical-version>/<arch>.complete    marker (JSON)
//! ```
//!
//! A lookup only hits when the marker exists. Registration copies into a
//! staging directory, renames it into place and writes the marker last, so
//! a crashed or racing registration never surfaces a half-written tree.

pub mod entry;
pub mod store;

pub use entry::{format_bytes, CacheEntry, CacheMarker, CacheState};
pub use store::ToolCache;

use crate::error::SetupResult;
use crate::resolve::ToolIdentity;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Lookup and registration of extracted toolchains
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Path of a completed entry for `identity`, if any
    async fn lookup(&self, identity: &ToolIdentity) -> Option<PathBuf>;

    /// Copy `source` into the cache under `identity` and return the cached
    /// path. Registering a key that is already complete returns the
    /// existing entry.
    async fn register(&self, source: &Path, identity: &ToolIdentity) -> SetupResult<PathBuf>;
}
