//! Version-to-URL resolution
//!
//! Pure mapping from the requested versions and the host to the canonical
//! version identifier (also the cache key) and the release download URL.
//! Nothing is validated here; a malformed version produces a URL that
//! fails at download time.

use crate::platform::{Arch, PlatformLayout};
use std::fmt;

/// Name under which distributions are cached
pub const TOOL_NAME: &str = "GraalVM";

/// Release download base for GraalVM Community Edition builds
pub const DEFAULT_BASE_URL: &str = "https://github.com/graalvm/graalvm-ce-builds/releases/download";

/// Identity of one cached distribution
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ToolIdentity {
    tool_name: String,
    canonical_version: String,
}

impl ToolIdentity {
    pub fn new(tool_name: impl Into<String>, canonical_version: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            canonical_version: canonical_version.into(),
        }
    }

    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }

    pub fn canonical_version(&self) -> &str {
        &self.canonical_version
    }
}

impl fmt::Display for ToolIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.tool_name, self.canonical_version)
    }
}

/// Result of resolving a version request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub identity: ToolIdentity,
    pub url: String,
}

/// Build the canonical version, e.g. `java17-linux-amd64-22.3.0`
pub fn canonical_version(
    java_version: &str,
    graalvm_version: &str,
    layout: &PlatformLayout,
    arch: Arch,
) -> String {
    format!(
        "java{}-{}-{}-{}",
        java_version,
        layout.platform.name(),
        arch.name(),
        graalvm_version
    )
}

/// Resolve identity and download URL against `base_url`
pub fn resolve(
    java_version: &str,
    graalvm_version: &str,
    layout: &PlatformLayout,
    arch: Arch,
    base_url: &str,
) -> Resolved {
    let version = canonical_version(java_version, graalvm_version, layout, arch);
    let url = format!(
        "{}/vm-{}/graalvm-ce-{}{}",
        base_url.trim_end_matches('/'),
        graalvm_version,
        version,
        layout.archive_extension()
    );

    Resolved {
        identity: ToolIdentity::new(TOOL_NAME, version),
        url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Platform;

    fn linux() -> PlatformLayout {
        PlatformLayout::for_platform(Platform::Linux)
    }

    #[test]
    fn canonical_version_template() {
        let version = canonical_version("11", "20.1.0", &linux(), Arch::Amd64);
        assert_eq!(version, "java11-linux-amd64-20.1.0");
    }

    #[test]
    fn resolve_linux_url() {
        let resolved = resolve("17", "22.3.0", &linux(), Arch::Aarch64, DEFAULT_BASE_URL);
        assert_eq!(resolved.identity.tool_name(), "GraalVM");
        assert_eq!(
            resolved.identity.canonical_version(),
            "java17-linux-aarch64-22.3.0"
        );
        assert_eq!(
            resolved.url,
            "https://github.com/graalvm/graalvm-ce-builds/releases/download/vm-22.3.0/graalvm-ce-java17-linux-aarch64-22.3.0.tar.gz"
        );
    }

    #[test]
    fn resolve_windows_uses_zip() {
        let layout = PlatformLayout::for_platform(Platform::Windows);
        let resolved = resolve("11", "21.0.0", &layout, Arch::Amd64, DEFAULT_BASE_URL);
        assert!(resolved.url.ends_with("graalvm-ce-java11-windows-amd64-21.0.0.zip"));
    }

    #[test]
    fn resolve_macos_name() {
        let layout = PlatformLayout::for_platform(Platform::MacOS);
        let resolved = resolve("8", "20.0.0", &layout, Arch::Amd64, DEFAULT_BASE_URL);
        assert_eq!(
            resolved.identity.canonical_version(),
            "java8-darwin-amd64-20.0.0"
        );
    }

    #[test]
    fn resolve_is_deterministic() {
        let a = resolve("17", "22.3.0", &linux(), Arch::Amd64, DEFAULT_BASE_URL);
        let b = resolve("17", "22.3.0", &linux(), Arch::Amd64, DEFAULT_BASE_URL);
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_inputs_distinct_keys() {
        let a = resolve("17", "22.3.0", &linux(), Arch::Amd64, DEFAULT_BASE_URL);
        let b = resolve("17", "22.3.1", &linux(), Arch::Amd64, DEFAULT_BASE_URL);
        let c = resolve("11", "22.3.0", &linux(), Arch::Amd64, DEFAULT_BASE_URL);
        assert_ne!(a.identity, b.identity);
        assert_ne!(a.identity, c.identity);
    }

    #[test]
    fn base_url_trailing_slash() {
        let resolved = resolve("17", "22.3.0", &linux(), Arch::Amd64, "http://mirror.local/");
        assert_eq!(
            resolved.url,
            "http://mirror.local/vm-22.3.0/graalvm-ce-java17-linux-amd64-22.3.0.tar.gz"
        );
    }

    #[test]
    fn malformed_version_is_not_rejected() {
        let resolved = resolve("", "not a version", &linux(), Arch::Amd64, DEFAULT_BASE_URL);
        assert!(resolved.url.contains("vm-not a version"));
    }
}
