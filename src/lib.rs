//! setup-graalvm - Provision GraalVM on a build runner
//!
//! Resolves a (Java version, GraalVM version) pair to a release asset,
//! downloads and extracts it once into a persistent tool cache, and
//! publishes JAVA_HOME, GRAALVM_HOME and PATH for later build steps.

pub mod archive;
pub mod cache;
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod install;
pub mod native_image;
pub mod pipeline;
pub mod platform;
pub mod resolve;

pub use error::{ErrorKind, SetupError, SetupResult};
