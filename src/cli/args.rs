//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// setup-graalvm - Provision GraalVM on a build runner
///
/// Downloads a GraalVM Community Edition distribution once per version,
/// keeps it in a tool cache, and publishes JAVA_HOME, GRAALVM_HOME and PATH.
#[derive(Parser, Debug)]
#[command(name = "setup-graalvm")]
#[command(author, version, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "SETUP_GRAALVM_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download (or reuse) GraalVM and publish its environment
    Install(InstallArgs),

    /// Print the canonical version and download URL without fetching
    Resolve(ResolveArgs),

    /// Manage the tool cache
    Cache(CacheArgs),

    /// Show or edit configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
}

/// Version selection shared by install and resolve
#[derive(Parser, Debug, Clone)]
pub struct VersionArgs {
    /// Java version of the distribution (e.g. 17)
    #[arg(long, env = "SETUP_GRAALVM_JAVA_VERSION")]
    pub java_version: String,

    /// GraalVM release version (e.g. 22.3.0)
    #[arg(long, env = "SETUP_GRAALVM_GRAALVM_VERSION")]
    pub graalvm_version: String,

    /// Override the release download base URL
    #[arg(long, env = "SETUP_GRAALVM_BASE_URL")]
    pub base_url: Option<String>,
}

/// Arguments for the install command
#[derive(Parser, Debug)]
pub struct InstallArgs {
    #[command(flatten)]
    pub versions: VersionArgs,

    /// Also install the native-image component with `gu`
    #[arg(long)]
    pub native_image: bool,

    /// How to publish the environment (default: actions when GITHUB_ENV is set)
    #[arg(short, long)]
    pub format: Option<EnvFormat>,
}

/// Arguments for the resolve command
#[derive(Parser, Debug)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub versions: VersionArgs,

    /// Target platform (linux, darwin, windows; defaults to host)
    #[arg(long)]
    pub platform: Option<String>,

    /// Target architecture (defaults to host)
    #[arg(long)]
    pub arch: Option<String>,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Where the environment is published
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EnvFormat {
    /// GITHUB_ENV / GITHUB_PATH files
    Actions,
    /// Shell statements on stdout, for eval
    Shell,
}

/// Output format for listing commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., download.base_url)
        key: String,
        /// Value to set
        value: String,
    },
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    /// Subcommand for cache
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// List cached distributions
    List {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Print the tool cache directory
    Path,

    /// Remove every cached distribution
    Clear {
        /// Skip the confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn about_comes_from_doc_comment() {
        let about = Cli::command().get_about().map(|a| a.to_string());
        assert_eq!(
            about.as_deref(),
            Some("setup-graalvm - Provision GraalVM on a build runner")
        );
    }

    #[test]
    fn parse_install() {
        let cli = Cli::try_parse_from([
            "setup-graalvm",
            "install",
            "--java-version",
            "17",
            "--graalvm-version",
            "22.3.0",
            "--native-image",
            "--format",
            "shell",
        ])
        .unwrap();

        match cli.command {
            Commands::Install(args) => {
                assert_eq!(args.versions.java_version, "17");
                assert_eq!(args.versions.graalvm_version, "22.3.0");
                assert!(args.native_image);
                assert_eq!(args.format, Some(EnvFormat::Shell));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parse_cache_clear() {
        let cli = Cli::try_parse_from(["setup-graalvm", "-vv", "cache", "clear", "--yes"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Commands::Cache(CacheArgs {
                action: CacheAction::Clear { yes: true }
            })
        ));
    }
}
