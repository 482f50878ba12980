//! setup-graalvm - Provision GraalVM on a build runner
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use setup_graalvm::cli::{Cli, Commands};
use setup_graalvm::config::{Config, ConfigManager};
use setup_graalvm::error::{SetupError, SetupResult};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> SetupResult<()> {
    let cli = Cli::parse();

    if let Commands::Completions { shell } = cli.command {
        return setup_graalvm::cli::commands::completions(shell);
    }

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = config_manager.load().await?;

    init_tracing(cli.verbose, &config);
    debug!("Configuration: {}", config_manager.path().display());

    match cli.command {
        Commands::Completions { .. } => unreachable!("Completions handled above"),
        Commands::Install(args) => setup_graalvm::cli::commands::install(args, &config).await,
        Commands::Resolve(args) => setup_graalvm::cli::commands::resolve(args, &config).await,
        Commands::Cache(args) => setup_graalvm::cli::commands::cache(args, &config).await,
        Commands::Config(args) => {
            setup_graalvm::cli::commands::config(args, &config_manager, &config).await
        }
    }
}

/// Logging goes to stderr so shell-format output on stdout stays evaluable.
/// 0 = info, 1 = debug, 2+ = trace; `general.verbose` counts as one level.
fn init_tracing(verbose: u8, config: &Config) {
    let level = verbose.saturating_add(u8::from(config.general.verbose));
    let filter = match level {
        0 => EnvFilter::new("setup_graalvm=info"),
        1 => EnvFilter::new("setup_graalvm=debug"),
        _ => EnvFilter::new("setup_graalvm=trace"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}

fn report(e: &SetupError) {
    if std::env::var("GITHUB_ACTIONS").is_ok_and(|v| v == "true") {
        println!("::error::{}", e);
    }

    eprintln!("{} {}", style("Error:").red().bold(), e);
    if let Some(hint) = e.hint() {
        eprintln!("{} {}", style("Hint:").yellow(), hint);
    }
}
