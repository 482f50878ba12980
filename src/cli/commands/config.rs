//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{SetupError, SetupResult};
use console::style;
use std::path::PathBuf;

/// Execute the config command
pub async fn execute(args: ConfigArgs, manager: &ConfigManager, config: &Config) -> SetupResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => show_path(manager),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value }) => set_value(manager, config, &key, &value).await?,
    }

    Ok(())
}

fn show_config(config: &Config) -> SetupResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

fn show_path(manager: &ConfigManager) {
    println!("{}", manager.path().display());
}

async fn init_config(manager: &ConfigManager, force: bool) -> SetupResult<()> {
    let path = manager.path();

    if path.exists() && !force {
        eprintln!(
            "{} Config already exists at {}",
            style("!").yellow(),
            path.display()
        );
        eprintln!("  Use --force to overwrite");
        return Ok(());
    }

    manager.save(&Config::default()).await?;
    eprintln!(
        "{} Configuration initialized at {}",
        style("✓").green(),
        path.display()
    );

    Ok(())
}

async fn set_value(
    manager: &ConfigManager,
    config: &Config,
    key: &str,
    value: &str,
) -> SetupResult<()> {
    let mut config = config.clone();
    apply_value(&mut config, key, value)?;

    manager.save(&config).await?;
    eprintln!("{} Set {} = {}", style("✓").green(), key, value);

    Ok(())
}

/// Apply a dot-separated key to `config`. Empty values clear optional keys.
fn apply_value(config: &mut Config, key: &str, value: &str) -> SetupResult<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["general", "verbose"] => config.general.verbose = parse_bool(value)?,
        ["general", "log_format"] => config.general.log_format = parse_log_format(value)?,

        ["paths", "temp_dir"] => config.paths.temp_dir = optional(value).map(PathBuf::from),
        ["paths", "cache_dir"] => config.paths.cache_dir = optional(value).map(PathBuf::from),

        ["layout", "app_dir"] => config.layout.app_dir = optional(value).map(str::to_string),
        ["layout", "bin_dir"] => config.layout.bin_dir = optional(value).map(str::to_string),

        ["env", "java_home"] => config.env.java_home = parse_name(value)?,
        ["env", "graalvm_home"] => config.env.graalvm_home = parse_name(value)?,

        ["download", "base_url"] => config.download.base_url = value.to_string(),
        ["download", "timeout_secs"] => config.download.timeout_secs = parse_u64(value)?,

        _ => {
            eprintln!("Valid keys:");
            print_valid_keys();
            return Err(SetupError::User(format!("Unknown config key: {}", key)));
        }
    }

    Ok(())
}

fn optional(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

fn parse_bool(value: &str) -> SetupResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(SetupError::User(format!(
            "Invalid boolean value: {}. Use true/false",
            value
        ))),
    }
}

fn parse_u64(value: &str) -> SetupResult<u64> {
    value
        .parse()
        .map_err(|_| SetupError::User(format!("Invalid number: {}", value)))
}

fn parse_log_format(value: &str) -> SetupResult<String> {
    match value {
        "text" | "json" => Ok(value.to_string()),
        _ => Err(SetupError::User(format!(
            "Invalid log format: {}. Use text/json",
            value
        ))),
    }
}

fn parse_name(value: &str) -> SetupResult<String> {
    if value.is_empty() || value.contains('=') {
        return Err(SetupError::User(format!(
            "Invalid environment variable name: '{}'",
            value
        )));
    }
    Ok(value.to_string())
}

fn print_valid_keys() {
    let keys = [
        "general.verbose",
        "general.log_format",
        "paths.temp_dir",
        "paths.cache_dir",
        "layout.app_dir",
        "layout.bin_dir",
        "env.java_home",
        "env.graalvm_home",
        "download.base_url",
        "download.timeout_secs",
    ];

    for key in keys {
        eprintln!("  {}", key);
    }
}
