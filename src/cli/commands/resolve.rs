//! Resolve command - show what install would fetch

use crate::cli::args::{OutputFormat, ResolveArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{SetupError, SetupResult};
use crate::platform::{Arch, Platform};
use crate::resolve::{self, Resolved};
use console::style;

/// Execute the resolve command
pub async fn execute(args: ResolveArgs, config: &Config) -> SetupResult<()> {
    let platform = match args.platform.as_deref() {
        Some(name) => Platform::from_name(name).ok_or_else(|| {
            SetupError::Resolution(format!(
                "unknown platform '{}' (expected linux, darwin or windows)",
                name
            ))
        })?,
        None => Platform::detect(),
    };
    let arch = args
        .arch
        .as_deref()
        .map(Arch::from_name)
        .unwrap_or_else(Arch::detect);

    let layout = ConfigManager::layout(config, platform);
    let base_url = args
        .versions
        .base_url
        .as_deref()
        .unwrap_or(&config.download.base_url);

    let resolved = resolve::resolve(
        &args.versions.java_version,
        &args.versions.graalvm_version,
        &layout,
        arch,
        base_url,
    );

    match args.format {
        OutputFormat::Table => print_table(&resolved, platform, arch),
        OutputFormat::Json => print_json(&resolved, platform, arch)?,
        OutputFormat::Plain => println!("{}", resolved.url),
    }

    Ok(())
}

fn print_table(resolved: &Resolved, platform: Platform, arch: Arch) {
    println!("{:<10} {}", style("Tool").bold(), resolved.identity.tool_name());
    println!(
        "{:<10} {}",
        style("Version").bold(),
        resolved.identity.canonical_version()
    );
    println!("{:<10} {}/{}", style("Target").bold(), platform, arch);
    println!("{:<10} {}", style("URL").bold(), resolved.url);
}

fn print_json(resolved: &Resolved, platform: Platform, arch: Arch) -> SetupResult<()> {
    #[derive(serde::Serialize)]
    struct ResolvedJson<'a> {
        tool: &'a str,
        version: &'a str,
        platform: &'a str,
        arch: &'a str,
        url: &'a str,
    }

    let json = ResolvedJson {
        tool: resolved.identity.tool_name(),
        version: resolved.identity.canonical_version(),
        platform: platform.name(),
        arch: arch.name(),
        url: &resolved.url,
    };

    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
