//! Cache command - inspect and clear the tool cache

use crate::cache::{format_bytes, CacheEntry, CacheState, ToolCache};
use crate::cli::args::{CacheAction, CacheArgs, OutputFormat};
use crate::config::{Config, ConfigManager};
use crate::error::{SetupError, SetupResult};
use crate::platform::Arch;
use console::style;
use std::io::{self, Write};

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config) -> SetupResult<()> {
    let cache = ToolCache::new(ConfigManager::tool_cache_dir(config), Arch::detect());

    match args.action {
        CacheAction::List { format } => list_entries(cache, format).await,
        CacheAction::Path => {
            println!("{}", cache.root().display());
            Ok(())
        }
        CacheAction::Clear { yes } => clear_cache(cache, yes).await,
    }
}

/// List every cached distribution
async fn list_entries(cache: ToolCache, format: OutputFormat) -> SetupResult<()> {
    let entries = tokio::task::spawn_blocking(move || cache.entries())
        .await
        .map_err(|e| SetupError::Internal(format!("cache scan task failed: {}", e)))??;

    if entries.is_empty() {
        match format {
            OutputFormat::Json => println!("[]"),
            _ => println!("No cached distributions found."),
        }
        return Ok(());
    }

    match format {
        OutputFormat::Table => print_cache_table(&entries),
        OutputFormat::Json => print_cache_json(&entries)?,
        OutputFormat::Plain => print_cache_plain(&entries),
    }

    Ok(())
}

fn print_cache_table(entries: &[CacheEntry]) {
    println!(
        "{:<10} {:<40} {:<8} {:<10} {:<10} {:<20}",
        "TOOL", "VERSION", "ARCH", "STATE", "SIZE", "CREATED"
    );
    println!("{}", "-".repeat(100));

    let mut total = 0;
    for entry in entries {
        let state_display = match entry.state {
            CacheState::Complete => style("complete").green().to_string(),
            CacheState::Partial => style("partial").yellow().to_string(),
        };

        let size = entry.size_bytes();
        total += size;

        let created = entry
            .created_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());

        println!(
            "{:<10} {:<40} {:<8} {:<10} {:<10} {:<20}",
            entry.tool,
            entry.version,
            entry.arch,
            state_display,
            format_bytes(size),
            created
        );
    }

    println!();
    println!(
        "Total: {} distribution(s), {}",
        entries.len(),
        format_bytes(total)
    );
}

fn print_cache_json(entries: &[CacheEntry]) -> SetupResult<()> {
    #[derive(serde::Serialize)]
    struct EntryJson {
        tool: String,
        version: String,
        arch: String,
        path: String,
        state: String,
        size_bytes: u64,
        created_at: Option<String>,
    }

    let json_entries: Vec<EntryJson> = entries
        .iter()
        .map(|e| EntryJson {
            tool: e.tool.clone(),
            version: e.version.clone(),
            arch: e.arch.clone(),
            path: e.path.display().to_string(),
            state: e.state.to_string(),
            size_bytes: e.size_bytes(),
            created_at: e.created_at.map(|t| t.to_rfc3339()),
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&json_entries)?);
    Ok(())
}

fn print_cache_plain(entries: &[CacheEntry]) {
    for entry in entries {
        println!("{}", entry.path.display());
    }
}

/// Remove the whole tool cache
async fn clear_cache(cache: ToolCache, skip_confirm: bool) -> SetupResult<()> {
    let root = cache.root().to_path_buf();
    if !root.exists() {
        println!("Tool cache is empty.");
        return Ok(());
    }

    if !skip_confirm {
        print!("Remove everything under {}? [y/N] ", root.display());
        let _ = io::stdout().flush();

        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_err() {
            println!("Failed to read input, aborting.");
            return Ok(());
        }

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    let freed = tokio::task::spawn_blocking(move || cache.clear())
        .await
        .map_err(|e| SetupError::Internal(format!("cache clear task failed: {}", e)))??;

    println!(
        "{} cleared {} ({} freed)",
        style("✓").green(),
        root.display(),
        format_bytes(freed)
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_state_display() {
        assert_eq!(CacheState::Complete.to_string(), "complete");
        assert_eq!(CacheState::Partial.to_string(), "partial");
    }
}
