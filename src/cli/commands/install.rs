//! Install command - acquire GraalVM and publish its environment

use crate::cache::ToolCache;
use crate::cli::args::{EnvFormat, InstallArgs};
use crate::config::{Config, ConfigManager};
use crate::download::HttpDownloader;
use crate::error::SetupResult;
use crate::install::{ActionsPublisher, EnvPublisher, EnvironmentInstaller, ShellPublisher};
use crate::native_image::install_native_image;
use crate::pipeline::{Pipeline, PipelineOptions};
use crate::platform::{Arch, Platform};
use console::style;
use std::sync::Arc;
use tracing::{debug, info};

/// Execute the install command
pub async fn execute(args: InstallArgs, config: &Config) -> SetupResult<()> {
    let platform = Platform::detect();
    let arch = Arch::detect();
    let layout = ConfigManager::layout(config, platform);
    let format = args.format.unwrap_or_else(default_format);

    let mut options = PipelineOptions::new(ConfigManager::temp_dir(config));
    options.layout = layout.clone();
    options.arch = arch;
    options.base_url = args
        .versions
        .base_url
        .clone()
        .unwrap_or_else(|| config.download.base_url.clone());

    let cache_root = ConfigManager::tool_cache_dir(config);
    debug!("Tool cache: {}", cache_root.display());

    let mut downloader = HttpDownloader::new(config.download.timeout());
    if format == EnvFormat::Shell {
        downloader = downloader.quiet();
    }

    let pipeline = Pipeline::new(
        options,
        Arc::new(ToolCache::new(cache_root, arch)),
        Arc::new(downloader),
    );

    let acquisition = pipeline
        .acquire(&args.versions.java_version, &args.versions.graalvm_version)
        .await?;

    if acquisition.from_cache {
        info!("Using cached {}", acquisition.identity);
    } else {
        info!("Installed {} to the tool cache", acquisition.identity);
    }

    let installer = EnvironmentInstaller::new(layout.clone(), config.env.names());
    let mut publisher: Box<dyn EnvPublisher> = match format {
        EnvFormat::Actions => Box::new(ActionsPublisher::from_env()),
        EnvFormat::Shell => Box::new(ShellPublisher::new(std::io::stdout(), platform)),
    };
    let toolchain = installer
        .install(
            &acquisition.root,
            &acquisition.scratch_dir,
            publisher.as_mut(),
        )
        .await?;

    if args.native_image {
        install_native_image(&toolchain, &layout).await?;
    }

    if format == EnvFormat::Actions {
        eprintln!(
            "{} {} at {}",
            style("✓").green(),
            acquisition.identity,
            toolchain.home.display()
        );
    }

    Ok(())
}

/// Actions files when running under a workflow, shell statements otherwise
fn default_format() -> EnvFormat {
    if std::env::var_os("GITHUB_ENV").is_some() {
        EnvFormat::Actions
    } else {
        EnvFormat::Shell
    }
}
