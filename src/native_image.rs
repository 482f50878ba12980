//! Native Image component installation through the GraalVM updater

use crate::error::{SetupError, SetupResult};
use crate::install::InstalledToolchain;
use crate::platform::PlatformLayout;
use tokio::process::Command;
use tracing::info;

/// Run `gu install native-image` from the installed toolchain
pub async fn install_native_image(
    toolchain: &InstalledToolchain,
    layout: &PlatformLayout,
) -> SetupResult<()> {
    let gu = toolchain.bin_dir.join(layout.updater_executable());
    let command = format!("{} install native-image", gu.display());
    info!("Installing native-image component");

    let output = Command::new(&gu)
        .args(["install", "native-image"])
        .env("JAVA_HOME", &toolchain.home)
        .env("GRAALVM_HOME", &toolchain.home)
        .output()
        .await
        .map_err(|e| SetupError::command_failed(&command, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SetupError::command_exec(command, stderr.trim()));
    }

    Ok(())
}
