//! Deploy command - Install a package on a cloud emulator

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use tracing::info;

use nimbus_build::output::ArtifactOutput;
use nimbus_build::{BuildError, Output};
use nimbus_core::Platform;
use nimbus_devices::types::EmulatorDevice;
use nimbus_devices::{CloudEmulatorApplicationManager, DeviceApplicationManager};

use crate::cli::{output, Cli, Workspace};

/// Install a package on a cloud emulator
#[derive(Debug, Args)]
pub struct DeployCommand {
    /// Package to install (.apk, .aab or .ipa)
    pub package: PathBuf,

    /// Emulator to install on
    #[arg(long)]
    pub emulator_id: String,

    /// Operating system of the emulator (android, ios)
    #[arg(long)]
    pub os: String,
}

impl DeployCommand {
    /// Execute the deploy command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(package = %self.package.display(), emulator = %self.emulator_id, "executing deploy command");
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(self.execute_async(cli))
    }

    async fn execute_async(&self, cli: &Cli) -> anyhow::Result<()> {
        let os = Platform::parse(&self.os).ok_or_else(|| BuildError::unsupported_platform(&self.os))?;

        let workspace = Workspace::load()?;
        let manager = CloudEmulatorApplicationManager::new(
            EmulatorDevice::new(&self.emulator_id, os),
            Arc::new(workspace.emulator_service()),
        );

        if cli.show_progress() {
            output::info(&format!(
                "Installing {} on emulator {}",
                output::path_style().apply_to(self.package.display()),
                self.emulator_id
            ));
        }

        manager.install_application(&self.package).await?;

        let result = Output::success(
            "deploy",
            format!("Installed on cloud emulator {}", self.emulator_id),
        )
        .with_artifact(ArtifactOutput::from_path(&self.package, os))
        .with_output("emulator_id", self.emulator_id.clone());
        cli.emit(&result);

        Ok(())
    }
}
