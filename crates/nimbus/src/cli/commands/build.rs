//! Build command - Build an app with the cloud build service

use std::time::Instant;

use clap::Args;
use console::style;
use tracing::info;

use nimbus_build::output::ArtifactOutput;
use nimbus_build::{BuildError, Output};
use nimbus_core::Platform;

use super::BuildArgs;
use crate::cli::{Cli, Workspace};

/// Build an app in the cloud
#[derive(Debug, Args)]
pub struct BuildCommand {
    /// Target platform (android, ios)
    pub platform: String,

    /// Build for a physical device (iOS)
    #[arg(long)]
    pub for_device: bool,

    #[command(flatten)]
    pub build: BuildArgs,
}

impl BuildCommand {
    /// Execute the build command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(platform = %self.platform, release = self.build.release, for_device = self.for_device, "executing build command");
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(self.execute_async(cli))
    }

    async fn execute_async(&self, cli: &Cli) -> anyhow::Result<()> {
        let start = Instant::now();
        let platform = Platform::parse(&self.platform)
            .ok_or_else(|| BuildError::unsupported_platform(&self.platform))?;

        let workspace = Workspace::load()?;
        let orchestrator = workspace
            .orchestrator(self.build.to_options(), cli.cli_version.as_deref())
            .await?;

        if cli.show_progress() {
            println!("{}", style("Building in the cloud...").bold());
            println!("  Platform: {}", style(platform.display_name()).cyan());
            println!(
                "  Configuration: {}",
                style(if self.build.release { "Release" } else { "Debug" }).cyan()
            );
            println!();
        }

        let package = orchestrator.build(platform.as_str(), self.for_device).await?;

        let result = Output::success("build", format!("{} build completed", platform))
            .with_duration(start.elapsed().as_millis() as u64)
            .with_artifact(ArtifactOutput::from_path(&package, platform));
        cli.emit(&result);

        Ok(())
    }
}
