//! Publish command - Build a release package for store submission

use std::fmt;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::info;

use nimbus_build::options::redacted;
use nimbus_build::{BuildError, Output};
use nimbus_core::Platform;

use super::BuildArgs;
use crate::cli::{Cli, Workspace};

/// Build a release package ready for store submission
#[derive(Args)]
pub struct PublishCommand {
    /// Target platform (android, ios)
    pub platform: String,

    /// Apple ID (iOS)
    pub apple_id: Option<String>,

    /// Apple ID password (iOS)
    pub apple_password: Option<String>,

    /// Build with the local toolchain instead of the cloud
    #[arg(long)]
    pub local: bool,

    /// Apple application-specific password
    #[arg(long, env = "NIMBUS_APPLE_APP_SPECIFIC_PASSWORD", hide_env_values = true)]
    pub apple_application_specific_password: Option<String>,

    /// Base64-encoded Apple session, replaces interactive login
    #[arg(long, env = "NIMBUS_APPLE_SESSION", hide_env_values = true)]
    pub apple_session: Option<String>,

    #[command(flatten)]
    pub build: BuildArgs,
}

impl fmt::Debug for PublishCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublishCommand")
            .field("platform", &self.platform)
            .field("apple_id", &self.apple_id)
            .field("apple_password", &redacted(&self.apple_password))
            .field("local", &self.local)
            .field(
                "apple_application_specific_password",
                &redacted(&self.apple_application_specific_password),
            )
            .field("apple_session", &redacted(&self.apple_session))
            .field("build", &self.build)
            .finish()
    }
}

impl PublishCommand {
    /// Execute the publish command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(platform = %self.platform, local = self.local, "executing publish command");
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(self.execute_async(cli))
    }

    fn credential_args(&self) -> Vec<String> {
        [&self.apple_id, &self.apple_password]
            .into_iter()
            .map(|arg| arg.clone().unwrap_or_default())
            .collect()
    }

    async fn execute_async(&self, cli: &Cli) -> anyhow::Result<()> {
        let start = Instant::now();
        let platform = Platform::parse(&self.platform)
            .ok_or_else(|| BuildError::unsupported_platform(&self.platform))?;

        let mut options = self.build.to_options().with_local(self.local);
        options.apple_application_specific_password =
            self.apple_application_specific_password.clone();
        options.apple_session_base64 = self.apple_session.clone();

        let workspace = Workspace::load()?;
        let orchestrator = workspace
            .orchestrator(options, cli.cli_version.as_deref())
            .await?;

        let apple_id = if platform.is_ios() {
            let credentials = orchestrator.extended_apple_credentials(&self.credential_args())?;
            info!(?credentials, "resolved App Store credentials");
            credentials.username
        } else {
            None
        };

        if cli.show_progress() {
            let backend = if self.local {
                format!("locally ({} backend)", orchestrator.local_backend().kind().as_str())
            } else {
                "in the cloud".to_string()
            };
            println!(
                "{} {} release package {}",
                style("→").blue(),
                platform,
                backend
            );
        }

        let location = orchestrator.build_for_publishing(platform.as_str()).await?;

        let mut result = Output::success("publish", format!("{} package ready for publishing", platform))
            .with_duration(start.elapsed().as_millis() as u64)
            .with_package(&location, platform);
        if let Some(apple_id) = apple_id {
            result = result.with_output("apple_id", apple_id);
        }
        cli.emit(&result);

        Ok(())
    }
}
