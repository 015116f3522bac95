//! Check command - Report the host CLI and the local backend it supports

use clap::Args;
use tracing::info;

use nimbus_build::{LocalBackendKind, Output, OrchestratorConfig};

use crate::cli::{output, Cli, Workspace};

/// Show the detected host CLI and selected local backend
#[derive(Debug, Args)]
pub struct CheckCommand {}

impl CheckCommand {
    /// Execute the check command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!("executing check command");
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(self.execute_async(cli))
    }

    async fn execute_async(&self, cli: &Cli) -> anyhow::Result<()> {
        let workspace = Workspace::load()?;
        let command = workspace.local_builder().command().to_string();
        let version = workspace.cli_version(cli.cli_version.as_deref()).await?;

        let config = OrchestratorConfig::from_config(&workspace.config, version.clone())?;
        let backend = config.local_backend_kind();

        if cli.show_progress() {
            println!("{}", output::header("Host CLI"));
            println!("{}", output::key_value("Command", &command));
            println!("{}", output::key_value("Version", &version));
            println!("{}", output::key_value("Local backend", describe(backend)));
            if let Some(ref path) = workspace.config_path {
                println!(
                    "{}",
                    output::key_value("Config", &path.display().to_string())
                );
            }
            println!();
        }

        let message = format!(
            "{} {} uses the {} local backend",
            command,
            version,
            backend.as_str()
        );
        let result = Output::success("check", message)
            .with_output("cli_version", version)
            .with_output("local_backend", backend.as_str());
        cli.emit(&result);

        Ok(())
    }
}

fn describe(kind: LocalBackendKind) -> &'static str {
    match kind {
        LocalBackendKind::Legacy => "legacy local build service",
        LocalBackendKind::Controller => "build data service + build controller",
    }
}
