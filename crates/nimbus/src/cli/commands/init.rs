//! Init command

use std::path::{Path, PathBuf};

use clap::Args;
use dialoguer::Confirm;
use tracing::info;

use nimbus_build::Prompter;
use nimbus_core::config::{DEFAULT_CONFIG_TEMPLATE, DEFAULT_CONFIG_TOML, DEFAULT_CONFIG_YAML};
use nimbus_core::Config;

use crate::cli::{output, Cli, TerminalPrompter};

/// Create a Nimbus configuration file
#[derive(Debug, Args)]
pub struct InitCommand {
    /// Force overwrite existing configuration
    #[arg(short, long)]
    pub force: bool,

    /// Write YAML instead of TOML
    #[arg(long)]
    pub yaml: bool,

    /// Output file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl InitCommand {
    /// Execute the init command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(force = self.force, yaml = self.yaml, "executing init command");
        let cwd = std::env::current_dir()?;
        let config_path = self.output.clone().unwrap_or_else(|| {
            cwd.join(if self.yaml {
                DEFAULT_CONFIG_YAML
            } else {
                DEFAULT_CONFIG_TOML
            })
        });

        if config_path.exists() && !self.force {
            let prompter = TerminalPrompter::detect();
            if !prompter.is_interactive() {
                anyhow::bail!(
                    "Configuration file already exists at {}. Use --force to overwrite.",
                    config_path.display()
                );
            }

            let overwrite = Confirm::new()
                .with_prompt(format!(
                    "Configuration file already exists at {}. Overwrite?",
                    config_path.display()
                ))
                .default(false)
                .interact()?;

            if !overwrite {
                output::warning("Aborted.");
                return Ok(());
            }
        }

        write_config(&config_path, self.yaml)?;

        if !cli.quiet {
            output::success(&format!(
                "Created configuration at {}",
                output::path_style().apply_to(config_path.display())
            ));
            println!();
            println!("Next steps:");
            println!("  1. Set {} to your cloud API token", output::path_style().apply_to("NIMBUS_CLOUD_TOKEN"));
            println!("  2. Run {} to verify the host CLI", output::path_style().apply_to("nimbus check"));
            println!("  3. Run {} to build in the cloud", output::path_style().apply_to("nimbus build android"));
        }

        Ok(())
    }
}

fn write_config(path: &Path, yaml: bool) -> anyhow::Result<()> {
    let content = if yaml {
        let config: Config = toml::from_str(DEFAULT_CONFIG_TEMPLATE)?;
        serde_yaml::to_string(&config)?
    } else {
        DEFAULT_CONFIG_TEMPLATE.to_string()
    };
    std::fs::write(path, content)?;
    Ok(())
}
