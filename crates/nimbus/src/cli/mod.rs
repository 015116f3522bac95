//! CLI definition and command handling

pub mod commands;
pub mod output;
mod prompt;
mod services;

use clap::{Parser, Subcommand};

use commands::{BuildCommand, CheckCommand, DeployCommand, InitCommand, PublishCommand};

pub use prompt::TerminalPrompter;
pub use services::Workspace;

/// Nimbus - Cloud and local builds for mobile projects
#[derive(Debug, Parser)]
#[command(name = "nimbus")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Working directory
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<std::path::PathBuf>,

    /// Host CLI version to assume instead of detecting it
    #[arg(long, global = true, env = "NIMBUS_CLI_VERSION")]
    pub cli_version: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
    /// GitHub Actions workflow commands
    Github,
}

impl From<OutputFormat> for nimbus_build::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => Self::Text,
            OutputFormat::Json => Self::Json,
            OutputFormat::Github => Self::GithubActions,
        }
    }
}

impl Cli {
    /// Whether human-oriented progress lines should be printed
    pub fn show_progress(&self) -> bool {
        !self.quiet && self.format == OutputFormat::Text
    }

    /// Print a command result in the selected format
    pub fn emit(&self, result: &nimbus_build::Output) {
        if !self.quiet {
            result.print(self.format.into());
        }
    }
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a nimbus.toml configuration
    Init(InitCommand),

    /// Build an app in the cloud
    Build(BuildCommand),

    /// Build a release package for store submission
    Publish(PublishCommand),

    /// Install a package on a cloud emulator
    Deploy(DeployCommand),

    /// Show the detected host CLI and selected local backend
    Check(CheckCommand),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> anyhow::Result<()> {
        // Change to specified directory if provided
        if let Some(dir) = &self.directory {
            std::env::set_current_dir(dir)?;
        }

        match self.command {
            Commands::Init(ref cmd) => cmd.execute(&self),
            Commands::Build(ref cmd) => cmd.execute(&self),
            Commands::Publish(ref cmd) => cmd.execute(&self),
            Commands::Deploy(ref cmd) => cmd.execute(&self),
            Commands::Check(ref cmd) => cmd.execute(&self),
        }
    }
}
