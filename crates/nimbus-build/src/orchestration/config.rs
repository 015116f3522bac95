//! Orchestrator configuration

use std::path::PathBuf;

use nimbus_core::{Config, ConfigError};

use crate::compat::{CompatThresholds, LocalBackendKind};

/// Configuration for the build orchestrator
#[derive(Debug, Clone, Default)]
pub struct OrchestratorConfig {
    /// Version of the host CLI, decides the local backend
    pub cli_version: String,

    /// Versions at which the host CLI gained the build controller
    pub compat: CompatThresholds,

    /// Base for relative signing paths (defaults to current dir)
    pub working_dir: Option<PathBuf>,

    /// Platform template for legacy local builds
    pub platform_template: Option<String>,
}

impl OrchestratorConfig {
    /// Create a new config
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the loaded config file and the detected host CLI version
    pub fn from_config(config: &Config, cli_version: impl Into<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            cli_version: cli_version.into(),
            compat: CompatThresholds::from_config(&config.compat)?,
            working_dir: None,
            platform_template: config.local.platform_template.clone(),
        })
    }

    // Builder methods

    pub fn with_cli_version(mut self, version: impl Into<String>) -> Self {
        self.cli_version = version.into();
        self
    }

    pub fn with_compat(mut self, compat: CompatThresholds) -> Self {
        self.compat = compat;
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_platform_template(mut self, template: impl Into<String>) -> Self {
        self.platform_template = Some(template.into());
        self
    }

    /// Local backend supported by the configured CLI version
    pub fn local_backend_kind(&self) -> LocalBackendKind {
        LocalBackendKind::resolve(&self.cli_version, &self.compat)
    }

    /// Get working directory (current dir if not set)
    pub fn effective_working_dir(&self) -> PathBuf {
        self.working_dir
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_default())
    }
}
