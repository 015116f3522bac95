//! Wiring of configuration and collaborators for commands

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, warn};

use nimbus_build::backends::{CliLocalBuilder, HttpCloudBuildService};
use nimbus_build::{
    BuildOptions, BuildOrchestrator, BuildServices, LocalBackends, OrchestratorConfig, ProjectData,
};
use nimbus_core::config::load_config_or_default;
use nimbus_core::Config;
use nimbus_devices::HttpEmulatorService;

use super::TerminalPrompter;

/// The project a command runs in and its configuration
#[derive(Debug, Clone)]
pub struct Workspace {
    pub project_dir: PathBuf,
    pub config: Config,
    pub config_path: Option<PathBuf>,
}

impl Workspace {
    /// Load from the current directory
    pub fn load() -> anyhow::Result<Self> {
        let cwd = std::env::current_dir()?;
        Self::load_from(&cwd)
    }

    pub fn load_from(project_dir: &Path) -> anyhow::Result<Self> {
        let (config, config_path) = load_config_or_default(project_dir)?;
        if let Some(ref path) = config_path {
            debug!(path = %path.display(), "loaded configuration");
        }
        Ok(Self {
            project_dir: project_dir.to_path_buf(),
            config,
            config_path,
        })
    }

    pub fn local_builder(&self) -> CliLocalBuilder {
        CliLocalBuilder::from_config(&self.config.local)
    }

    /// Host CLI version, preferring an explicit override
    pub async fn cli_version(&self, override_version: Option<&str>) -> nimbus_build::Result<String> {
        match override_version {
            Some(version) => Ok(version.to_string()),
            None => self.local_builder().detect_version().await,
        }
    }

    /// Concrete collaborators for the orchestrator
    pub fn services(&self) -> BuildServices {
        let local = Arc::new(self.local_builder());
        BuildServices {
            cloud: Arc::new(HttpCloudBuildService::from_config(&self.config.cloud)),
            local: LocalBackends {
                legacy: local.clone(),
                build_data: local.clone(),
                controller: local,
            },
            prompter: Arc::new(TerminalPrompter::detect()),
        }
    }

    /// Orchestrator for this project, with config defaults merged into `options`
    pub async fn orchestrator(
        &self,
        mut options: BuildOptions,
        cli_version: Option<&str>,
    ) -> anyhow::Result<BuildOrchestrator> {
        if options.account_id.is_none() {
            options.account_id = self.config.cloud.account_id.clone();
        }
        options.shared_cloud |= self.config.cloud.shared_cloud;

        let version = self.cli_version(cli_version).await.unwrap_or_else(|e| {
            warn!("Could not detect host CLI version, using legacy local builds: {}", e);
            String::new()
        });

        let config = OrchestratorConfig::from_config(&self.config, version)?
            .with_working_dir(&self.project_dir);
        let project = ProjectData::load(&self.project_dir)
            .with_context(|| format!("not a mobile project: {}", self.project_dir.display()))?;

        Ok(BuildOrchestrator::new(self.services(), project, options, config))
    }

    pub fn emulator_service(&self) -> HttpEmulatorService {
        HttpEmulatorService::from_config(&self.config.emulator, self.config.cloud.token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nimbus_build::LocalBackendKind;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("package.json"),
            r#"{ "nativescript": { "id": "org.demo.app" } }"#,
        )
        .unwrap();
        temp
    }

    #[test]
    fn test_load_without_config_uses_defaults() {
        let temp = project();
        let workspace = Workspace::load_from(temp.path()).unwrap();

        assert!(workspace.config_path.is_none());
        assert_eq!(workspace.local_builder().command(), "ns");
    }

    #[tokio::test]
    async fn test_orchestrator_merges_config() {
        let temp = project();
        std::fs::write(
            temp.path().join("nimbus.toml"),
            "[cloud]\naccount_id = \"acct-9\"\nshared_cloud = true\n",
        )
        .unwrap();

        let workspace = Workspace::load_from(temp.path()).unwrap();
        let orchestrator = workspace
            .orchestrator(BuildOptions::new(), Some("6.2.0"))
            .await
            .unwrap();

        assert_eq!(orchestrator.options().account_id.as_deref(), Some("acct-9"));
        assert!(orchestrator.options().shared_cloud);
        assert_eq!(orchestrator.local_backend().kind(), LocalBackendKind::Controller);
    }

    #[tokio::test]
    async fn test_explicit_account_wins() {
        let temp = project();
        std::fs::write(temp.path().join("nimbus.toml"), "[cloud]\naccount_id = \"acct-9\"\n").unwrap();

        let workspace = Workspace::load_from(temp.path()).unwrap();
        let orchestrator = workspace
            .orchestrator(BuildOptions::new().with_account_id("acct-1"), Some("5.0.0"))
            .await
            .unwrap();

        assert_eq!(orchestrator.options().account_id.as_deref(), Some("acct-1"));
        assert_eq!(orchestrator.local_backend().kind(), LocalBackendKind::Legacy);
    }
}
