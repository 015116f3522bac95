//! Local builds through the host mobile CLI
//!
//! [`CliLocalBuilder`] implements both local backends. Older CLIs are driven
//! through [`LegacyLocalBuildService`]; newer ones through the
//! [`BuildDataService`] and [`BuildController`] pair. Either way the package
//! is located under `platforms/<platform>/` after the CLI exits.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use nimbus_core::config::LocalConfig;
use nimbus_core::Platform;

use crate::error::{BuildError, Result};
use crate::options::BuildOptions;
use crate::request::{LocalBuildData, LocalBuildOptions};
use crate::traits::{BuildController, BuildDataService, LegacyLocalBuildService};

const INSTALL_HINT: &str = "Install the host CLI with `npm install -g nativescript`";

/// Arguments whose value must never reach logs or error messages
const SECRET_FLAGS: [&str; 2] = ["--key-store-password", "--key-store-alias-password"];

/// Drives the host mobile CLI
#[derive(Debug, Clone)]
pub struct CliLocalBuilder {
    command: String,
}

impl CliLocalBuilder {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn from_config(config: &LocalConfig) -> Self {
        Self::new(&config.command)
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Version reported by `<command> --version`
    pub async fn detect_version(&self) -> Result<String> {
        let program = self.resolve()?;
        let output = Command::new(&program).arg("--version").output().await?;

        if !output.status.success() {
            return Err(BuildError::CommandFailed {
                command: format!("{} --version", self.command),
                exit_code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        // Update notices may precede the version
        let stdout = String::from_utf8_lossy(&output.stdout);
        let version = stdout
            .lines()
            .map(str::trim)
            .rev()
            .find(|l| !l.is_empty())
            .unwrap_or_default()
            .to_string();

        debug!(command = %self.command, %version, "detected CLI version");
        Ok(version)
    }

    fn resolve(&self) -> Result<PathBuf> {
        which::which(&self.command)
            .map_err(|_| BuildError::tool_not_found(&self.command, INSTALL_HINT))
    }

    async fn run(&self, args: &[String], project_dir: &Path) -> Result<()> {
        let program = self.resolve()?;
        let shown = display_command(&self.command, args);
        info!(command = %shown, "Running local build");

        let output = Command::new(&program)
            .args(args)
            .current_dir(project_dir)
            .output()
            .await
            .map_err(|e| BuildError::CommandFailed {
                command: shown.clone(),
                exit_code: None,
                stderr: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(BuildError::CommandFailed {
                command: shown,
                exit_code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl LegacyLocalBuildService for CliLocalBuilder {
    async fn build(
        &self,
        platform: Platform,
        options: &LocalBuildOptions,
        platform_template: Option<&str>,
    ) -> Result<PathBuf> {
        let args = legacy_args(platform, options, platform_template);
        self.run(&args, &options.project_dir).await?;
        find_package(&options.project_dir, platform, false)
    }
}

impl BuildDataService for CliLocalBuilder {
    fn build_data(
        &self,
        project_dir: &Path,
        platform: Platform,
        options: &BuildOptions,
    ) -> Result<LocalBuildData> {
        Ok(LocalBuildData {
            project_dir: project_dir.to_path_buf(),
            platform,
            release: options.release,
            build_for_device: !options.emulator,
            clean: options.clean,
            bundle: options.bundle,
            hmr: options.hmr,
            aab: platform.is_android() && options.aab,
            env: options.env.clone(),
            device: options.device.clone(),
            team_id: options.team_id.clone(),
            provision: options.provision.clone(),
            key_store_path: options.key_store_path.clone(),
            key_store_password: options.key_store_password.clone(),
            key_store_alias: options.key_store_alias.clone(),
            key_store_alias_password: options.key_store_alias_password.clone(),
            icloud_container_environment: options.icloud_container_environment.clone(),
        })
    }
}

#[async_trait]
impl BuildController for CliLocalBuilder {
    async fn build(&self, data: &LocalBuildData) -> Result<PathBuf> {
        let args = controller_args(data);
        self.run(&args, &data.project_dir).await?;
        find_package(&data.project_dir, data.platform, data.aab)
    }
}

/// Command-line argument accumulator
struct Args(Vec<String>);

impl Args {
    fn build(platform: Platform) -> Self {
        Self(vec!["build".to_string(), platform.as_str().to_string()])
    }

    fn flag(&mut self, name: &str, enabled: bool) -> &mut Self {
        if enabled {
            self.0.push(name.to_string());
        }
        self
    }

    fn value(&mut self, name: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.0.push(name.to_string());
            self.0.push(value.to_string());
        }
        self
    }

    fn path(&mut self, name: &str, value: Option<&Path>) -> &mut Self {
        let value = value.map(|p| p.to_string_lossy().into_owned());
        self.value(name, value.as_deref())
    }

    fn env<'a>(&mut self, env: impl IntoIterator<Item = (&'a String, &'a String)>) -> &mut Self {
        for (key, value) in env {
            self.0.push(format!("--env.{}={}", key, value));
        }
        self
    }

    fn finish(&mut self) -> Vec<String> {
        std::mem::take(&mut self.0)
    }
}

fn legacy_args(
    platform: Platform,
    options: &LocalBuildOptions,
    platform_template: Option<&str>,
) -> Vec<String> {
    let mut args = Args::build(platform);
    args.path("--path", Some(options.project_dir.as_path()))
        .flag("--release", options.release)
        .flag("--for-device", options.build_for_device)
        .flag("--clean", options.clean)
        .flag("--bundle", options.bundle)
        .flag("--hmr", options.use_hot_module_reload)
        .value("--device", options.device.as_deref())
        .value("--team-id", options.team_id.as_deref())
        .value("--provision", options.provision.as_deref())
        .path("--key-store-path", options.key_store_path.as_deref())
        .value("--key-store-password", options.key_store_password.as_deref())
        .value("--key-store-alias", options.key_store_alias.as_deref())
        .value("--key-store-alias-password", options.key_store_alias_password.as_deref())
        .value(
            "--icloud-container-environment",
            options.icloud_container_environment.as_deref(),
        )
        .value("--platform-template", platform_template)
        .env(&options.env)
        .finish()
}

fn controller_args(data: &LocalBuildData) -> Vec<String> {
    let mut args = Args::build(data.platform);
    args.path("--path", Some(data.project_dir.as_path()))
        .flag("--release", data.release)
        .flag("--for-device", data.build_for_device)
        .flag("--clean", data.clean)
        .flag("--bundle", data.bundle)
        .flag("--hmr", data.hmr)
        .flag("--aab", data.aab)
        .value("--device", data.device.as_deref())
        .value("--team-id", data.team_id.as_deref())
        .value("--provision", data.provision.as_deref())
        .path("--key-store-path", data.key_store_path.as_deref())
        .value("--key-store-password", data.key_store_password.as_deref())
        .value("--key-store-alias", data.key_store_alias.as_deref())
        .value("--key-store-alias-password", data.key_store_alias_password.as_deref())
        .value(
            "--icloud-container-environment",
            data.icloud_container_environment.as_deref(),
        )
        .env(&data.env)
        .finish()
}

/// Command line with secret values masked
fn display_command(command: &str, args: &[String]) -> String {
    let mut parts = vec![command.to_string()];
    let mut mask_next = false;
    for arg in args {
        if mask_next {
            parts.push("***".to_string());
        } else {
            parts.push(arg.clone());
        }
        mask_next = SECRET_FLAGS.contains(&arg.as_str());
    }
    parts.join(" ")
}

/// Newest package for `platform` under `<project_dir>/platforms/<platform>`
fn find_package(project_dir: &Path, platform: Platform, aab: bool) -> Result<PathBuf> {
    let root = project_dir.join("platforms").join(platform.as_str());
    let extension = match platform {
        Platform::Android if aab => "aab",
        Platform::Android => "apk",
        Platform::Ios => "ipa",
    };

    fn walk(dir: &Path, ext: &str, results: &mut Vec<PathBuf>, depth: usize) {
        if depth > 8 {
            return;
        }
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    // Packages downloaded from the cloud are not local build output
                    if depth == 0 && path.file_name().map(|n| n == "cloud").unwrap_or(false) {
                        continue;
                    }
                    walk(&path, ext, results, depth + 1);
                } else if path.extension().map(|e| e == ext).unwrap_or(false) {
                    results.push(path);
                }
            }
        }
    }

    let mut results = Vec::new();
    walk(&root, extension, &mut results, 0);

    let modified = |path: &PathBuf| {
        std::fs::metadata(path)
            .and_then(|m| m.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH)
    };

    results
        .into_iter()
        .max_by_key(modified)
        .ok_or(BuildError::ArtifactNotFound {
            expected_path: root,
        })
}
