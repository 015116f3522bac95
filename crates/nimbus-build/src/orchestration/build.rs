//! Build orchestrator
//!
//! Regular builds always run in the cloud. Building a package for publishing
//! runs in the cloud too unless `local` is set, in which case the local
//! backend chosen at construction does the work.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument};

use nimbus_core::Platform;

use crate::credentials::{self, AppleCredentials, Prompter, PublishCredentials};
use crate::error::{BuildError, Result};
use crate::options::BuildOptions;
use crate::project::ProjectData;
use crate::request::{
    AndroidBuildData, BuildConfiguration, BuildRequest, CloudBuildOptions, IosBuildData,
    LocalBuildOptions, PackageLocation, ProjectSettings,
};
use crate::traits::CloudBuildService;

use super::config::OrchestratorConfig;
use super::{BuildServices, LocalBackend};

/// Negotiates cloud and local builds for one project
pub struct BuildOrchestrator {
    cloud: Arc<dyn CloudBuildService>,
    local: LocalBackend,
    prompter: Arc<dyn Prompter>,
    project: ProjectData,
    options: BuildOptions,
    config: OrchestratorConfig,
}

impl BuildOrchestrator {
    /// Create an orchestrator, selecting the local backend from the CLI version
    pub fn new(
        services: BuildServices,
        project: ProjectData,
        options: BuildOptions,
        config: OrchestratorConfig,
    ) -> Self {
        let kind = config.local_backend_kind();
        info!(
            cli_version = %config.cli_version,
            backend = kind.as_str(),
            "selected local build backend"
        );

        Self {
            cloud: services.cloud,
            local: services.local.select(kind),
            prompter: services.prompter,
            project,
            options,
            config,
        }
    }

    /// Local backend used for `--local` publishing builds
    pub fn local_backend(&self) -> &LocalBackend {
        &self.local
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    pub fn project(&self) -> &ProjectData {
        &self.project
    }

    /// Assemble the cloud build request for `platform`
    pub fn build_request(&self, platform: &str) -> Result<BuildRequest> {
        let platform = parse_platform(platform)?;
        info!("Building {} in the cloud", platform);

        let options = &self.options;
        let is_android = platform.is_android();
        let is_ios = platform.is_ios();

        let android = AndroidBuildData {
            path_to_certificate: if is_android {
                self.resolve_optional(options.key_store_path.as_deref())
            } else {
                String::new()
            },
            certificate_password: options
                .key_store_password
                .clone()
                .filter(|_| is_android),
            aab: is_android && options.aab,
        };

        let ios = IosBuildData {
            path_to_certificate: if is_ios {
                self.resolve_optional(options.certificate.as_deref())
            } else {
                String::new()
            },
            certificate_password: options.certificate_password.clone().filter(|_| is_ios),
            path_to_provision: if is_ios {
                self.resolve_optional(options.provision.as_deref().map(Path::new))
            } else {
                String::new()
            },
            build_for_device: !options.emulator,
        };

        let project_settings = ProjectSettings {
            nativescript_data: self.project.native_metadata()?,
            project_dir: self.project.project_dir.clone(),
            project_id: self.project.project_id(platform)?.to_string(),
            project_name: self.project.project_name.clone(),
            bundle: options.bundle,
            shared_cloud: options.shared_cloud,
            flavor_id: options.vm_template_name.clone(),
            workflow_name: options.workflow.as_ref().map(|w| w.name.clone()),
            workflow_url: options.workflow.as_ref().map(|w| w.url.clone()),
            clean: options.clean,
            env: options.env.clone(),
            use_hot_module_reload: options.hmr,
        };

        let build_configuration = if options.release {
            BuildConfiguration::Release
        } else {
            BuildConfiguration::Debug
        };

        Ok(BuildRequest {
            platform,
            project_settings,
            build_configuration,
            android,
            ios,
        })
    }

    /// Build in the cloud and return the downloaded package
    #[instrument(skip(self), fields(project = %self.project.project_name))]
    pub async fn build(&self, platform: &str, build_for_device: bool) -> Result<PathBuf> {
        let mut request = self.build_request(platform)?;
        if request.platform.is_ios() {
            request.ios.build_for_device = build_for_device;
        }

        let result = self
            .cloud
            .build(&request, self.options.account_id.as_deref(), None)
            .await?;

        info!(
            path = %result.output_file_path.display(),
            configuration = %request.build_configuration,
            "cloud build finished"
        );
        Ok(result.output_file_path)
    }

    /// Build a release package suitable for store submission
    #[instrument(skip(self), fields(project = %self.project.project_name, local = self.options.local))]
    pub async fn build_for_publishing(&self, platform: &str) -> Result<PackageLocation> {
        let resolved = parse_platform(platform)?;

        if self.options.local {
            let path = self.execute_local_build(resolved).await?;
            return Ok(PackageLocation::Path(path));
        }

        let mut request = self.build_request(platform)?;
        request.build_configuration = BuildConfiguration::Release;

        let cloud_options = CloudBuildOptions {
            should_prepare: true,
        };
        let result = self
            .cloud
            .build(
                &request,
                self.options.account_id.as_deref(),
                Some(&cloud_options),
            )
            .await?;

        Ok(match result.qr_data {
            Some(qr) => PackageLocation::Url(qr.original_url),
            None => PackageLocation::Path(result.output_file_path),
        })
    }

    /// Apple ID credentials from `args` or interactive prompts
    pub fn apple_credentials(&self, args: &[String]) -> Result<AppleCredentials> {
        credentials::apple_credentials(args, self.prompter.as_ref())
    }

    /// Publishing credentials, honoring an Apple session when one is set
    pub fn extended_apple_credentials(&self, args: &[String]) -> Result<PublishCredentials> {
        credentials::extended_apple_credentials(args, &self.options, self.prompter.as_ref())
    }

    /// Release build through the selected local backend
    async fn execute_local_build(&self, platform: Platform) -> Result<PathBuf> {
        let project_dir = self.project.project_dir.as_path();
        info!(backend = self.local.kind().as_str(), "Building {} locally", platform);

        match &self.local {
            LocalBackend::Legacy(service) => {
                let options = self.legacy_options();
                service
                    .build(platform, &options, self.platform_template())
                    .await
            }
            LocalBackend::Controller { data, controller } => {
                let mut options = self.options.clone();
                options.release = true;
                options.emulator = false;
                options.key_store_path = options
                    .key_store_path
                    .as_deref()
                    .map(|p| self.absolutize(p));

                let build_data = data.build_data(project_dir, platform, &options)?;
                debug!(
                    project_dir = %build_data.project_dir.display(),
                    release = build_data.release,
                    build_for_device = build_data.build_for_device,
                    "prepared local build data"
                );
                controller.build(&build_data).await
            }
        }
    }

    fn legacy_options(&self) -> LocalBuildOptions {
        let options = &self.options;
        LocalBuildOptions {
            release: true,
            build_for_device: true,
            clean: options.clean,
            team_id: options.team_id.clone(),
            bundle: options.bundle,
            device: options.device.clone(),
            project_dir: self.project.project_dir.clone(),
            provision: options.provision.clone(),
            key_store_alias: options.key_store_alias.clone(),
            key_store_alias_password: options.key_store_alias_password.clone(),
            key_store_password: options.key_store_password.clone(),
            key_store_path: options
                .key_store_path
                .as_deref()
                .map(|p| self.absolutize(p)),
            use_hot_module_reload: options.hmr,
            env: options.env.clone(),
            icloud_container_environment: options.icloud_container_environment.clone(),
        }
    }

    fn platform_template(&self) -> Option<&str> {
        self.options
            .platform_template
            .as_deref()
            .or(self.config.platform_template.as_deref())
    }

    /// Absolute path as a string, empty when not provided
    fn resolve_optional(&self, path: Option<&Path>) -> String {
        path.filter(|p| !p.as_os_str().is_empty())
            .map(|p| self.absolutize(p).to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn absolutize(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            normalize(path)
        } else {
            normalize(&self.config.effective_working_dir().join(path))
        }
    }
}

fn parse_platform(name: &str) -> Result<Platform> {
    Platform::parse(name).ok_or_else(|| BuildError::unsupported_platform(name))
}

/// Lexically resolve `.` and `..` without touching the filesystem
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tempfile::TempDir;

    use crate::credentials::tests::ScriptedPrompter;
    use crate::orchestration::LocalBackends;
    use crate::request::{CloudBuildResult, LocalBuildData, QrData};
    use crate::traits::{BuildController, BuildDataService, LegacyLocalBuildService};
    use crate::LocalBackendKind;

    type Calls = Arc<Mutex<Vec<String>>>;

    struct FakeCloud {
        calls: Calls,
        requests: Mutex<Vec<(BuildRequest, Option<String>, Option<CloudBuildOptions>)>>,
        qr_data: Option<QrData>,
    }

    #[async_trait]
    impl CloudBuildService for FakeCloud {
        async fn build(
            &self,
            request: &BuildRequest,
            account_id: Option<&str>,
            options: Option<&CloudBuildOptions>,
        ) -> Result<CloudBuildResult> {
            self.calls.lock().unwrap().push("cloud".to_string());
            self.requests.lock().unwrap().push((
                request.clone(),
                account_id.map(str::to_string),
                options.copied(),
            ));
            Ok(CloudBuildResult {
                output_file_path: PathBuf::from("/out/cloud/app.pkg"),
                qr_data: self.qr_data.clone(),
            })
        }
    }

    struct FakeLegacy {
        calls: Calls,
        received: Mutex<Vec<(Platform, LocalBuildOptions, Option<String>)>>,
    }

    #[async_trait]
    impl LegacyLocalBuildService for FakeLegacy {
        async fn build(
            &self,
            platform: Platform,
            options: &LocalBuildOptions,
            platform_template: Option<&str>,
        ) -> Result<PathBuf> {
            self.calls.lock().unwrap().push("legacy".to_string());
            self.received.lock().unwrap().push((
                platform,
                options.clone(),
                platform_template.map(str::to_string),
            ));
            Ok(PathBuf::from("/out/legacy/app.pkg"))
        }
    }

    struct FakeBuildData {
        calls: Calls,
        received: Mutex<Vec<BuildOptions>>,
    }

    impl BuildDataService for FakeBuildData {
        fn build_data(
            &self,
            project_dir: &Path,
            platform: Platform,
            options: &BuildOptions,
        ) -> Result<LocalBuildData> {
            self.calls.lock().unwrap().push("build_data".to_string());
            self.received.lock().unwrap().push(options.clone());
            Ok(LocalBuildData {
                project_dir: project_dir.to_path_buf(),
                platform,
                release: options.release,
                build_for_device: !options.emulator,
                clean: options.clean,
                bundle: options.bundle,
                hmr: options.hmr,
                aab: options.aab,
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

    struct FakeController {
        calls: Calls,
        received: Mutex<Vec<LocalBuildData>>,
    }

    #[async_trait]
    impl BuildController for FakeController {
        async fn build(&self, data: &LocalBuildData) -> Result<PathBuf> {
            self.calls.lock().unwrap().push("controller".to_string());
            self.received.lock().unwrap().push(data.clone());
            Ok(PathBuf::from("/out/controller/app.pkg"))
        }
    }

    struct Harness {
        _temp: TempDir,
        calls: Calls,
        cloud: Arc<FakeCloud>,
        legacy: Arc<FakeLegacy>,
        build_data: Arc<FakeBuildData>,
        controller: Arc<FakeController>,
        orchestrator: BuildOrchestrator,
    }

    fn harness(options: BuildOptions, cli_version: &str, qr_data: Option<QrData>) -> Harness {
        let temp = TempDir::new().unwrap();
        let project_dir = temp.path().join("demo");
        std::fs::create_dir_all(&project_dir).unwrap();
        std::fs::write(
            project_dir.join("package.json"),
            r#"{ "name": "demo", "nativescript": { "id": "org.demo.app" } }"#,
        )
        .unwrap();

        let calls: Calls = Arc::new(Mutex::new(Vec::new()));
        let cloud = Arc::new(FakeCloud {
            calls: Arc::clone(&calls),
            requests: Mutex::new(Vec::new()),
            qr_data,
        });
        let legacy = Arc::new(FakeLegacy {
            calls: Arc::clone(&calls),
            received: Mutex::new(Vec::new()),
        });
        let build_data = Arc::new(FakeBuildData {
            calls: Arc::clone(&calls),
            received: Mutex::new(Vec::new()),
        });
        let controller = Arc::new(FakeController {
            calls: Arc::clone(&calls),
            received: Mutex::new(Vec::new()),
        });

        let services = BuildServices {
            cloud: cloud.clone(),
            local: LocalBackends {
                legacy: legacy.clone(),
                build_data: build_data.clone(),
                controller: controller.clone(),
            },
            prompter: Arc::new(ScriptedPrompter::non_interactive()),
        };
        let config = OrchestratorConfig::new()
            .with_cli_version(cli_version)
            .with_working_dir("/work/signing");
        let project = ProjectData::load(&project_dir).unwrap();
        let orchestrator = BuildOrchestrator::new(services, project, options, config);

        Harness {
            _temp: temp,
            calls,
            cloud,
            legacy,
            build_data,
            controller,
            orchestrator,
        }
    }

    fn signing_options() -> BuildOptions {
        BuildOptions::new()
            .with_key_store("keys/release.jks", Some("ks-pass".to_string()))
            .with_certificate("certs/dist.p12", Some("cert-pass".to_string()))
            .with_provision("profiles/app.mobileprovision")
    }

    #[test]
    fn test_unsupported_platform() {
        let h = harness(BuildOptions::new(), "6.0.0", None);
        let err = h.orchestrator.build_request("windows").unwrap_err();
        assert!(matches!(err, BuildError::UnsupportedPlatform { .. }));
    }

    #[test]
    fn test_platform_name_is_case_insensitive() {
        let h = harness(BuildOptions::new(), "6.0.0", None);
        assert_eq!(h.orchestrator.build_request("ANDROID").unwrap().platform, Platform::Android);
        assert_eq!(h.orchestrator.build_request("iOS").unwrap().platform, Platform::Ios);
    }

    #[test]
    fn test_exactly_one_certificate_path_per_platform() {
        let h = harness(signing_options(), "6.0.0", None);

        let android = h.orchestrator.build_request("android").unwrap();
        assert_eq!(android.android.path_to_certificate, "/work/signing/keys/release.jks");
        assert_eq!(android.android.certificate_password.as_deref(), Some("ks-pass"));
        assert_eq!(android.ios.path_to_certificate, "");
        assert_eq!(android.ios.path_to_provision, "");

        let ios = h.orchestrator.build_request("ios").unwrap();
        assert_eq!(ios.ios.path_to_certificate, "/work/signing/certs/dist.p12");
        assert_eq!(ios.ios.certificate_password.as_deref(), Some("cert-pass"));
        assert_eq!(ios.ios.path_to_provision, "/work/signing/profiles/app.mobileprovision");
        assert_eq!(ios.android.path_to_certificate, "");
    }

    #[test]
    fn test_missing_paths_are_empty_strings() {
        let h = harness(BuildOptions::new(), "6.0.0", None);
        for platform in ["android", "ios"] {
            let request = h.orchestrator.build_request(platform).unwrap();
            assert_eq!(request.certificate_path(), "");
            assert_eq!(request.ios.path_to_provision, "");
        }
    }

    #[test]
    fn test_absolute_paths_are_normalized() {
        let options = BuildOptions::new().with_key_store("/keys/../secure/./release.jks", None);
        let h = harness(options, "6.0.0", None);

        let request = h.orchestrator.build_request("android").unwrap();
        assert_eq!(request.android.path_to_certificate, "/secure/release.jks");
    }

    #[test]
    fn test_request_project_settings() {
        let mut options = BuildOptions::new().with_env("production", "true");
        options.bundle = true;
        options.vm_template_name = Some("xcode-11".to_string());
        let h = harness(options, "6.0.0", None);

        let request = h.orchestrator.build_request("ios").unwrap();
        let settings = &request.project_settings;
        assert_eq!(settings.project_id, "org.demo.app");
        assert_eq!(settings.project_name, "demo");
        assert_eq!(settings.nativescript_data["id"], "org.demo.app");
        assert_eq!(settings.flavor_id.as_deref(), Some("xcode-11"));
        assert!(settings.bundle);
        assert_eq!(settings.env.get("production").map(String::as_str), Some("true"));
    }

    #[test]
    fn test_build_configuration_follows_release_flag() {
        let h = harness(BuildOptions::new(), "6.0.0", None);
        assert_eq!(
            h.orchestrator.build_request("android").unwrap().build_configuration,
            BuildConfiguration::Debug
        );

        let h = harness(BuildOptions::new().with_release(true), "6.0.0", None);
        assert_eq!(
            h.orchestrator.build_request("android").unwrap().build_configuration,
            BuildConfiguration::Release
        );
    }

    #[test]
    fn test_build_for_device_defaults_to_not_emulator() {
        let mut options = BuildOptions::new();
        options.emulator = true;
        let h = harness(options, "6.0.0", None);

        assert!(!h.orchestrator.build_request("ios").unwrap().ios.build_for_device);
    }

    #[tokio::test]
    async fn test_build_goes_to_cloud_with_device_override() {
        let h = harness(BuildOptions::new().with_account_id("acct-1"), "6.0.0", None);

        let path = h.orchestrator.build("ios", false).await.unwrap();
        assert_eq!(path, PathBuf::from("/out/cloud/app.pkg"));

        let requests = h.cloud.requests.lock().unwrap();
        let (request, account_id, options) = &requests[0];
        assert!(!request.ios.build_for_device);
        assert_eq!(account_id.as_deref(), Some("acct-1"));
        assert!(options.is_none());
    }

    #[tokio::test]
    async fn test_build_ignores_local_flag() {
        let h = harness(BuildOptions::new().with_local(true), "6.0.0", None);

        h.orchestrator.build("android", true).await.unwrap();
        assert_eq!(*h.calls.lock().unwrap(), vec!["cloud"]);
    }

    #[tokio::test]
    async fn test_publishing_forces_release_and_prepare() {
        let h = harness(BuildOptions::new().with_release(false), "6.0.0", None);

        let location = h.orchestrator.build_for_publishing("android").await.unwrap();
        assert_eq!(location, PackageLocation::Path(PathBuf::from("/out/cloud/app.pkg")));

        let requests = h.cloud.requests.lock().unwrap();
        let (request, _, options) = &requests[0];
        assert_eq!(request.build_configuration, BuildConfiguration::Release);
        assert_eq!(options.map(|o| o.should_prepare), Some(true));
    }

    #[tokio::test]
    async fn test_publishing_returns_url_when_qr_data_present() {
        let qr = QrData {
            original_url: "https://cdn.nimbus.dev/app.ipa".to_string(),
            image_data: None,
        };
        let h = harness(BuildOptions::new(), "6.0.0", Some(qr));

        let location = h.orchestrator.build_for_publishing("ios").await.unwrap();
        assert_eq!(location, PackageLocation::Url("https://cdn.nimbus.dev/app.ipa".to_string()));
    }

    #[tokio::test]
    async fn test_publishing_rejects_unsupported_platform_before_building() {
        let h = harness(BuildOptions::new().with_local(true), "6.0.0", None);

        let err = h.orchestrator.build_for_publishing("web").await.unwrap_err();
        assert!(matches!(err, BuildError::UnsupportedPlatform { .. }));
        assert!(h.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_local_publishing_uses_legacy_for_old_cli() {
        let mut options = signing_options().with_local(true);
        options.platform_template = Some("tns-android@5.3.0".to_string());
        let h = harness(options, "5.3.1", None);
        assert_eq!(h.orchestrator.local_backend().kind(), LocalBackendKind::Legacy);

        let location = h.orchestrator.build_for_publishing("android").await.unwrap();
        assert_eq!(location, PackageLocation::Path(PathBuf::from("/out/legacy/app.pkg")));
        assert_eq!(*h.calls.lock().unwrap(), vec!["legacy"]);

        let received = h.legacy.received.lock().unwrap();
        let (platform, options, template) = &received[0];
        assert_eq!(*platform, Platform::Android);
        assert!(options.release);
        assert!(options.build_for_device);
        assert_eq!(
            options.key_store_path,
            Some(PathBuf::from("/work/signing/keys/release.jks"))
        );
        assert_eq!(template.as_deref(), Some("tns-android@5.3.0"));
    }

    #[tokio::test]
    async fn test_local_publishing_uses_controller_for_new_cli() {
        let mut options = BuildOptions::new().with_local(true);
        options.emulator = true;
        let h = harness(options, "6.1.0", None);
        assert_eq!(h.orchestrator.local_backend().kind(), LocalBackendKind::Controller);

        let location = h.orchestrator.build_for_publishing("ios").await.unwrap();
        assert_eq!(location, PackageLocation::Path(PathBuf::from("/out/controller/app.pkg")));
        assert_eq!(*h.calls.lock().unwrap(), vec!["build_data", "controller"]);

        let data = &h.controller.received.lock().unwrap()[0];
        assert!(data.release);
        assert!(data.build_for_device);
        assert_eq!(data.platform, Platform::Ios);
        assert!(h.build_data.received.lock().unwrap()[0].release);
    }

    #[tokio::test]
    async fn test_prerelease_cli_below_threshold_uses_legacy() {
        let h = harness(BuildOptions::new().with_local(true), "5.4.0-2019-05-16-13276", None);

        h.orchestrator.build_for_publishing("ios").await.unwrap();
        assert_eq!(*h.calls.lock().unwrap(), vec!["legacy"]);
    }

    #[test]
    fn test_apple_credentials_from_args() {
        let h = harness(BuildOptions::new(), "6.0.0", None);
        let args = vec!["u".to_string(), "p".to_string()];

        let credentials = h.orchestrator.apple_credentials(&args).unwrap();
        assert_eq!(credentials.username, "u");
        assert_eq!(credentials.password, "p");
    }

    #[test]
    fn test_extended_credentials_non_interactive_without_args() {
        let h = harness(BuildOptions::new().with_apple_session(""), "6.0.0", None);

        let err = h.orchestrator.extended_apple_credentials(&[]).unwrap_err();
        assert!(matches!(err, BuildError::InteractiveInputRequired { .. }));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("/a/b/")), PathBuf::from("/a/b"));
    }
}
