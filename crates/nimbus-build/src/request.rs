//! Build request model
//!
//! A [`BuildRequest`] is assembled fresh for every build and is never mutated
//! once handed to a backend. It serializes to the camelCase JSON the cloud
//! build API expects.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use nimbus_core::Platform;

use crate::options::redacted;

/// Debug or release designation for a build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BuildConfiguration {
    #[default]
    Debug,
    Release,
}

impl BuildConfiguration {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "Debug",
            Self::Release => "Release",
        }
    }

    pub fn is_release(&self) -> bool {
        matches!(self, Self::Release)
    }
}

impl fmt::Display for BuildConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Project-level settings sent with every cloud build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSettings {
    /// The `nativescript` section of the project's package.json
    pub nativescript_data: serde_json::Value,
    pub project_dir: PathBuf,
    pub project_id: String,
    pub project_name: String,
    pub bundle: bool,
    pub shared_cloud: bool,
    pub flavor_id: Option<String>,
    pub workflow_name: Option<String>,
    pub workflow_url: Option<String>,
    pub clean: bool,
    pub env: BTreeMap<String, String>,
    pub use_hot_module_reload: bool,
}

/// Android signing and packaging data
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AndroidBuildData {
    /// Absolute keystore path, empty when not set or not an Android build
    pub path_to_certificate: String,
    pub certificate_password: Option<String>,
    pub aab: bool,
}

/// iOS signing data
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IosBuildData {
    /// Absolute certificate path, empty when not set or not an iOS build
    pub path_to_certificate: String,
    pub certificate_password: Option<String>,
    /// Absolute provisioning profile path, empty when not set
    pub path_to_provision: String,
    pub build_for_device: bool,
}

impl fmt::Debug for AndroidBuildData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AndroidBuildData")
            .field("path_to_certificate", &self.path_to_certificate)
            .field("certificate_password", &redacted(&self.certificate_password))
            .field("aab", &self.aab)
            .finish()
    }
}

impl fmt::Debug for IosBuildData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IosBuildData")
            .field("path_to_certificate", &self.path_to_certificate)
            .field("certificate_password", &redacted(&self.certificate_password))
            .field("path_to_provision", &self.path_to_provision)
            .field("build_for_device", &self.build_for_device)
            .finish()
    }
}

/// Normalized description of one build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRequest {
    pub platform: Platform,
    pub project_settings: ProjectSettings,
    pub build_configuration: BuildConfiguration,
    #[serde(rename = "androidBuildData")]
    pub android: AndroidBuildData,
    #[serde(rename = "iOSBuildData")]
    pub ios: IosBuildData,
}

impl BuildRequest {
    /// The certificate path relevant to this request's platform
    pub fn certificate_path(&self) -> &str {
        match self.platform {
            Platform::Android => &self.android.path_to_certificate,
            Platform::Ios => &self.ios.path_to_certificate,
        }
    }
}

/// Extra switches for a cloud build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudBuildOptions {
    /// Run the project's prepare step before building
    pub should_prepare: bool,
}

/// Result reported by the cloud build service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudBuildResult {
    pub output_file_path: PathBuf,
    pub qr_data: Option<QrData>,
}

/// Installable-build QR code information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrData {
    /// URL the package can be installed from
    pub original_url: String,
    /// Rendered QR code image, if the service provides one
    #[serde(default)]
    pub image_data: Option<String>,
}

/// Options in the shape the legacy local build service takes
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalBuildOptions {
    pub release: bool,
    pub build_for_device: bool,
    pub clean: bool,
    pub team_id: Option<String>,
    pub bundle: bool,
    pub device: Option<String>,
    pub project_dir: PathBuf,
    pub provision: Option<String>,
    pub key_store_alias: Option<String>,
    pub key_store_alias_password: Option<String>,
    pub key_store_password: Option<String>,
    pub key_store_path: Option<PathBuf>,
    pub use_hot_module_reload: bool,
    pub env: BTreeMap<String, String>,
    pub icloud_container_environment: Option<String>,
}

/// Build data produced by the build-data service for the build controller
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalBuildData {
    pub project_dir: PathBuf,
    pub platform: Platform,
    pub release: bool,
    pub build_for_device: bool,
    pub clean: bool,
    pub bundle: bool,
    pub hmr: bool,
    pub aab: bool,
    pub env: BTreeMap<String, String>,
    pub device: Option<String>,
    pub team_id: Option<String>,
    pub provision: Option<String>,
    pub key_store_path: Option<PathBuf>,
    pub key_store_password: Option<String>,
    pub key_store_alias: Option<String>,
    pub key_store_alias_password: Option<String>,
    pub icloud_container_environment: Option<String>,
}

impl fmt::Debug for LocalBuildOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalBuildOptions")
            .field("release", &self.release)
            .field("build_for_device", &self.build_for_device)
            .field("clean", &self.clean)
            .field("team_id", &self.team_id)
            .field("bundle", &self.bundle)
            .field("device", &self.device)
            .field("project_dir", &self.project_dir)
            .field("provision", &self.provision)
            .field("key_store_alias", &self.key_store_alias)
            .field(
                "key_store_alias_password",
                &redacted(&self.key_store_alias_password),
            )
            .field("key_store_password", &redacted(&self.key_store_password))
            .field("key_store_path", &self.key_store_path)
            .field("use_hot_module_reload", &self.use_hot_module_reload)
            .field("env", &self.env)
            .field(
                "icloud_container_environment",
                &self.icloud_container_environment,
            )
            .finish()
    }
}

impl fmt::Debug for LocalBuildData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalBuildData")
            .field("project_dir", &self.project_dir)
            .field("platform", &self.platform)
            .field("release", &self.release)
            .field("build_for_device", &self.build_for_device)
            .field("clean", &self.clean)
            .field("bundle", &self.bundle)
            .field("hmr", &self.hmr)
            .field("aab", &self.aab)
            .field("env", &self.env)
            .field("device", &self.device)
            .field("team_id", &self.team_id)
            .field("provision", &self.provision)
            .field("key_store_path", &self.key_store_path)
            .field("key_store_password", &redacted(&self.key_store_password))
            .field("key_store_alias", &self.key_store_alias)
            .field(
                "key_store_alias_password",
                &redacted(&self.key_store_alias_password),
            )
            .field(
                "icloud_container_environment",
                &self.icloud_container_environment,
            )
            .finish()
    }
}

/// Where a package built for publishing ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageLocation {
    /// Remote URL the package can be installed from
    Url(String),
    /// Local file
    Path(PathBuf),
}

impl fmt::Display for PackageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => f.write_str(url),
            Self::Path(path) => write!(f, "{}", path.display()),
        }
    }
}
