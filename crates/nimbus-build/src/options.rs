//! User-facing build options
//!
//! Everything a build command can be told on the command line or through
//! the environment. The orchestrator maps these onto backend-specific shapes.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Options for a cloud or local build
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    /// Produce a release build
    pub release: bool,

    /// Build with the local toolchain when publishing
    pub local: bool,

    /// Target the simulator/emulator rather than a device (iOS)
    pub emulator: bool,

    /// Clean before building
    pub clean: bool,

    /// Bundle the app with webpack
    pub bundle: bool,

    /// Enable hot module reload
    pub hmr: bool,

    /// Produce an Android App Bundle instead of an APK
    pub aab: bool,

    /// Build on the shared cloud pool
    pub shared_cloud: bool,

    /// Account to bill cloud builds against
    pub account_id: Option<String>,

    /// Android keystore
    pub key_store_path: Option<PathBuf>,
    pub key_store_password: Option<String>,
    pub key_store_alias: Option<String>,
    pub key_store_alias_password: Option<String>,

    /// iOS signing certificate (.p12)
    pub certificate: Option<PathBuf>,
    pub certificate_password: Option<String>,

    /// iOS provisioning profile (path, or name/UUID for local builds)
    pub provision: Option<String>,

    /// iOS team ID
    pub team_id: Option<String>,

    /// Device identifier for local builds
    pub device: Option<String>,

    /// Cloud VM template (flavor)
    pub vm_template_name: Option<String>,

    /// Cloud workflow to run instead of the default build
    pub workflow: Option<Workflow>,

    /// Values passed to the bundler as `--env.<key>`
    pub env: BTreeMap<String, String>,

    /// iCloud container environment (iOS)
    pub icloud_container_environment: Option<String>,

    /// Custom platform template for legacy local builds
    pub platform_template: Option<String>,

    /// Apple application-specific password
    pub apple_application_specific_password: Option<String>,

    /// Base64-encoded Apple session, replaces interactive login
    pub apple_session_base64: Option<String>,
}

impl BuildOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_release(mut self, release: bool) -> Self {
        self.release = release;
        self
    }

    pub fn with_local(mut self, local: bool) -> Self {
        self.local = local;
        self
    }

    pub fn with_account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    pub fn with_key_store(mut self, path: impl Into<PathBuf>, password: Option<String>) -> Self {
        self.key_store_path = Some(path.into());
        self.key_store_password = password;
        self
    }

    pub fn with_certificate(mut self, path: impl Into<PathBuf>, password: Option<String>) -> Self {
        self.certificate = Some(path.into());
        self.certificate_password = password;
        self
    }

    pub fn with_provision(mut self, provision: impl Into<String>) -> Self {
        self.provision = Some(provision.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn with_apple_session(mut self, session_base64: impl Into<String>) -> Self {
        self.apple_session_base64 = Some(session_base64.into());
        self
    }
}

impl fmt::Debug for BuildOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildOptions")
            .field("release", &self.release)
            .field("local", &self.local)
            .field("emulator", &self.emulator)
            .field("clean", &self.clean)
            .field("bundle", &self.bundle)
            .field("hmr", &self.hmr)
            .field("aab", &self.aab)
            .field("shared_cloud", &self.shared_cloud)
            .field("account_id", &self.account_id)
            .field("key_store_path", &self.key_store_path)
            .field("key_store_password", &redacted(&self.key_store_password))
            .field("key_store_alias", &self.key_store_alias)
            .field(
                "key_store_alias_password",
                &redacted(&self.key_store_alias_password),
            )
            .field("certificate", &self.certificate)
            .field("certificate_password", &redacted(&self.certificate_password))
            .field("provision", &self.provision)
            .field("team_id", &self.team_id)
            .field("device", &self.device)
            .field("vm_template_name", &self.vm_template_name)
            .field("workflow", &self.workflow)
            .field("env", &self.env)
            .field(
                "icloud_container_environment",
                &self.icloud_container_environment,
            )
            .field("platform_template", &self.platform_template)
            .field(
                "apple_application_specific_password",
                &redacted(&self.apple_application_specific_password),
            )
            .field("apple_session_base64", &redacted(&self.apple_session_base64))
            .finish()
    }
}

/// Debug stand-in for an optional secret
pub fn redacted(secret: &Option<String>) -> Option<&'static str> {
    secret.as_ref().map(|_| "<redacted>")
}

/// Named cloud workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    pub name: String,
    pub url: String,
}
