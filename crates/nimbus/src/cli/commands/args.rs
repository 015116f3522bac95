//! Build flags shared by `build` and `publish`

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use clap::Args;

use nimbus_build::{BuildOptions, Workflow};

/// Options that shape a build
#[derive(Clone, Default, Args)]
pub struct BuildArgs {
    /// Produce a release build
    #[arg(long)]
    pub release: bool,

    /// Build for the simulator/emulator instead of a device (iOS)
    #[arg(long)]
    pub emulator: bool,

    /// Clean before building
    #[arg(long)]
    pub clean: bool,

    /// Bundle the app with webpack
    #[arg(long)]
    pub bundle: bool,

    /// Enable hot module reload
    #[arg(long)]
    pub hmr: bool,

    /// Produce an Android App Bundle instead of an APK
    #[arg(long)]
    pub aab: bool,

    /// Account to bill cloud builds against
    #[arg(long, env = "NIMBUS_ACCOUNT_ID")]
    pub account_id: Option<String>,

    /// Build on the shared cloud pool
    #[arg(long)]
    pub shared_cloud: bool,

    /// Cloud VM template
    #[arg(long)]
    pub vm_template: Option<String>,

    /// Cloud workflow name (requires --workflow-url)
    #[arg(long, requires = "workflow_url")]
    pub workflow_name: Option<String>,

    /// Cloud workflow URL (requires --workflow-name)
    #[arg(long, requires = "workflow_name")]
    pub workflow_url: Option<String>,

    /// Android keystore
    #[arg(long)]
    pub key_store_path: Option<PathBuf>,

    /// Android keystore password
    #[arg(long, env = "NIMBUS_KEY_STORE_PASSWORD", hide_env_values = true)]
    pub key_store_password: Option<String>,

    /// Android key alias
    #[arg(long)]
    pub key_store_alias: Option<String>,

    /// Android key alias password
    #[arg(long, env = "NIMBUS_KEY_STORE_ALIAS_PASSWORD", hide_env_values = true)]
    pub key_store_alias_password: Option<String>,

    /// iOS signing certificate (.p12)
    #[arg(long)]
    pub certificate: Option<PathBuf>,

    /// iOS certificate password
    #[arg(long, env = "NIMBUS_CERTIFICATE_PASSWORD", hide_env_values = true)]
    pub certificate_password: Option<String>,

    /// iOS provisioning profile
    #[arg(long)]
    pub provision: Option<String>,

    /// iOS team ID
    #[arg(long)]
    pub team_id: Option<String>,

    /// Target device for local builds
    #[arg(long)]
    pub device: Option<String>,

    /// iCloud container environment (iOS)
    #[arg(long)]
    pub icloud_container_environment: Option<String>,

    /// Platform template for legacy local builds
    #[arg(long)]
    pub platform_template: Option<String>,

    /// Bundler environment value, repeatable (KEY=VALUE)
    #[arg(long = "env", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub env: Vec<(String, String)>,
}

impl BuildArgs {
    pub fn to_options(&self) -> BuildOptions {
        let workflow = match (&self.workflow_name, &self.workflow_url) {
            (Some(name), Some(url)) => Some(Workflow {
                name: name.clone(),
                url: url.clone(),
            }),
            _ => None,
        };

        BuildOptions {
            release: self.release,
            local: false,
            emulator: self.emulator,
            clean: self.clean,
            bundle: self.bundle,
            hmr: self.hmr,
            aab: self.aab,
            shared_cloud: self.shared_cloud,
            account_id: self.account_id.clone(),
            key_store_path: self.key_store_path.clone(),
            key_store_password: self.key_store_password.clone(),
            key_store_alias: self.key_store_alias.clone(),
            key_store_alias_password: self.key_store_alias_password.clone(),
            certificate: self.certificate.clone(),
            certificate_password: self.certificate_password.clone(),
            provision: self.provision.clone(),
            team_id: self.team_id.clone(),
            device: self.device.clone(),
            vm_template_name: self.vm_template.clone(),
            workflow,
            env: self.env.iter().cloned().collect::<BTreeMap<_, _>>(),
            icloud_container_environment: self.icloud_container_environment.clone(),
            platform_template: self.platform_template.clone(),
            apple_application_specific_password: None,
            apple_session_base64: None,
        }
    }
}

impl fmt::Debug for BuildArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BuildArgs").field(&self.to_options()).finish()
    }
}

/// `KEY=VALUE`, or a bare `KEY` meaning `KEY=true`
fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, _)) if key.is_empty() => Err(format!("missing key in '{}'", s)),
        Some((key, value)) => Ok((key.to_string(), value.to_string())),
        None if s.is_empty() => Err("empty environment entry".to_string()),
        None => Ok((s.to_string(), "true".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: BuildArgs,
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("api=https://x?a=b").unwrap(),
            ("api".to_string(), "https://x?a=b".to_string())
        );
        assert_eq!(
            parse_key_value("production").unwrap(),
            ("production".to_string(), "true".to_string())
        );
        assert!(parse_key_value("=x").is_err());
    }

    #[test]
    fn test_to_options() {
        let harness = Harness::parse_from([
            "test",
            "--release",
            "--key-store-path",
            "keys/release.jks",
            "--env",
            "production",
            "--env",
            "api=staging",
            "--workflow-name",
            "nightly",
            "--workflow-url",
            "https://ci.example/nightly",
        ]);
        let options = harness.args.to_options();

        assert!(options.release);
        assert!(!options.local);
        assert_eq!(options.key_store_path, Some(PathBuf::from("keys/release.jks")));
        assert_eq!(options.env.len(), 2);
        assert_eq!(options.workflow.map(|w| w.name), Some("nightly".to_string()));
    }

    #[test]
    fn test_debug_hides_passwords() {
        let harness = Harness::parse_from([
            "test",
            "--key-store-password",
            "ks-secret",
            "--certificate-password",
            "p12-secret",
        ]);
        let debug = format!("{:?}", harness.args);

        assert!(!debug.contains("ks-secret"));
        assert!(!debug.contains("p12-secret"));
    }

    #[test]
    fn test_workflow_requires_both_parts() {
        let result = Harness::try_parse_from(["test", "--workflow-name", "nightly"]);
        assert!(result.is_err());
    }
}
