//! Configuration types

use serde::{Deserialize, Serialize};

use super::defaults::*;

/// Main configuration for Nimbus
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote build service settings
    pub cloud: CloudConfig,

    /// Local toolchain settings
    pub local: LocalConfig,

    /// Host CLI compatibility thresholds
    pub compat: CompatConfig,

    /// Cloud emulator settings
    pub emulator: EmulatorConfig,
}

/// Remote build service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    /// Base URL of the build API
    pub endpoint: String,

    /// Account to bill builds against
    pub account_id: Option<String>,

    /// Name of the environment variable holding the API token
    pub token_env: String,

    /// Build on the shared cloud pool
    pub shared_cloud: bool,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_CLOUD_ENDPOINT.to_string(),
            account_id: None,
            token_env: DEFAULT_TOKEN_ENV.to_string(),
            shared_cloud: false,
        }
    }
}

impl CloudConfig {
    /// Read the API token from the configured environment variable
    pub fn token(&self) -> Option<String> {
        std::env::var(&self.token_env).ok().filter(|t| !t.is_empty())
    }
}

/// Local toolchain configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalConfig {
    /// Host mobile CLI executable
    pub command: String,

    /// Platform template passed to legacy local builds
    pub platform_template: Option<String>,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            command: DEFAULT_LOCAL_COMMAND.to_string(),
            platform_template: None,
        }
    }
}

/// Version thresholds deciding which local build backend the host CLI supports.
///
/// Prerelease CLI builds are compared against `prerelease_threshold`, stable
/// ones against `stable_threshold`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompatConfig {
    pub prerelease_threshold: String,
    pub stable_threshold: String,
}

impl Default for CompatConfig {
    fn default() -> Self {
        Self {
            prerelease_threshold: DEFAULT_PRERELEASE_THRESHOLD.to_string(),
            stable_threshold: DEFAULT_STABLE_THRESHOLD.to_string(),
        }
    }
}

/// Cloud emulator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmulatorConfig {
    /// Base URL of the emulator control API
    pub endpoint: String,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_EMULATOR_ENDPOINT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str("[cloud]\naccount_id = \"acme\"\n").unwrap();
        assert_eq!(config.cloud.account_id.as_deref(), Some("acme"));
        assert_eq!(config.cloud.endpoint, DEFAULT_CLOUD_ENDPOINT);
        assert_eq!(config.local.command, "ns");
        assert_eq!(config.compat.stable_threshold, "6.0.0");
    }

    #[test]
    fn test_template_parses_to_defaults() {
        let config: Config = toml::from_str(DEFAULT_CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.compat.prerelease_threshold, DEFAULT_PRERELEASE_THRESHOLD);
        assert_eq!(config.emulator.endpoint, DEFAULT_EMULATOR_ENDPOINT);
        assert!(!config.cloud.shared_cloud);
    }
}
