//! Default configuration values

/// Default configuration file name (TOML)
pub const DEFAULT_CONFIG_TOML: &str = "nimbus.toml";

/// Default configuration file name (YAML)
pub const DEFAULT_CONFIG_YAML: &str = "nimbus.yaml";

/// Default cloud build API endpoint
pub const DEFAULT_CLOUD_ENDPOINT: &str = "https://cloud.nimbus.dev";

/// Default cloud emulator API endpoint
pub const DEFAULT_EMULATOR_ENDPOINT: &str = "https://emulators.nimbus.dev";

/// Environment variable holding the cloud API token
pub const DEFAULT_TOKEN_ENV: &str = "NIMBUS_CLOUD_TOKEN";

/// Host mobile CLI used for local builds
pub const DEFAULT_LOCAL_COMMAND: &str = "ns";

/// First prerelease CLI build that ships the build controller
pub const DEFAULT_PRERELEASE_THRESHOLD: &str = "5.4.0-2019-05-16-13277";

/// First stable CLI release that ships the build controller
pub const DEFAULT_STABLE_THRESHOLD: &str = "6.0.0";

/// Get list of config file names to search for
pub fn config_file_names() -> Vec<&'static str> {
    vec![
        DEFAULT_CONFIG_TOML,
        DEFAULT_CONFIG_YAML,
        ".nimbus.toml",
        ".nimbus.yaml",
    ]
}

/// Default configuration template
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# Nimbus Configuration

[cloud]
endpoint = "https://cloud.nimbus.dev"
token_env = "NIMBUS_CLOUD_TOKEN"
shared_cloud = false

[local]
command = "ns"

[compat]
prerelease_threshold = "5.4.0-2019-05-16-13277"
stable_threshold = "6.0.0"

[emulator]
endpoint = "https://emulators.nimbus.dev"
"#;
