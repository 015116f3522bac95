//! Host CLI compatibility gate
//!
//! Host CLI builds older than the thresholds only ship the legacy local
//! build service; newer ones provide the build-data service and build
//! controller instead. Prerelease CLI builds follow a different cadence from
//! stable releases, so each has its own threshold.

use semver::{BuildMetadata, Prerelease, Version};
use tracing::debug;

use nimbus_core::config::CompatConfig;
use nimbus_core::ConfigError;

/// Which local build backend the host CLI supports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalBackendKind {
    /// The legacy local build service
    Legacy,
    /// The build-data service and build controller pair
    Controller,
}

impl LocalBackendKind {
    /// Select the backend for a host CLI version.
    ///
    /// Unparseable versions select [`LocalBackendKind::Legacy`].
    pub fn resolve(cli_version: &str, thresholds: &CompatThresholds) -> Self {
        let Some(current) = parse_cli_version(cli_version) else {
            debug!(cli_version, "unparseable CLI version, using legacy local build service");
            return Self::Legacy;
        };

        let threshold = if current.pre.is_empty() {
            &thresholds.stable
        } else {
            &thresholds.prerelease
        };

        let kind = if current < *threshold {
            Self::Legacy
        } else {
            Self::Controller
        };
        debug!(cli_version, %threshold, ?kind, "resolved local build backend");
        kind
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::Controller => "controller",
        }
    }
}

/// Versions at which the host CLI switched to the build controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompatThresholds {
    /// Compared against prerelease CLI versions
    pub prerelease: Version,
    /// Compared against stable CLI versions
    pub stable: Version,
}

impl CompatThresholds {
    pub fn new(prerelease: Version, stable: Version) -> Self {
        Self { prerelease, stable }
    }

    /// Parse thresholds from the `compat` config section
    pub fn from_config(config: &CompatConfig) -> Result<Self, ConfigError> {
        let prerelease = Version::parse(&config.prerelease_threshold)
            .map_err(|e| ConfigError::invalid("compat.prerelease_threshold", e.to_string()))?;
        let stable = Version::parse(&config.stable_threshold)
            .map_err(|e| ConfigError::invalid("compat.stable_threshold", e.to_string()))?;
        Ok(Self { prerelease, stable })
    }
}

impl Default for CompatThresholds {
    fn default() -> Self {
        Self {
            prerelease: Version {
                major: 5,
                minor: 4,
                patch: 0,
                pre: Prerelease::new("2019-05-16-13277").expect("valid prerelease identifier"),
                build: BuildMetadata::EMPTY,
            },
            stable: Version::new(6, 0, 0),
        }
    }
}

/// Lenient version parsing: surrounding whitespace and a leading `v` or `=`
/// are accepted, build metadata is ignored for ordering.
fn parse_cli_version(raw: &str) -> Option<Version> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix(['=', 'v']).unwrap_or(trimmed);
    let mut version = Version::parse(trimmed).ok()?;
    version.build = BuildMetadata::EMPTY;
    Some(version)
}
