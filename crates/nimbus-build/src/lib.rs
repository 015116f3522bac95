//! Nimbus Build - Cloud and local build orchestration for mobile projects
//!
//! The [`BuildOrchestrator`] turns a platform name and a set of
//! [`BuildOptions`] into a normalized [`BuildRequest`] and hands it to a
//! build backend:
//!
//! - the remote cloud build service for regular builds, or
//! - a local backend when building a release package with `--local`.
//!
//! Two local backends exist because older host CLIs only ship the legacy
//! local build service while newer ones expose a build-data service and a
//! build controller. Which one is used is decided once, from the host CLI
//! version, when the orchestrator is constructed.
//!
//! All collaborators are injected as trait objects through
//! [`BuildServices`]; [`backends`] provides HTTP and process-based
//! implementations.

pub mod backends;
pub mod compat;
pub mod credentials;
pub mod error;
pub mod options;
pub mod orchestration;
pub mod output;
pub mod project;
pub mod request;
pub mod traits;

pub use compat::{CompatThresholds, LocalBackendKind};
pub use credentials::{AppleCredentials, Prompter, PublishCredentials};
pub use error::{BuildError, Result};
pub use options::{BuildOptions, Workflow};
pub use orchestration::{BuildOrchestrator, BuildServices, LocalBackend, LocalBackends, OrchestratorConfig};
pub use output::{Output, OutputFormat};
pub use project::ProjectData;
pub use request::{
    AndroidBuildData, BuildConfiguration, BuildRequest, CloudBuildOptions, CloudBuildResult,
    IosBuildData, LocalBuildData, LocalBuildOptions, PackageLocation, ProjectSettings, QrData,
};
pub use traits::{BuildController, BuildDataService, CloudBuildService, LegacyLocalBuildService};
