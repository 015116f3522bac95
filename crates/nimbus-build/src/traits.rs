//! Collaborator traits for build backends
//!
//! The orchestrator never talks to a toolchain or a remote service directly.
//! Every backend is one of these traits, injected through
//! [`BuildServices`](crate::BuildServices).

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use nimbus_core::Platform;

use crate::error::Result;
use crate::options::BuildOptions;
use crate::request::{BuildRequest, CloudBuildOptions, CloudBuildResult, LocalBuildData, LocalBuildOptions};

/// Remote build service
#[async_trait]
pub trait CloudBuildService: Send + Sync {
    /// Run `request` in the cloud and fetch the produced package
    async fn build(
        &self,
        request: &BuildRequest,
        account_id: Option<&str>,
        options: Option<&CloudBuildOptions>,
    ) -> Result<CloudBuildResult>;
}

/// Local build service shipped by older host CLIs
#[async_trait]
pub trait LegacyLocalBuildService: Send + Sync {
    /// Build locally and return the produced package path
    async fn build(
        &self,
        platform: Platform,
        options: &LocalBuildOptions,
        platform_template: Option<&str>,
    ) -> Result<PathBuf>;
}

/// Turns generic build options into [`LocalBuildData`] for the controller
pub trait BuildDataService: Send + Sync {
    fn build_data(
        &self,
        project_dir: &Path,
        platform: Platform,
        options: &BuildOptions,
    ) -> Result<LocalBuildData>;
}

/// Local build controller shipped by newer host CLIs
#[async_trait]
pub trait BuildController: Send + Sync {
    /// Build locally and return the produced package path
    async fn build(&self, data: &LocalBuildData) -> Result<PathBuf>;
}
