//! Build orchestration
//!
//! [`BuildOrchestrator`] assembles build requests and routes them to the
//! cloud or to the local backend selected for the host CLI.

mod build;
mod config;

pub use build::BuildOrchestrator;
pub use config::OrchestratorConfig;

use std::sync::Arc;

use crate::compat::LocalBackendKind;
use crate::credentials::Prompter;
use crate::traits::{BuildController, BuildDataService, CloudBuildService, LegacyLocalBuildService};

/// Collaborators the orchestrator delegates to
#[derive(Clone)]
pub struct BuildServices {
    pub cloud: Arc<dyn CloudBuildService>,
    pub local: LocalBackends,
    pub prompter: Arc<dyn Prompter>,
}

/// Every available local backend; only one is used per orchestrator
#[derive(Clone)]
pub struct LocalBackends {
    pub legacy: Arc<dyn LegacyLocalBuildService>,
    pub build_data: Arc<dyn BuildDataService>,
    pub controller: Arc<dyn BuildController>,
}

impl LocalBackends {
    /// Pick the backend for `kind`
    pub fn select(&self, kind: LocalBackendKind) -> LocalBackend {
        match kind {
            LocalBackendKind::Legacy => LocalBackend::Legacy(Arc::clone(&self.legacy)),
            LocalBackendKind::Controller => LocalBackend::Controller {
                data: Arc::clone(&self.build_data),
                controller: Arc::clone(&self.controller),
            },
        }
    }
}

/// The local backend an orchestrator builds with
#[derive(Clone)]
pub enum LocalBackend {
    Legacy(Arc<dyn LegacyLocalBuildService>),
    Controller {
        data: Arc<dyn BuildDataService>,
        controller: Arc<dyn BuildController>,
    },
}

impl LocalBackend {
    pub fn kind(&self) -> LocalBackendKind {
        match self {
            Self::Legacy(_) => LocalBackendKind::Legacy,
            Self::Controller { .. } => LocalBackendKind::Controller,
        }
    }
}

impl std::fmt::Debug for LocalBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("LocalBackend").field(&self.kind()).finish()
    }
}
