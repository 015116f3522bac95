//! Concrete build backends
//!
//! - [`HttpCloudBuildService`]: the remote cloud build API
//! - [`CliLocalBuilder`]: the host mobile CLI, covering both local backends

mod cloud;
mod local;

pub use cloud::HttpCloudBuildService;
pub use local::CliLocalBuilder;
