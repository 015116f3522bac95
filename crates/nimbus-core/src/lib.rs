//! Nimbus Core - Shared foundation for the Nimbus build tooling
//!
//! This crate provides the platform type, error handling and configuration
//! layer used by the build orchestrator, the device adapters and the CLI.

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{ConfigError, NimbusError, Result};
pub use types::Platform;
