//! Device error types

use std::path::PathBuf;
use thiserror::Error;

/// Result type for device operations
pub type Result<T> = std::result::Result<T, DeviceError>;

/// Device-related errors
#[derive(Debug, Error)]
pub enum DeviceError {
    /// Application package to install does not exist
    #[error("Application package not found: {0}")]
    PackageNotFound(PathBuf),

    /// API error from the emulator service
    #[error("Emulator API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DeviceError {
    /// Get exit code for CLI
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::PackageNotFound(_) => 2,
            Self::Api { .. } | Self::Http(_) => 10,
            Self::Io(_) => 7,
        }
    }
}
