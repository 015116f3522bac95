//! Error types for build orchestration

use std::path::PathBuf;
use thiserror::Error;

use nimbus_core::Platform;

/// Result type for build operations
pub type Result<T> = std::result::Result<T, BuildError>;

/// Build orchestration errors
#[derive(Error, Debug)]
pub enum BuildError {
    /// Platform name is not one of the supported mobile platforms
    #[error("Currently only {supported} platforms are supported, got '{platform}'")]
    UnsupportedPlatform { platform: String, supported: String },

    /// Input is required but the session cannot prompt for it
    #[error("{message}")]
    InteractiveInputRequired { message: String },

    /// Project manifest (package.json) missing
    #[error("Project manifest not found at {path}")]
    ManifestNotFound { path: PathBuf },

    /// Project manifest could not be understood
    #[error("Invalid project manifest {path}: {message}")]
    ManifestParse { path: PathBuf, message: String },

    /// Session token could not be decoded
    #[error("Invalid Apple session: {message}")]
    InvalidSession { message: String },

    /// Local toolchain not installed
    #[error("Required tool '{tool}' not found. {install_hint}")]
    ToolNotFound { tool: String, install_hint: String },

    /// Local toolchain exited unsuccessfully
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    /// Build reported success but produced no package
    #[error("Expected build artifact not found under {expected_path}")]
    ArtifactNotFound { expected_path: PathBuf },

    /// Cloud API returned an error status
    #[error("Cloud build API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Interactive prompt failed
    #[error("Prompt failed: {0}")]
    Prompt(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BuildError {
    /// Create an unsupported platform error listing the supported platforms
    pub fn unsupported_platform(platform: impl Into<String>) -> Self {
        Self::UnsupportedPlatform {
            platform: platform.into(),
            supported: Platform::supported_names(),
        }
    }

    pub fn interactive_input_required(message: impl Into<String>) -> Self {
        Self::InteractiveInputRequired {
            message: message.into(),
        }
    }

    /// Create a tool not found error with install hint
    pub fn tool_not_found(tool: impl Into<String>, install_hint: impl Into<String>) -> Self {
        Self::ToolNotFound {
            tool: tool.into(),
            install_hint: install_hint.into(),
        }
    }

    /// Get exit code for CLI
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::UnsupportedPlatform { .. } => 5,
            Self::InteractiveInputRequired { .. } => 6,
            Self::ManifestNotFound { .. } | Self::ManifestParse { .. } => 2,
            Self::InvalidSession { .. } => 4,
            Self::ToolNotFound { .. } => 3,
            Self::CommandFailed { exit_code, .. } => exit_code.unwrap_or(10),
            Self::ArtifactNotFound { .. } => 13,
            Self::Api { .. } | Self::Http(_) => 10,
            Self::Prompt(_) => 130,
            Self::Io(_) => 7,
            Self::Json(_) => 8,
        }
    }
}
