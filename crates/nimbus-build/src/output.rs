//! Structured command output
//!
//! Build results render as human-friendly text, JSON, or GitHub Actions
//! workflow commands so the CLI behaves the same locally and in CI.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use nimbus_core::Platform;

use crate::request::PackageLocation;

/// Output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text (default for interactive)
    #[default]
    Text,
    /// JSON (default for CI)
    Json,
    /// GitHub Actions workflow commands
    GithubActions,
}

impl OutputFormat {
    /// Detect format from environment
    pub fn from_env() -> Self {
        if std::env::var("GITHUB_ACTIONS").is_ok() {
            Self::GithubActions
        } else if std::env::var("CI").is_ok() {
            Self::Json
        } else {
            Self::Text
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "pretty" => Some(Self::Text),
            "json" => Some(Self::Json),
            "github" | "github-actions" | "gha" => Some(Self::GithubActions),
            _ => None,
        }
    }
}

/// Result of a command, renderable in any [`OutputFormat`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Output {
    pub success: bool,
    pub message: String,
    pub operation: String,
    pub duration_ms: Option<u64>,

    /// Packages produced
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<ArtifactOutput>,

    /// Remote install URL, when the package was not downloaded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,

    /// CI output variables
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, String>,
}

impl Output {
    /// Create a success output
    pub fn success(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            operation: operation.into(),
            duration_ms: None,
            artifacts: Vec::new(),
            url: None,
            warnings: Vec::new(),
            outputs: BTreeMap::new(),
        }
    }

    pub fn with_duration(mut self, ms: u64) -> Self {
        self.duration_ms = Some(ms);
        self
    }

    pub fn with_artifact(mut self, artifact: ArtifactOutput) -> Self {
        self.outputs
            .insert("artifact_path".to_string(), artifact.path.clone());
        self.artifacts.push(artifact);
        self
    }

    /// Record where a publishing build ended up
    pub fn with_package(self, location: &PackageLocation, platform: Platform) -> Self {
        match location {
            PackageLocation::Path(path) => self.with_artifact(ArtifactOutput::from_path(path, platform)),
            PackageLocation::Url(url) => {
                let mut output = self.with_output("package_url", url.clone());
                output.url = Some(url.clone());
                output
            }
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_output(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.outputs.insert(key.into(), value.into());
        self
    }

    /// Render output in the specified format
    pub fn render(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Text => self.render_text(),
            OutputFormat::Json => self.render_json(),
            OutputFormat::GithubActions => self.render_github_actions(),
        }
    }

    /// Print output to stdout
    pub fn print(&self, format: OutputFormat) {
        print!("{}", self.render(format));
    }

    fn render_text(&self) -> String {
        let mut out = String::new();

        let status = if self.success { "✓" } else { "✗" };
        out.push_str(&format!("{} {}\n", status, self.message));

        if let Some(ms) = self.duration_ms {
            out.push_str(&format!("  Duration: {}ms\n", ms));
        }

        if !self.artifacts.is_empty() {
            out.push_str("\nArtifacts:\n");
            for artifact in &self.artifacts {
                out.push_str(&format!(
                    "  - {} ({}, {})\n",
                    artifact.path,
                    artifact.platform,
                    format_size(artifact.size)
                ));
            }
        }

        if let Some(ref url) = self.url {
            out.push_str(&format!("\nPackage URL: {}\n", url));
        }

        for warning in &self.warnings {
            out.push_str(&format!("⚠ {}\n", warning));
        }

        out
    }

    fn render_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    fn render_github_actions(&self) -> String {
        let mut out = String::new();

        if let Ok(output_file) = std::env::var("GITHUB_OUTPUT") {
            if let Ok(mut file) = std::fs::OpenOptions::new().append(true).open(&output_file) {
                for (key, value) in &self.outputs {
                    let _ = writeln!(file, "{}={}", key, value);
                }
            }
        }

        for warning in &self.warnings {
            out.push_str(&format!("::warning::{}\n", warning));
        }

        if !self.artifacts.is_empty() {
            out.push_str("::group::Artifacts\n");
            for artifact in &self.artifacts {
                out.push_str(&format!(
                    "{} ({}, {})\n",
                    artifact.path,
                    artifact.platform,
                    format_size(artifact.size)
                ));
            }
            out.push_str("::endgroup::\n");
        }

        out.push_str(&format!(
            "{} {}\n",
            if self.success { "✓" } else { "✗" },
            self.message
        ));

        out
    }
}

/// A produced package
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactOutput {
    pub path: String,
    pub platform: String,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

impl ArtifactOutput {
    /// Describe the package at `path`, hashing it when readable
    pub fn from_path(path: &Path, platform: Platform) -> Self {
        Self {
            path: path.to_string_lossy().to_string(),
            platform: platform.as_str().to_string(),
            size: std::fs::metadata(path).map(|m| m.len()).unwrap_or(0),
            sha256: file_sha256(path).ok(),
        }
    }
}

/// Hex-encoded SHA-256 of a file's contents
pub fn file_sha256(path: &Path) -> std::io::Result<String> {
    let content = std::fs::read(path)?;
    Ok(format!("{:x}", Sha256::digest(&content)))
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
