//! Project metadata read from package.json

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use nimbus_core::Platform;

use crate::error::{BuildError, Result};

/// Name of the project manifest
pub const MANIFEST_FILE: &str = "package.json";

/// The subset of package.json the build cares about
#[derive(Debug, Clone, Deserialize)]
pub struct PackageManifest {
    pub name: Option<String>,

    /// Native project metadata (`"nativescript": { "id": ... }`)
    #[serde(default)]
    pub nativescript: Option<serde_json::Value>,
}

/// Read and parse `<project_dir>/package.json`
pub fn read_manifest(project_dir: &Path) -> Result<PackageManifest> {
    let path = project_dir.join(MANIFEST_FILE);
    if !path.exists() {
        return Err(BuildError::ManifestNotFound { path });
    }

    let content = std::fs::read_to_string(&path)?;
    serde_json::from_str(&content).map_err(|e| BuildError::ManifestParse {
        path,
        message: e.to_string(),
    })
}

/// Identity of the project being built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectData {
    pub project_dir: PathBuf,
    pub project_name: String,
    identifiers: HashMap<Platform, String>,
}

impl ProjectData {
    /// Load project data from the manifest in `project_dir`
    pub fn load(project_dir: impl Into<PathBuf>) -> Result<Self> {
        let project_dir = project_dir.into();
        let manifest = read_manifest(&project_dir)?;

        let project_name = project_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .or(manifest.name)
            .unwrap_or_default();

        let identifiers = manifest
            .nativescript
            .as_ref()
            .and_then(|data| data.get("id"))
            .map(parse_identifiers)
            .unwrap_or_default();

        debug!(
            project_dir = %project_dir.display(),
            project_name = %project_name,
            identifier_count = identifiers.len(),
            "loaded project data"
        );

        Ok(Self {
            project_dir,
            project_name,
            identifiers,
        })
    }

    /// Path to the project manifest
    pub fn manifest_path(&self) -> PathBuf {
        self.project_dir.join(MANIFEST_FILE)
    }

    /// Application identifier declared for `platform`
    pub fn project_id(&self, platform: Platform) -> Result<&str> {
        self.identifiers
            .get(&platform)
            .map(String::as_str)
            .ok_or_else(|| BuildError::ManifestParse {
                path: self.manifest_path(),
                message: format!("no application id declared for {}", platform),
            })
    }

    /// Current `nativescript` section of the manifest, `null` when absent
    pub fn native_metadata(&self) -> Result<serde_json::Value> {
        let manifest = read_manifest(&self.project_dir)?;
        Ok(manifest.nativescript.unwrap_or(serde_json::Value::Null))
    }
}

/// `id` is either one identifier for every platform or a per-platform map
fn parse_identifiers(id: &serde_json::Value) -> HashMap<Platform, String> {
    match id {
        serde_json::Value::String(id) => Platform::ALL
            .iter()
            .map(|platform| (*platform, id.clone()))
            .collect(),
        serde_json::Value::Object(map) => Platform::ALL
            .iter()
            .filter_map(|platform| {
                map.get(platform.as_str())
                    .and_then(|v| v.as_str())
                    .map(|id| (*platform, id.to_string()))
            })
            .collect(),
        _ => HashMap::new(),
    }
}
