//! Cloud build API client

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use nimbus_core::config::CloudConfig;
use nimbus_core::Platform;

use crate::error::{BuildError, Result};
use crate::request::{BuildRequest, CloudBuildOptions, CloudBuildResult, QrData};
use crate::traits::CloudBuildService;

/// Directory under `platforms/<platform>/` that receives cloud packages
const CLOUD_OUTPUT_DIR: &str = "cloud";

/// Cloud build service over HTTP
pub struct HttpCloudBuildService {
    client: Client,
    endpoint: String,
    token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BuildSubmission<'a> {
    #[serde(flatten)]
    request: &'a BuildRequest,
    account_id: Option<&'a str>,
    should_prepare: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BuildResponse {
    artifact_url: String,
    file_name: Option<String>,
    qr_data: Option<QrData>,
}

impl HttpCloudBuildService {
    pub fn new(endpoint: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Create from the `cloud` config section, reading the token from its env var
    pub fn from_config(config: &CloudConfig) -> Self {
        Self::new(&config.endpoint, config.token())
    }

    async fn submit(&self, submission: &BuildSubmission<'_>) -> Result<BuildResponse> {
        let url = format!("{}/api/builds", self.endpoint);
        debug!("Cloud build API request: POST {}", url);

        let mut request = self.client.post(&url).json(submission);
        if let Some(ref token) = self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(BuildError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        Ok(response.json().await?)
    }

    async fn download(&self, url: &str, destination: &Path) -> Result<()> {
        let url = if url.starts_with('/') {
            format!("{}{}", self.endpoint, url)
        } else {
            url.to_string()
        };
        debug!("Downloading cloud artifact from {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(BuildError::Api {
                status: status.as_u16(),
                message: format!("artifact download failed: {}", error_text),
            });
        }

        let bytes = response.bytes().await?;
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(destination, &bytes).await?;
        Ok(())
    }
}

#[async_trait]
impl CloudBuildService for HttpCloudBuildService {
    async fn build(
        &self,
        request: &BuildRequest,
        account_id: Option<&str>,
        options: Option<&CloudBuildOptions>,
    ) -> Result<CloudBuildResult> {
        let submission = BuildSubmission {
            request,
            account_id,
            should_prepare: options.map(|o| o.should_prepare).unwrap_or(false),
        };

        let response = self.submit(&submission).await?;

        let file_name = response
            .file_name
            .as_deref()
            .and_then(plain_file_name)
            .or_else(|| file_name_from_url(&response.artifact_url))
            .unwrap_or_else(|| default_file_name(request));
        let output_file_path = cloud_output_dir(&request.project_settings.project_dir, request.platform)
            .join(file_name);

        self.download(&response.artifact_url, &output_file_path).await?;

        info!(
            platform = %request.platform,
            path = %output_file_path.display(),
            "Downloaded cloud build"
        );

        Ok(CloudBuildResult {
            output_file_path,
            qr_data: response.qr_data,
        })
    }
}

fn cloud_output_dir(project_dir: &Path, platform: Platform) -> PathBuf {
    project_dir
        .join("platforms")
        .join(platform.as_str())
        .join(CLOUD_OUTPUT_DIR)
}

fn file_name_from_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next()?;
    let name = path.rsplit('/').next()?;
    if name.contains('.') {
        plain_file_name(name)
    } else {
        None
    }
}

/// `name` if it is a single normal path component
fn plain_file_name(name: &str) -> Option<String> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(part)), None) => part.to_str().map(str::to_string),
        _ => None,
    }
}

fn default_file_name(request: &BuildRequest) -> String {
    let extension = match request.platform {
        Platform::Android if request.android.aab => "aab",
        Platform::Android => "apk",
        Platform::Ios => "ipa",
    };
    format!("{}.{}", request.project_settings.project_name, extension)
}
