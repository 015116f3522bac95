//! Cloud emulator control API

use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use tracing::{debug, info};

use nimbus_core::config::EmulatorConfig;
use nimbus_core::Platform;

use crate::error::{DeviceError, Result};

/// Operations the cloud emulator service exposes
#[async_trait]
pub trait CloudEmulatorService: Send + Sync {
    /// Upload a package so emulators running `os` can install it
    async fn deploy_app(&self, package_path: &Path, os: Platform) -> Result<()>;

    /// Reload the emulator so it picks up newly deployed packages
    async fn refresh_emulator(&self, identifier: &str) -> Result<()>;
}

/// Cloud emulator service over HTTP
pub struct HttpEmulatorService {
    client: Client,
    endpoint: String,
    token: Option<String>,
}

impl HttpEmulatorService {
    pub fn new(endpoint: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Create from the `emulator` config section
    pub fn from_config(config: &EmulatorConfig, token: Option<String>) -> Self {
        Self::new(&config.endpoint, token)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.token {
            Some(ref token) => request.header("Authorization", format!("Bearer {}", token)),
            None => request,
        }
    }

    async fn check(response: Response) -> Result<()> {
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(DeviceError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CloudEmulatorService for HttpEmulatorService {
    async fn deploy_app(&self, package_path: &Path, os: Platform) -> Result<()> {
        if !package_path.is_file() {
            return Err(DeviceError::PackageNotFound(package_path.to_path_buf()));
        }

        let url = format!("{}/api/emulators/apps", self.endpoint);
        info!("Uploading {} to the cloud emulator service", package_path.display());

        let file_content = tokio::fs::read(package_path).await?;
        let file_name = package_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("app")
            .to_string();

        let part = Part::bytes(file_content).file_name(file_name);
        let form = Form::new().part("package", part);

        let request = self
            .client
            .post(&url)
            .query(&[("os", os.as_str())])
            .multipart(form);
        let response = self.authorized(request).send().await?;
        Self::check(response).await
    }

    async fn refresh_emulator(&self, identifier: &str) -> Result<()> {
        let url = format!("{}/api/emulators/{}/refresh", self.endpoint, identifier);
        debug!("Emulator API request: POST {}", url);

        let response = self.authorized(self.client.post(&url)).send().await?;
        Self::check(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_deploy_app_uploads_package() {
        let mut server = mockito::Server::new_async().await;
        let temp = TempDir::new().unwrap();
        let package = temp.path().join("app-debug.apk");
        std::fs::write(&package, b"apk-bytes").unwrap();

        let mock = server
            .mock("POST", "/api/emulators/apps")
            .match_query(Matcher::UrlEncoded("os".into(), "android".into()))
            .match_header("authorization", "Bearer emu-token")
            .match_header(
                "content-type",
                Matcher::Regex("multipart/form-data".to_string()),
            )
            .match_body(Matcher::Regex("app-debug.apk".to_string()))
            .with_status(201)
            .create_async()
            .await;

        let service = HttpEmulatorService::new(server.url(), Some("emu-token".to_string()));
        service.deploy_app(&package, Platform::Android).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_deploy_missing_package() {
        let service = HttpEmulatorService::new("http://127.0.0.1:9", None);

        let err = service
            .deploy_app(Path::new("/nonexistent/app.ipa"), Platform::Ios)
            .await
            .unwrap_err();
        assert!(matches!(err, DeviceError::PackageNotFound(_)));
    }

    #[tokio::test]
    async fn test_refresh_error_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/emulators/emu-42/refresh")
            .with_status(404)
            .with_body("unknown emulator")
            .create_async()
            .await;

        let service = HttpEmulatorService::new(server.url(), None);
        let err = service.refresh_emulator("emu-42").await.unwrap_err();

        match err {
            DeviceError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "unknown emulator");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
