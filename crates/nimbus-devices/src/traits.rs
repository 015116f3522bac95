//! Device application manager trait

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ApplicationInfo, DebugWebViewInfo, DeviceApplicationInformation};

/// Application lifecycle operations on a single device
#[async_trait]
pub trait DeviceApplicationManager: Send + Sync {
    /// Identifiers of the applications installed on the device
    async fn installed_applications(&self) -> Result<Vec<String>>;

    /// Install the package at `package_path`
    async fn install_application(&self, package_path: &Path) -> Result<()>;

    /// Replace an installed application with the package at `package_path`
    async fn reinstall_application(&self, app_identifier: &str, package_path: &Path) -> Result<()>;

    async fn uninstall_application(&self, app_identifier: &str) -> Result<()>;

    async fn is_application_installed(&self, app_identifier: &str) -> Result<bool>;

    async fn start_application(&self, app_identifier: &str) -> Result<()>;

    async fn stop_application(&self, app_identifier: &str) -> Result<()>;

    async fn restart_application(&self, app_identifier: &str, app_name: Option<&str>) -> Result<()>;

    /// Start the application, ignoring failures to do so
    async fn try_start_application(&self, app_identifier: &str) -> Result<()>;

    fn can_start_application(&self) -> bool;

    async fn application_info(&self, app_identifier: &str) -> Result<Option<ApplicationInfo>>;

    async fn is_live_sync_supported(&self, app_identifier: &str) -> Result<bool>;

    async fn debuggable_apps(&self) -> Result<Vec<DeviceApplicationInformation>>;

    /// Debuggable web views keyed by application identifier
    async fn debuggable_app_views(
        &self,
        app_identifiers: &[String],
    ) -> Result<HashMap<String, Vec<DebugWebViewInfo>>>;

    /// Refresh the cached list of installed applications
    async fn check_for_application_updates(&self) -> Result<()>;
}
