//! Application manager for cloud-hosted emulators
//!
//! Cloud emulators only support pushing a new package and reloading. This is
//! a placeholder implementation: every other operation reports a fixed answer
//! (nothing installed, nothing debuggable, live sync unsupported) or does
//! nothing.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::emulator::CloudEmulatorService;
use crate::error::Result;
use crate::traits::DeviceApplicationManager;
use crate::types::{ApplicationInfo, DebugWebViewInfo, DeviceApplicationInformation, EmulatorDevice};

/// [`DeviceApplicationManager`] for one cloud emulator
pub struct CloudEmulatorApplicationManager {
    device: EmulatorDevice,
    service: Arc<dyn CloudEmulatorService>,
}

impl CloudEmulatorApplicationManager {
    pub fn new(device: EmulatorDevice, service: Arc<dyn CloudEmulatorService>) -> Self {
        Self { device, service }
    }

    pub fn device(&self) -> &EmulatorDevice {
        &self.device
    }
}

#[async_trait]
impl DeviceApplicationManager for CloudEmulatorApplicationManager {
    async fn installed_applications(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    async fn install_application(&self, package_path: &Path) -> Result<()> {
        debug!(
            emulator = %self.device.identifier,
            package = %package_path.display(),
            "installing on cloud emulator"
        );
        self.service.deploy_app(package_path, self.device.os).await?;
        self.service.refresh_emulator(&self.device.identifier).await
    }

    async fn reinstall_application(&self, _app_identifier: &str, package_path: &Path) -> Result<()> {
        self.install_application(package_path).await
    }

    async fn uninstall_application(&self, _app_identifier: &str) -> Result<()> {
        Ok(())
    }

    async fn is_application_installed(&self, _app_identifier: &str) -> Result<bool> {
        Ok(true)
    }

    async fn start_application(&self, _app_identifier: &str) -> Result<()> {
        Ok(())
    }

    async fn stop_application(&self, _app_identifier: &str) -> Result<()> {
        Ok(())
    }

    async fn restart_application(&self, _app_identifier: &str, _app_name: Option<&str>) -> Result<()> {
        Ok(())
    }

    async fn try_start_application(&self, _app_identifier: &str) -> Result<()> {
        Ok(())
    }

    fn can_start_application(&self) -> bool {
        true
    }

    async fn application_info(&self, _app_identifier: &str) -> Result<Option<ApplicationInfo>> {
        Ok(None)
    }

    async fn is_live_sync_supported(&self, _app_identifier: &str) -> Result<bool> {
        Ok(false)
    }

    async fn debuggable_apps(&self) -> Result<Vec<DeviceApplicationInformation>> {
        Ok(Vec::new())
    }

    async fn debuggable_app_views(
        &self,
        _app_identifiers: &[String],
    ) -> Result<HashMap<String, Vec<DebugWebViewInfo>>> {
        Ok(HashMap::new())
    }

    async fn check_for_application_updates(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use nimbus_core::Platform;

    use crate::error::DeviceError;

    #[derive(Default)]
    struct RecordingEmulator {
        calls: Mutex<Vec<String>>,
        fail_deploy: bool,
    }

    #[async_trait]
    impl CloudEmulatorService for RecordingEmulator {
        async fn deploy_app(&self, package_path: &Path, os: Platform) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("deploy {} {}", package_path.display(), os.as_str()));
            if self.fail_deploy {
                return Err(DeviceError::Api {
                    status: 503,
                    message: "emulator pool exhausted".to_string(),
                });
            }
            Ok(())
        }

        async fn refresh_emulator(&self, identifier: &str) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("refresh {}", identifier));
            Ok(())
        }
    }

    fn manager(service: Arc<RecordingEmulator>) -> CloudEmulatorApplicationManager {
        CloudEmulatorApplicationManager::new(EmulatorDevice::new("emu-1", Platform::Ios), service)
    }

    #[tokio::test]
    async fn test_install_deploys_then_refreshes() {
        let service = Arc::new(RecordingEmulator::default());
        let manager = manager(service.clone());

        manager.install_application(Path::new("/out/app.ipa")).await.unwrap();

        assert_eq!(
            *service.calls.lock().unwrap(),
            vec!["deploy /out/app.ipa ios", "refresh emu-1"]
        );
    }

    #[tokio::test]
    async fn test_reinstall_is_install() {
        let service = Arc::new(RecordingEmulator::default());
        let manager = manager(service.clone());

        manager
            .reinstall_application("org.demo.app", Path::new("/out/app.ipa"))
            .await
            .unwrap();

        assert_eq!(service.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_deploy_error_propagates_without_refresh() {
        let service = Arc::new(RecordingEmulator {
            fail_deploy: true,
            ..Default::default()
        });
        let manager = manager(service.clone());

        let err = manager
            .install_application(Path::new("/out/app.ipa"))
            .await
            .unwrap_err();

        assert!(matches!(err, DeviceError::Api { status: 503, .. }));
        assert_eq!(service.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_fixed_answers() {
        let service = Arc::new(RecordingEmulator::default());
        let manager = manager(service.clone());

        assert!(manager.installed_applications().await.unwrap().is_empty());
        assert!(manager.debuggable_apps().await.unwrap().is_empty());
        assert!(manager
            .debuggable_app_views(&["org.demo.app".to_string()])
            .await
            .unwrap()
            .is_empty());
        assert!(manager.application_info("org.demo.app").await.unwrap().is_none());
        assert!(!manager.is_live_sync_supported("org.demo.app").await.unwrap());
        assert!(manager.is_application_installed("org.demo.app").await.unwrap());
        assert!(manager.can_start_application());
    }

    #[tokio::test]
    async fn test_lifecycle_operations_are_noops() {
        let service = Arc::new(RecordingEmulator::default());
        let manager = manager(service.clone());

        manager.uninstall_application("org.demo.app").await.unwrap();
        manager.start_application("org.demo.app").await.unwrap();
        manager.stop_application("org.demo.app").await.unwrap();
        manager.restart_application("org.demo.app", None).await.unwrap();
        manager.try_start_application("org.demo.app").await.unwrap();
        manager.check_for_application_updates().await.unwrap();

        assert!(service.calls.lock().unwrap().is_empty());
    }
}
