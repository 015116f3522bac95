//! Device and application descriptions

use serde::{Deserialize, Serialize};

use nimbus_core::Platform;

/// Identity of a cloud emulator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmulatorDevice {
    /// Emulator identifier assigned by the service
    pub identifier: String,
    /// Operating system the emulator runs
    pub os: Platform,
}

impl EmulatorDevice {
    pub fn new(identifier: impl Into<String>, os: Platform) -> Self {
        Self {
            identifier: identifier.into(),
            os,
        }
    }
}

/// Information about an installed application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationInfo {
    pub application_identifier: String,
    pub device_identifier: String,
    pub configuration: String,
}

/// An application that can be debugged on a device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceApplicationInformation {
    pub identifier: String,
    pub device_identifier: String,
    pub framework: String,
}

/// A debuggable web view inside an application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugWebViewInfo {
    pub id: String,
    pub title: String,
    pub url: String,
    pub web_socket_debugger_url: Option<String>,
}
