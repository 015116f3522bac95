//! Nimbus Devices - Application management on cloud-hosted emulators
//!
//! [`DeviceApplicationManager`] is the capability surface the rest of the
//! tooling expects from a device. [`CloudEmulatorApplicationManager`]
//! satisfies it for cloud emulators, where only installation is meaningful.

pub mod cloud_emulator;
pub mod emulator;
pub mod error;
pub mod traits;
pub mod types;

pub use cloud_emulator::CloudEmulatorApplicationManager;
pub use emulator::{CloudEmulatorService, HttpEmulatorService};
pub use error::{DeviceError, Result};
pub use traits::DeviceApplicationManager;
pub use types::{ApplicationInfo, DebugWebViewInfo, DeviceApplicationInformation, EmulatorDevice};
