//! Exit codes for the CLI

use nimbus_build::BuildError;
use nimbus_core::{ConfigError, NimbusError};
use nimbus_devices::DeviceError;

/// General error
pub const ERROR: i32 = 1;

/// Configuration error
pub const CONFIG_ERROR: i32 = 2;

/// Map an error to the process exit status
pub fn from_error(err: &anyhow::Error) -> i32 {
    if let Some(e) = err.downcast_ref::<BuildError>() {
        e.exit_code()
    } else if let Some(e) = err.downcast_ref::<DeviceError>() {
        e.exit_code()
    } else if err.downcast_ref::<ConfigError>().is_some()
        || err.downcast_ref::<NimbusError>().is_some()
    {
        CONFIG_ERROR
    } else {
        ERROR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_errors_keep_their_code() {
        let err = anyhow::Error::new(BuildError::unsupported_platform("web"));
        assert_eq!(from_error(&err), 5);
    }

    #[test]
    fn test_config_errors() {
        let err = anyhow::Error::new(ConfigError::invalid("cloud.endpoint", "not a URL"));
        assert_eq!(from_error(&err), CONFIG_ERROR);
    }

    #[test]
    fn test_context_does_not_hide_code() {
        let err = anyhow::Error::new(DeviceError::PackageNotFound("/tmp/x.apk".into()))
            .context("deploy failed");
        assert_eq!(from_error(&err), 2);
    }

    #[test]
    fn test_other_errors() {
        assert_eq!(from_error(&anyhow::anyhow!("boom")), ERROR);
    }
}
