//! Probe error taxonomy (thiserror-based).
//!
//! Every variant is recoverable inside the negotiation layer. None of them
//! reach callers of the availability or validation surface.

use std::path::PathBuf;

use thiserror::Error;

/// Failure of one step of hardware probing.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Device {path} unavailable: {reason}")]
    DeviceUnavailable { path: PathBuf, reason: String },

    #[error("Driver {driver:?} on {path} is not supported")]
    DriverUnsupported { path: PathBuf, driver: String },

    #[error("Hardware init failed on {path}: {reason}")]
    HardwareInit { path: PathBuf, reason: String },

    #[error("Profile {0} not found on any device")]
    ProfileUnsupported(&'static str),

    #[error("Attribute {0} not reported by the driver")]
    AttributeUnsupported(&'static str),

    #[error("VA-API call {call} failed with status {status}")]
    Query { call: &'static str, status: i32 },

    #[error("Acceleration library not loaded: {0}")]
    LibraryLoad(String),

    #[error("Required symbol not found: {0}")]
    SymbolNotFound(String),
}

/// Convenience Result type for probe operations.
pub type ProbeResult<T> = Result<T, ProbeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_device() {
        let err = ProbeError::DriverUnsupported {
            path: PathBuf::from("/dev/dri/renderD128"),
            driver: "nvidia-drm".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("renderD128"));
        assert!(msg.contains("nvidia-drm"));
    }

    #[test]
    fn query_message() {
        let err = ProbeError::Query {
            call: "vaQueryConfigProfiles",
            status: 12,
        };
        assert_eq!(
            err.to_string(),
            "VA-API call vaQueryConfigProfiles failed with status 12"
        );
    }
}
