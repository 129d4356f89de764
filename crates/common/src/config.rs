//! Negotiation configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Render nodes first, then primary card nodes.
pub const DEFAULT_DEVICE_PATHS: [&str; 4] = [
    "/dev/dri/renderD128",
    "/dev/dri/renderD129",
    "/dev/dri/card0",
    "/dev/dri/card1",
];

/// Kernel DRM drivers whose VA-API stacks are trusted for encoding.
pub const DEFAULT_ALLOWED_DRIVERS: [&str; 3] = ["amdgpu", "radeon", "i915"];

/// Configuration for a negotiation context.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NegotiationConfig {
    /// Process-wide hardware kill switch. When set, every family reports
    /// unavailable and no device is opened.
    pub hardware_disabled: bool,
    /// Candidate device files, tried in order.
    pub device_paths: Vec<PathBuf>,
    /// DRM driver names accepted for probing.
    pub allowed_drivers: Vec<String>,
}

impl Default for NegotiationConfig {
    fn default() -> Self {
        Self {
            hardware_disabled: false,
            device_paths: DEFAULT_DEVICE_PATHS.iter().map(PathBuf::from).collect(),
            allowed_drivers: DEFAULT_ALLOWED_DRIVERS
                .iter()
                .map(|d| d.to_string())
                .collect(),
        }
    }
}

impl NegotiationConfig {
    /// Load from a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_hardware_disabled(mut self, disabled: bool) -> Self {
        self.hardware_disabled = disabled;
        self
    }

    pub fn is_driver_allowed(&self, driver: &str) -> bool {
        self.allowed_drivers.iter().any(|d| d == driver)
    }
}
