//! Candidate device enumeration with driver filtering.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use hwcaps_common::{NegotiationConfig, ProbeError, ProbeResult};

use crate::backend::{DeviceHandle, VaBackend};

/// Walks the configured device paths in order and yields each device that
/// opens and runs an allowed driver.
///
/// Devices are opened lazily. Rejected devices are dropped (closed) before the
/// next candidate is tried; a yielded device is closed when the caller drops it.
pub struct DeviceScanner<'a> {
    backend: &'a dyn VaBackend,
    config: &'a NegotiationConfig,
}

impl<'a> DeviceScanner<'a> {
    pub fn new(backend: &'a dyn VaBackend, config: &'a NegotiationConfig) -> Self {
        Self { backend, config }
    }

    /// Iterate over accepted devices.
    pub fn candidates(&self) -> Candidates<'a> {
        Candidates {
            backend: self.backend,
            config: self.config,
            paths: self.config.device_paths.iter(),
        }
    }
}

/// Iterator returned by [`DeviceScanner::candidates`].
pub struct Candidates<'a> {
    backend: &'a dyn VaBackend,
    config: &'a NegotiationConfig,
    paths: std::slice::Iter<'a, PathBuf>,
}

impl Candidates<'_> {
    fn accept(&self, path: &Path) -> ProbeResult<Box<dyn DeviceHandle>> {
        let device = self.backend.open(path)?;
        let driver = device.driver_name()?;
        info!(path = %path.display(), driver = %driver, "Found DRM driver");

        if !self.config.is_driver_allowed(&driver) {
            return Err(ProbeError::DriverUnsupported {
                path: path.to_path_buf(),
                driver,
            });
        }
        Ok(device)
    }
}

impl Iterator for Candidates<'_> {
    type Item = Box<dyn DeviceHandle>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let path = self.paths.next()?;
            match self.accept(path) {
                Ok(device) => return Some(device),
                Err(e) => debug!(path = %path.display(), error = %e, "Skipping device"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimDevice, SimulatedBackend};

    fn config_for(paths: &[&str]) -> NegotiationConfig {
        NegotiationConfig {
            device_paths: paths.iter().map(PathBuf::from).collect(),
            ..NegotiationConfig::default()
        }
    }

    #[test]
    fn skips_missing_and_foreign_devices() {
        let backend = SimulatedBackend::new()
            .with_device(SimDevice::new("/dev/dri/renderD128", "nvidia-drm"))
            .with_device(SimDevice::new("/dev/dri/card0", "amdgpu"));
        let config = config_for(&["/dev/dri/renderD128", "/dev/dri/renderD129", "/dev/dri/card0"]);
        let scanner = DeviceScanner::new(&backend, &config);

        let accepted: Vec<PathBuf> = scanner
            .candidates()
            .map(|d| d.path().to_path_buf())
            .collect();

        assert_eq!(accepted, vec![PathBuf::from("/dev/dri/card0")]);
        assert_eq!(backend.open_calls(), 3);
        assert_eq!(backend.open_handles(), 0);
    }

    #[test]
    fn driver_query_failure_skips_device() {
        let backend = SimulatedBackend::new()
            .with_device(SimDevice::new("/dev/dri/renderD128", "i915").without_driver_info())
            .with_device(SimDevice::new("/dev/dri/renderD129", "i915"));
        let config = config_for(&["/dev/dri/renderD128", "/dev/dri/renderD129"]);
        let scanner = DeviceScanner::new(&backend, &config);

        let first = scanner.candidates().next().unwrap();
        assert_eq!(first.path(), Path::new("/dev/dri/renderD129"));
        assert_eq!(backend.released(), vec![PathBuf::from("/dev/dri/renderD128")]);
    }

    #[test]
    fn exhaustion_yields_nothing() {
        let backend = SimulatedBackend::new();
        let config = NegotiationConfig::default();
        let scanner = DeviceScanner::new(&backend, &config);
        assert!(scanner.candidates().next().is_none());
        assert_eq!(backend.open_calls(), 4);
    }
}
