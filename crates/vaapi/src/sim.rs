//! Scripted in-memory backend.
//!
//! `SimulatedBackend` answers probes from a list of [`SimDevice`]s and records
//! every open, release and session so callers can assert on probing behavior
//! without GPU hardware. Clones share the same bookkeeping.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use hwcaps_common::{ProbeError, ProbeResult};

use crate::backend::{DeviceHandle, VaBackend, VaSession};
use crate::va::{ConfigAttrib, ConfigAttribType, VaEntrypoint, VaProfile, VA_ATTRIB_NOT_SUPPORTED};

/// A scripted device.
#[derive(Clone, Debug)]
pub struct SimDevice {
    path: PathBuf,
    driver: Option<String>,
    init_fails: bool,
    attribute_query_fails: bool,
    version: (i32, i32),
    profiles: Vec<(VaProfile, Vec<VaEntrypoint>)>,
    attributes: Vec<(ConfigAttribType, u32)>,
}

impl SimDevice {
    pub fn new(path: impl Into<PathBuf>, driver: &str) -> Self {
        Self {
            path: path.into(),
            driver: Some(driver.to_string()),
            init_fails: false,
            attribute_query_fails: false,
            version: (1, 20),
            profiles: Vec::new(),
            attributes: Vec::new(),
        }
    }

    /// Expose `profile` with the given entrypoints.
    pub fn with_profile(mut self, profile: VaProfile, entrypoints: &[VaEntrypoint]) -> Self {
        self.profiles.push((profile, entrypoints.to_vec()));
        self
    }

    /// Report `value` for `attrib`. Unscripted attributes read as not supported.
    pub fn with_attribute(mut self, attrib: ConfigAttribType, value: u32) -> Self {
        self.attributes.retain(|(a, _)| *a != attrib);
        self.attributes.push((attrib, value));
        self
    }

    pub fn with_version(mut self, major: i32, minor: i32) -> Self {
        self.version = (major, minor);
        self
    }

    /// Driver identification fails on this device.
    pub fn without_driver_info(mut self) -> Self {
        self.driver = None;
        self
    }

    /// VA display initialization fails on this device.
    pub fn failing_init(mut self) -> Self {
        self.init_fails = true;
        self
    }

    /// `vaGetConfigAttributes` fails on this device.
    pub fn failing_attribute_query(mut self) -> Self {
        self.attribute_query_fails = true;
        self
    }
}

#[derive(Debug, Default)]
struct SimState {
    open_calls: usize,
    open_handles: usize,
    released: Vec<PathBuf>,
    sessions_started: usize,
    active_sessions: usize,
}

/// Backend serving [`SimDevice`]s.
#[derive(Clone, Debug, Default)]
pub struct SimulatedBackend {
    devices: Vec<SimDevice>,
    state: Arc<Mutex<SimState>>,
}

impl SimulatedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(mut self, device: SimDevice) -> Self {
        self.devices.push(device);
        self
    }

    /// Number of `open` calls, successful or not.
    pub fn open_calls(&self) -> usize {
        self.state.lock().open_calls
    }

    /// Devices currently open.
    pub fn open_handles(&self) -> usize {
        self.state.lock().open_handles
    }

    /// Paths of closed devices, in close order.
    pub fn released(&self) -> Vec<PathBuf> {
        self.state.lock().released.clone()
    }

    /// Number of VA displays successfully initialized.
    pub fn sessions_started(&self) -> usize {
        self.state.lock().sessions_started
    }

    /// VA displays currently initialized and not yet terminated.
    pub fn active_sessions(&self) -> usize {
        self.state.lock().active_sessions
    }
}

impl VaBackend for SimulatedBackend {
    fn open(&self, path: &Path) -> ProbeResult<Box<dyn DeviceHandle>> {
        let mut state = self.state.lock();
        state.open_calls += 1;

        let device = self
            .devices
            .iter()
            .find(|d| d.path == path)
            .ok_or_else(|| ProbeError::DeviceUnavailable {
                path: path.to_path_buf(),
                reason: "No such file or directory".to_string(),
            })?;

        state.open_handles += 1;
        Ok(Box::new(SimHandle {
            device: device.clone(),
            state: Arc::clone(&self.state),
        }))
    }
}

struct SimHandle {
    device: SimDevice,
    state: Arc<Mutex<SimState>>,
}

impl DeviceHandle for SimHandle {
    fn path(&self) -> &Path {
        &self.device.path
    }

    fn driver_name(&self) -> ProbeResult<String> {
        self.device
            .driver
            .clone()
            .ok_or_else(|| ProbeError::DeviceUnavailable {
                path: self.device.path.clone(),
                reason: "drmGetVersion failed".to_string(),
            })
    }

    fn initialize(&mut self) -> ProbeResult<Box<dyn VaSession + '_>> {
        if self.device.init_fails {
            return Err(ProbeError::HardwareInit {
                path: self.device.path.clone(),
                reason: "unknown libva error".to_string(),
            });
        }

        let mut state = self.state.lock();
        state.sessions_started += 1;
        state.active_sessions += 1;
        drop(state);

        Ok(Box::new(SimSession {
            device: &self.device,
            state: Arc::clone(&self.state),
        }))
    }
}

impl Drop for SimHandle {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        state.open_handles -= 1;
        state.released.push(self.device.path.clone());
    }
}

struct SimSession<'a> {
    device: &'a SimDevice,
    state: Arc<Mutex<SimState>>,
}

impl VaSession for SimSession<'_> {
    fn version(&self) -> (i32, i32) {
        self.device.version
    }

    fn profiles(&self) -> ProbeResult<Vec<VaProfile>> {
        Ok(self.device.profiles.iter().map(|(p, _)| *p).collect())
    }

    fn entrypoints(&self, profile: VaProfile) -> ProbeResult<Vec<VaEntrypoint>> {
        self.device
            .profiles
            .iter()
            .find(|(p, _)| *p == profile)
            .map(|(_, eps)| eps.clone())
            .ok_or(ProbeError::Query {
                call: "vaQueryConfigEntrypoints",
                status: 12,
            })
    }

    fn config_attributes(
        &self,
        _profile: VaProfile,
        _entrypoint: VaEntrypoint,
        attribs: &mut [ConfigAttrib],
    ) -> ProbeResult<()> {
        if self.device.attribute_query_fails {
            return Err(ProbeError::Query {
                call: "vaGetConfigAttributes",
                status: 1,
            });
        }
        for slot in attribs.iter_mut() {
            slot.value = self
                .device
                .attributes
                .iter()
                .find(|(a, _)| *a == slot.attrib_type)
                .map_or(VA_ATTRIB_NOT_SUPPORTED, |(_, v)| *v);
        }
        Ok(())
    }
}

impl Drop for SimSession<'_> {
    fn drop(&mut self) {
        self.state.lock().active_sessions -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_counts_every_attempt() {
        let backend = SimulatedBackend::new().with_device(SimDevice::new("/dev/dri/card0", "i915"));
        assert!(backend.open(Path::new("/dev/dri/renderD128")).is_err());
        let handle = backend.open(Path::new("/dev/dri/card0")).unwrap();
        assert_eq!(backend.open_calls(), 2);
        assert_eq!(backend.open_handles(), 1);
        drop(handle);
        assert_eq!(backend.open_handles(), 0);
        assert_eq!(backend.released(), vec![PathBuf::from("/dev/dri/card0")]);
    }

    #[test]
    fn session_terminates_on_drop() {
        let backend = SimulatedBackend::new().with_device(
            SimDevice::new("/dev/dri/card0", "i915")
                .with_profile(VaProfile::HEVC_MAIN, &[VaEntrypoint::VLD]),
        );
        let mut handle = backend.open(Path::new("/dev/dri/card0")).unwrap();
        {
            let session = handle.initialize().unwrap();
            assert_eq!(session.profiles().unwrap(), vec![VaProfile::HEVC_MAIN]);
            assert_eq!(backend.active_sessions(), 1);
        }
        assert_eq!(backend.active_sessions(), 0);
        assert_eq!(backend.sessions_started(), 1);
    }

    #[test]
    fn unscripted_attributes_are_not_supported() {
        let backend = SimulatedBackend::new().with_device(
            SimDevice::new("/dev/dri/card0", "i915")
                .with_attribute(ConfigAttribType::MAX_PICTURE_WIDTH, 4096),
        );
        let mut handle = backend.open(Path::new("/dev/dri/card0")).unwrap();
        let session = handle.initialize().unwrap();
        let mut attribs = [
            ConfigAttrib::query(ConfigAttribType::MAX_PICTURE_WIDTH),
            ConfigAttrib::query(ConfigAttribType::RATE_CONTROL),
        ];
        session
            .config_attributes(VaProfile::H264_MAIN, VaEntrypoint::ENC_SLICE, &mut attribs)
            .unwrap();
        assert_eq!(attribs[0].value, 4096);
        assert_eq!(attribs[1].value, VA_ATTRIB_NOT_SUPPORTED);
    }
}
