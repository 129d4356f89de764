//! Backend seam between probing logic and the acceleration library.
//!
//! Probing only talks to these traits. Resource release is tied to `Drop`:
//! dropping a [`VaSession`] terminates the VA display, dropping a
//! [`DeviceHandle`] closes the device. A session borrows its device, so the
//! display is always terminated before the descriptor closes, on every exit
//! path of a probe.

use std::path::Path;

use hwcaps_common::ProbeResult;

use crate::va::{ConfigAttrib, VaEntrypoint, VaProfile};

/// Opens candidate devices.
pub trait VaBackend: Send + Sync {
    /// Open the device file at `path`.
    ///
    /// # Errors
    /// `ProbeError::DeviceUnavailable` when the file cannot be opened.
    fn open(&self, path: &Path) -> ProbeResult<Box<dyn DeviceHandle>>;
}

/// An open device. Closed on drop.
pub trait DeviceHandle {
    /// Path the device was opened from.
    fn path(&self) -> &Path;

    /// Kernel DRM driver name (e.g. `i915`, `amdgpu`).
    fn driver_name(&self) -> ProbeResult<String>;

    /// Create and initialize a VA display on this device.
    ///
    /// # Errors
    /// `ProbeError::HardwareInit` when no display can be created or
    /// initialization fails.
    fn initialize(&mut self) -> ProbeResult<Box<dyn VaSession + '_>>;
}

/// An initialized VA display. Terminated on drop.
pub trait VaSession {
    /// VA-API (major, minor) version reported by initialization.
    fn version(&self) -> (i32, i32);

    /// Profiles the driver exposes.
    fn profiles(&self) -> ProbeResult<Vec<VaProfile>>;

    /// Entrypoints available for `profile`.
    fn entrypoints(&self, profile: VaProfile) -> ProbeResult<Vec<VaEntrypoint>>;

    /// Fill `attribs` in place. Attributes the driver does not know are set to
    /// `VA_ATTRIB_NOT_SUPPORTED`.
    fn config_attributes(
        &self,
        profile: VaProfile,
        entrypoint: VaEntrypoint,
        attribs: &mut [ConfigAttrib],
    ) -> ProbeResult<()>;
}
