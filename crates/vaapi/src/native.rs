//! VA-API backend over real DRM device nodes.
//!
//! Wraps the raw [`VaLibrary`] entry points behind the [`VaBackend`] traits.
//! Opened files close when their handle drops; initialized displays are
//! terminated when their session drops.

use std::ffi::{c_int, CStr};
use std::fs::{File, OpenOptions};
use std::os::fd::AsRawFd;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use hwcaps_common::{ProbeError, ProbeResult};

use crate::backend::{DeviceHandle, VaBackend, VaSession};
use crate::ffi::{check_va_status, VADisplay, VaLibrary};
use crate::va::{ConfigAttrib, VaEntrypoint, VaProfile};

/// Backend that opens `/dev/dri` nodes through the system libva.
#[derive(Clone, Debug)]
pub struct NativeBackend {
    lib: Arc<VaLibrary>,
}

impl NativeBackend {
    /// Load (or reuse) the process-wide VA-API libraries.
    pub fn load() -> ProbeResult<Self> {
        Ok(Self {
            lib: VaLibrary::shared()?,
        })
    }
}

impl VaBackend for NativeBackend {
    fn open(&self, path: &Path) -> ProbeResult<Box<dyn DeviceHandle>> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| ProbeError::DeviceUnavailable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        debug!(path = %path.display(), "Opened DRM device");

        Ok(Box::new(NativeDevice {
            lib: Arc::clone(&self.lib),
            path: path.to_path_buf(),
            file,
        }))
    }
}

// ---------------------------------------------------------------------------
// Device
// ---------------------------------------------------------------------------

/// An open DRM device node. The descriptor closes with the `File`.
struct NativeDevice {
    lib: Arc<VaLibrary>,
    path: PathBuf,
    file: File,
}

impl NativeDevice {
    fn fd(&self) -> c_int {
        self.file.as_raw_fd()
    }
}

impl DeviceHandle for NativeDevice {
    fn path(&self) -> &Path {
        &self.path
    }

    fn driver_name(&self) -> ProbeResult<String> {
        // SAFETY: fd is a valid open descriptor owned by self.file.
        let version = unsafe { (self.lib.drmGetVersion)(self.fd()) };
        if version.is_null() {
            return Err(ProbeError::DeviceUnavailable {
                path: self.path.clone(),
                reason: "drmGetVersion failed".to_string(),
            });
        }

        // SAFETY: version is non-null and owned by us until drmFreeVersion.
        // `name` is NUL-terminated by libdrm when non-null.
        let name = unsafe {
            let name_ptr = (*version).name;
            let name = if name_ptr.is_null() {
                None
            } else {
                Some(CStr::from_ptr(name_ptr).to_string_lossy().into_owned())
            };
            (self.lib.drmFreeVersion)(version);
            name
        };

        name.ok_or_else(|| ProbeError::DeviceUnavailable {
            path: self.path.clone(),
            reason: "driver name missing".to_string(),
        })
    }

    fn initialize(&mut self) -> ProbeResult<Box<dyn VaSession + '_>> {
        // SAFETY: fd stays open for the lifetime of the returned session,
        // which borrows self.
        let display = unsafe { (self.lib.vaGetDisplayDRM)(self.fd()) };
        if display.is_null() {
            return Err(ProbeError::HardwareInit {
                path: self.path.clone(),
                reason: "vaGetDisplayDRM returned null".to_string(),
            });
        }

        // Guard first so the display is terminated even if initialization fails.
        let mut session = NativeSession {
            lib: &self.lib,
            display,
            version: (0, 0),
        };

        let (mut major, mut minor) = (0, 0);
        // SAFETY: display is non-null; out-pointers are valid stack locations.
        let status = unsafe { (self.lib.vaInitialize)(display, &mut major, &mut minor) };
        if status != crate::va::VA_STATUS_SUCCESS {
            return Err(ProbeError::HardwareInit {
                path: self.path.clone(),
                reason: self.lib.error_str(status),
            });
        }
        session.version = (major, minor);

        Ok(Box::new(session))
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// RAII wrapper around a VA display.
struct NativeSession<'a> {
    lib: &'a VaLibrary,
    display: VADisplay,
    version: (i32, i32),
}

impl VaSession for NativeSession<'_> {
    fn version(&self) -> (i32, i32) {
        self.version
    }

    fn profiles(&self) -> ProbeResult<Vec<VaProfile>> {
        // SAFETY: display is valid for the lifetime of self.
        let max = unsafe { (self.lib.vaMaxNumProfiles)(self.display) };
        let mut profiles = vec![VaProfile::NONE; max.max(0) as usize];
        let mut count: c_int = 0;

        // SAFETY: the buffer holds vaMaxNumProfiles entries, the most libva writes.
        let status = unsafe {
            (self.lib.vaQueryConfigProfiles)(self.display, profiles.as_mut_ptr(), &mut count)
        };
        check_va_status(status, "vaQueryConfigProfiles")?;

        profiles.truncate(count.clamp(0, max.max(0)) as usize);
        Ok(profiles)
    }

    fn entrypoints(&self, profile: VaProfile) -> ProbeResult<Vec<VaEntrypoint>> {
        // SAFETY: display is valid for the lifetime of self.
        let max = unsafe { (self.lib.vaMaxNumEntrypoints)(self.display) };
        let mut entrypoints = vec![VaEntrypoint(0); max.max(0) as usize];
        let mut count: c_int = 0;

        // SAFETY: the buffer holds vaMaxNumEntrypoints entries.
        let status = unsafe {
            (self.lib.vaQueryConfigEntrypoints)(
                self.display,
                profile,
                entrypoints.as_mut_ptr(),
                &mut count,
            )
        };
        check_va_status(status, "vaQueryConfigEntrypoints")?;

        entrypoints.truncate(count.clamp(0, max.max(0)) as usize);
        Ok(entrypoints)
    }

    fn config_attributes(
        &self,
        profile: VaProfile,
        entrypoint: VaEntrypoint,
        attribs: &mut [ConfigAttrib],
    ) -> ProbeResult<()> {
        // SAFETY: ConfigAttrib is layout-compatible with VAConfigAttrib and
        // the slice length is passed alongside the pointer.
        let status = unsafe {
            (self.lib.vaGetConfigAttributes)(
                self.display,
                profile,
                entrypoint,
                attribs.as_mut_ptr(),
                attribs.len() as c_int,
            )
        };
        check_va_status(status, "vaGetConfigAttributes")
    }
}

impl Drop for NativeSession<'_> {
    fn drop(&mut self) {
        // SAFETY: display came from vaGetDisplayDRM and is terminated exactly once.
        let status = unsafe { (self.lib.vaTerminate)(self.display) };
        if status != crate::va::VA_STATUS_SUCCESS {
            warn!(status, error = %self.lib.error_str(status), "vaTerminate failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_node_is_unavailable() {
        let Ok(backend) = NativeBackend::load() else {
            return;
        };
        let err = backend
            .open(Path::new("/dev/dri/renderD999"))
            .err()
            .expect("nonexistent node should not open");
        assert!(matches!(err, ProbeError::DeviceUnavailable { .. }));
    }

    #[test]
    #[ignore] // Requires a VA-API capable GPU at /dev/dri/renderD128
    fn reads_driver_and_profiles() {
        let backend = NativeBackend::load().expect("VA-API libraries should load");
        let mut device = backend
            .open(Path::new("/dev/dri/renderD128"))
            .expect("render node should open");
        let driver = device.driver_name().expect("driver name");
        println!("driver: {driver}");

        let session = device.initialize().expect("VA display should initialize");
        let (major, minor) = session.version();
        assert!(major >= 1, "VA-API {major}.{minor}");
        for profile in session.profiles().expect("profiles") {
            println!("{profile}: {:?}", session.entrypoints(profile));
        }
    }
}
