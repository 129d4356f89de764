//! Raw FFI bindings for libva, libva-drm and libdrm.
//!
//! The libraries are loaded dynamically at runtime via `libloading`, so a
//! host without a VA-API stack simply reports no devices. Only the capability
//! query surface is bound; no encode or decode calls.
//!
//! Reference: libva `va.h`, `va_drm.h`; libdrm `xf86drm.h`.

use std::ffi::{c_char, c_int, c_void, CStr};
use std::sync::{Arc, OnceLock};

use libloading::Library;
use tracing::{debug, info};

use hwcaps_common::ProbeError;

use crate::va::{ConfigAttrib, VaEntrypoint, VaProfile, VaStatus};

/// VA display handle (opaque pointer).
pub type VADisplay = *mut c_void;

// ---------------------------------------------------------------------------
// drmVersion
// ---------------------------------------------------------------------------

/// Kernel driver identification. Matches `drmVersion` from `xf86drm.h`.
#[repr(C)]
pub struct DrmVersion {
    pub version_major: c_int,
    pub version_minor: c_int,
    pub version_patchlevel: c_int,
    pub name_len: c_int,
    pub name: *mut c_char,
    pub date_len: c_int,
    pub date: *mut c_char,
    pub desc_len: c_int,
    pub desc: *mut c_char,
}

// ---------------------------------------------------------------------------
// Dynamic library wrapper
// ---------------------------------------------------------------------------

/// Dynamically loaded VA-API and DRM entry points.
#[allow(non_snake_case)]
pub struct VaLibrary {
    /// Library handles. Must outlive every copied symbol.
    _va: Library,
    _va_drm: Library,
    _drm: Library,

    // -- libdrm --
    pub drmGetVersion: unsafe extern "C" fn(fd: c_int) -> *mut DrmVersion,
    pub drmFreeVersion: unsafe extern "C" fn(version: *mut DrmVersion),

    // -- libva-drm --
    pub vaGetDisplayDRM: unsafe extern "C" fn(fd: c_int) -> VADisplay,

    // -- libva --
    pub vaInitialize:
        unsafe extern "C" fn(dpy: VADisplay, major: *mut c_int, minor: *mut c_int) -> VaStatus,
    pub vaTerminate: unsafe extern "C" fn(dpy: VADisplay) -> VaStatus,
    pub vaErrorStr: unsafe extern "C" fn(status: VaStatus) -> *const c_char,
    pub vaMaxNumProfiles: unsafe extern "C" fn(dpy: VADisplay) -> c_int,
    pub vaMaxNumEntrypoints: unsafe extern "C" fn(dpy: VADisplay) -> c_int,
    pub vaQueryConfigProfiles: unsafe extern "C" fn(
        dpy: VADisplay,
        profile_list: *mut VaProfile,
        num_profiles: *mut c_int,
    ) -> VaStatus,
    pub vaQueryConfigEntrypoints: unsafe extern "C" fn(
        dpy: VADisplay,
        profile: VaProfile,
        entrypoint_list: *mut VaEntrypoint,
        num_entrypoints: *mut c_int,
    ) -> VaStatus,
    pub vaGetConfigAttributes: unsafe extern "C" fn(
        dpy: VADisplay,
        profile: VaProfile,
        entrypoint: VaEntrypoint,
        attrib_list: *mut ConfigAttrib,
        num_attribs: c_int,
    ) -> VaStatus,
}

// SAFETY: VaLibrary only holds function pointers into shared libraries that
// stay loaded for the lifetime of the struct. libva's query functions are
// safe to call from any thread on distinct displays.
unsafe impl Send for VaLibrary {}
unsafe impl Sync for VaLibrary {}

impl std::fmt::Debug for VaLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaLibrary").field("loaded", &true).finish()
    }
}

const LIBVA: &str = "libva.so.2";
const LIBVA_DRM: &str = "libva-drm.so.2";
const LIBDRM: &str = "libdrm.so.2";

static SHARED: OnceLock<Result<Arc<VaLibrary>, String>> = OnceLock::new();

impl VaLibrary {
    /// Process-wide library instance, loaded on first use.
    pub fn shared() -> Result<Arc<Self>, VaLoadError> {
        SHARED
            .get_or_init(|| Self::load().map(Arc::new).map_err(|e| e.to_string()))
            .clone()
            .map_err(VaLoadError::Cached)
    }

    /// Load the three libraries from the default search path.
    pub fn load() -> Result<Self, VaLoadError> {
        info!(libva = LIBVA, libdrm = LIBDRM, "Loading VA-API libraries");

        let va = open_library(LIBVA)?;
        let va_drm = open_library(LIBVA_DRM)?;
        let drm = open_library(LIBDRM)?;

        // SAFETY: Every symbol below is a documented libva / libdrm export and
        // the function pointer types match the C prototypes. Each pointer is
        // copied out of its `Symbol` so the borrow on the library ends before
        // the library is moved into the struct.
        unsafe {
            let lib = Self {
                drmGetVersion: symbol(&drm, b"drmGetVersion\0")?,
                drmFreeVersion: symbol(&drm, b"drmFreeVersion\0")?,
                vaGetDisplayDRM: symbol(&va_drm, b"vaGetDisplayDRM\0")?,
                vaInitialize: symbol(&va, b"vaInitialize\0")?,
                vaTerminate: symbol(&va, b"vaTerminate\0")?,
                vaErrorStr: symbol(&va, b"vaErrorStr\0")?,
                vaMaxNumProfiles: symbol(&va, b"vaMaxNumProfiles\0")?,
                vaMaxNumEntrypoints: symbol(&va, b"vaMaxNumEntrypoints\0")?,
                vaQueryConfigProfiles: symbol(&va, b"vaQueryConfigProfiles\0")?,
                vaQueryConfigEntrypoints: symbol(&va, b"vaQueryConfigEntrypoints\0")?,
                vaGetConfigAttributes: symbol(&va, b"vaGetConfigAttributes\0")?,
                _va: va,
                _va_drm: va_drm,
                _drm: drm,
            };
            debug!("All VA-API symbols loaded successfully");
            Ok(lib)
        }
    }

    /// Human-readable text for a VA status code.
    pub fn error_str(&self, status: VaStatus) -> String {
        // SAFETY: vaErrorStr returns a pointer to a static string for any input.
        let ptr = unsafe { (self.vaErrorStr)(status) };
        if ptr.is_null() {
            return format!("status {status}");
        }
        // SAFETY: non-null pointer to a NUL-terminated static string.
        unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
    }
}

fn open_library(name: &str) -> Result<Library, VaLoadError> {
    // SAFETY: Loading a well-known system library whose initializers only
    // register driver lookup paths.
    unsafe { Library::new(name) }
        .map_err(|e| VaLoadError::LibraryNotFound(format!("Failed to load {name}: {e}")))
}

/// Copy a function pointer out of `lib`.
///
/// # Safety
/// `T` must be the exact function pointer type of the exported symbol.
unsafe fn symbol<T: Copy>(lib: &Library, name: &'static [u8]) -> Result<T, VaLoadError> {
    lib.get::<T>(name).map(|s| *s).map_err(|e| {
        let display = String::from_utf8_lossy(&name[..name.len().saturating_sub(1)]);
        VaLoadError::SymbolNotFound(format!("{display}: {e}"))
    })
}

// ---------------------------------------------------------------------------
// Error type for library loading
// ---------------------------------------------------------------------------

/// Errors that can occur when loading the VA-API libraries.
#[derive(Debug, thiserror::Error)]
pub enum VaLoadError {
    #[error("VA-API library not found: {0}")]
    LibraryNotFound(String),

    #[error("Required symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("VA-API libraries failed to load earlier: {0}")]
    Cached(String),
}

impl From<VaLoadError> for ProbeError {
    fn from(e: VaLoadError) -> Self {
        match e {
            VaLoadError::SymbolNotFound(s) => ProbeError::SymbolNotFound(s),
            other => ProbeError::LibraryLoad(other.to_string()),
        }
    }
}

/// Convert a VA status to a Result.
pub fn check_va_status(status: VaStatus, call: &'static str) -> Result<(), ProbeError> {
    if status == crate::va::VA_STATUS_SUCCESS {
        Ok(())
    } else {
        Err(ProbeError::Query { call, status })
    }
}
