//! Profile probing and capability attribute reads.
//!
//! For a family, each target profile is looked for on each accepted device in
//! turn. The first device exposing the profile decides availability and, if it
//! has an encode entrypoint, supplies the attribute values.

use tracing::{debug, info, warn};

use hwcaps_common::{CodecFamily, ProbeError, ProbeResult};

use crate::backend::{DeviceHandle, VaSession};
use crate::capability::{Capability, PackedHeaders, RateControlModes, TriState};
use crate::scanner::DeviceScanner;
use crate::va::{rt_format, ConfigAttrib, ConfigAttribType, VaEntrypoint, VaProfile};

/// Attributes read for every available family.
const QUERIED_ATTRIBUTES: [ConfigAttribType; 7] = [
    ConfigAttribType::RATE_CONTROL,
    ConfigAttribType::MAX_PICTURE_WIDTH,
    ConfigAttribType::MAX_PICTURE_HEIGHT,
    ConfigAttribType::RT_FORMAT,
    ConfigAttribType::ENC_MAX_REF_FRAMES,
    ConfigAttribType::ENC_QUALITY_RANGE,
    ConfigAttribType::ENC_PACKED_HEADERS,
];

/// More list-0 references than this is taken to mean B-frames are usable.
///
/// This is a heuristic: libva has no direct B-frame attribute, and a driver
/// could allow several references while still refusing B-frames.
const BFRAME_MIN_REFERENCES: u32 = 2;

/// Profiles probed for a family, in order. The first one found wins.
pub fn target_profiles(family: CodecFamily) -> &'static [VaProfile] {
    match family {
        CodecFamily::H264 => &[VaProfile::H264_MAIN, VaProfile::H264_HIGH],
        CodecFamily::H265 => &[VaProfile::HEVC_MAIN],
        CodecFamily::H265_10Bit => &[VaProfile::HEVC_MAIN10],
    }
}

/// Drives a [`DeviceScanner`] to build a family's [`Capability`].
pub struct ProfileProber<'a> {
    scanner: DeviceScanner<'a>,
}

impl<'a> ProfileProber<'a> {
    pub fn new(scanner: DeviceScanner<'a>) -> Self {
        Self { scanner }
    }

    /// Probe every candidate device for `family`.
    ///
    /// Never fails: exhausting all profiles and devices yields an unavailable
    /// capability.
    pub fn probe_family(&self, family: CodecFamily) -> Capability {
        for &profile in target_profiles(family) {
            info!(profile = %profile, "Checking for profile support");

            for mut device in self.scanner.candidates() {
                let path = device.path().to_path_buf();
                match probe_device(device.as_mut(), family, profile) {
                    Ok(Some(capability)) => return capability,
                    Ok(None) => {}
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Device unusable, trying next");
                    }
                }
            }

            let miss = ProbeError::ProfileUnsupported(profile.name());
            info!(family = %family, "{miss}");
        }

        info!(family = %family, "No suitable hardware encoder found");
        Capability::unavailable(family)
    }
}

/// Look for `profile` on one open device.
///
/// Returns `Ok(None)` when the device works but lacks the profile. The VA
/// display is terminated before this returns, on every path.
pub fn probe_device(
    device: &mut dyn DeviceHandle,
    family: CodecFamily,
    profile: VaProfile,
) -> ProbeResult<Option<Capability>> {
    let path = device.path().to_path_buf();
    let driver = device.driver_name().ok();
    let session = device.initialize()?;
    let (major, minor) = session.version();

    let profiles = session.profiles()?;
    if !profiles.contains(&profile) {
        info!(
            profile = %profile,
            path = %path.display(),
            found = profiles.len(),
            "Profile not supported on device"
        );
        return Ok(None);
    }

    info!(
        profile = %profile,
        path = %path.display(),
        va_version = %format_args!("{major}.{minor}"),
        "Profile supported"
    );

    let mut capability = Capability::new(family);
    capability.availability = TriState::Yes;
    capability.device = Some(path);
    capability.driver = driver;
    capability.profile = Some(profile.name());

    match encode_entrypoint(session.as_ref(), profile) {
        Some(entrypoint) => read_attributes(session.as_ref(), profile, entrypoint, &mut capability),
        None => debug!(profile = %profile, "No encode entrypoint, keeping default attributes"),
    }

    Ok(Some(capability))
}

fn encode_entrypoint(session: &dyn VaSession, profile: VaProfile) -> Option<VaEntrypoint> {
    let entrypoints = match session.entrypoints(profile) {
        Ok(eps) => eps,
        Err(e) => {
            warn!(profile = %profile, error = %e, "Entrypoint query failed");
            return None;
        }
    };
    VaEntrypoint::ENCODE_PREFERENCE
        .into_iter()
        .find(|ep| entrypoints.contains(ep))
}

fn read_attributes(
    session: &dyn VaSession,
    profile: VaProfile,
    entrypoint: VaEntrypoint,
    capability: &mut Capability,
) {
    let mut attribs = QUERIED_ATTRIBUTES.map(ConfigAttrib::query);
    if let Err(e) = session.config_attributes(profile, entrypoint, &mut attribs) {
        warn!(profile = %profile, error = %e, "Attribute query failed, keeping defaults");
        return;
    }

    for attrib in &attribs {
        if let Err(e) = apply_attribute(capability, attrib) {
            debug!(family = %capability.family, "{e}");
        }
    }

    info!(
        family = %capability.family,
        max_width = capability.max_width,
        max_height = capability.max_height,
        rc_modes = ?capability.rate_control_modes.names(),
        bframes = ?capability.supports_bframes,
        ten_bit = ?capability.supports_10bit,
        quality_levels = capability.quality_levels,
        packed_headers = capability.packed_headers.bits(),
        "Encoder capabilities"
    );
}

/// Fold one attribute into `capability`.
///
/// # Errors
/// `ProbeError::AttributeUnsupported` when the driver did not report the
/// attribute; `capability` is left untouched in that case.
pub fn apply_attribute(capability: &mut Capability, attrib: &ConfigAttrib) -> ProbeResult<()> {
    if !attrib.is_supported() {
        return Err(ProbeError::AttributeUnsupported(attrib.attrib_type.name()));
    }
    let value = attrib.value;

    match attrib.attrib_type {
        ConfigAttribType::RATE_CONTROL => {
            capability.rate_control_modes = RateControlModes::from_va_mask(value);
        }
        ConfigAttribType::MAX_PICTURE_WIDTH if value > 0 => capability.max_width = value,
        ConfigAttribType::MAX_PICTURE_HEIGHT if value > 0 => capability.max_height = value,
        ConfigAttribType::RT_FORMAT => {
            capability.supports_10bit = TriState::from_bool(value & rt_format::YUV420_10 != 0);
        }
        ConfigAttribType::ENC_MAX_REF_FRAMES => {
            // Low 16 bits: list-0 references. High 16 bits: list-1.
            let l0_refs = value & 0xffff;
            capability.supports_bframes = TriState::from_bool(l0_refs > BFRAME_MIN_REFERENCES);
        }
        ConfigAttribType::ENC_QUALITY_RANGE => capability.quality_levels = value,
        ConfigAttribType::ENC_PACKED_HEADERS => {
            capability.packed_headers = PackedHeaders::from_va_mask(value);
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::sim::{SimDevice, SimulatedBackend};
    use crate::va::{rc, VaEntrypoint, VA_ATTRIB_NOT_SUPPORTED};
    use hwcaps_common::NegotiationConfig;

    fn attrib(attrib_type: ConfigAttribType, value: u32) -> ConfigAttrib {
        ConfigAttrib { attrib_type, value }
    }

    #[test]
    fn h264_tries_main_then_high() {
        assert_eq!(
            target_profiles(CodecFamily::H264),
            &[VaProfile::H264_MAIN, VaProfile::H264_HIGH]
        );
        assert_eq!(target_profiles(CodecFamily::H265_10Bit), &[VaProfile::HEVC_MAIN10]);
    }

    #[test]
    fn unsupported_attribute_keeps_default() {
        let mut cap = Capability::new(CodecFamily::H264);
        let err = apply_attribute(
            &mut cap,
            &attrib(ConfigAttribType::MAX_PICTURE_WIDTH, VA_ATTRIB_NOT_SUPPORTED),
        );
        assert!(matches!(err, Err(ProbeError::AttributeUnsupported("MaxPictureWidth"))));
        assert_eq!(cap.max_width, 4096);
    }

    #[test]
    fn zero_dimension_is_ignored() {
        let mut cap = Capability::new(CodecFamily::H265);
        apply_attribute(&mut cap, &attrib(ConfigAttribType::MAX_PICTURE_HEIGHT, 0)).unwrap();
        assert_eq!(cap.max_height, 4096);
    }

    #[test]
    fn bframe_heuristic_threshold() {
        let mut cap = Capability::new(CodecFamily::H264);
        apply_attribute(&mut cap, &attrib(ConfigAttribType::ENC_MAX_REF_FRAMES, 3)).unwrap();
        assert_eq!(cap.supports_bframes, TriState::Yes);
        apply_attribute(&mut cap, &attrib(ConfigAttribType::ENC_MAX_REF_FRAMES, 2)).unwrap();
        assert_eq!(cap.supports_bframes, TriState::No);
        // One list-0 reference, one list-1 reference.
        apply_attribute(&mut cap, &attrib(ConfigAttribType::ENC_MAX_REF_FRAMES, 0x0001_0001))
            .unwrap();
        assert_eq!(cap.supports_bframes, TriState::No);
    }

    #[test]
    fn ten_bit_from_rt_format() {
        let mut cap = Capability::new(CodecFamily::H265_10Bit);
        apply_attribute(
            &mut cap,
            &attrib(ConfigAttribType::RT_FORMAT, rt_format::YUV420 | rt_format::YUV420_10),
        )
        .unwrap();
        assert_eq!(cap.supports_10bit, TriState::Yes);
        apply_attribute(&mut cap, &attrib(ConfigAttribType::RT_FORMAT, rt_format::YUV420)).unwrap();
        assert_eq!(cap.supports_10bit, TriState::No);
    }

    #[test]
    fn init_failure_moves_to_next_device() {
        let backend = SimulatedBackend::new()
            .with_device(
                SimDevice::new("/dev/dri/renderD128", "amdgpu")
                    .failing_init()
                    .with_profile(VaProfile::HEVC_MAIN, &[VaEntrypoint::ENC_SLICE]),
            )
            .with_device(
                SimDevice::new("/dev/dri/renderD129", "radeon")
                    .with_profile(VaProfile::HEVC_MAIN, &[VaEntrypoint::ENC_SLICE])
                    .with_attribute(ConfigAttribType::RATE_CONTROL, rc::CQP),
            );
        let config = NegotiationConfig::default();
        let prober = ProfileProber::new(DeviceScanner::new(&backend, &config));

        let cap = prober.probe_family(CodecFamily::H265);

        assert!(cap.is_available());
        assert_eq!(cap.device, Some(PathBuf::from("/dev/dri/renderD129")));
        assert_eq!(cap.driver.as_deref(), Some("radeon"));
        assert!(cap.rate_control_modes.contains(RateControlModes::CQP));
        assert_eq!(backend.open_handles(), 0);
        assert_eq!(backend.active_sessions(), 0);
    }

    #[test]
    fn decode_only_profile_is_available_with_defaults() {
        let backend = SimulatedBackend::new().with_device(
            SimDevice::new("/dev/dri/renderD128", "i915")
                .with_profile(VaProfile::H264_HIGH, &[VaEntrypoint::VLD])
                .with_attribute(ConfigAttribType::RATE_CONTROL, rc::CBR),
        );
        let config = NegotiationConfig::default();
        let prober = ProfileProber::new(DeviceScanner::new(&backend, &config));

        let cap = prober.probe_family(CodecFamily::H264);

        assert!(cap.is_available());
        assert_eq!(cap.profile, Some("H264 High"));
        assert!(cap.rate_control_modes.is_empty());
        assert!(cap.uses_fallback_bounds());
    }

    #[test]
    fn attribute_query_failure_keeps_availability() {
        let backend = SimulatedBackend::new().with_device(
            SimDevice::new("/dev/dri/renderD128", "i915")
                .failing_attribute_query()
                .with_profile(VaProfile::HEVC_MAIN10, &[VaEntrypoint::ENC_SLICE_LP]),
        );
        let config = NegotiationConfig::default();
        let prober = ProfileProber::new(DeviceScanner::new(&backend, &config));

        let cap = prober.probe_family(CodecFamily::H265_10Bit);

        assert!(cap.is_available());
        assert_eq!(cap.max_width, 8192);
        assert_eq!(cap.supports_10bit, TriState::Unknown);
        assert_eq!(backend.active_sessions(), 0);
    }

    #[test]
    fn missing_profile_releases_every_device() {
        let backend = SimulatedBackend::new()
            .with_device(SimDevice::new("/dev/dri/renderD128", "i915"))
            .with_device(SimDevice::new("/dev/dri/card0", "amdgpu"));
        let config = NegotiationConfig::default();
        let prober = ProfileProber::new(DeviceScanner::new(&backend, &config));

        let cap = prober.probe_family(CodecFamily::H265);

        assert_eq!(cap.availability, TriState::No);
        assert_eq!(backend.sessions_started(), 2);
        assert_eq!(backend.active_sessions(), 0);
        assert_eq!(backend.open_handles(), 0);
        assert_eq!(
            backend.released(),
            vec![PathBuf::from("/dev/dri/renderD128"), PathBuf::from("/dev/dri/card0")]
        );
    }
}
