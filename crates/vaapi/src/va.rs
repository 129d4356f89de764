//! VA-API identifiers and attribute layouts.
//!
//! Numeric values match libva's `va.h`. These types are shared by the native
//! bindings and the simulated backend, so they are compiled regardless of the
//! `vaapi` feature.

use std::fmt;

/// VA-API return type. 0 means success.
pub type VaStatus = i32;

/// Success return code.
pub const VA_STATUS_SUCCESS: VaStatus = 0;

/// Attribute value reported for attributes the driver does not implement.
pub const VA_ATTRIB_NOT_SUPPORTED: u32 = 0x8000_0000;

// ---------------------------------------------------------------------------
// Profiles (VAProfile)
// ---------------------------------------------------------------------------

/// Codec profile identifier. Matches `VAProfile`.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct VaProfile(pub i32);

impl VaProfile {
    pub const NONE: Self = Self(-1);
    pub const MPEG2_SIMPLE: Self = Self(0);
    pub const MPEG2_MAIN: Self = Self(1);
    pub const H264_MAIN: Self = Self(6);
    pub const H264_HIGH: Self = Self(7);
    pub const VC1_ADVANCED: Self = Self(10);
    pub const JPEG_BASELINE: Self = Self(12);
    pub const H264_CONSTRAINED_BASELINE: Self = Self(13);
    pub const VP8_VERSION0_3: Self = Self(14);
    pub const HEVC_MAIN: Self = Self(17);
    pub const HEVC_MAIN10: Self = Self(18);
    pub const VP9_PROFILE0: Self = Self(19);
    pub const VP9_PROFILE2: Self = Self(21);
    pub const HEVC_MAIN12: Self = Self(23);
    pub const AV1_PROFILE0: Self = Self(32);

    /// Short display name for logging.
    pub fn name(self) -> &'static str {
        match self {
            Self::NONE => "None",
            Self::MPEG2_SIMPLE => "MPEG2 Simple",
            Self::MPEG2_MAIN => "MPEG2 Main",
            Self::H264_MAIN => "H264 Main",
            Self::H264_HIGH => "H264 High",
            Self::VC1_ADVANCED => "VC1 Advanced",
            Self::JPEG_BASELINE => "JPEG Baseline",
            Self::H264_CONSTRAINED_BASELINE => "H264 Constrained Baseline",
            Self::VP8_VERSION0_3 => "VP8",
            Self::HEVC_MAIN => "HEVC Main",
            Self::HEVC_MAIN10 => "HEVC Main10",
            Self::VP9_PROFILE0 => "VP9 Profile0",
            Self::VP9_PROFILE2 => "VP9 Profile2",
            Self::HEVC_MAIN12 => "HEVC Main12",
            Self::AV1_PROFILE0 => "AV1 Profile0",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for VaProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Entrypoints (VAEntrypoint)
// ---------------------------------------------------------------------------

/// Hardware function for a profile. Matches `VAEntrypoint`.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct VaEntrypoint(pub i32);

impl VaEntrypoint {
    /// Variable-length decode.
    pub const VLD: Self = Self(1);
    pub const ENC_SLICE: Self = Self(6);
    pub const ENC_PICTURE: Self = Self(7);
    /// Low-power encode (fixed-function pipe on Intel).
    pub const ENC_SLICE_LP: Self = Self(8);
    pub const VIDEO_PROC: Self = Self(10);

    /// Encode entrypoints usable for attribute queries, in preference order.
    pub const ENCODE_PREFERENCE: [Self; 2] = [Self::ENC_SLICE, Self::ENC_SLICE_LP];

    pub fn is_encode(self) -> bool {
        matches!(self, Self::ENC_SLICE | Self::ENC_PICTURE | Self::ENC_SLICE_LP)
    }
}

// ---------------------------------------------------------------------------
// Config attributes (VAConfigAttribType / VAConfigAttrib)
// ---------------------------------------------------------------------------

/// Configuration attribute selector. Matches `VAConfigAttribType`.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ConfigAttribType(pub i32);

impl ConfigAttribType {
    pub const RT_FORMAT: Self = Self(0);
    pub const RATE_CONTROL: Self = Self(5);
    pub const ENC_PACKED_HEADERS: Self = Self(10);
    pub const ENC_MAX_REF_FRAMES: Self = Self(13);
    pub const MAX_PICTURE_WIDTH: Self = Self(18);
    pub const MAX_PICTURE_HEIGHT: Self = Self(19);
    pub const ENC_QUALITY_RANGE: Self = Self(21);

    pub fn name(self) -> &'static str {
        match self {
            Self::RT_FORMAT => "RTFormat",
            Self::RATE_CONTROL => "RateControl",
            Self::ENC_PACKED_HEADERS => "EncPackedHeaders",
            Self::ENC_MAX_REF_FRAMES => "EncMaxRefFrames",
            Self::MAX_PICTURE_WIDTH => "MaxPictureWidth",
            Self::MAX_PICTURE_HEIGHT => "MaxPictureHeight",
            Self::ENC_QUALITY_RANGE => "EncQualityRange",
            _ => "Unknown",
        }
    }
}

/// One attribute slot. Matches `VAConfigAttrib`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ConfigAttrib {
    pub attrib_type: ConfigAttribType,
    pub value: u32,
}

impl ConfigAttrib {
    pub fn query(attrib_type: ConfigAttribType) -> Self {
        Self {
            attrib_type,
            value: 0,
        }
    }

    pub fn is_supported(&self) -> bool {
        self.value != VA_ATTRIB_NOT_SUPPORTED
    }
}

// ---------------------------------------------------------------------------
// Attribute value bits
// ---------------------------------------------------------------------------

/// `VA_RC_*` rate-control bits.
pub mod rc {
    pub const NONE: u32 = 0x0000_0001;
    pub const CBR: u32 = 0x0000_0002;
    pub const VBR: u32 = 0x0000_0004;
    pub const VCM: u32 = 0x0000_0008;
    pub const CQP: u32 = 0x0000_0010;
    pub const VBR_CONSTRAINED: u32 = 0x0000_0020;
    pub const ICQ: u32 = 0x0000_0040;
    pub const QVBR: u32 = 0x0000_0400;
}

/// `VA_RT_FORMAT_*` render-target format bits.
pub mod rt_format {
    pub const YUV420: u32 = 0x0000_0001;
    pub const YUV422: u32 = 0x0000_0002;
    pub const YUV444: u32 = 0x0000_0004;
    pub const YUV420_10: u32 = 0x0000_0100;
    pub const YUV422_10: u32 = 0x0000_0200;
    pub const YUV444_10: u32 = 0x0000_0400;
}

/// `VA_ENC_PACKED_HEADER_*` bits.
pub mod packed_header {
    pub const SEQUENCE: u32 = 0x0000_0001;
    pub const PICTURE: u32 = 0x0000_0002;
    pub const SLICE: u32 = 0x0000_0004;
    pub const MISC: u32 = 0x0000_0008;
    pub const RAW_DATA: u32 = 0x0000_0010;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attrib_layout_matches_c() {
        assert_eq!(std::mem::size_of::<ConfigAttrib>(), 8);
        assert_eq!(std::mem::size_of::<VaProfile>(), 4);
    }

    #[test]
    fn profile_names() {
        assert_eq!(VaProfile::HEVC_MAIN10.name(), "HEVC Main10");
        assert_eq!(VaProfile(999).to_string(), "Unknown");
    }

    #[test]
    fn encode_entrypoints() {
        assert!(VaEntrypoint::ENC_SLICE_LP.is_encode());
        assert!(!VaEntrypoint::VLD.is_encode());
    }

    #[test]
    fn unsupported_sentinel() {
        let mut attrib = ConfigAttrib::query(ConfigAttribType::RATE_CONTROL);
        assert!(attrib.is_supported());
        attrib.value = VA_ATTRIB_NOT_SUPPORTED;
        assert!(!attrib.is_supported());
    }
}
