//! Video codec, hardware codec family, and encoder identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Input video codec identifier.
///
/// This is an open set: codecs the transcoder can demux but that have no
/// dedicated variant are carried as `Other` with the container's raw codec id.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VideoCodec {
    H264,
    Hevc,
    Av1,
    Vp9,
    Vp8,
    Mpeg2,
    Mpeg4,
    Vc1,
    Theora,
    Other(u32),
}

impl VideoCodec {
    /// Human-readable name (for display/logging).
    pub fn display_name(self) -> &'static str {
        match self {
            Self::H264 => "H.264/AVC",
            Self::Hevc => "H.265/HEVC",
            Self::Av1 => "AV1",
            Self::Vp9 => "VP9",
            Self::Vp8 => "VP8",
            Self::Mpeg2 => "MPEG-2",
            Self::Mpeg4 => "MPEG-4 Part 2",
            Self::Vc1 => "VC-1",
            Self::Theora => "Theora",
            Self::Other(_) => "unknown",
        }
    }

    /// Parse a short codec name as used on command lines (`h264`, `hevc`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        let codec = match name.to_ascii_lowercase().as_str() {
            "h264" | "avc" => Self::H264,
            "hevc" | "h265" => Self::Hevc,
            "av1" => Self::Av1,
            "vp9" => Self::Vp9,
            "vp8" => Self::Vp8,
            "mpeg2" | "mpeg2video" => Self::Mpeg2,
            "mpeg4" => Self::Mpeg4,
            "vc1" => Self::Vc1,
            "theora" => Self::Theora,
            _ => return None,
        };
        Some(codec)
    }
}

impl fmt::Display for VideoCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Other(id) => write!(f, "codec#{id}"),
            other => f.write_str(other.display_name()),
        }
    }
}

/// Codec family whose hardware capabilities are probed and cached.
///
/// Closed set. H.265 8-bit and 10-bit are probed as distinct profiles of the
/// same codec and cached independently.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodecFamily {
    H264,
    H265,
    H265_10Bit,
}

impl CodecFamily {
    /// Every family, in probe order.
    pub const ALL: [CodecFamily; 3] = [Self::H264, Self::H265, Self::H265_10Bit];

    pub fn name(self) -> &'static str {
        match self {
            Self::H264 => "H.264",
            Self::H265 => "H.265",
            Self::H265_10Bit => "H.265 10-bit",
        }
    }

    /// Maximum picture dimension assumed when the hardware never reported one.
    pub fn fallback_max_dimension(self) -> u32 {
        match self {
            Self::H264 | Self::H265 => 4096,
            Self::H265_10Bit => 8192,
        }
    }

    /// Stable index into per-family tables.
    pub fn index(self) -> usize {
        match self {
            Self::H264 => 0,
            Self::H265 => 1,
            Self::H265_10Bit => 2,
        }
    }
}

impl fmt::Display for CodecFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Output video encoder requested by a job.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VideoEncoder {
    VaapiH264,
    VaapiH265,
    VaapiH265_10Bit,
    X264,
    X265,
    X265_10Bit,
    SvtAv1,
    Vp9,
}

impl VideoEncoder {
    /// The hardware family backing this encoder, if it is a VA-API encoder.
    pub fn vaapi_family(self) -> Option<CodecFamily> {
        match self {
            Self::VaapiH264 => Some(CodecFamily::H264),
            Self::VaapiH265 => Some(CodecFamily::H265),
            Self::VaapiH265_10Bit => Some(CodecFamily::H265_10Bit),
            _ => None,
        }
    }

    pub fn is_hardware(self) -> bool {
        self.vaapi_family().is_some()
    }

    /// Encoder short name as used in presets and logs.
    pub fn short_name(self) -> &'static str {
        match self {
            Self::VaapiH264 => "vaapi_h264",
            Self::VaapiH265 => "vaapi_h265",
            Self::VaapiH265_10Bit => "vaapi_h265_10bit",
            Self::X264 => "x264",
            Self::X265 => "x265",
            Self::X265_10Bit => "x265_10bit",
            Self::SvtAv1 => "svt_av1",
            Self::Vp9 => "vp9",
        }
    }
}
