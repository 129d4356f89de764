//! Read-only capability predicates.
//!
//! Every query is infallible. A family that was never probed, was disabled, or
//! was not found answers with the conservative default: unavailable, fallback
//! bounds, no rate-control modes.

use hwcaps_common::{CodecFamily, FilterKind, PixelFormat, Resolution, VideoCodec};

use crate::capability::{PackedHeaders, RateControlModes};
use crate::context::NegotiationContext;

impl NegotiationContext {
    // -----------------------------------------------------------------------
    // Encode
    // -----------------------------------------------------------------------

    pub fn is_available(&self, family: CodecFamily) -> bool {
        self.capability(family).is_available()
    }

    pub fn h264_available(&self) -> bool {
        self.is_available(CodecFamily::H264)
    }

    pub fn h265_available(&self) -> bool {
        self.is_available(CodecFamily::H265)
    }

    pub fn h265_10bit_available(&self) -> bool {
        self.is_available(CodecFamily::H265_10Bit)
    }

    /// `Unknown` reads as `false`.
    pub fn supports_bframes(&self, family: CodecFamily) -> bool {
        self.capability(family).supports_bframes.is_yes()
    }

    /// `Unknown` reads as `false`.
    pub fn supports_10bit(&self, family: CodecFamily) -> bool {
        self.capability(family).supports_10bit.is_yes()
    }

    /// Measured maximum width, or the family's fallback. Never zero.
    pub fn max_width(&self, family: CodecFamily) -> u32 {
        self.capability(family).max_width
    }

    /// Measured maximum height, or the family's fallback. Never zero.
    pub fn max_height(&self, family: CodecFamily) -> u32 {
        self.capability(family).max_height
    }

    /// Confirmed rate-control modes. Empty when the family is unavailable.
    pub fn rc_modes(&self, family: CodecFamily) -> RateControlModes {
        let capability = self.capability(family);
        if capability.is_available() {
            capability.rate_control_modes
        } else {
            RateControlModes::empty()
        }
    }

    pub fn supports_cqp(&self, family: CodecFamily) -> bool {
        self.rc_modes(family).contains(RateControlModes::CQP)
    }

    pub fn supports_vbr(&self, family: CodecFamily) -> bool {
        self.rc_modes(family).contains(RateControlModes::VBR)
    }

    pub fn supports_cbr(&self, family: CodecFamily) -> bool {
        self.rc_modes(family).contains(RateControlModes::CBR)
    }

    /// Number of encoder quality levels, 0 when unknown.
    pub fn quality_levels(&self, family: CodecFamily) -> u32 {
        self.capability(family).quality_levels
    }

    pub fn packed_headers(&self, family: CodecFamily) -> PackedHeaders {
        self.capability(family).packed_headers
    }

    // -----------------------------------------------------------------------
    // Decode
    // -----------------------------------------------------------------------

    /// Whether hardware can decode `codec` in `pix_fmt` at `resolution`.
    ///
    /// Only combinations backed by a probed family can be confirmed: H.264
    /// 8-bit 4:2:0 and HEVC 8/10-bit 4:2:0. The resolution must be non-zero
    /// and within the family's bounds.
    pub fn decode_is_codec_supported(
        &self,
        codec: VideoCodec,
        pix_fmt: PixelFormat,
        resolution: Resolution,
    ) -> bool {
        let Some(family) = decode_family(codec, pix_fmt) else {
            return false;
        };
        resolution.is_valid()
            && self.is_available(family)
            && resolution.fits_within(self.max_width(family), self.max_height(family))
    }

    pub fn decode_h264_is_supported(&self, pix_fmt: PixelFormat, resolution: Resolution) -> bool {
        self.decode_is_codec_supported(VideoCodec::H264, pix_fmt, resolution)
    }

    pub fn decode_h265_is_supported(&self, pix_fmt: PixelFormat, resolution: Resolution) -> bool {
        self.decode_is_codec_supported(VideoCodec::Hevc, pix_fmt, resolution)
    }

    pub fn decode_h265_10bit_is_supported(
        &self,
        pix_fmt: PixelFormat,
        resolution: Resolution,
    ) -> bool {
        pix_fmt.bit_depth() == 10
            && self.decode_is_codec_supported(VideoCodec::Hevc, pix_fmt, resolution)
    }

    /// AV1 decode is never probed, so it is never confirmed.
    pub fn decode_av1_is_supported(&self, _pix_fmt: PixelFormat, _resolution: Resolution) -> bool {
        false
    }

    /// Whether a filter chain can run alongside hardware encode. Frames are
    /// downloaded to system memory before filtering, so every chain is accepted.
    pub fn filters_supported(&self, _filters: &[FilterKind]) -> bool {
        true
    }
}

/// Probed family that covers decoding `codec` in `pix_fmt`.
fn decode_family(codec: VideoCodec, pix_fmt: PixelFormat) -> Option<CodecFamily> {
    if !pix_fmt.is_420() {
        return None;
    }
    match (codec, pix_fmt.bit_depth()) {
        (VideoCodec::H264, 8) => Some(CodecFamily::H264),
        (VideoCodec::Hevc, 8) => Some(CodecFamily::H265),
        (VideoCodec::Hevc, 10) => Some(CodecFamily::H265_10Bit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_family_mapping() {
        assert_eq!(decode_family(VideoCodec::H264, PixelFormat::Nv12), Some(CodecFamily::H264));
        assert_eq!(
            decode_family(VideoCodec::Hevc, PixelFormat::P010),
            Some(CodecFamily::H265_10Bit)
        );
        assert_eq!(decode_family(VideoCodec::H264, PixelFormat::Yuv420p10), None);
        assert_eq!(decode_family(VideoCodec::Hevc, PixelFormat::Yuv422p), None);
        assert_eq!(decode_family(VideoCodec::Vp9, PixelFormat::Yuv420p), None);
    }

    #[test]
    fn unprobed_context_is_conservative() {
        let ctx = NegotiationContext::new(
            hwcaps_common::NegotiationConfig::default().with_hardware_disabled(true),
        );
        for family in CodecFamily::ALL {
            assert!(!ctx.is_available(family));
            assert!(!ctx.supports_bframes(family));
            assert!(!ctx.supports_10bit(family));
            assert_eq!(ctx.max_width(family), family.fallback_max_dimension());
            assert!(ctx.rc_modes(family).is_empty());
            assert_eq!(ctx.quality_levels(family), 0);
        }
        assert!(!ctx.decode_h264_is_supported(PixelFormat::Yuv420p, Resolution::FHD));
        assert!(!ctx.decode_av1_is_supported(PixelFormat::Yuv420p, Resolution::FHD));
        assert!(ctx.filters_supported(&[FilterKind::Crop, FilterKind::Scale]));
    }
}
