//! Decoder selection for an input stream.
//!
//! Resolution walks an ordered list of strategies and returns the first
//! decoder one of them produces. The default order is hardware, then software.
//! `None` means no decoder exists for the codec at all; the coordinator must
//! treat that input as undecodable.

use serde::Serialize;
use tracing::{debug, warn};

use hwcaps_common::{PixelFormat, Resolution, VideoCodec};

use crate::context::NegotiationContext;

/// Hardware decoder name for `codec`, if VA-API has one.
pub fn hw_decoder_name(codec: VideoCodec) -> Option<&'static str> {
    match codec {
        VideoCodec::H264 => Some("h264_vaapi"),
        VideoCodec::Hevc => Some("hevc_vaapi"),
        VideoCodec::Av1 => Some("av1_vaapi"),
        VideoCodec::Vp9 => Some("vp9_vaapi"),
        VideoCodec::Vp8 => Some("vp8_vaapi"),
        VideoCodec::Mpeg2 => Some("mpeg2_vaapi"),
        _ => None,
    }
}

/// Software decoder name for `codec`.
pub fn sw_decoder_name(codec: VideoCodec) -> Option<&'static str> {
    match codec {
        VideoCodec::H264 => Some("h264"),
        VideoCodec::Hevc => Some("hevc"),
        VideoCodec::Av1 => Some("libdav1d"),
        VideoCodec::Vp9 => Some("vp9"),
        VideoCodec::Vp8 => Some("vp8"),
        VideoCodec::Mpeg2 => Some("mpeg2video"),
        VideoCodec::Mpeg4 => Some("mpeg4"),
        VideoCodec::Vc1 => Some("vc1"),
        VideoCodec::Theora => Some("theora"),
        VideoCodec::Other(_) => None,
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DecoderKind {
    Hardware,
    Software,
}

/// A resolved decoder.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DecoderChoice {
    pub name: &'static str,
    pub kind: DecoderKind,
}

impl DecoderChoice {
    pub fn is_hardware(&self) -> bool {
        self.kind == DecoderKind::Hardware
    }
}

/// The stream being decoded.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DecodeRequest {
    pub codec: VideoCodec,
    pub pix_fmt: PixelFormat,
    pub resolution: Resolution,
}

impl DecodeRequest {
    pub fn new(codec: VideoCodec, pix_fmt: PixelFormat, resolution: Resolution) -> Self {
        Self {
            codec,
            pix_fmt,
            resolution,
        }
    }
}

/// One step of decoder resolution.
pub trait ResolutionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// A decoder for `request`, or `None` to defer to the next strategy.
    fn resolve(&self, ctx: &NegotiationContext, request: &DecodeRequest) -> Option<DecoderChoice>;
}

/// Hardware decoder when the combination is confirmed supported.
#[derive(Copy, Clone, Debug, Default)]
pub struct HardwareStrategy;

impl ResolutionStrategy for HardwareStrategy {
    fn name(&self) -> &'static str {
        "hardware"
    }

    fn resolve(&self, ctx: &NegotiationContext, request: &DecodeRequest) -> Option<DecoderChoice> {
        if !crate::COMPILED_IN {
            return None;
        }
        if !ctx.decode_is_codec_supported(request.codec, request.pix_fmt, request.resolution) {
            debug!(
                codec = %request.codec,
                pix_fmt = ?request.pix_fmt,
                resolution = %request.resolution,
                "Hardware decode not supported"
            );
            return None;
        }
        hw_decoder_name(request.codec).map(|name| DecoderChoice {
            name,
            kind: DecoderKind::Hardware,
        })
    }
}

/// Software decoder for the codec, regardless of hardware.
#[derive(Copy, Clone, Debug, Default)]
pub struct SoftwareStrategy;

impl ResolutionStrategy for SoftwareStrategy {
    fn name(&self) -> &'static str {
        "software"
    }

    fn resolve(&self, _ctx: &NegotiationContext, request: &DecodeRequest) -> Option<DecoderChoice> {
        sw_decoder_name(request.codec).map(|name| DecoderChoice {
            name,
            kind: DecoderKind::Software,
        })
    }
}

/// Ordered list of [`ResolutionStrategy`]s.
pub struct DecoderResolver {
    strategies: Vec<Box<dyn ResolutionStrategy>>,
}

impl Default for DecoderResolver {
    fn default() -> Self {
        Self::new(vec![Box::new(HardwareStrategy), Box::new(SoftwareStrategy)])
    }
}

impl DecoderResolver {
    pub fn new(strategies: Vec<Box<dyn ResolutionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Names of the strategies, in evaluation order.
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// First decoder any strategy produces for `request`.
    pub fn resolve(
        &self,
        ctx: &NegotiationContext,
        request: &DecodeRequest,
    ) -> Option<DecoderChoice> {
        let choice = self
            .strategies
            .iter()
            .find_map(|strategy| {
                strategy.resolve(ctx, request).inspect(|choice| {
                    debug!(
                        strategy = strategy.name(),
                        decoder = choice.name,
                        codec = %request.codec,
                        "Resolved decoder"
                    );
                })
            });

        if choice.is_none() {
            warn!(codec = %request.codec, "No decoder available for codec");
        }
        choice
    }
}

impl std::fmt::Debug for DecoderResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecoderResolver")
            .field("strategies", &self.strategy_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hwcaps_common::NegotiationConfig;

    fn disabled_ctx() -> NegotiationContext {
        NegotiationContext::new(NegotiationConfig::default().with_hardware_disabled(true))
    }

    #[test]
    fn default_order_is_hardware_then_software() {
        assert_eq!(
            DecoderResolver::default().strategy_names(),
            vec!["hardware", "software"]
        );
    }

    #[test]
    fn falls_back_to_software() {
        let ctx = disabled_ctx();
        let request = DecodeRequest::new(VideoCodec::Av1, PixelFormat::Yuv420p, Resolution::UHD);
        let choice = DecoderResolver::default().resolve(&ctx, &request).unwrap();
        assert_eq!(choice.name, "libdav1d");
        assert!(!choice.is_hardware());
    }

    #[test]
    fn unknown_codec_resolves_to_nothing() {
        let ctx = disabled_ctx();
        let request = DecodeRequest::new(VideoCodec::Other(7), PixelFormat::Yuv420p, Resolution::HD);
        assert!(DecoderResolver::default().resolve(&ctx, &request).is_none());
    }

    #[test]
    fn every_named_codec_has_a_software_decoder() {
        let codecs = [
            VideoCodec::H264,
            VideoCodec::Hevc,
            VideoCodec::Av1,
            VideoCodec::Vp9,
            VideoCodec::Vp8,
            VideoCodec::Mpeg2,
            VideoCodec::Mpeg4,
            VideoCodec::Vc1,
            VideoCodec::Theora,
        ];
        for codec in codecs {
            assert!(sw_decoder_name(codec).is_some(), "{codec}");
        }
    }

    #[test]
    fn hardware_names() {
        assert_eq!(hw_decoder_name(VideoCodec::Hevc), Some("hevc_vaapi"));
        assert_eq!(hw_decoder_name(VideoCodec::Theora), None);
    }
}
