//! The coordinator's job view that negotiation reads and adjusts.

use serde::{Deserialize, Serialize};

use crate::codec::{VideoCodec, VideoEncoder};
use crate::color::PixelFormat;
use crate::types::Resolution;

/// How the job asks the encoder to spend bits.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RateControlIntent {
    /// Constant-quality target (e.g. RF/CRF value).
    Quality(f32),
    /// Average bitrate target in kbit/s.
    Bitrate(u32),
}

impl RateControlIntent {
    pub fn is_quality(self) -> bool {
        matches!(self, Self::Quality(_))
    }
}

/// Job fields relevant to hardware negotiation.
///
/// Owned by the coordinator; negotiation only reads it and clears or sets
/// the hardware flags in place.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JobDescriptor {
    /// Codec of the input video stream.
    pub input_codec: VideoCodec,
    /// Pixel format the input decodes to.
    pub input_pix_fmt: PixelFormat,
    /// Picture size of the job.
    pub resolution: Resolution,
    /// Whether the job asks for hardware decoding.
    pub hw_decode: bool,
    /// Requested output encoder. Never rewritten by negotiation.
    pub encoder: VideoEncoder,
    /// Rate-control intent and its value.
    pub rate_control: RateControlIntent,
    /// Set when the requested hardware encoder cannot serve this job; the
    /// coordinator substitutes a software encoder.
    pub hw_encoder_unsupported: bool,
}

impl JobDescriptor {
    pub fn new(
        input_codec: VideoCodec,
        resolution: Resolution,
        encoder: VideoEncoder,
        rate_control: RateControlIntent,
    ) -> Self {
        Self {
            input_codec,
            input_pix_fmt: PixelFormat::default(),
            resolution,
            hw_decode: false,
            encoder,
            rate_control,
            hw_encoder_unsupported: false,
        }
    }

    pub fn with_hw_decode(mut self, hw_decode: bool) -> Self {
        self.hw_decode = hw_decode;
        self
    }

    pub fn with_pix_fmt(mut self, pix_fmt: PixelFormat) -> Self {
        self.input_pix_fmt = pix_fmt;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let job = JobDescriptor::new(
            VideoCodec::H264,
            Resolution::FHD,
            VideoEncoder::VaapiH264,
            RateControlIntent::Quality(22.0),
        );
        assert!(!job.hw_decode);
        assert!(!job.hw_encoder_unsupported);
        assert_eq!(job.input_pix_fmt, PixelFormat::Yuv420p);
        assert!(job.rate_control.is_quality());
    }

    #[test]
    fn serde_round_trip_keeps_flags() {
        let job = JobDescriptor::new(
            VideoCodec::Hevc,
            Resolution::UHD,
            VideoEncoder::VaapiH265_10Bit,
            RateControlIntent::Bitrate(8000),
        )
        .with_hw_decode(true)
        .with_pix_fmt(PixelFormat::P010);

        let json = serde_json::to_string(&job).unwrap();
        let back: JobDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, job);
    }
}
