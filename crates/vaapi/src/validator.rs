//! Job validation against probed capabilities.
//!
//! Validation adjusts a [`JobDescriptor`] in place and never fails. Hardware
//! decode is cleared when it cannot be honored; a hardware encoder request that
//! cannot be honored is flagged so the coordinator substitutes software. The
//! requested encoder itself is never rewritten.

use std::fmt;

use serde::Serialize;
use tracing::{info, warn};

use hwcaps_common::{
    CodecFamily, JobDescriptor, PixelFormat, RateControlIntent, Resolution, VideoCodec,
};

use crate::context::NegotiationContext;

/// Why a hardware path was refused for a job.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectReason {
    HardwareUnavailable,
    DecodeUnsupported {
        codec: VideoCodec,
        pix_fmt: PixelFormat,
        resolution: Resolution,
    },
    EncoderUnavailable {
        family: CodecFamily,
    },
    InvalidResolution {
        resolution: Resolution,
    },
    ResolutionTooLarge {
        family: CodecFamily,
        resolution: Resolution,
        max_width: u32,
        max_height: u32,
    },
    RateControlUnsupported {
        family: CodecFamily,
        intent: RateControlIntent,
    },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HardwareUnavailable => f.write_str("no VA-API hardware available"),
            Self::DecodeUnsupported {
                codec,
                pix_fmt,
                resolution,
            } => write!(
                f,
                "hardware decode of {codec} ({pix_fmt:?}, {resolution}) not supported"
            ),
            Self::EncoderUnavailable { family } => {
                write!(f, "{family} hardware encoder not available")
            }
            Self::InvalidResolution { resolution } => {
                write!(f, "resolution {resolution} is not a valid picture size")
            }
            Self::ResolutionTooLarge {
                family,
                resolution,
                max_width,
                max_height,
            } => write!(
                f,
                "{family} hardware encoder supports up to {max_width}x{max_height}, job is {resolution}"
            ),
            Self::RateControlUnsupported { family, intent } => match intent {
                RateControlIntent::Quality(_) => write!(
                    f,
                    "{family} hardware encoder supports neither CQP nor VBR for constant quality"
                ),
                RateControlIntent::Bitrate(_) => write!(
                    f,
                    "{family} hardware encoder supports neither VBR nor CBR for average bitrate"
                ),
            },
        }
    }
}

/// A change validation made to a job.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "action", content = "cause", rename_all = "snake_case")]
pub enum Adjustment {
    HwDecodeCleared(RejectReason),
    HwEncoderUnsupported(RejectReason),
}

/// Every adjustment made during one validation.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub adjustments: Vec<Adjustment>,
}

impl ValidationReport {
    /// Whether the job came through untouched.
    pub fn is_unchanged(&self) -> bool {
        self.adjustments.is_empty()
    }

    pub fn hw_decode_cleared(&self) -> bool {
        self.adjustments
            .iter()
            .any(|a| matches!(a, Adjustment::HwDecodeCleared(_)))
    }

    pub fn hw_encoder_rejected(&self) -> bool {
        self.adjustments
            .iter()
            .any(|a| matches!(a, Adjustment::HwEncoderUnsupported(_)))
    }
}

/// Applies capability checks to jobs.
#[derive(Clone, Copy, Debug)]
pub struct JobValidator<'a> {
    ctx: &'a NegotiationContext,
}

impl<'a> JobValidator<'a> {
    pub fn new(ctx: &'a NegotiationContext) -> Self {
        Self { ctx }
    }

    /// Adjust `job` to what the hardware can do.
    pub fn validate(&self, job: &mut JobDescriptor) -> ValidationReport {
        let mut report = ValidationReport::default();

        if job.hw_decode && !self.ctx.available() {
            self.clear_hw_decode(job, RejectReason::HardwareUnavailable, &mut report);
        }

        if job.hw_decode
            && !self
                .ctx
                .decode_is_codec_supported(job.input_codec, job.input_pix_fmt, job.resolution)
        {
            let reason = RejectReason::DecodeUnsupported {
                codec: job.input_codec,
                pix_fmt: job.input_pix_fmt,
                resolution: job.resolution,
            };
            self.clear_hw_decode(job, reason, &mut report);
        }

        if let Some(family) = job.encoder.vaapi_family() {
            if let Some(reason) = self.check_encoder(family, job) {
                warn!(
                    encoder = job.encoder.short_name(),
                    reason = %reason,
                    "Hardware encoder unsupported for job, falling back to software"
                );
                job.hw_encoder_unsupported = true;
                report.adjustments.push(Adjustment::HwEncoderUnsupported(reason));
            }
        }

        report
    }

    fn clear_hw_decode(
        &self,
        job: &mut JobDescriptor,
        reason: RejectReason,
        report: &mut ValidationReport,
    ) {
        info!(codec = %job.input_codec, reason = %reason, "Disabling hardware decode");
        job.hw_decode = false;
        report.adjustments.push(Adjustment::HwDecodeCleared(reason));
    }

    /// First reason the family's encoder cannot serve `job`, if any.
    fn check_encoder(&self, family: CodecFamily, job: &JobDescriptor) -> Option<RejectReason> {
        if !self.ctx.is_available(family) {
            return Some(RejectReason::EncoderUnavailable { family });
        }

        let resolution = job.resolution;
        if !resolution.is_valid() {
            return Some(RejectReason::InvalidResolution { resolution });
        }

        let max_width = self.ctx.max_width(family);
        let max_height = self.ctx.max_height(family);
        if !resolution.fits_within(max_width, max_height) {
            return Some(RejectReason::ResolutionTooLarge {
                family,
                resolution,
                max_width,
                max_height,
            });
        }

        let rc_ok = match job.rate_control {
            RateControlIntent::Quality(_) => {
                self.ctx.supports_cqp(family) || self.ctx.supports_vbr(family)
            }
            RateControlIntent::Bitrate(_) => {
                self.ctx.supports_vbr(family) || self.ctx.supports_cbr(family)
            }
        };
        if !rc_ok {
            return Some(RejectReason::RateControlUnsupported {
                family,
                intent: job.rate_control,
            });
        }

        None
    }
}

impl NegotiationContext {
    /// Validate `job` with a [`JobValidator`] over this context.
    pub fn validate_job(&self, job: &mut JobDescriptor) -> ValidationReport {
        JobValidator::new(self).validate(job)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hwcaps_common::{NegotiationConfig, VideoEncoder};

    #[test]
    fn disabled_hardware_clears_decode_and_flags_encoder() {
        let ctx = NegotiationContext::new(NegotiationConfig::default().with_hardware_disabled(true));
        let mut job = JobDescriptor::new(
            VideoCodec::H264,
            Resolution::FHD,
            VideoEncoder::VaapiH264,
            RateControlIntent::Quality(22.0),
        )
        .with_hw_decode(true);

        let report = ctx.validate_job(&mut job);

        assert!(!job.hw_decode);
        assert!(job.hw_encoder_unsupported);
        assert_eq!(job.encoder, VideoEncoder::VaapiH264);
        assert_eq!(
            report.adjustments[0],
            Adjustment::HwDecodeCleared(RejectReason::HardwareUnavailable)
        );
        assert!(report.hw_encoder_rejected());
    }

    #[test]
    fn software_job_is_untouched() {
        let ctx = NegotiationContext::new(NegotiationConfig::default().with_hardware_disabled(true));
        let mut job = JobDescriptor::new(
            VideoCodec::Vp9,
            Resolution::UHD,
            VideoEncoder::X265,
            RateControlIntent::Bitrate(8000),
        );
        let before = job.clone();
        let report = ctx.validate_job(&mut job);
        assert!(report.is_unchanged());
        assert_eq!(job, before);
    }

    #[test]
    fn reasons_read_well() {
        let reason = RejectReason::RateControlUnsupported {
            family: CodecFamily::H265,
            intent: RateControlIntent::Bitrate(4000),
        };
        assert!(reason.to_string().contains("neither VBR nor CBR"));
        let reason = RejectReason::InvalidResolution {
            resolution: Resolution::new(0, 1080),
        };
        assert!(reason.to_string().contains("0x1080"));
    }
}
