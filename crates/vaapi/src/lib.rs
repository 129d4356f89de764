//! `hwcaps-vaapi`: VA-API capability negotiation.
//!
//! Discovers which codec families the GPU can encode, caches the answer once
//! per [`NegotiationContext`], and steers jobs toward hardware or software
//! without ever failing them.
//!
//! - [`scanner::DeviceScanner`] opens candidate DRM nodes and filters drivers
//! - [`prober::ProfileProber`] checks profiles and reads encoder attributes
//! - [`NegotiationContext`] holds the per-family cache and the predicates
//! - [`DecoderResolver`] picks a hardware or software decoder
//! - [`JobValidator`] adjusts a job's hardware flags in place
//!
//! The native backend needs the `vaapi` feature (on by default). Without it
//! every query answers with the conservative default and no device is touched.
//! [`sim::SimulatedBackend`] stands in for hardware in tests.

pub mod availability;
pub mod backend;
pub mod capability;
pub mod context;
pub mod prober;
pub mod resolver;
pub mod scanner;
pub mod sim;
pub mod va;
pub mod validator;

#[cfg(feature = "vaapi")]
pub mod ffi;
#[cfg(feature = "vaapi")]
pub mod native;

/// Whether the native VA-API backend was compiled in.
pub const COMPILED_IN: bool = cfg!(feature = "vaapi");

pub use backend::{DeviceHandle, VaBackend, VaSession};
pub use capability::{Capability, PackedHeaders, RateControlModes, TriState};
pub use context::{CapabilityReport, NegotiationContext};
pub use resolver::{
    hw_decoder_name, sw_decoder_name, DecodeRequest, DecoderChoice, DecoderKind, DecoderResolver,
    HardwareStrategy, ResolutionStrategy, SoftwareStrategy,
};
pub use validator::{Adjustment, JobValidator, RejectReason, ValidationReport};

#[cfg(feature = "vaapi")]
pub use native::NativeBackend;
