//! `hwcaps-common`: shared types, errors, and configuration for hardware
//! capability negotiation.
//!
//! This crate is the foundation the negotiation crates depend on:
//!
//! - **Codecs**: `VideoCodec` (open set of input codecs), `CodecFamily`
//!   (fixed set of hardware-probed families), `VideoEncoder`
//! - **Color**: `PixelFormat` with bit depth / chroma helpers
//! - **Types**: `Resolution`
//! - **Job**: `JobDescriptor`, `RateControlIntent` (coordinator-owned job view)
//! - **Errors**: `ProbeError` (thiserror-based, internal probe taxonomy)
//! - **Filters**: `FilterKind`
//! - **Config**: `NegotiationConfig`

pub mod codec;
pub mod color;
pub mod config;
pub mod error;
pub mod filter;
pub mod job;
pub mod types;

// Re-export commonly used items at crate root
pub use codec::{CodecFamily, VideoCodec, VideoEncoder};
pub use color::PixelFormat;
pub use config::NegotiationConfig;
pub use error::{ProbeError, ProbeResult};
pub use filter::FilterKind;
pub use job::{JobDescriptor, RateControlIntent};
pub use types::Resolution;
