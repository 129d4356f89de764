//! Per-family hardware capability record.

use std::path::PathBuf;

use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

use hwcaps_common::CodecFamily;

use crate::va::{packed_header, rc};

/// Three-valued answer for properties that may never have been measured.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TriState {
    #[default]
    Unknown,
    No,
    Yes,
}

impl TriState {
    pub fn from_bool(value: bool) -> Self {
        if value {
            Self::Yes
        } else {
            Self::No
        }
    }

    /// Collapse to a boolean; `Unknown` reads as `false`.
    pub fn is_yes(self) -> bool {
        self == Self::Yes
    }
}

/// Rate-control modes confirmed by the driver.
///
/// Only CQP, VBR and CBR are tracked; other `VA_RC_*` bits are dropped.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct RateControlModes(u32);

impl RateControlModes {
    pub const CQP: Self = Self(rc::CQP);
    pub const VBR: Self = Self(rc::VBR);
    pub const CBR: Self = Self(rc::CBR);

    const TRACKED: u32 = rc::CQP | rc::VBR | rc::CBR;

    pub const fn empty() -> Self {
        Self(0)
    }

    /// Keep the tracked bits of a `VAConfigAttribRateControl` value.
    pub fn from_va_mask(mask: u32) -> Self {
        Self(mask & Self::TRACKED)
    }

    pub fn contains(self, other: Self) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn names(self) -> Vec<&'static str> {
        [(Self::CQP, "cqp"), (Self::VBR, "vbr"), (Self::CBR, "cbr")]
            .into_iter()
            .filter(|(mode, _)| self.contains(*mode))
            .map(|(_, name)| name)
            .collect()
    }
}

impl Serialize for RateControlModes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let names = self.names();
        let mut seq = serializer.serialize_seq(Some(names.len()))?;
        for name in names {
            seq.serialize_element(name)?;
        }
        seq.end()
    }
}

/// Packed header kinds the encoder accepts from the application.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PackedHeaders(u32);

impl PackedHeaders {
    pub const SEQUENCE: Self = Self(packed_header::SEQUENCE);
    pub const PICTURE: Self = Self(packed_header::PICTURE);
    pub const SLICE: Self = Self(packed_header::SLICE);
    pub const MISC: Self = Self(packed_header::MISC);
    pub const RAW_DATA: Self = Self(packed_header::RAW_DATA);

    pub fn from_va_mask(mask: u32) -> Self {
        Self(mask)
    }

    pub fn contains(self, other: Self) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub fn bits(self) -> u32 {
        self.0
    }
}

/// What the hardware can do for one codec family.
///
/// Starts out conservative: unknown availability, fallback bounds, no rate
/// control modes. Probing only ever overwrites fields with values the driver
/// confirmed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Capability {
    pub family: CodecFamily,
    pub availability: TriState,
    pub max_width: u32,
    pub max_height: u32,
    pub supports_bframes: TriState,
    pub supports_10bit: TriState,
    pub rate_control_modes: RateControlModes,
    pub quality_levels: u32,
    pub packed_headers: PackedHeaders,
    /// Device the family was found on.
    pub device: Option<PathBuf>,
    /// Kernel driver of that device.
    pub driver: Option<String>,
    /// Profile that matched.
    pub profile: Option<&'static str>,
}

impl Capability {
    /// Conservative record with availability not yet determined.
    pub fn new(family: CodecFamily) -> Self {
        let fallback = family.fallback_max_dimension();
        Self {
            family,
            availability: TriState::Unknown,
            max_width: fallback,
            max_height: fallback,
            supports_bframes: TriState::Unknown,
            supports_10bit: TriState::Unknown,
            rate_control_modes: RateControlModes::empty(),
            quality_levels: 0,
            packed_headers: PackedHeaders::default(),
            device: None,
            driver: None,
            profile: None,
        }
    }

    /// Record for a family that was looked for and not found (or never looked for).
    pub fn unavailable(family: CodecFamily) -> Self {
        Self {
            availability: TriState::No,
            ..Self::new(family)
        }
    }

    pub fn is_available(&self) -> bool {
        self.availability.is_yes()
    }

    /// Whether the bounds are still the fallback values.
    pub fn uses_fallback_bounds(&self) -> bool {
        let fallback = self.family.fallback_max_dimension();
        self.max_width == fallback && self.max_height == fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tristate_collapse() {
        assert!(!TriState::Unknown.is_yes());
        assert!(!TriState::No.is_yes());
        assert!(TriState::Yes.is_yes());
        assert_eq!(TriState::from_bool(false), TriState::No);
    }

    #[test]
    fn rate_control_masks_untracked_bits() {
        let modes = RateControlModes::from_va_mask(rc::CBR | rc::ICQ | rc::NONE);
        assert!(modes.contains(RateControlModes::CBR));
        assert!(!modes.contains(RateControlModes::VBR));
        assert!(!modes.contains(RateControlModes::CQP));
        assert_eq!(modes.bits(), rc::CBR);
    }

    #[test]
    fn empty_contains_nothing() {
        let modes = RateControlModes::empty();
        assert!(modes.is_empty());
        assert!(!modes.contains(RateControlModes::empty()));
    }

    #[test]
    fn new_capability_is_conservative() {
        let cap = Capability::new(CodecFamily::H265_10Bit);
        assert_eq!(cap.availability, TriState::Unknown);
        assert_eq!(cap.max_width, 8192);
        assert_eq!(cap.max_height, 8192);
        assert!(cap.rate_control_modes.is_empty());
        assert!(cap.uses_fallback_bounds());
    }

    #[test]
    fn serializes_mode_names() {
        let mut cap = Capability::unavailable(CodecFamily::H264);
        cap.rate_control_modes = RateControlModes::from_va_mask(rc::CQP | rc::VBR);
        let json = serde_json::to_value(&cap).unwrap();
        assert_eq!(json["availability"], "no");
        assert_eq!(json["rate_control_modes"], serde_json::json!(["cqp", "vbr"]));
        assert_eq!(json["max_width"], 4096);
    }
}
