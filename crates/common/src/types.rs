//! Core newtypes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Picture resolution in pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const HD: Self = Self::new(1280, 720);
    pub const FHD: Self = Self::new(1920, 1080);
    pub const UHD: Self = Self::new(3840, 2160);

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A resolution with a zero dimension cannot describe a real picture.
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Whether both dimensions are within the given bounds (inclusive).
    pub fn fits_within(self, max_width: u32, max_height: u32) -> bool {
        self.width <= max_width && self.height <= max_height
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validity() {
        assert!(Resolution::FHD.is_valid());
        assert!(!Resolution::new(0, 1080).is_valid());
        assert!(!Resolution::default().is_valid());
    }

    #[test]
    fn bounds_are_inclusive() {
        assert!(Resolution::UHD.fits_within(4096, 4096));
        assert!(Resolution::new(4096, 2160).fits_within(4096, 4096));
        assert!(!Resolution::new(4097, 2160).fits_within(4096, 4096));
        assert!(!Resolution::new(u32::MAX, 1).fits_within(8192, 8192));
    }

    #[test]
    fn display() {
        assert_eq!(Resolution::FHD.to_string(), "1920x1080");
    }
}
