//! Pixel formats as seen on decoder output.

use serde::{Deserialize, Serialize};

/// Decoded picture pixel format.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelFormat {
    /// Planar 4:2:0, 8-bit.
    #[default]
    Yuv420p,
    /// Semi-planar 4:2:0, 8-bit.
    Nv12,
    /// Planar 4:2:0, 10-bit.
    Yuv420p10,
    /// Semi-planar 4:2:0, 10-bit in 16-bit containers.
    P010,
    /// Planar 4:2:2, 8-bit.
    Yuv422p,
    /// Planar 4:2:2, 10-bit.
    Yuv422p10,
    /// Planar 4:4:4, 8-bit.
    Yuv444p,
}

impl PixelFormat {
    /// Bits per luma sample.
    pub fn bit_depth(self) -> u8 {
        match self {
            Self::Yuv420p | Self::Nv12 | Self::Yuv422p | Self::Yuv444p => 8,
            Self::Yuv420p10 | Self::P010 | Self::Yuv422p10 => 10,
        }
    }

    /// Whether chroma is subsampled 2x2 (the only layout VA-API decode targets here).
    pub fn is_420(self) -> bool {
        matches!(self, Self::Yuv420p | Self::Nv12 | Self::Yuv420p10 | Self::P010)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_depths() {
        assert_eq!(PixelFormat::Nv12.bit_depth(), 8);
        assert_eq!(PixelFormat::P010.bit_depth(), 10);
        assert_eq!(PixelFormat::Yuv422p10.bit_depth(), 10);
    }

    #[test]
    fn chroma_layout() {
        assert!(PixelFormat::Yuv420p10.is_420());
        assert!(!PixelFormat::Yuv444p.is_420());
    }
}
