//! Video filter identifiers.

use serde::{Deserialize, Serialize};

/// A filter a job may apply between decode and encode.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    Crop,
    Scale,
    Deinterlace,
    Denoise,
    Deblock,
    Rotate,
    Pad,
    Colorspace,
    Grayscale,
    Subtitles,
}
