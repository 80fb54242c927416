//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which decides the target geometry and where the artifact goes) and the
//! [`backend`](super::backend) (which does the actual pixel work). This
//! separation allows swapping backends (e.g. for testing with a mock) without
//! changing operation logic.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 70). Clamped on construction.
//! - [`Rotation`]: Clockwise rotation derived from the EXIF orientation tag.
//! - [`OutputFormat`]: Encoded format of normalized artifacts.
//! - [`RenderParams`]: Everything one normalize render needs: source,
//!   target dimensions, subsampling factor, rotation, quality, format.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
///
/// Requests may carry 0; the JPEG encoder's floor is 1, so 0 encodes at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(70)
    }
}

/// Clockwise rotation needed to display an image upright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    None,
    Cw90,
    Cw180,
    Cw270,
}

impl Rotation {
    /// Map an EXIF orientation tag (0x0112) to the rotation it calls for.
    ///
    /// Only the pure rotations are honoured: 6 → 90°, 3 → 180°, 8 → 270°.
    /// Mirrored orientations (2, 4, 5, 7) and unknown values are left alone.
    pub fn from_orientation_tag(tag: u16) -> Self {
        match tag {
            6 => Rotation::Cw90,
            3 => Rotation::Cw180,
            8 => Rotation::Cw270,
            _ => Rotation::None,
        }
    }

    pub fn degrees(self) -> u32 {
        match self {
            Rotation::None => 0,
            Rotation::Cw90 => 90,
            Rotation::Cw180 => 180,
            Rotation::Cw270 => 270,
        }
    }

    /// Whether applying this rotation swaps width and height.
    pub fn swaps_axes(self) -> bool {
        matches!(self, Rotation::Cw90 | Rotation::Cw270)
    }
}

/// Encoded format of normalized artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Jpeg,
    /// Lossless; quality is ignored.
    Png,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
        }
    }
}

/// Parameters for rendering one normalized image into encoded bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderParams {
    pub source: PathBuf,
    /// Final (pre-rotation) dimensions.
    pub width: u32,
    pub height: u32,
    /// Integer divisor applied while decoding to bound memory.
    pub sample_size: u32,
    pub rotation: Rotation,
    pub quality: Quality,
    pub format: OutputFormat,
    /// Allocation ceiling for the decoder, in bytes.
    pub max_decode_bytes: u64,
}

impl RenderParams {
    /// Dimensions of the encoded artifact, after rotation.
    pub fn output_dimensions(&self) -> (u32, u32) {
        if self.rotation.swaps_axes() {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(70).value(), 70);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_default_is_70() {
        assert_eq!(Quality::default().value(), 70);
    }

    #[test]
    fn rotation_from_pure_rotation_tags() {
        assert_eq!(Rotation::from_orientation_tag(6).degrees(), 90);
        assert_eq!(Rotation::from_orientation_tag(3).degrees(), 180);
        assert_eq!(Rotation::from_orientation_tag(8).degrees(), 270);
    }

    #[test]
    fn rotation_ignores_other_tags() {
        for tag in [0, 1, 2, 4, 5, 7, 9, 255, u16::MAX] {
            assert_eq!(Rotation::from_orientation_tag(tag), Rotation::None, "tag {tag}");
        }
    }

    #[test]
    fn quarter_turns_swap_axes() {
        assert!(Rotation::Cw90.swaps_axes());
        assert!(Rotation::Cw270.swaps_axes());
        assert!(!Rotation::Cw180.swaps_axes());
        assert!(!Rotation::None.swaps_axes());
    }

    #[test]
    fn output_dimensions_follow_rotation() {
        let mut params = RenderParams {
            source: PathBuf::from("/a.jpg"),
            width: 80,
            height: 40,
            sample_size: 1,
            rotation: Rotation::Cw180,
            quality: Quality::default(),
            format: OutputFormat::Jpeg,
            max_decode_bytes: 1024,
        };
        assert_eq!(params.output_dimensions(), (80, 40));
        params.rotation = Rotation::Cw270;
        assert_eq!(params.output_dimensions(), (40, 80));
    }

    #[test]
    fn output_format_extensions() {
        assert_eq!(OutputFormat::Jpeg.extension(), "jpg");
        assert_eq!(OutputFormat::Png.extension(), "png");
    }
}
