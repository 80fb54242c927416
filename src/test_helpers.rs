//! Shared test utilities for the medias-picker test suite.
//!
//! Synthetic image fixtures: plain JPEGs produced by the `image` encoder, and
//! JPEGs with an EXIF APP1 segment spliced in so orientation handling can be
//! exercised without binary fixture files.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let path = tmp.path().join("portrait.jpg");
//! write_test_jpeg_with_orientation(&path, 40, 20, 6);
//! ```

use image::{ImageEncoder, RgbImage};
use std::path::Path;

use crate::imaging::exif_parser::tests::with_exif_orientation;

// =========================================================================
// Fixture builders
// =========================================================================

/// Encode a gradient JPEG of the given dimensions into memory.
pub fn test_jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut buf = Vec::new();
    image::codecs::jpeg::JpegEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

/// Create a small valid JPEG file with the given dimensions.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    std::fs::write(path, test_jpeg_bytes(width, height)).unwrap();
}

/// Create a JPEG file carrying an EXIF orientation tag.
pub fn write_test_jpeg_with_orientation(path: &Path, width: u32, height: u32, orientation: u16) {
    let bytes = with_exif_orientation(&test_jpeg_bytes(width, height), orientation);
    std::fs::write(path, bytes).unwrap();
}
