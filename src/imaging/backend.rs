//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the three operations the normalizer
//! needs: identify, read_orientation, and render.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the pure Rust
//! decoders and encoders of the `image` crate.

use super::params::RenderParams;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode exceeded memory limit: {0}")]
    MemoryLimit(String),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
///
/// `render` returns encoded bytes instead of writing a file: where the
/// artifact lands is decided by the [`WorkDir`](crate::workdir::WorkDir),
/// so a backend only ever sees the source path.
pub trait ImageBackend {
    /// Get image dimensions without decoding pixel data.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Read the EXIF orientation tag, `None` when the file has none.
    fn read_orientation(&self, path: &Path) -> Result<Option<u16>, BackendError>;

    /// Decode, resample, rotate and encode. Returns the encoded bytes.
    fn render(&self, params: &RenderParams) -> Result<Vec<u8>, BackendError>;
}
