//! High-level image operations.
//!
//! These functions combine calculations with backend execution. They take a
//! [`CompressionRequest`], compute the render parameters, call the backend
//! and hand the encoded bytes to the [`WorkDir`].
//!
//! Two entry points exist on purpose:
//!
//! - [`normalize`] surfaces every failure as a [`NormalizeError`].
//! - [`normalize_or_original`] keeps the bridge contract: any failure is
//!   logged and the source path comes back unchanged.

use super::backend::{BackendError, ImageBackend};
use super::calculations::{calculate_fit_dimensions, calculate_sample_size};
use super::params::{OutputFormat, Quality, RenderParams, Rotation};
use crate::workdir::WorkDir;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Default allocation ceiling for one decode (256 MiB).
pub const DEFAULT_MAX_DECODE_BYTES: u64 = 256 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("Bounding box must be positive, got {width}x{height}")]
    InvalidBounds { width: u32, height: u32 },
    #[error("Source has no pixels: {0}")]
    EmptySource(PathBuf),
    #[error("Image processing failed: {0}")]
    Backend(#[from] BackendError),
    #[error("Failed to write artifact: {0}")]
    Write(#[from] std::io::Error),
}

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, NormalizeError>;

/// One normalize invocation: a source plus the constraints it must meet.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionRequest {
    pub source: PathBuf,
    pub max_width: u32,
    pub max_height: u32,
    pub quality: Quality,
}

impl CompressionRequest {
    pub fn new(source: impl Into<PathBuf>, max_width: u32, max_height: u32, quality: u32) -> Self {
        Self {
            source: source.into(),
            max_width,
            max_height,
            quality: Quality::new(quality),
        }
    }
}

/// Knobs that come from plugin configuration rather than the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizeOptions {
    pub format: OutputFormat,
    pub max_decode_bytes: u64,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            max_decode_bytes: DEFAULT_MAX_DECODE_BYTES,
        }
    }
}

/// Read the orientation through the backend, degrading to no rotation.
fn resolve_rotation(backend: &impl ImageBackend, path: &Path) -> Rotation {
    match backend.read_orientation(path) {
        Ok(Some(tag)) => Rotation::from_orientation_tag(tag),
        Ok(None) => Rotation::None,
        Err(e) => {
            warn!(path = %path.display(), "failed to read orientation, leaving unrotated: {e}");
            Rotation::None
        }
    }
}

/// Plan a normalize render without executing it.
///
/// Reads the source dimensions and orientation; no pixel data is decoded.
///
/// The fit runs on the stored (pre-rotation) dimensions and the rotation is
/// applied to the fitted image. For quarter turns (orientation 6 or 8) the
/// artifact is therefore bounded by the box with its axes swapped, and can
/// exceed `max_width` or `max_height` when the box is not square. See
/// [`RenderParams::output_dimensions`].
pub fn plan_render(
    backend: &impl ImageBackend,
    request: &CompressionRequest,
    options: &NormalizeOptions,
) -> Result<RenderParams> {
    if request.max_width == 0 || request.max_height == 0 {
        return Err(NormalizeError::InvalidBounds {
            width: request.max_width,
            height: request.max_height,
        });
    }

    let dims = backend.identify(&request.source)?;
    if dims.width == 0 || dims.height == 0 {
        return Err(NormalizeError::EmptySource(request.source.clone()));
    }

    let source = (dims.width, dims.height);
    let (width, height) =
        calculate_fit_dimensions(source, (request.max_width, request.max_height));
    let sample_size = calculate_sample_size(source, (width, height));
    let rotation = resolve_rotation(backend, &request.source);

    Ok(RenderParams {
        source: request.source.clone(),
        width,
        height,
        sample_size,
        rotation,
        quality: request.quality,
        format: options.format,
        max_decode_bytes: options.max_decode_bytes,
    })
}

/// Normalize one image into a new artifact inside `work_dir`.
///
/// Never touches the source. On success exactly one new file exists.
pub fn normalize(
    backend: &impl ImageBackend,
    work_dir: &WorkDir,
    request: &CompressionRequest,
    options: &NormalizeOptions,
) -> Result<PathBuf> {
    let params = plan_render(backend, request, options)?;
    let (out_width, out_height) = params.output_dimensions();
    debug!(
        source = %request.source.display(),
        "normalizing to {}x{} (sample {}, rotate {}°, quality {})",
        out_width,
        out_height,
        params.sample_size,
        params.rotation.degrees(),
        params.quality.value()
    );

    let bytes = backend.render(&params)?;
    let output = work_dir.write_artifact(&bytes, params.format.extension())?;
    Ok(output)
}

/// Like [`normalize`], but every failure yields the original source path.
///
/// Callers cannot tell "compressed" from "returned unchanged" by the value;
/// the failure is only visible in the log.
///
/// Images tagged with orientation 6 or 8 are fitted before they are turned,
/// so a 100x50 source in a 100x60 box comes back 50x100. Only the stored
/// orientation is guaranteed to fit the box.
pub fn normalize_or_original(
    backend: &impl ImageBackend,
    work_dir: &WorkDir,
    request: &CompressionRequest,
    options: &NormalizeOptions,
) -> PathBuf {
    match normalize(backend, work_dir, request, options) {
        Ok(path) => path,
        Err(e) => {
            warn!(
                source = %request.source.display(),
                "compression failed, returning original: {e}"
            );
            request.source.clone()
        }
    }
}

/// Normalize each path in order, dropping results that come back empty.
pub fn compress_all(
    backend: &impl ImageBackend,
    work_dir: &WorkDir,
    paths: &[String],
    bounds: (u32, u32),
    quality: u32,
    options: &NormalizeOptions,
) -> Vec<String> {
    paths
        .iter()
        .map(|path| {
            let request = CompressionRequest::new(path, bounds.0, bounds.1, quality);
            normalize_or_original(backend, work_dir, &request, options)
                .to_string_lossy()
                .into_owned()
        })
        .filter(|path| !path.is_empty())
        .collect()
}
