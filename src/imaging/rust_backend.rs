//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `ImageReader::into_dimensions` (header only) |
//! | Decode (JPEG, subsampled) | `jpeg_decoder::Decoder::scale` (1/2, 1/4, 1/8 in the DCT) |
//! | Decode (PNG, TIFF, WebP, CMYK JPEG) | `image` crate, under `image::Limits` |
//! | Subsample remainder | `DynamicImage::thumbnail_exact` (box-style reduction) |
//! | Resample | `DynamicImage::resize_exact` with `Triangle` (bilinear) |
//! | Rotate | `DynamicImage::rotate90` / `rotate180` / `rotate270` |
//! | Encode → JPEG / PNG | `image::codecs::jpeg::JpegEncoder` / `png::PngEncoder` |
//! | Orientation | custom `exif_parser` (JPEG APP1 + TIFF IFD0) |
//!
//! `max_decode_bytes` bounds the buffer actually decoded. For JPEG that is
//! the scaled buffer, so a source whose full decode would not fit can still
//! be rendered when its sample size is large enough.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::{jpeg_scale_denominator, subsampled_dimensions};
use super::params::{OutputFormat, Quality, RenderParams, Rotation};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageError, ImageFormat, ImageReader, Limits, RgbImage};
use jpeg_decoder::PixelFormat;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Open a reader with the format sniffed from content, falling back to the
/// extension. Picker paths do not always carry one.
fn open_reader(path: &Path) -> Result<ImageReader<BufReader<File>>, BackendError> {
    Ok(ImageReader::open(path)?.with_guessed_format()?)
}

/// Decode `path` reduced by `sample_size`, never holding a decoded buffer
/// larger than `max_decode_bytes`.
///
/// JPEGs are scaled during decode by the largest DCT factor not above
/// `sample_size`; whatever is left of the reduction is done afterwards.
/// Everything else is decoded in full under [`Limits`] first.
fn decode_subsampled(
    path: &Path,
    sample_size: u32,
    max_decode_bytes: u64,
) -> Result<DynamicImage, BackendError> {
    let reader = open_reader(path)?;
    let scaled = if sample_size > 1 && reader.format() == Some(ImageFormat::Jpeg) {
        decode_jpeg_scaled(path, sample_size, max_decode_bytes)?
    } else {
        None
    };
    let (img, source) = match scaled {
        Some(decoded) => decoded,
        None => decode_full(reader, path, max_decode_bytes)?,
    };

    let (w, h) = subsampled_dimensions(source, sample_size);
    if (img.width(), img.height()) == (w, h) {
        return Ok(img);
    }
    debug!(
        path = %path.display(),
        sample_size,
        "subsampled {}x{} → {}x{} (decoded at {}x{})",
        source.0,
        source.1,
        w,
        h,
        img.width(),
        img.height()
    );
    Ok(img.thumbnail_exact(w, h))
}

/// Full-resolution decode under an allocation ceiling. Returns the image and
/// its source dimensions.
fn decode_full(
    mut reader: ImageReader<BufReader<File>>,
    path: &Path,
    max_decode_bytes: u64,
) -> Result<(DynamicImage, (u32, u32)), BackendError> {
    let mut limits = Limits::default();
    limits.max_alloc = Some(max_decode_bytes);
    reader.limits(limits);

    let img = reader.decode().map_err(|e| match e {
        ImageError::Limits(err) => {
            BackendError::MemoryLimit(format!("{}: {}", path.display(), err))
        }
        other => BackendError::ProcessingFailed(format!(
            "Failed to decode {}: {}",
            path.display(),
            other
        )),
    })?;
    let source = (img.width(), img.height());
    Ok((img, source))
}

/// Decode a JPEG at 1/2, 1/4 or 1/8 scale. Returns the image and the source
/// dimensions.
///
/// `Ok(None)` means the pixel format (CMYK, 16-bit gray) has no direct
/// `DynamicImage` counterpart and the caller should take the full decode.
fn decode_jpeg_scaled(
    path: &Path,
    sample_size: u32,
    max_decode_bytes: u64,
) -> Result<Option<(DynamicImage, (u32, u32))>, BackendError> {
    let jpeg_err = |e: jpeg_decoder::Error| {
        BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
    };

    let mut decoder = jpeg_decoder::Decoder::new(BufReader::new(File::open(path)?));
    decoder.read_info().map_err(jpeg_err)?;
    let Some(info) = decoder.info() else {
        return Ok(None);
    };
    let channels: u64 = match info.pixel_format {
        PixelFormat::L8 => 1,
        PixelFormat::RGB24 => 3,
        _ => return Ok(None),
    };

    // Both requested sides stay within the u16 source dimensions
    let denominator = jpeg_scale_denominator(sample_size) as u16;
    let (width, height) = decoder
        .scale(
            info.width.div_ceil(denominator),
            info.height.div_ceil(denominator),
        )
        .map_err(jpeg_err)?;

    let needed = u64::from(width) * u64::from(height) * channels;
    if needed > max_decode_bytes {
        return Err(BackendError::MemoryLimit(format!(
            "{}: decoding at {}x{} needs {} bytes, limit is {}",
            path.display(),
            width,
            height,
            needed,
            max_decode_bytes
        )));
    }

    let pixels = decoder.decode().map_err(jpeg_err)?;
    let (width, height) = (u32::from(width), u32::from(height));
    let img = match info.pixel_format {
        PixelFormat::L8 => {
            GrayImage::from_raw(width, height, pixels).map(DynamicImage::ImageLuma8)
        }
        _ => RgbImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8),
    }
    .ok_or_else(|| {
        BackendError::ProcessingFailed(format!(
            "{}: decoded buffer does not match {}x{}",
            path.display(),
            width,
            height
        ))
    })?;

    let source = (u32::from(info.width), u32::from(info.height));
    Ok(Some((img, source)))
}

fn rotate(img: DynamicImage, rotation: Rotation) -> DynamicImage {
    match rotation {
        Rotation::None => img,
        Rotation::Cw90 => img.rotate90(),
        Rotation::Cw180 => img.rotate180(),
        Rotation::Cw270 => img.rotate270(),
    }
}

/// Encode a DynamicImage into memory in the requested format.
fn encode(
    img: &DynamicImage,
    format: OutputFormat,
    quality: Quality,
) -> Result<Vec<u8>, BackendError> {
    let mut buf = Vec::new();
    match format {
        OutputFormat::Jpeg => {
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality.value() as u8);
            rgb.write_with_encoder(encoder).map_err(|e| {
                BackendError::ProcessingFailed(format!("JPEG encode failed: {}", e))
            })?;
        }
        OutputFormat::Png => {
            let encoder = PngEncoder::new(&mut buf);
            img.write_with_encoder(encoder).map_err(|e| {
                BackendError::ProcessingFailed(format!("PNG encode failed: {}", e))
            })?;
        }
    }
    Ok(buf)
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = open_reader(path)?.into_dimensions().map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to read dimensions: {}", e))
        })?;
        Ok(Dimensions { width, height })
    }

    fn read_orientation(&self, path: &Path) -> Result<Option<u16>, BackendError> {
        Ok(super::exif_parser::read_orientation(path)?)
    }

    fn render(&self, params: &RenderParams) -> Result<Vec<u8>, BackendError> {
        let decoded =
            decode_subsampled(&params.source, params.sample_size, params.max_decode_bytes)?;
        let scaled = decoded.resize_exact(params.width, params.height, FilterType::Triangle);
        let oriented = rotate(scaled, params.rotation);
        encode(&oriented, params.format, params.quality)
    }
}
