//! Image normalization in pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `ImageReader::into_dimensions` |
//! | **Orientation** | custom parser (JPEG APP1 + TIFF IFD0) |
//! | **Subsample** | `jpeg_decoder` DCT scaling, `thumbnail_exact` for the rest |
//! | **Resample → rotate** | `resize_exact` (Triangle) + `rotateN` |
//! | **Encode** | `JpegEncoder` at the requested quality |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub(crate) mod exif_parser;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{calculate_fit_dimensions, calculate_sample_size};
pub use operations::{
    CompressionRequest, NormalizeError, NormalizeOptions, compress_all, normalize,
    normalize_or_original, plan_render,
};
pub use params::{OutputFormat, Quality, RenderParams, Rotation};
pub use rust_backend::RustBackend;
