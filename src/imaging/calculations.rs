//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate the dimensions that fit `source` inside the `bounds` box.
///
/// Images already inside the box are returned unchanged. Otherwise the
/// image aspect ratio is compared to the box aspect ratio: a relatively
/// taller image is bound by the box height, a relatively wider (or equally
/// proportioned) one by the box width. The free side is truncated and never
/// drops below 1 px.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `bounds` - Bounding box (max width, max height)
///
/// # Examples
/// ```
/// # use medias_picker::imaging::calculate_fit_dimensions;
/// // 1600x1200 into 800x800 is width-bound → 800x600
/// assert_eq!(calculate_fit_dimensions((1600, 1200), (800, 800)), (800, 600));
///
/// // Already fits → untouched
/// assert_eq!(calculate_fit_dimensions((640, 480), (800, 800)), (640, 480));
/// ```
pub fn calculate_fit_dimensions(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (max_w, max_h) = bounds;

    if src_w <= max_w && src_h <= max_h {
        return source;
    }

    let img_ratio = src_w as f64 / src_h as f64;
    let box_ratio = max_w as f64 / max_h as f64;

    if img_ratio < box_ratio {
        // Relatively taller: height is the binding edge
        let scale = max_h as f64 / src_h as f64;
        (((src_w as f64 * scale) as u32).max(1), max_h)
    } else {
        // Relatively wider or same proportions: width is the binding edge
        let scale = max_w as f64 / src_w as f64;
        (max_w, ((src_h as f64 * scale) as u32).max(1))
    }
}

/// Calculate the decode subsampling factor for a source/target pair.
///
/// Starts at 1 and increments while decoding at that factor would still hold
/// more than twice the target pixel count.
///
/// # Examples
/// ```
/// # use medias_picker::imaging::calculate_sample_size;
/// // 1600x1200 (1.92 MP) → 800x600 target (cap 0.96 MP) needs factor 2
/// assert_eq!(calculate_sample_size((1600, 1200), (800, 600)), 2);
/// ```
pub fn calculate_sample_size(source: (u32, u32), target: (u32, u32)) -> u32 {
    let total_pixels = source.0 as u64 * source.1 as u64;
    let pixel_cap = 2 * target.0 as u64 * target.1 as u64;

    let mut sample_size: u64 = 1;
    while total_pixels / (sample_size * sample_size) > pixel_cap {
        sample_size += 1;
    }
    sample_size as u32
}

/// Dimensions of a source decoded at `sample_size`, rounded up like the
/// platform decoders do. Never below 1 px per side.
pub fn subsampled_dimensions(source: (u32, u32), sample_size: u32) -> (u32, u32) {
    let s = sample_size.max(1);
    (source.0.div_ceil(s).max(1), source.1.div_ceil(s).max(1))
}

/// Largest JPEG DCT scale denominator (1, 2, 4 or 8) that does not exceed
/// `sample_size`.
pub fn jpeg_scale_denominator(sample_size: u32) -> u32 {
    match sample_size {
        0..=1 => 1,
        2..=3 => 2,
        4..=7 => 4,
        _ => 8,
    }
}
