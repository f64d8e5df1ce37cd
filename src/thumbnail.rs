//! Thumbnail sizing and resampling.
//!
//! A thumbnail is produced by reading the whole of the pyramid level closest
//! to the wanted scale, then resampling it bilinearly so that its longest
//! side equals the requested size.

use image::imageops::{self, FilterType};
use image::RgbaImage;

/// Downsample factor that fits the level 0 image into `size` pixels.
///
/// This is the largest of `width / size` and `height / size`.
pub fn thumbnail_downsample(level0: (u64, u64), size: u32) -> f64 {
    let size = size as f64;
    let (width, height) = level0;
    (width as f64 / size).max(height as f64 / size)
}

/// Output dimensions for a thumbnail of an image with the given dimensions.
///
/// The longest side becomes `size`; the other side is scaled by the same
/// factor and floored. Portrait and square images are fitted by height.
/// Neither side is ever zero.
pub fn thumbnail_size(dimensions: (u32, u32), size: u32) -> (u32, u32) {
    let (width, height) = dimensions;
    if width == 0 || height == 0 {
        return (size.max(1), size.max(1));
    }

    let (out_width, out_height) = if width <= height {
        let scaling = height as f64 / size as f64;
        ((width as f64 / scaling).floor() as u32, size)
    } else {
        let scaling = width as f64 / size as f64;
        (size, (height as f64 / scaling).floor() as u32)
    };

    (out_width.max(1), out_height.max(1))
}

/// Resample `source` to fit within `size` pixels using bilinear filtering.
pub fn resize_to_thumbnail(source: &RgbaImage, size: u32) -> RgbaImage {
    let (width, height) = thumbnail_size(source.dimensions(), size);
    if (width, height) == source.dimensions() {
        return source.clone();
    }
    imageops::resize(source, width, height, FilterType::Triangle)
}
