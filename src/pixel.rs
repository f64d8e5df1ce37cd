//! Pixel format conversion.
//!
//! OpenSlide returns premultiplied ARGB packed into native-endian `u32`
//! values (`a << 24 | r << 16 | g << 8 | b`). The `image` crate expects
//! straight (non-premultiplied) RGBA bytes. Conversion works on the packed
//! values rather than on memory layout, so it does not depend on host
//! endianness.

/// Convert one premultiplied ARGB pixel to straight RGBA.
#[inline]
pub fn argb_pixel_to_rgba(pixel: u32) -> [u8; 4] {
    let a = (pixel >> 24) as u8;
    let r = (pixel >> 16) as u8;
    let g = (pixel >> 8) as u8;
    let b = pixel as u8;

    match a {
        0 => [0, 0, 0, 0],
        255 => [r, g, b, 255],
        _ => [unpremultiply(r, a), unpremultiply(g, a), unpremultiply(b, a), a],
    }
}

/// Convert a buffer of premultiplied ARGB pixels to straight RGBA bytes.
///
/// The output holds four bytes per input pixel.
pub fn argb_to_rgba(pixels: &[u32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(pixels.len() * 4);
    for &pixel in pixels {
        out.extend_from_slice(&argb_pixel_to_rgba(pixel));
    }
    out
}

#[inline]
fn unpremultiply(channel: u8, alpha: u8) -> u8 {
    // Valid premultiplied data has channel <= alpha; clamp anything else.
    (255 * channel as u32 / alpha as u32).min(255) as u8
}
