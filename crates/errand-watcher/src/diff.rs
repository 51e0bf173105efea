//! Perceptual frame diffing.
//!
//! Compares two RGBA buffers pixel by pixel in YIQ color space, counting a
//! pixel as changed only when its color distance exceeds a per-pixel
//! tolerance. This makes the diff robust to anti-aliasing and subpixel
//! rendering noise that would otherwise trip the change threshold on every
//! frame.

/// Per-pixel color distance tolerance, as a fraction of the maximum
/// possible YIQ delta.
pub const PER_PIXEL_THRESHOLD: f64 = 0.1;

/// Maximum possible YIQ color delta between two pixels.
const MAX_YIQ_DELTA: f64 = 35215.0;

/// Count pixels whose perceptual distance exceeds the tolerance.
///
/// Both buffers must be RGBA with `width * height * 4` bytes; the caller
/// is responsible for rejecting dimension mismatches before diffing.
pub fn differing_pixels(a: &[u8], b: &[u8], width: u32, height: u32) -> u64 {
    debug_assert_eq!(a.len(), (width * height * 4) as usize);
    debug_assert_eq!(a.len(), b.len());

    let max_delta = MAX_YIQ_DELTA * PER_PIXEL_THRESHOLD * PER_PIXEL_THRESHOLD;
    let mut count = 0u64;

    for (pa, pb) in a.chunks_exact(4).zip(b.chunks_exact(4)) {
        if color_delta(pa, pb) > max_delta {
            count += 1;
        }
    }
    count
}

/// The fraction of differing pixels, as a percentage of total pixels.
pub fn change_percentage(a: &[u8], b: &[u8], width: u32, height: u32) -> f64 {
    let total = u64::from(width) * u64::from(height);
    if total == 0 {
        return 0.0;
    }
    (differing_pixels(a, b, width, height) as f64 / total as f64) * 100.0
}

/// Squared YIQ distance between two RGBA pixels, alpha-blended onto white.
fn color_delta(a: &[u8], b: &[u8]) -> f64 {
    let (ry, gy, by) = blend(a);
    let (rz, gz, bz) = blend(b);

    let dy = rgb2y(ry, gy, by) - rgb2y(rz, gz, bz);
    let di = rgb2i(ry, gy, by) - rgb2i(rz, gz, bz);
    let dq = rgb2q(ry, gy, by) - rgb2q(rz, gz, bz);

    0.5053 * dy * dy + 0.299 * di * di + 0.1957 * dq * dq
}

fn blend(px: &[u8]) -> (f64, f64, f64) {
    let alpha = f64::from(px[3]) / 255.0;
    (
        255.0 + (f64::from(px[0]) - 255.0) * alpha,
        255.0 + (f64::from(px[1]) - 255.0) * alpha,
        255.0 + (f64::from(px[2]) - 255.0) * alpha,
    )
}

fn rgb2y(r: f64, g: f64, b: f64) -> f64 {
    r * 0.298_895_31 + g * 0.586_622_47 + b * 0.114_482_23
}

fn rgb2i(r: f64, g: f64, b: f64) -> f64 {
    r * 0.595_977_99 - g * 0.274_176_10 - b * 0.321_801_89
}

fn rgb2q(r: f64, g: f64, b: f64) -> f64 {
    r * 0.211_470_17 - g * 0.522_617_11 + b * 0.311_146_94
}
