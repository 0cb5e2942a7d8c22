//! Per-pixel color transforms and the two-tone classifier.

use super::buffer::PixelBuffer;

/// Channel values below this become black during contrast enhancement.
const CONTRAST_LOWER: u8 = 102;
/// Channel values above this become white during contrast enhancement.
const CONTRAST_UPPER: u8 = 153;

/// Pixels with alpha below this are ignored by the two-tone classifier.
const CLASSIFIER_MIN_ALPHA: u8 = 10;
/// How close (0–255) a pixel must be to pure black or white to count as two-tone.
const BLACK_WHITE_TOLERANCE: f64 = 30.0;
/// Fraction of visible pixels that must be near black or white.
const TWO_TONE_RATIO: f64 = 0.85;

fn map_pixels(buffer: &PixelBuffer, mut f: impl FnMut([u8; 4]) -> [u8; 4]) -> PixelBuffer {
    PixelBuffer::from_fn(buffer.width(), buffer.height(), |x, y| f(buffer.pixel(x, y)))
}

/// Perceptual luma (ITU-R BT.601 weights), rounded.
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    (0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64).round() as u8
}

/// Replace R, G and B with the pixel's luma. Alpha is preserved.
pub fn ensure_grayscale(buffer: &PixelBuffer) -> PixelBuffer {
    map_pixels(buffer, |[r, g, b, a]| {
        let l = luma(r, g, b);
        [l, l, l, a]
    })
}

#[inline]
fn enhance_channel(value: u8) -> u8 {
    if value < CONTRAST_LOWER {
        0
    } else if value > CONTRAST_UPPER {
        255
    } else {
        value
    }
}

/// Push channels towards black or white, keeping the 102–153 mid-band.
/// Fully transparent pixels pass through untouched.
pub fn increase_contrast(buffer: &PixelBuffer) -> PixelBuffer {
    map_pixels(buffer, |[r, g, b, a]| {
        if a == 0 {
            [r, g, b, a]
        } else {
            [enhance_channel(r), enhance_channel(g), enhance_channel(b), a]
        }
    })
}

/// Invert the colour of every visible pixel. Alpha is preserved.
pub fn invert_image(buffer: &PixelBuffer) -> PixelBuffer {
    map_pixels(buffer, |[r, g, b, a]| {
        if a > 0 {
            [255 - r, 255 - g, 255 - b, a]
        } else {
            [r, g, b, a]
        }
    })
}

/// Whether the visible content is predominantly pure black/white line art.
///
/// Looks at pixels with alpha >= 10 and their channel average; at least 85%
/// of them must be within 30 of 0 or 255. A buffer with no visible pixels
/// is not two-tone.
pub fn is_two_tone_image(buffer: &PixelBuffer) -> bool {
    let mut visible = 0usize;
    let mut two_tone = 0usize;

    for p in buffer.pixels() {
        if p[3] < CLASSIFIER_MIN_ALPHA {
            continue;
        }
        visible += 1;
        let gray = (p[0] as f64 + p[1] as f64 + p[2] as f64) / 3.0;
        if gray <= BLACK_WHITE_TOLERANCE || gray >= 255.0 - BLACK_WHITE_TOLERANCE {
            two_tone += 1;
        }
    }

    if visible == 0 {
        return false;
    }
    two_tone as f64 / visible as f64 >= TWO_TONE_RATIO
}
