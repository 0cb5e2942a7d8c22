//! Canvas geometry: resizing, padding, and cropping.
//!
//! Every function returns a fresh buffer; inputs are never mutated. Only
//! [`resize_to_square`] needs resampling and therefore an [`ImageSurface`].

use super::backend::{ImageSurface, SurfaceError};
use super::buffer::PixelBuffer;
use super::calculations::{calculate_aspect_padding, calculate_square_fit};

/// Fill colour for aspect padding: white, fully transparent, so a later
/// texture pass has no dark fringe to pick up at the edges.
const TRANSPARENT_WHITE: [u8; 4] = [255, 255, 255, 0];

/// Scale to fit within a `target × target` square (default: the larger
/// dimension), preserving aspect ratio, centered on a transparent canvas.
///
/// Returns the input unchanged when it is already `target × target`.
pub fn resize_to_square(
    surface: &impl ImageSurface,
    buffer: &PixelBuffer,
    target: Option<u32>,
) -> Result<PixelBuffer, SurfaceError> {
    let target = target.unwrap_or_else(|| buffer.width().max(buffer.height()));
    if buffer.dimensions() == (target, target) {
        return Ok(buffer.clone());
    }

    let ((scaled_w, scaled_h), placement) = calculate_square_fit(buffer.dimensions(), target);
    let scaled = surface.resample(buffer, scaled_w, scaled_h)?;

    let mut out = PixelBuffer::new(target, target);
    out.copy_from(&scaled, placement.offset_x, placement.offset_y);
    Ok(out)
}

/// Grow the canvas by `padding` transparent pixels on every side.
pub fn add_edge_padding(buffer: &PixelBuffer, padding: u32) -> PixelBuffer {
    if padding == 0 {
        return buffer.clone();
    }
    let mut out = PixelBuffer::new(
        buffer.width() + padding * 2,
        buffer.height() + padding * 2,
    );
    out.copy_from(buffer, padding, padding);
    out
}

/// Grow the width by `|padding|` transparent columns.
///
/// Negative values pad on the left (content shifts right); positive values
/// pad on the right.
pub fn add_horizontal_padding(buffer: &PixelBuffer, padding: i32) -> PixelBuffer {
    if padding == 0 {
        return buffer.clone();
    }
    let amount = padding.unsigned_abs();
    let offset_x = if padding < 0 { amount } else { 0 };

    let mut out = PixelBuffer::new(buffer.width() + amount, buffer.height());
    out.copy_from(buffer, offset_x, 0);
    out
}

/// Bounding box `(min_x, min_y, width, height)` of pixels with alpha > 0.
pub fn content_bounds(buffer: &PixelBuffer) -> Option<(u32, u32, u32, u32)> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for y in 0..buffer.height() {
        for x in 0..buffer.width() {
            if buffer.alpha(x, y) == 0 {
                continue;
            }
            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((min_x, min_y, max_x, max_y)) => {
                    (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
                }
            });
        }
    }
    bounds.map(|(min_x, min_y, max_x, max_y)| (min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
}

/// Crop to the bounding box of visible pixels.
///
/// Fully transparent and already-tight buffers are returned unchanged.
pub fn crop_to_content(buffer: &PixelBuffer) -> PixelBuffer {
    match content_bounds(buffer) {
        Some((x, y, w, h)) if (x, y, w, h) != (0, 0, buffer.width(), buffer.height()) => {
            buffer.sub_buffer(x, y, w, h)
        }
        _ => buffer.clone(),
    }
}

/// Pad to a square with aspect-aware margins.
///
/// See [`calculate_aspect_padding`] for the sizing rule. The margin is
/// transparent white.
pub fn add_aspect_ratio_padding(buffer: &PixelBuffer) -> PixelBuffer {
    let placement = calculate_aspect_padding(buffer.width(), buffer.height());
    let mut out = PixelBuffer::filled(placement.size, placement.size, TRANSPARENT_WHITE);
    out.copy_from(buffer, placement.offset_x, placement.offset_y);
    out
}
