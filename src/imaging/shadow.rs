//! Soft drop shadow behind the visible content.
//!
//! Works like CSS `drop-shadow(offset offset blur rgba(0,0,0,0.2))`: the
//! canvas grows by [`ShadowParams::extra_space`], the image's alpha is
//! shifted by the offset, blurred with a Gaussian, tinted black at 20%, and
//! the image is composited over it.

use super::buffer::PixelBuffer;
use super::calculations::calculate_shadow_params;

/// Shadow opacity applied to the blurred alpha.
const SHADOW_OPACITY: f32 = 0.2;

/// Normalised 1-D Gaussian kernel covering ±3σ.
fn gaussian_kernel(sigma: f32) -> Vec<f32> {
    if sigma <= 0.0 {
        return vec![1.0];
    }
    let radius = (sigma * 3.0).ceil() as i32;
    let denom = 2.0 * sigma * sigma;
    let weights: Vec<f32> = (-radius..=radius)
        .map(|i| (-(i * i) as f32 / denom).exp())
        .collect();
    let sum: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / sum).collect()
}

/// Separable blur of a single channel; samples outside the plane count as 0.
fn blur_plane(plane: &[f32], width: usize, height: usize, kernel: &[f32]) -> Vec<f32> {
    if kernel.len() == 1 {
        return plane.to_vec();
    }
    let radius = (kernel.len() / 2) as isize;
    let mut tmp = vec![0.0f32; plane.len()];
    let mut out = vec![0.0f32; plane.len()];

    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.0;
            for (ki, &kw) in kernel.iter().enumerate() {
                let sx = x as isize + ki as isize - radius;
                if sx >= 0 && (sx as usize) < width {
                    acc += kw * plane[y * width + sx as usize];
                }
            }
            tmp[y * width + x] = acc;
        }
    }
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.0;
            for (ki, &kw) in kernel.iter().enumerate() {
                let sy = y as isize + ki as isize - radius;
                if sy >= 0 && (sy as usize) < height {
                    acc += kw * tmp[sy as usize * width + x];
                }
            }
            out[y * width + x] = acc;
        }
    }
    out
}

/// Add a drop shadow sized from the image dimensions.
pub fn apply_drop_shadow(buffer: &PixelBuffer) -> PixelBuffer {
    let params = calculate_shadow_params(buffer.width(), buffer.height());
    let width = buffer.width() + params.extra_space;
    let height = buffer.height() + params.extra_space;
    let shadow_origin = params.origin + params.offset;

    // Shadow coverage in 0..=1 on the grown canvas
    let mut plane = vec![0.0f32; width as usize * height as usize];
    for y in 0..buffer.height() {
        for x in 0..buffer.width() {
            let i = (y + shadow_origin) as usize * width as usize + (x + shadow_origin) as usize;
            plane[i] = buffer.alpha(x, y) as f32 / 255.0;
        }
    }
    let shadow = blur_plane(
        &plane,
        width as usize,
        height as usize,
        &gaussian_kernel(params.sigma()),
    );

    let mut out = PixelBuffer::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let shadow_alpha = shadow[y as usize * width as usize + x as usize] * SHADOW_OPACITY;
            let inside = x >= params.origin
                && y >= params.origin
                && x < params.origin + buffer.width()
                && y < params.origin + buffer.height();
            let [r, g, b, a] = if inside {
                buffer.pixel(x - params.origin, y - params.origin)
            } else {
                [0, 0, 0, 0]
            };

            // Source-over onto a black backdrop, straight alpha
            let src_alpha = a as f32 / 255.0;
            let out_alpha = src_alpha + shadow_alpha * (1.0 - src_alpha);
            if out_alpha <= 0.0 {
                continue;
            }
            let channel = |c: u8| (c as f32 * src_alpha / out_alpha).round().min(255.0) as u8;
            out.put_pixel(
                x,
                y,
                [
                    channel(r),
                    channel(g),
                    channel(b),
                    (out_alpha * 255.0).round().min(255.0) as u8,
                ],
            );
        }
    }
    out
}
