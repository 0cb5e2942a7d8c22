//! Morphological white border with a feathered outer rim.
//!
//! The border grows from a [`ContentMask`] seeded on strongly opaque pixels.
//! Each dilation step paints the newly covered ring solid white. Only the
//! ring added by the final step is feathered: four ordered passes score each
//! still-opaque ring pixel by the summed alpha of its eight neighbours and
//! lower its alpha when the score is at or below the pass threshold.

use super::buffer::{OPAQUE, PixelBuffer};

/// Seed threshold: only pixels with alpha above 0.8 × 255 start the mask.
const SEED_ALPHA_THRESHOLD: f64 = 0.8 * 255.0;

const BORDER_WHITE: [u8; 4] = [255, 255, 255, OPAQUE];

/// Feathering passes as `(max neighbour score, target alpha)`, applied in order.
const FEATHER_PASSES: [(f64, u8); 4] = [(3.0, 0), (4.99, 63), (4.26, 127), (4.51, 191)];

/// Boolean grid over a buffer's pixels, alive only during border synthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentMask {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl ContentMask {
    /// Mask of pixels whose alpha exceeds the seed threshold.
    pub fn seed(buffer: &PixelBuffer) -> Self {
        let cells = buffer
            .pixels()
            .map(|p| p[3] as f64 > SEED_ALPHA_THRESHOLD)
            .collect();
        Self {
            width: buffer.width(),
            height: buffer.height(),
            cells,
        }
    }

    #[inline]
    pub fn contains(&self, x: u32, y: u32) -> bool {
        self.cells[y as usize * self.width as usize + x as usize]
    }

    pub fn count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    fn has_member_neighbor(&self, x: u32, y: u32) -> bool {
        neighbors(x, y, self.width, self.height).any(|(nx, ny)| self.contains(nx, ny))
    }

    /// One 8-neighbour dilation step. Returns the coordinates newly covered;
    /// membership is evaluated against the mask as it was before the step.
    pub fn dilate(&mut self) -> Vec<(u32, u32)> {
        let mut added = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                if !self.contains(x, y) && self.has_member_neighbor(x, y) {
                    added.push((x, y));
                }
            }
        }
        for &(x, y) in &added {
            self.cells[y as usize * self.width as usize + x as usize] = true;
        }
        added
    }
}

/// In-bounds 8-neighbourhood of `(x, y)`, excluding the pixel itself.
fn neighbors(x: u32, y: u32, width: u32, height: u32) -> impl Iterator<Item = (u32, u32)> {
    (-1i64..=1)
        .flat_map(|dy| (-1i64..=1).map(move |dx| (dx, dy)))
        .filter(|&(dx, dy)| dx != 0 || dy != 0)
        .filter_map(move |(dx, dy)| {
            let nx = x as i64 + dx;
            let ny = y as i64 + dy;
            (nx >= 0 && ny >= 0 && nx < width as i64 && ny < height as i64)
                .then_some((nx as u32, ny as u32))
        })
}

/// Sum of neighbour alphas, each normalised to 0–1. Out-of-bounds counts 0.
fn neighbor_score(buffer: &PixelBuffer, x: u32, y: u32) -> f64 {
    neighbors(x, y, buffer.width(), buffer.height())
        .map(|(nx, ny)| buffer.alpha(nx, ny) as f64 / 255.0)
        .sum()
}

/// Add a `border_size`-pixel white border around the visible content.
///
/// Returns a copy of the input when `border_size` is zero. The caller is
/// responsible for leaving room at the canvas edge (see
/// [`add_edge_padding`](super::geometry::add_edge_padding)); dilation never
/// grows the canvas.
pub fn add_content_border(buffer: &PixelBuffer, border_size: u32) -> PixelBuffer {
    if border_size == 0 {
        return buffer.clone();
    }

    let mut out = buffer.clone();
    let mut mask = ContentMask::seed(buffer);

    let mut outer_ring = Vec::new();
    for _ in 0..border_size {
        outer_ring = mask.dilate();
        for &(x, y) in &outer_ring {
            out.put_pixel(x, y, BORDER_WHITE);
        }
    }

    for (threshold, target_alpha) in FEATHER_PASSES {
        // Score the whole pass before changing anything
        let marked: Vec<(u32, u32)> = outer_ring
            .iter()
            .copied()
            .filter(|&(x, y)| out.alpha(x, y) == OPAQUE)
            .filter(|&(x, y)| neighbor_score(&out, x, y) <= threshold)
            .collect();
        for (x, y) in marked {
            out.set_alpha(x, y, target_alpha);
        }
    }

    out
}
