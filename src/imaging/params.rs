//! Parameter types for geometric operations.
//!
//! These structs describe *where* pixels go, not how they get there. They
//! are produced by the pure functions in [`calculations`](super::calculations)
//! and consumed by the transforms in [`geometry`](super::geometry) and
//! [`shadow`](super::shadow), which keeps the dimension math testable on its
//! own.
//!
//! ## Types
//!
//! - [`SquarePlacement`]: Final square canvas size plus the offset at which the source is placed.
//! - [`ShadowParams`]: Drop-shadow offset, blur, and canvas growth for a given image size.

/// Where a buffer lands on a square canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SquarePlacement {
    /// Side length of the square canvas.
    pub size: u32,
    pub offset_x: u32,
    pub offset_y: u32,
}

/// Drop-shadow geometry derived from image dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShadowParams {
    /// Shadow displacement on both axes, in pixels.
    pub offset: u32,
    /// Blur radius in the CSS `drop-shadow` sense (Gaussian sigma = blur / 2).
    pub blur: u32,
    /// Pixels added to both width and height.
    pub extra_space: u32,
    /// Where the unshadowed image sits on the grown canvas (both axes).
    pub origin: u32,
}

impl ShadowParams {
    /// Gaussian standard deviation equivalent to the blur radius.
    pub fn sigma(self) -> f32 {
        self.blur as f32 / 2.0
    }
}
