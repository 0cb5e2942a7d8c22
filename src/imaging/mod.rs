//! Image processing in pure Rust, statically linked.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::load_from_memory`, `usvg` + `resvg` for SVG |
//! | **Resample** | `image::imageops::resize` (bilinear) |
//! | **Encode → PNG** | `image::codecs::png::PngEncoder` |
//! | **Everything else** | hand-written loops over [`PixelBuffer`] |
//!
//! The module is split into:
//! - **Buffer**: [`PixelBuffer`], the flat RGBA8 raster every transform uses
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing placements and shadows
//! - **Backend**: [`ImageSurface`] trait + [`RustSurface`]
//! - **Transforms**: geometry, color, border, texture, shadow; each takes a
//!   buffer and returns a new one

pub mod backend;
pub mod border;
pub mod buffer;
pub mod calculations;
pub mod color;
pub mod geometry;
mod params;
pub mod rust_backend;
pub mod shadow;
pub mod texture;

pub use backend::{ImageSurface, SurfaceError};
pub use border::{ContentMask, add_content_border};
pub use buffer::PixelBuffer;
pub use color::{ensure_grayscale, increase_contrast, invert_image, is_two_tone_image};
pub use geometry::{
    add_aspect_ratio_padding, add_edge_padding, add_horizontal_padding, crop_to_content,
    resize_to_square,
};
pub use params::{ShadowParams, SquarePlacement};
pub use rust_backend::RustSurface;
pub use shadow::apply_drop_shadow;
pub use texture::{TextureError, TextureLoader, WHITE_TEXTURE, apply_textures, scale_texture};
