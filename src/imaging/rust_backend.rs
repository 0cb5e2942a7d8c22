//! Pure Rust image surface with no system dependencies.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (PNG, JPEG, WebP, TIFF, GIF, BMP) | `image::load_from_memory` |
//! | Decode (SVG, SVGZ) | `usvg` parse + `resvg` render at intrinsic size |
//! | Resample | `image::imageops::resize` with `Triangle` (bilinear) filter |
//! | Encode → PNG | `image::codecs::png::PngEncoder` |

use super::backend::{ImageSurface, SurfaceError};
use super::buffer::PixelBuffer;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{ExtendedColorType, ImageEncoder, ImageFormat, Rgba32FImage};
use std::sync::LazyLock;

/// Raster extensions whose decoders are compiled in.
const RASTER_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("png", ImageFormat::Png),
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("webp", ImageFormat::WebP),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("gif", ImageFormat::Gif),
    ("bmp", ImageFormat::Bmp),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    let mut exts: Vec<&'static str> = RASTER_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect();
    // SVG goes through resvg, not the image crate
    exts.extend(["svg", "svgz"]);
    exts
});

/// Returns the set of input file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Pure Rust surface using the `image` crate and `resvg`.
///
/// See the [module docs](self) for the crate-to-operation mapping.
#[derive(Debug, Default, Clone, Copy)]
pub struct RustSurface;

impl RustSurface {
    pub fn new() -> Self {
        Self
    }
}

/// Sniff SVG input: gzip magic (SVGZ) or an XML/`<svg` prologue in the
/// first kilobyte. Raster formats with known magic numbers win.
pub fn is_svg(bytes: &[u8]) -> bool {
    if image::guess_format(bytes).is_ok() {
        return false;
    }
    if bytes.starts_with(&[0x1f, 0x8b]) {
        return true;
    }
    let head = &bytes[..bytes.len().min(1024)];
    let text = String::from_utf8_lossy(head);
    let trimmed = text.trim_start_matches('\u{feff}').trim_start();
    (trimmed.starts_with("<?xml") || trimmed.starts_with("<svg") || trimmed.starts_with("<!"))
        && text.contains("<svg")
}

/// Rasterize an SVG document at its intrinsic pixel size, demultiplying
/// resvg's premultiplied output.
fn rasterize_svg(bytes: &[u8]) -> Result<PixelBuffer, SurfaceError> {
    let tree = usvg::Tree::from_data(bytes, &usvg::Options::default())
        .map_err(|e| SurfaceError::Decode(format!("Failed to parse SVG: {e}")))?;

    let size = tree.size();
    let width = (size.width().round() as u32).max(1);
    let height = (size.height().round() as u32).max(1);

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height).ok_or_else(|| {
        SurfaceError::Unavailable(format!("Could not allocate {width}x{height} SVG canvas"))
    })?;
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::identity(),
        &mut pixmap.as_mut(),
    );

    let data = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    PixelBuffer::from_raw(width, height, data)
        .ok_or_else(|| SurfaceError::Unavailable("SVG canvas size mismatch".into()))
}

fn decode_raster(bytes: &[u8]) -> Result<PixelBuffer, SurfaceError> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| SurfaceError::Decode(format!("Failed to decode image: {e}")))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    PixelBuffer::from_raw(width, height, rgba.into_raw())
        .ok_or_else(|| SurfaceError::Decode("Decoded image has inconsistent size".into()))
}

/// Straight-alpha bytes to premultiplied floats in `0.0..=1.0`, so
/// transparent pixels carry no colour into the filter.
fn premultiplied(buffer: &PixelBuffer) -> Result<Rgba32FImage, SurfaceError> {
    let data = buffer
        .pixels()
        .flat_map(|p| {
            let alpha = p[3] as f32 / 255.0;
            [
                p[0] as f32 / 255.0 * alpha,
                p[1] as f32 / 255.0 * alpha,
                p[2] as f32 / 255.0 * alpha,
                alpha,
            ]
        })
        .collect();
    Rgba32FImage::from_raw(buffer.width(), buffer.height(), data)
        .ok_or_else(|| SurfaceError::Unavailable("Source buffer size mismatch".into()))
}

fn demultiplied(image: &Rgba32FImage) -> PixelBuffer {
    let to_byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    PixelBuffer::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0;
        if a <= 0.0 {
            return [0, 0, 0, 0];
        }
        [to_byte(r / a), to_byte(g / a), to_byte(b / a), to_byte(a)]
    })
}

impl ImageSurface for RustSurface {
    fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer, SurfaceError> {
        if bytes.is_empty() {
            return Err(SurfaceError::Decode("Input is empty".into()));
        }
        if is_svg(bytes) {
            rasterize_svg(bytes)
        } else {
            decode_raster(bytes)
        }
    }

    fn resample(
        &self,
        buffer: &PixelBuffer,
        width: u32,
        height: u32,
    ) -> Result<PixelBuffer, SurfaceError> {
        if buffer.dimensions() == (width, height) {
            return Ok(buffer.clone());
        }
        if width == 0 || height == 0 || buffer.width() == 0 || buffer.height() == 0 {
            return Ok(PixelBuffer::new(width, height));
        }
        let src = premultiplied(buffer)?;
        let resized = image::imageops::resize(&src, width, height, FilterType::Triangle);
        Ok(demultiplied(&resized))
    }

    fn encode_png(&self, buffer: &PixelBuffer) -> Result<Vec<u8>, SurfaceError> {
        let mut out = Vec::new();
        PngEncoder::new(&mut out)
            .write_image(
                buffer.data(),
                buffer.width(),
                buffer.height(),
                ExtendedColorType::Rgba8,
            )
            .map_err(|e| SurfaceError::Encode(format!("PNG encode failed: {e}")))?;
        Ok(out)
    }
}
