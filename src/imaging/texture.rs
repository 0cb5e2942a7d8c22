//! Texture assets and texture compositing.
//!
//! Textures are plain raster files named `background-<name>.<ext>` in one
//! directory. [`TextureLoader`] decodes each name at most once and shares
//! the buffer behind an `Arc`; [`scale_texture`] adapts a cached texture to
//! the working buffer and [`apply_textures`] paints it through the
//! grayscale mask.

use super::backend::{ImageSurface, SurfaceError};
use super::buffer::PixelBuffer;
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Name of the shared texture used for light areas.
pub const WHITE_TEXTURE: &str = "white";

/// Extensions tried when locating an asset, after the preferred one.
const FALLBACK_EXTENSIONS: &[&str] = &["png", "webp", "jpg", "jpeg"];

/// Intensity at or above which threshold compositing picks the white texture.
const THRESHOLD_INTENSITY: f64 = 128.0;

#[derive(Error, Debug)]
pub enum TextureError {
    #[error("No texture asset background-{name}.* in {}", dir.display())]
    NotFound { name: String, dir: PathBuf },
    #[error("Failed to read texture {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Texture '{name}' could not be decoded: {source}")]
    Decode {
        name: String,
        #[source]
        source: SurfaceError,
    },
}

/// Preferred file extension for a texture: the traveller family ships PNG,
/// everything else WebP.
pub fn preferred_extension(name: &str) -> &'static str {
    if name.contains("traveller") {
        "png"
    } else {
        "webp"
    }
}

/// File name candidates for `name`, preferred extension first.
pub fn candidate_file_names(name: &str) -> Vec<String> {
    let preferred = preferred_extension(name);
    std::iter::once(preferred)
        .chain(FALLBACK_EXTENSIONS.iter().copied().filter(|e| *e != preferred))
        .map(|ext| format!("background-{name}.{ext}"))
        .collect()
}

/// Loads texture assets from a directory, caching each by name.
///
/// The cache is a concurrent map: parallel pipeline runs may race on the
/// first load of a name, in which case the last decoded buffer wins. Both
/// are decoded from the same file, so the values are identical.
#[derive(Debug)]
pub struct TextureLoader {
    dir: PathBuf,
    cache: DashMap<String, Arc<PixelBuffer>>,
}

impl TextureLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cache: DashMap::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of distinct textures currently cached.
    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    /// Seed the cache with an in-memory texture. Later loads of `name`
    /// never touch the filesystem.
    pub fn preload(&self, name: impl Into<String>, texture: PixelBuffer) {
        self.cache.insert(name.into(), Arc::new(texture));
    }

    /// First existing asset path for `name`, if any.
    pub fn locate(&self, name: &str) -> Option<PathBuf> {
        candidate_file_names(name)
            .into_iter()
            .map(|file| self.dir.join(file))
            .find(|path| path.is_file())
    }

    /// Load the texture called `name`, decoding it on first use.
    pub fn load(
        &self,
        surface: &impl ImageSurface,
        name: &str,
    ) -> Result<Arc<PixelBuffer>, TextureError> {
        if let Some(cached) = self.cache.get(name) {
            return Ok(Arc::clone(cached.value()));
        }

        let path = self.locate(name).ok_or_else(|| TextureError::NotFound {
            name: name.to_string(),
            dir: self.dir.clone(),
        })?;
        let bytes = std::fs::read(&path).map_err(|source| TextureError::Io {
            path: path.clone(),
            source,
        })?;
        let texture = surface
            .decode(&bytes)
            .map_err(|source| TextureError::Decode {
                name: name.to_string(),
                source,
            })?;
        tracing::debug!(
            texture = name,
            path = %path.display(),
            width = texture.width(),
            height = texture.height(),
            "loaded texture"
        );

        let texture = Arc::new(texture);
        self.cache.insert(name.to_string(), Arc::clone(&texture));
        Ok(texture)
    }
}

/// Resample `texture` to a square of side `max(target_width, target_height)`.
pub fn scale_texture(
    surface: &impl ImageSurface,
    texture: &PixelBuffer,
    target_width: u32,
    target_height: u32,
) -> Result<PixelBuffer, SurfaceError> {
    let size = target_width.max(target_height);
    surface.resample(texture, size, size)
}

/// Paint the textures through `buffer`'s intensity.
///
/// Both textures are scaled to `buffer`'s square size. The result starts as
/// a copy of `original` (or fully transparent); every pixel of `buffer` with
/// alpha > 0 is then replaced by texture colour, dark areas from `color` and
/// light areas from `white`, keeping `buffer`'s alpha.
pub fn apply_textures(
    surface: &impl ImageSurface,
    buffer: &PixelBuffer,
    white: &PixelBuffer,
    color: &PixelBuffer,
    smooth_blend: bool,
    original: Option<&PixelBuffer>,
) -> Result<PixelBuffer, SurfaceError> {
    let (width, height) = buffer.dimensions();
    let white = scale_texture(surface, white, width, height)?;
    let color = scale_texture(surface, color, width, height)?;

    let mut out = match original {
        Some(base) if base.dimensions() == buffer.dimensions() => base.clone(),
        _ => PixelBuffer::new(width, height),
    };

    let max_x = color.width().saturating_sub(1);
    let max_y = color.height().saturating_sub(1);

    for y in 0..height {
        for x in 0..width {
            let [r, g, b, a] = buffer.pixel(x, y);
            if a == 0 {
                continue;
            }
            let intensity = (r as f64 + g as f64 + b as f64) / 3.0;
            let (tx, ty) = (x.min(max_x), y.min(max_y));
            let c = color.pixel(tx, ty);
            let w = white.pixel(tx, ty);

            let rgb = if smooth_blend {
                let ratio = intensity / 255.0;
                let blend =
                    |c: u8, w: u8| (c as f64 * (1.0 - ratio) + w as f64 * ratio).round() as u8;
                [blend(c[0], w[0]), blend(c[1], w[1]), blend(c[2], w[2])]
            } else if intensity < THRESHOLD_INTENSITY {
                [c[0], c[1], c[2]]
            } else {
                [w[0], w[1], w[2]]
            };
            out.put_pixel(x, y, [rgb[0], rgb[1], rgb[2], a]);
        }
    }

    Ok(out)
}
