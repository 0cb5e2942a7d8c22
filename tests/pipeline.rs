//! End-to-end runs through the public API: texture assets on disk, a real
//! PNG in, PNG bytes out.

use clocktower_icons::cache::RemovalCache;
use clocktower_icons::config;
use clocktower_icons::generate::generate;
use clocktower_icons::imaging::{ImageSurface, PixelBuffer, RustSurface, TextureLoader};
use clocktower_icons::process::{Pipeline, Stage};
use clocktower_icons::removal::{BackgroundRemover, CachedRemover, RemovalError};
use clocktower_icons::types::{ColorOption, ProcessingOptions};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

const PARCHMENT: [u8; 4] = [250, 245, 230, 255];
const CRIMSON: [u8; 4] = [139, 16, 17, 255];

fn write_texture(dir: &Path, file: &str, texture: &PixelBuffer) {
    let png = RustSurface::new().encode_png(texture).unwrap();
    fs::write(dir.join(file), png).unwrap();
}

fn black_square_png(size: u32) -> Vec<u8> {
    RustSurface::new()
        .encode_png(&PixelBuffer::filled(size, size, [0, 0, 0, 255]))
        .unwrap()
}

fn threshold_red() -> ProcessingOptions {
    ProcessingOptions {
        variant: ColorOption::Red,
        border: false,
        crop: true,
        smooth_blend: false,
        ..Default::default()
    }
}

/// Red texture with a distinct colour per pixel, so every output pixel can be
/// traced back to its texture coordinate.
fn patterned_red(size: u32) -> PixelBuffer {
    PixelBuffer::from_fn(size, size, |x, y| [x as u8, y as u8, 200, 255])
}

// =============================================================================
// Black square, no border
// =============================================================================

#[test]
fn black_square_takes_every_pixel_from_the_color_texture() {
    let tmp = TempDir::new().unwrap();
    // White prefers webp; the png fallback must be found too.
    write_texture(tmp.path(), "background-white.png", &PixelBuffer::filled(100, 100, PARCHMENT));
    write_texture(tmp.path(), "background-red.png", &patterned_red(100));

    let surface = RustSurface::new();
    let textures = TextureLoader::new(tmp.path());
    let pipeline = Pipeline::new(&surface, &textures);

    let icon = pipeline
        .run(&black_square_png(100), &threshold_red())
        .unwrap();
    assert_eq!((icon.width, icon.height), (100, 100));

    let out = surface.decode(&icon.png).unwrap();
    assert_eq!(out.dimensions(), (100, 100));
    let red = patterned_red(100);
    for y in 0..100 {
        for x in 0..100 {
            assert_eq!(out.pixel(x, y), red.pixel(x, y), "pixel ({x}, {y})");
        }
    }

    // Both textures were read from disk exactly once
    assert_eq!(textures.cached_count(), 2);
    pipeline.run(&black_square_png(100), &threshold_red()).unwrap();
    assert_eq!(textures.cached_count(), 2);
}

// =============================================================================
// Black square with a 3 px border
// =============================================================================

#[test]
fn border_grows_canvas_and_feathers_outer_ring() {
    let tmp = TempDir::new().unwrap();
    // Already at the padded canvas size, so no resampling is involved
    write_texture(tmp.path(), "background-white.png", &PixelBuffer::filled(106, 106, PARCHMENT));
    write_texture(tmp.path(), "background-red.png", &PixelBuffer::filled(106, 106, CRIMSON));

    let surface = RustSurface::new();
    let textures = TextureLoader::new(tmp.path());
    let pipeline = Pipeline::new(&surface, &textures);
    let options = ProcessingOptions {
        border: true,
        border_size: 3,
        ..threshold_red()
    };

    let icon = pipeline.run(&black_square_png(100), &options).unwrap();
    assert!(icon.stages.contains(&Stage::EdgePadding));
    assert!(icon.stages.contains(&Stage::Border));

    let out = surface.decode(&icon.png).unwrap();
    assert_eq!(out.dimensions(), (106, 106));

    // Graduated alpha tiers walking away from each corner
    let top: Vec<u8> = (0..5).map(|x| out.alpha(x, 0)).collect();
    assert_eq!(top, vec![0, 63, 127, 191, 255]);
    let left: Vec<u8> = (0..5).map(|y| out.alpha(0, y)).collect();
    assert_eq!(left, vec![0, 63, 127, 191, 255]);
    let bottom_right: Vec<u8> = (0..5).map(|i| out.alpha(105 - i, 105)).collect();
    assert_eq!(bottom_right, vec![0, 63, 127, 191, 255]);

    // Border rings are white in the mask, so they show the parchment texture
    assert_eq!(out.pixel(50, 0), PARCHMENT);
    assert_eq!(out.pixel(1, 50), PARCHMENT);
    assert_eq!(out.pixel(2, 2), PARCHMENT);
    let [r, g, b, a] = out.pixel(2, 0);
    assert_eq!(([r, g, b], a), ([PARCHMENT[0], PARCHMENT[1], PARCHMENT[2]], 127));

    // The original artwork shows the team colour
    assert_eq!(out.pixel(3, 3), CRIMSON);
    assert_eq!(out.pixel(53, 53), CRIMSON);
    assert_eq!(out.pixel(102, 102), CRIMSON);
}

// =============================================================================
// Missing assets
// =============================================================================

#[test]
fn missing_color_texture_fails_at_texture_stage() {
    let tmp = TempDir::new().unwrap();
    write_texture(tmp.path(), "background-white.webp", &PixelBuffer::filled(4, 4, PARCHMENT));

    let surface = RustSurface::new();
    let textures = TextureLoader::new(tmp.path());
    let pipeline = Pipeline::new(&surface, &textures);

    let err = pipeline
        .run(&black_square_png(10), &threshold_red())
        .unwrap_err();
    assert_eq!(err.stage(), Stage::Texture);
    assert!(err.to_string().contains("background-red"));
}

// =============================================================================
// Background removal through the cache
// =============================================================================

/// Returns a fixed cut-out and counts how often it was asked.
struct StubRemover {
    cutout: Vec<u8>,
    calls: AtomicUsize,
}

impl BackgroundRemover for StubRemover {
    fn remove_background(&self, _bytes: &[u8]) -> Result<Vec<u8>, RemovalError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.cutout.clone())
    }
}

#[test]
fn background_removal_output_feeds_the_pipeline_and_is_cached() {
    let tmp = TempDir::new().unwrap();
    write_texture(tmp.path(), "background-white.png", &PixelBuffer::filled(4, 4, PARCHMENT));
    write_texture(tmp.path(), "background-red.png", &PixelBuffer::filled(4, 4, CRIMSON));

    // The cut-out leaves a 10×6 opaque block on a transparent 20×20 canvas
    let mut cutout = PixelBuffer::new(20, 20);
    for y in 7..13 {
        for x in 5..15 {
            cutout.put_pixel(x, y, [0, 0, 0, 255]);
        }
    }
    let surface = RustSurface::new();
    let stub = StubRemover {
        cutout: surface.encode_png(&cutout).unwrap(),
        calls: AtomicUsize::new(0),
    };
    let cache = Arc::new(RemovalCache::new());
    let remover = CachedRemover::new(stub, Arc::clone(&cache));

    let textures = TextureLoader::new(tmp.path());
    let pipeline = Pipeline::new(&surface, &textures).with_remover(&remover);
    let options = ProcessingOptions {
        remove_background: true,
        ..threshold_red()
    };

    let input = black_square_png(20);
    let first = pipeline.run(&input, &options).unwrap();
    let second = pipeline.run(&input, &options).unwrap();

    // Cropped to the cut-out's content
    assert_eq!((first.width, first.height), (10, 6));
    assert_eq!(first.png, second.png);
    assert_eq!(first.stages[0], Stage::RemoveBackground);

    let stats = cache.stats();
    assert_eq!((stats.hits, stats.misses), (1, 1));
}

// =============================================================================
// Config-driven batch
// =============================================================================

#[test]
fn batch_uses_texture_dir_from_config() {
    let tmp = TempDir::new().unwrap();
    let assets = tmp.path().join("assets");
    fs::create_dir_all(&assets).unwrap();
    write_texture(&assets, "background-white.webp", &PixelBuffer::filled(4, 4, PARCHMENT));
    write_texture(&assets, "background-traveller.png", &PixelBuffer::filled(4, 4, CRIMSON));
    fs::write(
        tmp.path().join("config.toml"),
        r#"
[textures]
dir = "assets"

[defaults]
variant = "traveller"
horizontal_adjustment = -4
crop = false
"#,
    )
    .unwrap();

    let uploads = tmp.path().join("uploads");
    fs::create_dir_all(&uploads).unwrap();
    fs::write(uploads.join("Fortune Teller.png"), black_square_png(8)).unwrap();

    let config = config::load_config(tmp.path()).unwrap();
    let surface = RustSurface::new();
    let textures = TextureLoader::new(config.texture_dir(tmp.path()));
    let pipeline = Pipeline::new(&surface, &textures);
    let out_dir = tmp.path().join("icons");

    let inputs = clocktower_icons::scan::collect_inputs(&[uploads]).unwrap();
    let report = generate(&pipeline, &inputs, &out_dir, &config.defaults, None).unwrap();

    assert!(report.is_success());
    let icon = &report.generated[0];
    assert_eq!(icon.output, out_dir.join("Fortune-Teller-traveller.png"));
    // 8×8 padded to 12×8 on the left, then resized into a 12×12 square
    assert_eq!((icon.width, icon.height), (12, 12));
    assert!(icon.stages.contains(&Stage::HorizontalPadding));
    assert!(!icon.stages.contains(&Stage::Crop));
}
