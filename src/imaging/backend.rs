//! Image surface trait and shared error type.
//!
//! The [`ImageSurface`] trait is the single seam between the pixel pipeline
//! and whatever actually decodes, resamples, and encodes rasters. Every
//! transform that needs resampling (square resize, texture scaling) goes
//! through it; everything else works on [`PixelBuffer`]s directly.
//!
//! The production implementation is
//! [`RustSurface`](super::rust_backend::RustSurface): `image` crate codecs
//! plus `resvg` for SVG, all statically linked.

use super::buffer::PixelBuffer;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SurfaceError {
    /// Input bytes are malformed or in an unsupported format.
    #[error("Decode failed: {0}")]
    Decode(String),
    /// A drawing or resampling surface could not be allocated.
    #[error("Surface unavailable: {0}")]
    Unavailable(String),
    #[error("Encode failed: {0}")]
    Encode(String),
}

/// Decode, resample, and encode capability used by the pipeline.
///
/// Implementations must be `Sync` so one surface can serve concurrent
/// pipeline invocations.
pub trait ImageSurface: Sync {
    /// Decode raster or SVG bytes into a straight-alpha RGBA buffer.
    /// SVG input is rasterized at its intrinsic size.
    fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer, SurfaceError>;

    /// Resample `buffer` to exactly `width × height`.
    fn resample(
        &self,
        buffer: &PixelBuffer,
        width: u32,
        height: u32,
    ) -> Result<PixelBuffer, SurfaceError>;

    /// Encode as PNG.
    fn encode_png(&self, buffer: &PixelBuffer) -> Result<Vec<u8>, SurfaceError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::imaging::RustSurface;
    use std::sync::Mutex;

    /// Surface that records every call and delegates the pixel work to
    /// [`RustSurface`]. Uses Mutex (not RefCell) so it stays Sync.
    #[derive(Default)]
    pub struct RecordingSurface {
        inner: RustSurface,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Decode { len: usize },
        Resample { from: (u32, u32), to: (u32, u32) },
        EncodePng { width: u32, height: u32 },
    }

    impl RecordingSurface {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }
    }

    impl ImageSurface for RecordingSurface {
        fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer, SurfaceError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Decode { len: bytes.len() });
            self.inner.decode(bytes)
        }

        fn resample(
            &self,
            buffer: &PixelBuffer,
            width: u32,
            height: u32,
        ) -> Result<PixelBuffer, SurfaceError> {
            self.operations.lock().unwrap().push(RecordedOp::Resample {
                from: buffer.dimensions(),
                to: (width, height),
            });
            self.inner.resample(buffer, width, height)
        }

        fn encode_png(&self, buffer: &PixelBuffer) -> Result<Vec<u8>, SurfaceError> {
            self.operations.lock().unwrap().push(RecordedOp::EncodePng {
                width: buffer.width(),
                height: buffer.height(),
            });
            self.inner.encode_png(buffer)
        }
    }

    /// Surface whose every operation fails, for error-path tests.
    pub struct BrokenSurface;

    impl ImageSurface for BrokenSurface {
        fn decode(&self, _bytes: &[u8]) -> Result<PixelBuffer, SurfaceError> {
            Err(SurfaceError::Decode("broken surface".into()))
        }

        fn resample(
            &self,
            _buffer: &PixelBuffer,
            _width: u32,
            _height: u32,
        ) -> Result<PixelBuffer, SurfaceError> {
            Err(SurfaceError::Unavailable("broken surface".into()))
        }

        fn encode_png(&self, _buffer: &PixelBuffer) -> Result<Vec<u8>, SurfaceError> {
            Err(SurfaceError::Encode("broken surface".into()))
        }
    }

    #[test]
    fn recording_surface_records_resample() {
        let surface = RecordingSurface::new();
        let buf = PixelBuffer::filled(4, 2, [0, 0, 0, 255]);

        let out = surface.resample(&buf, 8, 4).unwrap();
        assert_eq!(out.dimensions(), (8, 4));

        let ops = surface.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(
            &ops[0],
            RecordedOp::Resample {
                from: (4, 2),
                to: (8, 4)
            }
        ));
    }

    #[test]
    fn recording_surface_records_encode() {
        let surface = RecordingSurface::new();
        let buf = PixelBuffer::filled(3, 3, [10, 20, 30, 255]);

        let png = surface.encode_png(&buf).unwrap();
        assert!(!png.is_empty());
        assert_eq!(
            surface.get_operations(),
            vec![RecordedOp::EncodePng {
                width: 3,
                height: 3
            }]
        );
    }
}
