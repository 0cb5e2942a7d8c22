//! The flat RGBA8 raster every transform works on.
//!
//! A [`PixelBuffer`] is row-major, four bytes per pixel, straight (not
//! premultiplied) alpha. The only way to build one from raw bytes is
//! [`PixelBuffer::from_raw`], which refuses data whose length does not match
//! `width * height * 4`; every transform can therefore index without bounds
//! bookkeeping.

/// Opaque alpha value.
pub const OPAQUE: u8 = 255;

/// Row-major RGBA8 raster with explicit dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Fully transparent buffer (all bytes zero).
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; byte_len(width, height)],
        }
    }

    /// Buffer with every pixel set to `rgba`.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let data = rgba
            .iter()
            .copied()
            .cycle()
            .take(byte_len(width, height))
            .collect();
        Self {
            width,
            height,
            data,
        }
    }

    /// Wrap raw RGBA8 bytes. Returns `None` if the length is not `width * height * 4`.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        (data.len() == byte_len(width, height)).then_some(Self {
            width,
            height,
            data,
        })
    }

    /// Build a buffer by evaluating `f` at every coordinate.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> [u8; 4]) -> Self {
        let mut data = Vec::with_capacity(byte_len(width, height));
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn is_square(&self) -> bool {
        self.width == self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Byte offset of the pixel at `(x, y)`.
    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.index(x, y);
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    #[inline]
    pub fn alpha(&self, x: u32, y: u32) -> u8 {
        self.data[self.index(x, y) + 3]
    }

    #[inline]
    pub fn put_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let i = self.index(x, y);
        self.data[i..i + 4].copy_from_slice(&rgba);
    }

    #[inline]
    pub fn set_alpha(&mut self, x: u32, y: u32, alpha: u8) {
        let i = self.index(x, y) + 3;
        self.data[i] = alpha;
    }

    /// Iterate over pixels as 4-byte slices in row-major order.
    pub fn pixels(&self) -> std::slice::ChunksExact<'_, u8> {
        self.data.chunks_exact(4)
    }

    /// Copy every pixel of `src` into this buffer with its top-left corner at
    /// `(dx, dy)`. Pixels are replaced, not blended; anything falling outside
    /// this buffer is dropped.
    pub fn copy_from(&mut self, src: &PixelBuffer, dx: u32, dy: u32) {
        if dx >= self.width || dy >= self.height {
            return;
        }
        let copy_w = src.width.min(self.width - dx) as usize;
        let copy_h = src.height.min(self.height - dy);
        for y in 0..copy_h {
            let s = src.index(0, y);
            let d = self.index(dx, dy + y);
            self.data[d..d + copy_w * 4].copy_from_slice(&src.data[s..s + copy_w * 4]);
        }
    }

    /// Copy of the `width × height` region starting at `(x, y)`.
    pub fn sub_buffer(&self, x: u32, y: u32, width: u32, height: u32) -> PixelBuffer {
        let mut out = PixelBuffer::new(width, height);
        for row in 0..height {
            let s = self.index(x, y + row);
            let d = out.index(0, row);
            out.data[d..d + width as usize * 4]
                .copy_from_slice(&self.data[s..s + width as usize * 4]);
        }
        out
    }
}

fn byte_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 4
}
