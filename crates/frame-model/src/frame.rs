//! Pixel buffers and binary masks.
//!
//! A [`Frame`] is an immutable RGBA8 snapshot handed to the pipeline once per
//! admitted cycle. A [`Mask`] is the per-cycle classification of that frame;
//! it is recomputed every cycle and never persisted.

use crate::error::ModelError;

/// Bytes per pixel in a [`Frame`] buffer (R, G, B, A).
pub const CHANNELS: usize = 4;

/// A `width x height` RGBA8 pixel grid in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Frame {
    /// Wrap an RGBA8 buffer.
    ///
    /// Zero-dimension frames are accepted here; the scheduler skips them.
    /// The buffer length must be exactly `width * height * 4`.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, ModelError> {
        let expected = width as usize * height as usize * CHANNELS;
        if data.len() != expected {
            return Err(ModelError::invalid_frame(format!(
                "{width}x{height} RGBA frame needs {expected} bytes, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A frame where every pixel has the same color.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let count = width as usize * height as usize;
        let mut data = Vec::with_capacity(count * CHANNELS);
        for _ in 0..count {
            data.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Paint an axis-aligned rectangle, clipped to the frame bounds.
    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, rgba: [u8; 4]) {
        let x_end = x.saturating_add(w).min(self.width);
        let y_end = y.saturating_add(h).min(self.height);
        for row in y.min(self.height)..y_end {
            for col in x.min(self.width)..x_end {
                let offset = self.offset(col, row);
                self.data[offset..offset + CHANNELS].copy_from_slice(&rgba);
            }
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// True when either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of pixels in the frame.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// RGBA value at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = self.offset(x, y);
        let px = &self.data[offset..offset + CHANNELS];
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Iterate pixels in row-major order as 4-byte slices.
    pub fn pixels(&self) -> std::slice::ChunksExact<'_, u8> {
        self.data.chunks_exact(CHANNELS)
    }

    /// One row of pixels as raw RGBA bytes, or `None` past the last row.
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let stride = self.width as usize * CHANNELS;
        let start = y as usize * stride;
        self.data.get(start..start + stride)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }
}

/// Binary grid with the same dimensions as the frame it was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl Mask {
    /// An all-zero mask.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width as usize * height as usize],
        }
    }

    /// Build a mask by evaluating `f(x, y)` for every cell.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> bool) -> Self {
        let mut bits = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                bits.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            bits,
        }
    }

    /// Wrap a row-major bit vector. Returns `None` on a length mismatch.
    pub fn from_bits(width: u32, height: u32, bits: Vec<bool>) -> Option<Self> {
        if bits.len() != width as usize * height as usize {
            return None;
        }
        Some(Self {
            width,
            height,
            bits,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Value at `(x, y)`; out-of-bounds reads are `false`.
    pub fn get(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.bits[self.index(x, y)]
    }

    /// Set the value at `(x, y)`. Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = self.index(x, y);
        self.bits[idx] = value;
    }

    /// Set every cell of a rectangle, clipped to the mask bounds.
    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32) {
        let x_end = x.saturating_add(w).min(self.width);
        let y_end = y.saturating_add(h).min(self.height);
        for row in y.min(self.height)..y_end {
            for col in x.min(self.width)..x_end {
                let idx = self.index(col, row);
                self.bits[idx] = true;
            }
        }
    }

    /// Number of set cells.
    pub fn count_ones(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }

    /// Row-major view of the cells.
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Mutable row-major view, for producers that fill the mask in bulk.
    pub fn bits_mut(&mut self) -> &mut [bool] {
        &mut self.bits
    }

    /// Coordinates of every set cell, in row-major order.
    pub fn ones(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let width = self.width.max(1);
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, b)| **b)
            .map(move |(i, _)| ((i as u32) % width, (i as u32) / width))
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}
