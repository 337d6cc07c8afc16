//! Connected-component labeling of binary masks.
//!
//! # Algorithm
//!
//! 1. **Scan** the mask in row-major order.
//! 2. **Seed** a new region at every set pixel not yet visited.
//! 3. **Flood** breadth-first (FIFO queue) through 4-connected set
//!    neighbors, marking each pixel visited exactly once and growing the
//!    region's bounding box and pixel count as it goes.
//!
//! Every set pixel ends up in exactly one region. Runs in
//! `O(width × height)` time with one visited flag per pixel; the scratch
//! buffers are kept between calls to avoid reallocating every frame.

use std::collections::VecDeque;

use posehue_frame_model::{Mask, Region};

/// Per-pixel component assignment produced by [`ComponentLabeler::label_map`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMap {
    pub width: u32,
    pub height: u32,
    /// Row-major labels: `0` is background, `k` is `regions[k - 1]`.
    pub labels: Vec<u32>,
    pub regions: Vec<Region>,
}

impl LabelMap {
    /// Label at `(x, y)`; `0` for background or out of bounds.
    pub fn label_at(&self, x: u32, y: u32) -> u32 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.labels[y as usize * self.width as usize + x as usize]
    }
}

/// Breadth-first 4-connected component labeler.
#[derive(Debug, Default)]
pub struct ComponentLabeler {
    visited: Vec<bool>,
    queue: VecDeque<(u32, u32)>,
}

impl ComponentLabeler {
    pub fn new() -> Self {
        Self::default()
    }

    /// All maximal 4-connected regions of set pixels, in scan order of
    /// their first (top-most, then left-most) pixel.
    pub fn label(&mut self, mask: &Mask) -> Vec<Region> {
        self.flood_all(mask, None)
    }

    /// Like [`label`](Self::label), also recording which region owns each pixel.
    pub fn label_map(&mut self, mask: &Mask) -> LabelMap {
        let mut labels = vec![0u32; mask.bits().len()];
        let regions = self.flood_all(mask, Some(&mut labels));
        LabelMap {
            width: mask.width(),
            height: mask.height(),
            labels,
            regions,
        }
    }

    fn flood_all(&mut self, mask: &Mask, mut labels: Option<&mut [u32]>) -> Vec<Region> {
        let width = mask.width();
        let height = mask.height();
        let bits = mask.bits();

        self.visited.clear();
        self.visited.resize(bits.len(), false);
        self.queue.clear();

        let mut regions = Vec::new();
        for y in 0..height {
            for x in 0..width {
                let idx = y as usize * width as usize + x as usize;
                if !bits[idx] || self.visited[idx] {
                    continue;
                }

                let label = regions.len() as u32 + 1;
                let region = self.flood(bits, width, height, x, y, label, labels.as_deref_mut());
                tracing::trace!(
                    label,
                    pixels = region.pixel_count,
                    min_x = region.min_x,
                    min_y = region.min_y,
                    "Labeled component"
                );
                regions.push(region);
            }
        }
        regions
    }

    #[allow(clippy::too_many_arguments)]
    fn flood(
        &mut self,
        bits: &[bool],
        width: u32,
        height: u32,
        seed_x: u32,
        seed_y: u32,
        label: u32,
        mut labels: Option<&mut [u32]>,
    ) -> Region {
        let index = |x: u32, y: u32| y as usize * width as usize + x as usize;

        let mut region = Region::seed(seed_x, seed_y);
        self.visited[index(seed_x, seed_y)] = true;
        self.queue.push_back((seed_x, seed_y));

        while let Some((x, y)) = self.queue.pop_front() {
            if let Some(labels) = labels.as_deref_mut() {
                labels[index(x, y)] = label;
            }

            let neighbors = [
                (x > 0).then(|| (x - 1, y)),
                (x + 1 < width).then(|| (x + 1, y)),
                (y > 0).then(|| (x, y - 1)),
                (y + 1 < height).then(|| (x, y + 1)),
            ];
            for (nx, ny) in neighbors.into_iter().flatten() {
                let n = index(nx, ny);
                if bits[n] && !self.visited[n] {
                    self.visited[n] = true;
                    region.include(nx, ny);
                    self.queue.push_back((nx, ny));
                }
            }
        }

        region
    }
}

/// Label a mask with a throwaway labeler.
pub fn label_components(mask: &Mask) -> Vec<Region> {
    ComponentLabeler::new().label(mask)
}
