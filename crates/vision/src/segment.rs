//! Hue-based color segmentation.
//!
//! Each pixel is converted from RGB to HSV (hue in degrees `[0, 360)`,
//! saturation and value in percent `[0, 100]`) and marked when:
//! - saturation ≥ the configured floor,
//! - value ≥ the configured floor, and
//! - hue lies in **any** of the configured closed intervals.
//!
//! Wrap-around targets such as red are expressed as two intervals
//! (`[340, 360]` and `[0, 10]`), never as a single inverted pair.
//! Alpha is ignored.

use std::sync::Arc;

use posehue_frame_model::{DetectionConfig, Frame, HueInterval, Mask, CHANNELS};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

/// A color in HSV form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    /// Hue in degrees, `[0, 360)`.
    pub h: f64,
    /// Saturation in percent.
    pub s: f64,
    /// Value in percent.
    pub v: f64,
}

/// Convert 8-bit RGB to HSV.
///
/// Achromatic input (`r == g == b`) has hue 0; black also has saturation 0.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> Hsv {
    let r = r as f64 / 255.0;
    let g = g as f64 / 255.0;
    let b = b as f64 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };

    let s = if max == 0.0 { 0.0 } else { delta / max * 100.0 };

    Hsv { h, s, v: max * 100.0 }
}

/// How a frame's rows are distributed over threads.
#[derive(Debug, Clone)]
enum Parallelism {
    Serial,
    /// Rayon's global pool, sized to the available parallelism.
    Global,
    /// A dedicated pool with a fixed thread count.
    Pool(Arc<ThreadPool>),
}

/// Classifies pixels against a hue/saturation/value window.
#[derive(Debug, Clone)]
pub struct ColorSegmenter {
    hue_ranges: Vec<HueInterval>,
    saturation_min: f64,
    value_min: f64,
    workers: usize,
    parallelism: Parallelism,
}

impl ColorSegmenter {
    /// Create a single-threaded segmenter.
    pub fn new(hue_ranges: Vec<HueInterval>, saturation_min: f64, value_min: f64) -> Self {
        Self {
            hue_ranges,
            saturation_min,
            value_min,
            workers: 1,
            parallelism: Parallelism::Serial,
        }
    }

    /// Build from detection config, including its worker count.
    pub fn from_config(config: &DetectionConfig) -> Self {
        Self::new(
            config.hue_ranges.clone(),
            config.saturation_min_percent,
            config.value_min_percent,
        )
        .with_workers(config.worker_threads)
    }

    /// Classify rows in parallel on `workers` threads. `0` uses rayon's
    /// global pool; `1` stays on the calling thread.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self.parallelism = match workers {
            1 => Parallelism::Serial,
            0 => Parallelism::Global,
            n => match ThreadPoolBuilder::new().num_threads(n).build() {
                Ok(pool) => Parallelism::Pool(Arc::new(pool)),
                Err(e) => {
                    tracing::warn!(workers = n, "Falling back to the global thread pool: {e}");
                    Parallelism::Global
                }
            },
        };
        self
    }

    pub fn hue_ranges(&self) -> &[HueInterval] {
        &self.hue_ranges
    }

    /// Configured worker count; `0` means the global pool.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Whether an HSV color falls inside the window.
    pub fn matches_hsv(&self, hsv: Hsv) -> bool {
        hsv.s >= self.saturation_min
            && hsv.v >= self.value_min
            && self.hue_ranges.iter().any(|range| range.contains(hsv.h))
    }

    /// Whether an RGB color falls inside the window.
    pub fn matches_rgb(&self, r: u8, g: u8, b: u8) -> bool {
        self.matches_hsv(rgb_to_hsv(r, g, b))
    }

    /// Produce the mask for a frame. The mask has the frame's dimensions.
    ///
    /// Parallel classification still returns only once every row is done.
    pub fn segment(&self, frame: &Frame) -> Mask {
        let width = frame.width() as usize;
        let mut mask = Mask::new(frame.width(), frame.height());
        if frame.is_empty() {
            return mask;
        }

        match &self.parallelism {
            Parallelism::Serial => self.classify_rows(frame.as_bytes(), mask.bits_mut()),
            Parallelism::Global => self.classify_par(frame, mask.bits_mut(), width),
            Parallelism::Pool(pool) => {
                pool.install(|| self.classify_par(frame, mask.bits_mut(), width))
            }
        }
        mask
    }

    fn classify_par(&self, frame: &Frame, bits: &mut [bool], width: usize) {
        bits.par_chunks_mut(width)
            .zip(frame.as_bytes().par_chunks(width * CHANNELS))
            .for_each(|(row_bits, row_bytes)| self.classify_rows(row_bytes, row_bits));
    }

    fn classify_rows(&self, bytes: &[u8], bits: &mut [bool]) {
        for (bit, px) in bits.iter_mut().zip(bytes.chunks_exact(CHANNELS)) {
            *bit = self.matches_rgb(px[0], px[1], px[2]);
        }
    }
}

impl Default for ColorSegmenter {
    fn default() -> Self {
        Self::from_config(&DetectionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GREEN: [u8; 4] = [30, 200, 40, 255];
    const GREY: [u8; 4] = [128, 128, 128, 255];

    /// RGB for a fully saturated, fully bright color at `hue` degrees.
    fn rgb_at_hue(hue: f64) -> (u8, u8, u8) {
        let x = 1.0 - ((hue / 60.0) % 2.0 - 1.0).abs();
        let (r, g, b) = match (hue / 60.0) as u32 {
            0 => (1.0, x, 0.0),
            1 => (x, 1.0, 0.0),
            2 => (0.0, 1.0, x),
            3 => (0.0, x, 1.0),
            4 => (x, 0.0, 1.0),
            _ => (1.0, 0.0, x),
        };
        let to8 = |c: f64| (c * 255.0).round() as u8;
        (to8(r), to8(g), to8(b))
    }

    #[test]
    fn test_primary_hues() {
        assert_eq!(rgb_to_hsv(255, 0, 0).h, 0.0);
        assert!((rgb_to_hsv(0, 255, 0).h - 120.0).abs() < 1e-9);
        assert!((rgb_to_hsv(0, 0, 255).h - 240.0).abs() < 1e-9);
        let hsv = rgb_to_hsv(0, 255, 0);
        assert!((hsv.s - 100.0).abs() < 1e-9);
        assert!((hsv.v - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_black_is_degenerate() {
        let hsv = rgb_to_hsv(0, 0, 0);
        assert_eq!(hsv, Hsv { h: 0.0, s: 0.0, v: 0.0 });
        assert!(!ColorSegmenter::default().matches_rgb(0, 0, 0));
    }

    #[test]
    fn test_hue_just_below_360() {
        let (r, g, b) = rgb_at_hue(355.0);
        let hsv = rgb_to_hsv(r, g, b);
        assert!(hsv.h > 350.0 && hsv.h < 360.0, "hue={}", hsv.h);
    }

    #[test]
    fn test_wraparound_red_needs_interval_set() {
        let (r, g, b) = rgb_at_hue(355.0);

        let split = ColorSegmenter::new(HueInterval::wrapping(340.0, 10.0), 25.0, 25.0);
        assert!(split.matches_rgb(r, g, b));
        assert!(split.matches_rgb(255, 10, 0));

        // An inverted single interval matches nothing.
        let naive = ColorSegmenter::new(vec![HueInterval::new(340.0, 10.0)], 25.0, 25.0);
        assert!(!naive.matches_rgb(r, g, b));
    }

    #[test]
    fn test_default_window_is_green() {
        let seg = ColorSegmenter::default();
        assert!(seg.matches_rgb(GREEN[0], GREEN[1], GREEN[2]));
        assert!(!seg.matches_rgb(GREY[0], GREY[1], GREY[2]));
        assert!(!seg.matches_rgb(200, 30, 30));
        // Dark green falls under the value floor.
        assert!(!seg.matches_rgb(0, 40, 0));
    }

    #[test]
    fn test_segment_marks_rect() {
        let mut frame = Frame::filled(8, 6, GREY);
        frame.fill_rect(2, 1, 3, 2, GREEN);
        let mask = ColorSegmenter::default().segment(&frame);
        assert_eq!(mask.width(), 8);
        assert_eq!(mask.height(), 6);
        assert_eq!(mask.count_ones(), 6);
        assert!(mask.get(2, 1));
        assert!(mask.get(4, 2));
        assert!(!mask.get(5, 2));
    }

    #[test]
    fn test_parallel_segmentation_matches_serial() {
        let mut frame = Frame::filled(17, 23, GREY);
        frame.fill_rect(0, 0, 5, 5, GREEN);
        frame.fill_rect(9, 7, 6, 13, GREEN);
        frame.fill_rect(16, 22, 1, 1, GREEN);

        let serial = ColorSegmenter::default().segment(&frame);
        for workers in [0, 2, 3, 4, 23, 64] {
            let parallel = ColorSegmenter::default().with_workers(workers).segment(&frame);
            assert_eq!(parallel, serial, "workers={workers}");
        }
    }

    #[test]
    fn test_empty_frame_gives_empty_mask() {
        let frame = Frame::from_rgba(0, 0, Vec::new()).unwrap();
        let mask = ColorSegmenter::default().with_workers(4).segment(&frame);
        assert_eq!(mask.count_ones(), 0);
    }
}
