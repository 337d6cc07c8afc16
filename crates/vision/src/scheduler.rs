//! Throttled frame scheduling.
//!
//! The scheduler is driven by an external tick source (a display refresh
//! callback, a camera callback, or a replayed session). On each tick it
//! decides whether to run a full analysis cycle:
//!
//! 1. **Stopped?** A stopped scheduler consumes no further ticks.
//! 2. **Throttle:** the first tick is admitted; afterwards a tick is admitted
//!    only when strictly more than `throttle_interval_ms` has passed since
//!    the last completed cycle. Everything else is dropped, never queued.
//! 3. **Input check:** an admitted tick without a usable frame is skipped
//!    and leaves every piece of state untouched.
//! 4. **Cycle:** segment → label → filter the frame; smooth each tracked
//!    joint; keep the regions near a joint; publish the result.
//!
//! All computation happens in capture space. Published results are
//! expressed in the [`CoordinateSpace`] chosen at construction.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use posehue_common::clock::Throttle;
use posehue_common::error::PosehueResult;
use posehue_frame_model::{
    CoordinateSpace, DetectionConfig, Frame, LandmarkSet, PixelPoint, PoseLandmark, Region,
    TimestampMs, TrackedPoint,
};
use serde::Serialize;

use crate::filter::ObjectFilter;
use crate::label::ComponentLabeler;
use crate::proximity::{ProximityMatcher, RegionMatch};
use crate::segment::ColorSegmenter;
use crate::smooth::PointSmoother;

/// Smoothed estimate of one joint for this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct JointEstimate {
    pub joint: PoseLandmark,
    /// Smoothed normalized point.
    pub point: TrackedPoint,
    /// The point in frame pixels, mirrored with the same map as regions so
    /// it can be compared with `objects` and `matched` directly.
    pub pixel: PixelPoint,
}

/// Everything a completed cycle publishes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleOutput {
    pub timestamp_ms: TimestampMs,
    pub frame_width: u32,
    pub frame_height: u32,
    /// Space that every coordinate below is expressed in.
    pub space: CoordinateSpace,
    /// Regions that passed the area filter.
    pub objects: Vec<Region>,
    /// Filtered regions near at least one tracked joint.
    pub matched: Vec<RegionMatch>,
    /// Smoothed tracked joints reported this cycle.
    pub joints: Vec<JointEstimate>,
    /// At least one region passed the area filter.
    pub object_detected: bool,
    /// At least one tracked joint was reported.
    pub joint_detected: bool,
    /// At least one region is near a tracked joint.
    pub near_match: bool,
}

/// Why an admitted tick did not run a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No frame was supplied.
    NoFrame,
    /// The frame has a zero dimension.
    EmptyFrame,
}

/// Result of offering one tick to the scheduler.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// A cycle ran to completion and published this output.
    Completed(CycleOutput),
    /// Too soon after the last cycle; the tick was dropped.
    Throttled,
    /// The tick was due but had no usable frame.
    Skipped(SkipReason),
    /// The scheduler has been stopped.
    Stopped,
}

impl TickOutcome {
    pub fn output(&self) -> Option<&CycleOutput> {
        match self {
            Self::Completed(output) => Some(output),
            _ => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

/// Running tick counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SchedulerStats {
    pub ticks: u64,
    pub cycles: u64,
    pub throttled: u64,
    pub skipped: u64,
}

/// Owns the long-lived pipeline state and sequences one cycle per admitted tick.
pub struct FrameScheduler {
    config: DetectionConfig,
    space: CoordinateSpace,
    throttle: Throttle,
    segmenter: ColorSegmenter,
    labeler: ComponentLabeler,
    filter: ObjectFilter,
    smoother: PointSmoother,
    matcher: ProximityMatcher,
    stop_flag: Arc<AtomicBool>,
    latest: Option<CycleOutput>,
    stats: SchedulerStats,
}

impl FrameScheduler {
    /// Create a scheduler publishing results in `space`.
    ///
    /// Fails if the configuration does not validate.
    pub fn new(config: DetectionConfig, space: CoordinateSpace) -> PosehueResult<Self> {
        config.validate()?;
        Ok(Self {
            throttle: Throttle::new(config.throttle_interval_ms),
            segmenter: ColorSegmenter::from_config(&config),
            labeler: ComponentLabeler::new(),
            filter: ObjectFilter::from_config(&config),
            smoother: PointSmoother::new(config.smoothing_window_size),
            matcher: ProximityMatcher::from_config(&config),
            stop_flag: Arc::new(AtomicBool::new(false)),
            latest: None,
            stats: SchedulerStats::default(),
            space,
            config,
        })
    }

    /// Offer a tick at `now_ms` with the latest frame and landmarks.
    ///
    /// Absent joints are simply not processed this cycle; their history
    /// is kept.
    pub fn tick(
        &mut self,
        now_ms: TimestampMs,
        frame: Option<&Frame>,
        landmarks: &LandmarkSet,
    ) -> TickOutcome {
        if self.is_stopped() {
            return TickOutcome::Stopped;
        }
        self.stats.ticks += 1;

        if !self.throttle.is_due(now_ms) {
            self.stats.throttled += 1;
            return TickOutcome::Throttled;
        }

        let frame = match frame {
            None => return self.skip(now_ms, SkipReason::NoFrame),
            Some(f) if f.is_empty() => return self.skip(now_ms, SkipReason::EmptyFrame),
            Some(f) => f,
        };

        let started = Instant::now();
        let output = self.run_cycle(now_ms, frame, landmarks);
        self.throttle.mark(now_ms);
        self.stats.cycles += 1;
        self.latest = Some(output.clone());

        tracing::debug!(
            t = now_ms,
            objects = output.objects.len(),
            matched = output.matched.len(),
            joints = output.joints.len(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "Cycle completed"
        );
        TickOutcome::Completed(output)
    }

    fn skip(&mut self, now_ms: TimestampMs, reason: SkipReason) -> TickOutcome {
        self.stats.skipped += 1;
        tracing::debug!(t = now_ms, ?reason, "Cycle skipped");
        TickOutcome::Skipped(reason)
    }

    fn run_cycle(
        &mut self,
        now_ms: TimestampMs,
        frame: &Frame,
        landmarks: &LandmarkSet,
    ) -> CycleOutput {
        let (width, height) = (frame.width(), frame.height());

        let mask = self.segmenter.segment(frame);
        let regions = self.labeler.label(&mask);
        let objects = self.filter.apply(regions);

        let mut joints = Vec::with_capacity(self.config.tracked_joints.len());
        for &joint in &self.config.tracked_joints {
            let Some(raw) = landmarks.get(joint) else {
                continue;
            };
            let point = self.smoother.update(joint, *raw);
            joints.push(JointEstimate {
                joint,
                point,
                pixel: point.to_pixel(width, height),
            });
        }

        let joint_pixels: Vec<(PoseLandmark, PixelPoint)> =
            joints.iter().map(|j| (j.joint, j.pixel)).collect();
        let matched = self.matcher.match_regions(&objects, &joint_pixels);

        let space = self.space;
        CycleOutput {
            timestamp_ms: now_ms,
            frame_width: width,
            frame_height: height,
            space,
            object_detected: !objects.is_empty(),
            joint_detected: !joints.is_empty(),
            near_match: !matched.is_empty(),
            objects: objects
                .iter()
                .map(|r| r.in_space(space, width))
                .collect(),
            matched: matched
                .into_iter()
                .map(|m| RegionMatch {
                    region: m.region.in_space(space, width),
                    ..m
                })
                .collect(),
            joints: joints
                .into_iter()
                .map(|j| JointEstimate {
                    point: j.point.in_space(space),
                    pixel: match space {
                        CoordinateSpace::Capture => j.pixel,
                        CoordinateSpace::Mirrored => j.pixel.mirrored(width),
                    },
                    ..j
                })
                .collect(),
        }
    }

    /// Whether a tick at `now_ms` would be admitted, so callers can skip
    /// decoding frames that would be dropped anyway.
    pub fn is_due(&self, now_ms: TimestampMs) -> bool {
        !self.is_stopped() && self.throttle.is_due(now_ms)
    }

    /// Stop consuming ticks. Cycles never run half-way, so there is
    /// nothing to cancel.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop_flag.load(Ordering::SeqCst)
    }

    /// Shared stop flag for an external controller.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    /// Output of the most recent completed cycle, for redraws between cycles.
    pub fn latest(&self) -> Option<&CycleOutput> {
        self.latest.as_ref()
    }

    /// Timestamp of the last completed cycle.
    pub fn last_run_ms(&self) -> Option<TimestampMs> {
        self.throttle.last_run_ms()
    }

    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    pub fn space(&self) -> CoordinateSpace {
        self.space
    }

    pub fn smoother(&self) -> &PointSmoother {
        &self.smoother
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proximity::distance_to_region;
    use posehue_frame_model::HueInterval;

    const GREEN: [u8; 4] = [20, 220, 60, 255];
    const BACKDROP: [u8; 4] = [90, 70, 60, 255];

    fn small_config() -> DetectionConfig {
        DetectionConfig {
            min_object_area_px: 20,
            ..Default::default()
        }
    }

    fn frame_with_block() -> Frame {
        let mut frame = Frame::filled(100, 80, BACKDROP);
        frame.fill_rect(10, 20, 10, 10, GREEN);
        frame
    }

    fn knee_at(x: f64, y: f64) -> LandmarkSet {
        LandmarkSet::new().with(PoseLandmark::LeftKnee, TrackedPoint::planar(x, y))
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = DetectionConfig {
            hue_ranges: vec![HueInterval::new(200.0, 100.0)],
            ..Default::default()
        };
        assert!(FrameScheduler::new(config, CoordinateSpace::Capture).is_err());
    }

    #[test]
    fn test_cycle_matches_block_near_knee() {
        let mut scheduler = FrameScheduler::new(small_config(), CoordinateSpace::Capture).unwrap();
        // (0.3, 0.3) → (30, 24): 11 px right of the block's right edge.
        let outcome = scheduler.tick(0, Some(&frame_with_block()), &knee_at(0.3, 0.3));
        let output = outcome.output().unwrap();

        assert_eq!(output.objects.len(), 1);
        assert_eq!(output.objects[0].pixel_count, 100);
        assert_eq!(output.matched.len(), 1);
        assert!((output.matched[0].distance - 11.0).abs() < 1e-9);
        assert!(output.object_detected && output.joint_detected && output.near_match);
    }

    #[test]
    fn test_far_joint_does_not_match() {
        let mut scheduler = FrameScheduler::new(small_config(), CoordinateSpace::Capture).unwrap();
        let outcome = scheduler.tick(0, Some(&frame_with_block()), &knee_at(0.95, 0.95));
        let output = outcome.output().unwrap();
        assert!(output.object_detected);
        assert!(output.joint_detected);
        assert!(!output.near_match);
        assert!(output.matched.is_empty());
    }

    #[test]
    fn test_untracked_joints_are_ignored() {
        let mut scheduler = FrameScheduler::new(small_config(), CoordinateSpace::Capture).unwrap();
        let landmarks =
            LandmarkSet::new().with(PoseLandmark::LeftWrist, TrackedPoint::planar(0.15, 0.3));
        let outcome = scheduler.tick(0, Some(&frame_with_block()), &landmarks);
        let output = outcome.output().unwrap();
        assert!(!output.joint_detected);
        assert!(output.matched.is_empty());
    }

    #[test]
    fn test_skipped_tick_leaves_state_untouched() {
        let mut scheduler = FrameScheduler::new(small_config(), CoordinateSpace::Capture).unwrap();
        let empty = Frame::from_rgba(0, 0, Vec::new()).unwrap();

        assert_eq!(
            scheduler.tick(0, None, &knee_at(0.5, 0.5)),
            TickOutcome::Skipped(SkipReason::NoFrame)
        );
        assert_eq!(
            scheduler.tick(10, Some(&empty), &knee_at(0.5, 0.5)),
            TickOutcome::Skipped(SkipReason::EmptyFrame)
        );
        assert_eq!(scheduler.last_run_ms(), None);
        assert!(scheduler.smoother().history(PoseLandmark::LeftKnee).is_none());
        assert!(scheduler.latest().is_none());

        // The next tick with a frame is admitted straight away.
        assert!(scheduler
            .tick(20, Some(&frame_with_block()), &LandmarkSet::new())
            .is_completed());
        assert_eq!(scheduler.stats().skipped, 2);
    }

    #[test]
    fn test_missing_joint_keeps_history() {
        let mut scheduler = FrameScheduler::new(small_config(), CoordinateSpace::Capture).unwrap();
        let frame = frame_with_block();
        scheduler.tick(0, Some(&frame), &knee_at(0.5, 0.5));
        scheduler.tick(300, Some(&frame), &LandmarkSet::new());
        scheduler.tick(600, Some(&frame), &knee_at(0.5, 0.5));
        let history = scheduler.smoother().history(PoseLandmark::LeftKnee).unwrap();
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_mirrored_space_flips_outputs() {
        let mut capture = FrameScheduler::new(small_config(), CoordinateSpace::Capture).unwrap();
        let mut mirrored = FrameScheduler::new(small_config(), CoordinateSpace::Mirrored).unwrap();
        let frame = frame_with_block();
        let landmarks = knee_at(0.3, 0.3);

        let a = capture.tick(0, Some(&frame), &landmarks);
        let b = mirrored.tick(0, Some(&frame), &landmarks);
        let (a, b) = (a.output().unwrap(), b.output().unwrap());

        assert_eq!(b.space, CoordinateSpace::Mirrored);
        assert_eq!(b.objects[0], a.objects[0].mirrored(100));
        assert_eq!((b.objects[0].min_x, b.objects[0].max_x), (80, 89));
        assert!((b.joints[0].point.x - 0.7).abs() < 1e-9);
        assert!((b.joints[0].pixel.x - 69.0).abs() < 1e-9);
        // Matching happens before the flip, so the decision is the same.
        assert_eq!(a.near_match, b.near_match);
        assert_eq!(a.matched[0].distance, b.matched[0].distance);
    }

    #[test]
    fn test_published_distances_hold_in_both_spaces() {
        let config = DetectionConfig {
            near_distance_px: 10.5,
            ..small_config()
        };
        let frame = frame_with_block();
        // Block spans columns 10..=19; joints 11 px and 10 px to its right.
        let landmarks = LandmarkSet::new()
            .with(PoseLandmark::LeftKnee, TrackedPoint::planar(0.3, 0.3))
            .with(PoseLandmark::RightKnee, TrackedPoint::planar(0.29, 0.3));

        for space in [CoordinateSpace::Capture, CoordinateSpace::Mirrored] {
            let mut scheduler = FrameScheduler::new(config.clone(), space).unwrap();
            let outcome = scheduler.tick(0, Some(&frame), &landmarks);
            let output = outcome.output().unwrap();

            assert_eq!(output.matched.len(), 1, "space={space}");
            let m = output.matched[0];
            assert_eq!(m.joint, PoseLandmark::RightKnee);
            assert!((m.distance - 10.0).abs() < 1e-9);

            for joint in &output.joints {
                let recomputed = distance_to_region(joint.pixel, &output.objects[0]);
                assert_eq!(
                    recomputed <= config.near_distance_px,
                    output.matched.iter().any(|m| m.joint == joint.joint),
                    "space={space} joint={}",
                    joint.joint
                );
            }
            let right = output
                .joints
                .iter()
                .find(|j| j.joint == PoseLandmark::RightKnee)
                .unwrap();
            assert!((distance_to_region(right.pixel, &m.region) - m.distance).abs() < 1e-9);
        }
    }

    #[test]
    fn test_stop_consumes_no_ticks() {
        let mut scheduler = FrameScheduler::new(small_config(), CoordinateSpace::Capture).unwrap();
        let handle = scheduler.stop_handle();
        handle.store(true, Ordering::SeqCst);
        assert_eq!(
            scheduler.tick(0, Some(&frame_with_block()), &LandmarkSet::new()),
            TickOutcome::Stopped
        );
        assert_eq!(scheduler.stats().ticks, 0);
    }

    #[test]
    fn test_latest_survives_throttled_ticks() {
        let mut scheduler = FrameScheduler::new(small_config(), CoordinateSpace::Capture).unwrap();
        let frame = frame_with_block();
        scheduler.tick(0, Some(&frame), &LandmarkSet::new());
        assert_eq!(
            scheduler.tick(100, Some(&frame), &LandmarkSet::new()),
            TickOutcome::Throttled
        );
        assert_eq!(scheduler.latest().unwrap().timestamp_ms, 0);
    }
}
