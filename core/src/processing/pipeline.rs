use crate::capture::{CaptureDevice, FrameFeed};
use crate::math::AngleHelper;
use crate::pose_interface::{PoseDetector, PoseFrameResult, PoseLandmarks, TrackedLimb};
use crate::prelude::{CancelToken, TrackerConfig};
use crate::processing::overlay::{OverlaySink, SkeletonOverlay};
use crate::processing::rep_detector::{RepDetected, RepDetector};
use crate::session::SessionHandle;
use crate::telemetry::{LogManager, MetricsRecorder};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, Instant, MissedTickBehavior};

pub const NO_POSE_FEEDBACK: &str = "No pose detected. Move into frame.";

/// Detector clock that never runs backwards, even across pipeline restarts.
#[derive(Debug, Clone, Copy)]
pub struct FrameTimestamps {
    origin: Instant,
    last_ms: u64,
}

impl FrameTimestamps {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            last_ms: 0,
        }
    }

    pub fn next(&mut self) -> u64 {
        let elapsed = u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.last_ms = self.last_ms.max(elapsed);
        self.last_ms
    }

    pub fn last(&self) -> u64 {
        self.last_ms
    }
}

impl Default for FrameTimestamps {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of analysing one detector response.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    /// No usable pose: empty result, wrong landmark count or a tracked joint missing.
    NoPose,
    /// Pose present but the tracked limb had no measurable angle.
    Skipped,
    Sample {
        angle_deg: f32,
        rep: Option<RepDetected>,
    },
}

/// Per-frame loop: grab a frame, run the detector, measure the tracked joint
/// and feed the rep detector.
///
/// The loop is paced by a refresh-rate clock and awaits each detection before
/// scheduling the next tick, so a session never has more than one detection
/// in flight.
pub struct FramePipeline<P: PoseDetector, O: OverlaySink> {
    detector: P,
    overlay: O,
    rep_detector: RepDetector,
    limb: TrackedLimb,
    min_visibility: f32,
    frame_interval: Duration,
    timestamps: FrameTimestamps,
    metrics: Arc<MetricsRecorder>,
    logger: LogManager,
}

impl<P: PoseDetector, O: OverlaySink> FramePipeline<P, O> {
    pub fn new(
        detector: P,
        overlay: O,
        config: &TrackerConfig,
        limb: TrackedLimb,
        timestamps: FrameTimestamps,
        metrics: Arc<MetricsRecorder>,
    ) -> Self {
        Self {
            detector,
            overlay,
            rep_detector: RepDetector::new(config.thresholds()),
            limb,
            min_visibility: config.min_visibility,
            frame_interval: config.frame_interval(),
            timestamps,
            metrics,
            logger: LogManager::new("pipeline"),
        }
    }

    pub fn limb(&self) -> TrackedLimb {
        self.limb
    }

    /// Hands back the detector and clock so a later run can reuse them.
    pub fn into_parts(self) -> (P, FrameTimestamps) {
        (self.detector, self.timestamps)
    }

    /// Runs until `token` is cancelled, then returns the pipeline.
    ///
    /// Results are only applied while the token is live and the session is
    /// still on `generation`, read by the caller before spawning the loop.
    pub async fn run<D: CaptureDevice>(
        mut self,
        feed: FrameFeed<D>,
        session: SessionHandle,
        generation: u64,
        token: CancelToken,
    ) -> Self {
        self.rep_detector.reset();
        let mut clock = interval(self.frame_interval);
        clock.set_missed_tick_behavior(MissedTickBehavior::Skip);
        self.logger
            .record(&format!("frame loop started tracking {:?}", self.limb));

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = clock.tick() => {}
            }

            let Some(frame) = feed.grab() else {
                continue;
            };
            let timestamp_ms = self.timestamps.next();

            let detection = tokio::select! {
                biased;
                _ = token.cancelled() => break,
                result = self.detector.detect(frame, timestamp_ms) => result,
            };
            if token.is_cancelled() {
                break;
            }

            match detection {
                Ok(result) => {
                    let outcome = self.process(&result);
                    self.apply(outcome, &session, generation);
                }
                Err(err) => {
                    self.metrics.record_error();
                    self.logger.warn(&format!("detection failed: {err}"));
                }
            }
        }

        self.overlay.clear();
        self.logger.record("frame loop stopped");
        self
    }

    /// Draws the overlay and runs angle and rep analysis for one result.
    pub fn process(&mut self, result: &PoseFrameResult) -> FrameOutcome {
        self.metrics.record_frame();
        self.overlay.clear();

        let Some(pose) = PoseLandmarks::from_frame(result, self.min_visibility) else {
            self.metrics.record_no_pose();
            return FrameOutcome::NoPose;
        };
        self.overlay.draw(&SkeletonOverlay::new(pose.points()));

        let Some([proximal, vertex, distal]) = pose.limb(self.limb) else {
            self.metrics.record_no_pose();
            return FrameOutcome::NoPose;
        };
        let Some(angle_deg) = AngleHelper::angle_at(&proximal, &vertex, &distal) else {
            self.metrics.record_degenerate();
            return FrameOutcome::Skipped;
        };

        let rep = self.rep_detector.observe(angle_deg);
        self.logger.detail(&format!(
            "t={}ms angle {:.1} phase {:?}",
            result.timestamp_ms,
            angle_deg,
            self.rep_detector.phase()
        ));
        if rep.is_some() {
            self.metrics.record_rep();
        }
        FrameOutcome::Sample { angle_deg, rep }
    }

    fn apply(&self, outcome: FrameOutcome, session: &SessionHandle, generation: u64) {
        let applied = session.update_if_current(generation, |state| match outcome {
            FrameOutcome::NoPose => {
                if state.is_tracking() {
                    state.set_feedback(NO_POSE_FEEDBACK);
                }
                None
            }
            FrameOutcome::Sample { rep: Some(_), .. } => state.increment_rep(),
            _ => None,
        });

        match applied {
            None => self
                .logger
                .detail("discarding frame result for a closed session"),
            Some(Some(reps)) => self.logger.record(&format!("rep {reps} completed")),
            Some(None) => {}
        }
    }
}
