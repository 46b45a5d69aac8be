use crate::generator::profile::{build_pose, MotionProfile};
use rand::{rngs::StdRng, SeedableRng};
use repcore::capture::{CaptureConstraints, CaptureDevice};
use repcore::pose_interface::{
    DetectorLoader, PoseDetector, PoseFrameResult, TrackedLimb, VideoFrame,
};
use repcore::prelude::{CaptureError, DetectorError};
use std::time::Duration;
use tokio::time::sleep;

/// Camera stand-in that hands out empty frames with increasing sequence numbers.
#[derive(Debug, Default)]
pub struct SyntheticCamera {
    active: bool,
    deny: bool,
    sequence: u64,
    resolution: (u32, u32),
}

impl SyntheticCamera {
    pub fn new() -> Self {
        Self::default()
    }

    /// A camera whose permission prompt is always dismissed.
    #[cfg(test)]
    pub fn denied() -> Self {
        Self {
            deny: true,
            ..Self::default()
        }
    }
}

impl CaptureDevice for SyntheticCamera {
    fn start(&mut self, constraints: &CaptureConstraints) -> Result<(), CaptureError> {
        if self.deny {
            return Err(CaptureError::Denied("synthetic camera refuses access".into()));
        }
        if constraints.width == 0 || constraints.height == 0 {
            return Err(CaptureError::Unavailable(format!(
                "unsupported resolution {}x{}",
                constraints.width, constraints.height
            )));
        }
        self.resolution = (constraints.width, constraints.height);
        self.active = true;
        log::debug!("synthetic camera streaming at {}x{}", constraints.width, constraints.height);
        Ok(())
    }

    fn grab(&mut self) -> Option<VideoFrame> {
        if !self.active {
            return None;
        }
        self.sequence += 1;
        let (width, height) = self.resolution;
        Some(VideoFrame::new(self.sequence, width, height, Vec::new()))
    }

    fn stop(&mut self) {
        self.active = false;
        log::debug!("synthetic camera stopped after {} frames", self.sequence);
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

/// Detector that ignores pixels and poses `limb` along the motion profile.
pub struct SyntheticDetector {
    profile: MotionProfile,
    limb: TrackedLimb,
    rng: StdRng,
    last_timestamp_ms: Option<u64>,
}

impl SyntheticDetector {
    pub fn new(profile: MotionProfile, limb: TrackedLimb) -> Self {
        let rng = StdRng::seed_from_u64(profile.seed);
        Self {
            profile,
            limb,
            rng,
            last_timestamp_ms: None,
        }
    }
}

impl PoseDetector for SyntheticDetector {
    async fn detect(
        &mut self,
        frame: VideoFrame,
        timestamp_ms: u64,
    ) -> Result<PoseFrameResult, DetectorError> {
        if self
            .last_timestamp_ms
            .is_some_and(|last| timestamp_ms < last)
        {
            return Err(DetectorError::Inference(format!(
                "timestamp {timestamp_ms} ms precedes previous frame"
            )));
        }
        self.last_timestamp_ms = Some(timestamp_ms);

        if self.profile.inference_latency_ms > 0 {
            sleep(Duration::from_millis(self.profile.inference_latency_ms)).await;
        }

        let dropout = self.profile.dropout_every;
        if dropout > 0 && frame.sequence % dropout == 0 {
            return Ok(PoseFrameResult::empty(timestamp_ms));
        }
        let angle = self.profile.sample(timestamp_ms, &mut self.rng);
        Ok(build_pose(angle, self.limb, timestamp_ms))
    }
}

/// Simulates fetching the pose model before handing out a detector.
pub struct SyntheticLoader {
    profile: MotionProfile,
    limb: TrackedLimb,
    failures_remaining: u32,
}

impl SyntheticLoader {
    pub fn new(profile: MotionProfile, limb: TrackedLimb) -> Self {
        Self {
            profile,
            limb,
            failures_remaining: 0,
        }
    }

    /// Fails the first `count` loads, like a flaky model download.
    pub fn with_failures(mut self, count: u32) -> Self {
        self.failures_remaining = count;
        self
    }
}

impl DetectorLoader for SyntheticLoader {
    type Detector = SyntheticDetector;

    async fn load(&mut self) -> Result<SyntheticDetector, DetectorError> {
        if self.profile.load_latency_ms > 0 {
            sleep(Duration::from_millis(self.profile.load_latency_ms)).await;
        }
        if self.failures_remaining > 0 {
            self.failures_remaining -= 1;
            return Err(DetectorError::Initialization(
                "model asset download failed".into(),
            ));
        }
        Ok(SyntheticDetector::new(self.profile.clone(), self.limb))
    }
}
