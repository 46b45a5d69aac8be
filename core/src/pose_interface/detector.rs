use crate::pose_interface::{PoseFrameResult, VideoFrame};
use crate::prelude::DetectorError;
use std::future::Future;

/// External pose-landmark detector.
///
/// Implementations may keep state between calls and require timestamps that
/// never decrease; the frame pipeline guarantees both a non-decreasing clock
/// and at most one outstanding call per detector.
pub trait PoseDetector: Send + 'static {
    fn detect(
        &mut self,
        frame: VideoFrame,
        timestamp_ms: u64,
    ) -> impl Future<Output = Result<PoseFrameResult, DetectorError>> + Send;
}

/// Produces a ready detector, e.g. by fetching and compiling a model asset.
pub trait DetectorLoader: Send {
    type Detector: PoseDetector;

    fn load(&mut self) -> impl Future<Output = Result<Self::Detector, DetectorError>> + Send;
}
