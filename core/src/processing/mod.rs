pub mod overlay;
pub mod pipeline;
pub mod rep_detector;

pub use overlay::{NullOverlay, OverlaySink, SkeletonOverlay, POSE_CONNECTIONS};
pub use pipeline::{FrameOutcome, FramePipeline, FrameTimestamps, NO_POSE_FEEDBACK};
pub use rep_detector::{RepDetected, RepDetector, RepPhase, RepThresholds};
