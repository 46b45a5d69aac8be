pub mod detector;
pub mod frame;
pub mod landmarks;

pub use detector::{DetectorLoader, PoseDetector};
pub use frame::VideoFrame;
pub use landmarks::{
    Joint, LandmarkPoint, PoseFrameResult, PoseLandmarks, TrackedLimb, LANDMARK_COUNT,
};
