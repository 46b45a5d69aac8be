use crate::pose_interface::VideoFrame;
use crate::prelude::CaptureError;
use serde::{Deserialize, Serialize};

/// Stream request passed to the capture device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConstraints {
    pub width: u32,
    pub height: u32,
    pub audio: bool,
}

impl Default for CaptureConstraints {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            audio: false,
        }
    }
}

/// Video capture hardware boundary.
pub trait CaptureDevice: Send + 'static {
    /// Opens a video stream honouring `constraints`.
    fn start(&mut self, constraints: &CaptureConstraints) -> Result<(), CaptureError>;

    /// Returns the next decodable frame, or `None` when none is ready yet.
    fn grab(&mut self) -> Option<VideoFrame>;

    /// Halts every underlying track.
    fn stop(&mut self);

    fn is_active(&self) -> bool;
}
