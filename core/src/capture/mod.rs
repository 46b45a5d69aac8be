pub mod device;
pub mod guard;

pub use device::{CaptureConstraints, CaptureDevice};
pub use guard::{CaptureGuard, FrameFeed};
