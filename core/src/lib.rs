//! Core tracking engine for the camera-based rep counter.
//!
//! Frames flow from a capture device through a pose detector into the rep
//! detector, which drives the workout session. A rest timer and the session
//! coordinator tie the pieces to the lifecycle of a tracking view.

pub mod capture;
pub mod math;
pub mod pose_interface;
pub mod prelude;
pub mod processing;
pub mod progress;
pub mod session;
pub mod storage;
pub mod telemetry;

pub use prelude::{TrackerConfig, TrackerError, TrackerResult};
pub use session::{SessionCoordinator, SessionParams, WorkoutSession};
