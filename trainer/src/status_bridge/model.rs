use repcore::session::{CoordinatorSnapshot, SessionPhase, TimerPhase};
use serde::{Deserialize, Serialize};

/// Live session view served by the status bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusModel {
    pub exercise: Option<String>,
    pub phase: SessionPhase,
    pub current_reps: u32,
    pub target_reps: u32,
    pub current_set: u32,
    pub target_sets: u32,
    pub feedback: String,
    pub workout_complete: bool,
    pub camera_active: bool,
    pub rest_phase: TimerPhase,
    pub rest_remaining: String,
    pub frames: u64,
    pub frames_without_pose: u64,
    pub detector_errors: u64,
}

impl From<&CoordinatorSnapshot> for StatusModel {
    fn from(snapshot: &CoordinatorSnapshot) -> Self {
        let session = &snapshot.session;
        Self {
            exercise: session.exercise_name().map(String::from),
            phase: session.phase(),
            current_reps: session.current_reps(),
            target_reps: session.target_reps(),
            current_set: session.current_set(),
            target_sets: session.target_sets(),
            feedback: session.feedback().to_string(),
            workout_complete: session.workout_complete(),
            camera_active: snapshot.camera_active,
            rest_phase: snapshot.timer.phase(),
            rest_remaining: snapshot.timer.remaining_label(),
            frames: snapshot.metrics.frames,
            frames_without_pose: snapshot.metrics.frames_without_pose,
            detector_errors: snapshot.metrics.detector_errors,
        }
    }
}

impl Default for StatusModel {
    fn default() -> Self {
        Self::from(&CoordinatorSnapshot::default())
    }
}

/// Requests accepted over HTTP and executed by the workout runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BridgeCommand {
    NextSet,
}
