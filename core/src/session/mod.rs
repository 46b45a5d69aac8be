pub mod coordinator;
pub mod timer;
pub mod workout;

pub use coordinator::{CoordinatorSnapshot, SessionCoordinator, SessionParams, WorkoutSummary};
pub use timer::{RestTimer, TimerPhase, TimerState};
pub use workout::{SessionHandle, SessionPhase, WorkoutSession};
