use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};

pub const START_FEEDBACK: &str = "Get into position...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    Idle,
    Tracking,
}

/// Set/rep progress of one tracked exercise.
///
/// Reps only grow within a set and drop back to zero on set advance; the set
/// counter only grows and never passes the target. Reps are not clamped at
/// the target: overshoot is recorded as performed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSession {
    phase: SessionPhase,
    /// Bumped on every start/stop so late results from an older run can be told apart.
    generation: u64,
    exercise_name: Option<String>,
    current_reps: u32,
    target_reps: u32,
    current_set: u32,
    target_sets: u32,
    feedback: String,
}

impl Default for WorkoutSession {
    fn default() -> Self {
        Self {
            phase: SessionPhase::Idle,
            generation: 0,
            exercise_name: None,
            current_reps: 0,
            target_reps: 0,
            current_set: 0,
            target_sets: 1,
            feedback: String::new(),
        }
    }
}

impl WorkoutSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, exercise_name: impl Into<String>, target_reps: u32, target_sets: u32) {
        self.phase = SessionPhase::Tracking;
        self.generation += 1;
        self.exercise_name = Some(exercise_name.into());
        self.target_reps = target_reps.max(1);
        self.target_sets = target_sets.max(1);
        self.current_reps = 0;
        self.current_set = 0;
        self.feedback = START_FEEDBACK.to_string();
    }

    /// Counts one rep. Returns the new rep count, or `None` when idle.
    pub fn increment_rep(&mut self) -> Option<u32> {
        if !self.is_tracking() {
            return None;
        }
        self.current_reps += 1;
        self.feedback = format!("Rep {} completed!", self.current_reps);
        Some(self.current_reps)
    }

    /// Moves to the next set. No-op once every set has been started.
    pub fn advance_set(&mut self) -> bool {
        if !self.is_tracking() || self.current_set >= self.target_sets {
            return false;
        }
        self.current_set += 1;
        self.current_reps = 0;
        self.feedback = format!("Set {} started!", self.current_set);
        true
    }

    pub fn set_feedback(&mut self, text: impl Into<String>) {
        self.feedback = text.into();
    }

    pub fn stop(&mut self) {
        let generation = self.generation + 1;
        *self = Self {
            generation,
            ..Self::default()
        };
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_tracking(&self) -> bool {
        self.phase == SessionPhase::Tracking
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn exercise_name(&self) -> Option<&str> {
        self.exercise_name.as_deref()
    }

    pub fn current_reps(&self) -> u32 {
        self.current_reps
    }

    pub fn target_reps(&self) -> u32 {
        self.target_reps
    }

    pub fn current_set(&self) -> u32 {
        self.current_set
    }

    pub fn target_sets(&self) -> u32 {
        self.target_sets
    }

    pub fn feedback(&self) -> &str {
        &self.feedback
    }

    pub fn set_complete(&self) -> bool {
        self.is_tracking() && self.current_reps >= self.target_reps
    }

    /// The "next set" affordance: current set done and sets remaining.
    pub fn can_advance_set(&self) -> bool {
        self.set_complete() && self.current_set < self.target_sets
    }

    pub fn workout_complete(&self) -> bool {
        self.is_tracking() && self.current_set >= self.target_sets
    }

    /// Rep and set completion ratios for display, capped at 1.0.
    pub fn progress(&self) -> (f32, f32) {
        let ratio = |current: u32, target: u32| {
            if target == 0 {
                0.0
            } else {
                (current as f32 / target as f32).min(1.0)
            }
        };
        (
            ratio(self.current_reps, self.target_reps),
            ratio(self.current_set, self.target_sets),
        )
    }
}

/// Shared handle to the session owned by one coordinator.
#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    inner: Arc<RwLock<WorkoutSession>>,
}

impl SessionHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read<R>(&self, f: impl FnOnce(&WorkoutSession) -> R) -> R {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut WorkoutSession) -> R) -> R {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Applies `f` only while the session is still on `generation`.
    pub fn update_if_current<R>(
        &self,
        generation: u64,
        f: impl FnOnce(&mut WorkoutSession) -> R,
    ) -> Option<R> {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        (guard.generation == generation).then(|| f(&mut guard))
    }

    pub fn generation(&self) -> u64 {
        self.read(WorkoutSession::generation)
    }

    pub fn snapshot(&self) -> WorkoutSession {
        self.read(WorkoutSession::clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn squats() -> WorkoutSession {
        let mut session = WorkoutSession::new();
        session.start("Squats", 10, 3);
        session
    }

    #[test]
    fn start_resets_counters_and_feedback() {
        let session = squats();
        assert!(session.is_tracking());
        assert_eq!(session.exercise_name(), Some("Squats"));
        assert_eq!(session.current_reps(), 0);
        assert_eq!(session.current_set(), 0);
        assert_eq!(session.feedback(), "Get into position...");
    }

    #[test]
    fn three_reps_update_feedback() {
        let mut session = squats();
        for _ in 0..3 {
            session.increment_rep();
        }
        assert_eq!(session.current_reps(), 3);
        assert_eq!(session.feedback(), "Rep 3 completed!");
    }

    #[test]
    fn reps_may_overshoot_target() {
        let mut session = WorkoutSession::new();
        session.start("Curls", 2, 1);
        for _ in 0..4 {
            session.increment_rep();
        }
        assert_eq!(session.current_reps(), 4);
        assert_eq!(session.progress().0, 1.0);
    }

    #[test]
    fn advance_set_resets_reps() {
        let mut session = squats();
        session.increment_rep();
        assert!(session.advance_set());
        assert_eq!(session.current_set(), 1);
        assert_eq!(session.current_reps(), 0);
        assert_eq!(session.feedback(), "Set 1 started!");
    }

    #[test]
    fn advance_set_at_target_is_noop() {
        let mut session = WorkoutSession::new();
        session.start("Lunges", 5, 2);
        assert!(session.advance_set());
        assert!(session.advance_set());
        session.increment_rep();

        let before = session.clone();
        assert!(!session.advance_set());
        assert_eq!(session, before);
    }

    #[test]
    fn idle_session_ignores_reps() {
        let mut session = WorkoutSession::new();
        assert_eq!(session.increment_rep(), None);
        assert!(!session.advance_set());
        assert_eq!(session.current_reps(), 0);
    }

    #[test]
    fn stop_clears_everything_and_is_repeatable() {
        let mut session = squats();
        session.increment_rep();
        session.stop();
        session.stop();
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert_eq!(session.exercise_name(), None);
        assert_eq!(session.target_reps(), 0);
        assert_eq!(session.target_sets(), 1);
        assert_eq!(session.feedback(), "");
    }

    #[test]
    fn completion_policy_follows_counters() {
        let mut session = WorkoutSession::new();
        session.start("Push-ups", 2, 1);
        assert!(!session.set_complete());
        session.increment_rep();
        session.increment_rep();
        assert!(session.can_advance_set());
        assert!(!session.workout_complete());
        session.advance_set();
        assert!(session.workout_complete());
        assert!(!session.can_advance_set());
    }

    #[test]
    fn stale_generation_updates_are_dropped() {
        let handle = SessionHandle::new();
        handle.update(|s| s.start("Squats", 10, 3));
        let generation = handle.generation();

        handle.update(|s| s.stop());
        handle.update(|s| s.start("Squats", 10, 3));

        assert_eq!(handle.update_if_current(generation, |s| s.increment_rep()), None);
        assert_eq!(handle.snapshot().current_reps(), 0);
        let current = handle.generation();
        assert_eq!(
            handle.update_if_current(current, |s| s.increment_rep()),
            Some(Some(1))
        );
    }

    #[test]
    fn zero_targets_are_raised_to_one() {
        let mut session = WorkoutSession::new();
        session.start("Plank", 0, 0);
        assert_eq!(session.target_reps(), 1);
        assert_eq!(session.target_sets(), 1);
    }
}
