use crate::telemetry::LogManager;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

pub const DEFAULT_TARGET_SECONDS: u32 = 60;
const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerPhase {
    Idle,
    Running,
    Paused,
    Complete,
}

/// Countdown state. Reaching zero stops the countdown but keeps the target,
/// owner and set number until an explicit reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    is_running: bool,
    is_paused: bool,
    seconds_remaining: u32,
    target_seconds: u32,
    owner_id: Option<String>,
    set_number: u32,
    completed: bool,
}

impl Default for TimerState {
    fn default() -> Self {
        Self {
            is_running: false,
            is_paused: false,
            seconds_remaining: 0,
            target_seconds: DEFAULT_TARGET_SECONDS,
            owner_id: None,
            set_number: 0,
            completed: false,
        }
    }
}

impl TimerState {
    /// Arms the countdown, replacing whatever was running before.
    pub fn start(&mut self, target_seconds: u32, owner_id: Option<String>, set_number: u32) {
        let target_seconds = target_seconds.max(1);
        *self = Self {
            is_running: true,
            is_paused: false,
            seconds_remaining: target_seconds,
            target_seconds,
            owner_id,
            set_number,
            completed: false,
        };
    }

    /// Advances one elapsed second. Returns whether anything changed.
    pub fn tick(&mut self) -> bool {
        if !self.is_running || self.is_paused {
            return false;
        }
        self.seconds_remaining = self.seconds_remaining.saturating_sub(1);
        if self.seconds_remaining == 0 {
            self.is_running = false;
            self.completed = true;
        }
        true
    }

    pub fn pause(&mut self) {
        if self.is_running {
            self.is_paused = true;
        }
    }

    pub fn resume(&mut self) {
        self.is_paused = false;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn phase(&self) -> TimerPhase {
        match (self.is_running, self.is_paused) {
            (true, true) => TimerPhase::Paused,
            (true, false) => TimerPhase::Running,
            (false, _) if self.completed => TimerPhase::Complete,
            (false, _) => TimerPhase::Idle,
        }
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    pub fn seconds_remaining(&self) -> u32 {
        self.seconds_remaining
    }

    pub fn target_seconds(&self) -> u32 {
        self.target_seconds
    }

    pub fn owner_id(&self) -> Option<&str> {
        self.owner_id.as_deref()
    }

    pub fn set_number(&self) -> u32 {
        self.set_number
    }

    /// Remaining time as `m:ss`.
    pub fn remaining_label(&self) -> String {
        format!(
            "{}:{:02}",
            self.seconds_remaining / 60,
            self.seconds_remaining % 60
        )
    }

    /// Elapsed fraction of the target duration.
    pub fn progress(&self) -> f32 {
        if self.target_seconds == 0 {
            return 0.0;
        }
        let elapsed = self.target_seconds.saturating_sub(self.seconds_remaining);
        elapsed as f32 / self.target_seconds as f32
    }
}

/// Rest timer service: one countdown per owner, ticking once per second on
/// its own task, independent of the frame pipeline.
///
/// Methods that arm the ticker spawn onto the current tokio runtime.
pub struct RestTimer {
    state: Arc<RwLock<TimerState>>,
    ticker: Option<JoinHandle<()>>,
    logger: LogManager,
}

impl RestTimer {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(TimerState::default())),
            ticker: None,
            logger: LogManager::new("timer"),
        }
    }

    pub fn snapshot(&self) -> TimerState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn start(&mut self, target_seconds: u32, owner_id: Option<String>, set_number: u32) {
        self.update(|state| state.start(target_seconds, owner_id, set_number));
        self.logger.record(&format!(
            "rest timer armed for {}s (set {})",
            target_seconds.max(1),
            set_number
        ));
        self.arm();
    }

    pub fn pause(&mut self) {
        self.disarm();
        self.update(TimerState::pause);
    }

    pub fn resume(&mut self) {
        let running = self.update(|state| {
            state.resume();
            state.is_running()
        });
        if running {
            self.arm();
        }
    }

    pub fn reset(&mut self) {
        self.disarm();
        self.update(TimerState::reset);
    }

    fn update<R>(&self, f: impl FnOnce(&mut TimerState) -> R) -> R {
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    fn arm(&mut self) {
        self.disarm();
        let state = self.state.clone();
        let logger = self.logger;
        self.ticker = Some(tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
            loop {
                interval.tick().await;
                let mut guard = state.write().unwrap_or_else(PoisonError::into_inner);
                guard.tick();
                if guard.phase() == TimerPhase::Complete {
                    logger.record(&format!("rest for set {} complete", guard.set_number()));
                }
                if !guard.is_running() || guard.is_paused() {
                    break;
                }
            }
        }));
    }

    fn disarm(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

impl Default for RestTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RestTimer {
    fn drop(&mut self) {
        self.disarm();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_ticks_complete_a_five_second_timer() {
        let mut timer = TimerState::default();
        timer.start(5, Some("curls".into()), 1);
        for _ in 0..5 {
            assert!(timer.tick());
        }
        assert_eq!(timer.seconds_remaining(), 0);
        assert!(!timer.is_running());
        assert_eq!(timer.phase(), TimerPhase::Complete);
        assert_eq!(timer.owner_id(), Some("curls"));
        assert_eq!(timer.target_seconds(), 5);
        assert!(!timer.tick());
    }

    #[test]
    fn pause_freezes_countdown() {
        let mut timer = TimerState::default();
        timer.start(5, None, 1);
        timer.tick();
        timer.tick();
        timer.pause();
        for _ in 0..10 {
            assert!(!timer.tick());
        }
        assert_eq!(timer.seconds_remaining(), 3);
        assert_eq!(timer.phase(), TimerPhase::Paused);
        timer.resume();
        timer.tick();
        assert_eq!(timer.seconds_remaining(), 2);
    }

    #[test]
    fn reset_restores_idle_defaults() {
        let mut timer = TimerState::default();
        timer.start(90, Some("squats".into()), 2);
        timer.tick();
        timer.reset();
        assert_eq!(timer, TimerState::default());
        assert_eq!(timer.target_seconds(), 60);
        assert_eq!(timer.phase(), TimerPhase::Idle);
    }

    #[test]
    fn restart_overwrites_previous_countdown() {
        let mut timer = TimerState::default();
        timer.start(30, Some("a".into()), 1);
        timer.tick();
        timer.start(10, Some("b".into()), 2);
        assert_eq!(timer.seconds_remaining(), 10);
        assert_eq!(timer.owner_id(), Some("b"));
        assert_eq!(timer.set_number(), 2);
    }

    #[test]
    fn label_and_progress_render() {
        let mut timer = TimerState::default();
        timer.start(75, None, 1);
        assert_eq!(timer.remaining_label(), "1:15");
        for _ in 0..15 {
            timer.tick();
        }
        assert_eq!(timer.remaining_label(), "1:00");
        assert!((timer.progress() - 0.2).abs() < 1e-6);
    }

    #[tokio::test(start_paused = true)]
    async fn service_ticks_once_per_second() {
        let mut timer = RestTimer::new();
        timer.start(5, Some("push-ups".into()), 1);

        tokio::time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(timer.snapshot().seconds_remaining(), 3);

        tokio::time::sleep(Duration::from_millis(3_000)).await;
        let state = timer.snapshot();
        assert_eq!(state.seconds_remaining(), 0);
        assert!(!state.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn service_pause_holds_until_resume() {
        let mut timer = RestTimer::new();
        timer.start(5, None, 1);

        tokio::time::sleep(Duration::from_millis(2_500)).await;
        timer.pause();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(timer.snapshot().seconds_remaining(), 3);
        assert!(timer.snapshot().is_paused());

        timer.resume();
        tokio::time::sleep(Duration::from_millis(3_500)).await;
        let state = timer.snapshot();
        assert_eq!(state.seconds_remaining(), 0);
        assert_eq!(state.phase(), TimerPhase::Complete);
    }

    #[tokio::test(start_paused = true)]
    async fn service_reset_stops_ticking() {
        let mut timer = RestTimer::new();
        timer.start(5, None, 1);
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        timer.reset();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(timer.snapshot(), TimerState::default());
    }
}
