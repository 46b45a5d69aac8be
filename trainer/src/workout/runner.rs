use crate::generator::camera::{SyntheticCamera, SyntheticLoader};
use crate::status_bridge::bridge::{publish, StatusBoard};
use crate::status_bridge::model::{BridgeCommand, StatusModel};
use crate::workout::config::TrainerConfig;
use anyhow::Context;
use repcore::prelude::{CancelToken, StoreResult};
use repcore::processing::NullOverlay;
use repcore::session::{SessionCoordinator, SessionParams, WorkoutSummary};
use repcore::storage::{NewWorkoutLog, WorkoutLog, WorkoutStore};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{interval, sleep, Instant, MissedTickBehavior};

const POLL_PERIOD: Duration = Duration::from_millis(50);
const RETRY_DELAY: Duration = Duration::from_secs(1);

type TrainerCoordinator = SessionCoordinator<SyntheticCamera, SyntheticLoader, NullOverlay>;

/// How a workout run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEnd {
    Completed,
    TimedOut,
    Interrupted,
}

pub struct RunOutcome {
    pub end: RunEnd,
    pub summary: Option<WorkoutSummary>,
}

/// Drives one workout through the coordinator: sets advance once their reps
/// are done, with the camera stopped while the rest timer runs.
pub struct WorkoutRunner {
    config: TrainerConfig,
    coordinator: TrainerCoordinator,
    board: StatusBoard,
}

impl WorkoutRunner {
    pub fn new(config: TrainerConfig, board: StatusBoard) -> anyhow::Result<Self> {
        let limb = config.tracker.limb_for(&config.exercise);
        let loader = SyntheticLoader::new(config.motion.clone(), limb)
            .with_failures(config.load_failures);
        let coordinator = SessionCoordinator::new(
            config.tracker.clone(),
            SyntheticCamera::new(),
            loader,
            NullOverlay,
        )
        .context("creating session coordinator")?;
        Ok(Self {
            config,
            coordinator,
            board,
        })
    }

    pub async fn run(
        &mut self,
        mut commands: Option<UnboundedReceiver<BridgeCommand>>,
        stop: &CancelToken,
    ) -> anyhow::Result<RunOutcome> {
        let params = SessionParams::new(
            self.config.exercise.clone(),
            self.config.sets,
            self.config.reps,
        );
        self.coordinator.enter(params).await;
        self.publish();

        let deadline = Instant::now() + Duration::from_secs(self.config.max_duration_secs);
        let end = match self.start_camera(stop).await {
            Ok(true) => self.track(&mut commands, stop, deadline).await,
            Ok(false) => RunEnd::Interrupted,
            Err(err) => {
                self.coordinator.finish().await;
                self.publish();
                return Err(err);
            }
        };

        let summary = self.coordinator.finish().await;
        self.publish();
        Ok(RunOutcome { end, summary })
    }

    async fn track(
        &mut self,
        commands: &mut Option<UnboundedReceiver<BridgeCommand>>,
        stop: &CancelToken,
        deadline: Instant,
    ) -> RunEnd {
        let mut poll = interval(POLL_PERIOD);
        poll.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            let mut advance = false;
            tokio::select! {
                biased;
                _ = stop.cancelled() => return RunEnd::Interrupted,
                Some(command) = next_command(commands) => match command {
                    BridgeCommand::NextSet => advance = true,
                },
                _ = poll.tick() => {}
            }
            self.publish();

            let session = self.coordinator.session().snapshot();
            if session.workout_complete() {
                return RunEnd::Completed;
            }
            if Instant::now() >= deadline {
                log::warn!(
                    "workout exceeded {}s; finishing early",
                    self.config.max_duration_secs
                );
                return RunEnd::TimedOut;
            }
            if advance || (self.config.auto_advance && session.can_advance_set()) {
                match self.advance_set(stop).await {
                    Ok(true) => {}
                    Ok(false) => return RunEnd::Interrupted,
                    Err(err) => {
                        log::warn!("could not resume after rest: {err:#}");
                        return RunEnd::Interrupted;
                    }
                }
            }
        }
    }

    /// Stops the camera, advances the set and rests before resuming.
    /// Returns `false` when interrupted.
    async fn advance_set(&mut self, stop: &CancelToken) -> anyhow::Result<bool> {
        self.coordinator.stop_camera().await;
        if !self.coordinator.next_set() {
            return Ok(true);
        }
        self.publish();
        if self.coordinator.session().read(|s| s.workout_complete()) {
            self.coordinator.timer_mut().reset();
            return Ok(true);
        }

        let mut poll = interval(POLL_PERIOD);
        while self.coordinator.timer().snapshot().is_running() {
            tokio::select! {
                biased;
                _ = stop.cancelled() => return Ok(false),
                _ = poll.tick() => {}
            }
            self.publish();
        }
        self.start_camera(stop).await
    }

    /// Starts the camera, retrying failed attempts. Returns `false` when
    /// interrupted while waiting to retry.
    async fn start_camera(&mut self, stop: &CancelToken) -> anyhow::Result<bool> {
        let attempts = self.config.start_attempts.max(1);
        for attempt in 1..=attempts {
            match self.coordinator.start_camera().await {
                Ok(()) => {
                    self.publish();
                    return Ok(true);
                }
                Err(err) if attempt < attempts => {
                    log::warn!("camera start attempt {attempt}/{attempts} failed: {err}");
                    self.publish();
                    tokio::select! {
                        biased;
                        _ = stop.cancelled() => return Ok(false),
                        _ = sleep(RETRY_DELAY) => {}
                    }
                }
                Err(err) => {
                    self.publish();
                    return Err(err).with_context(|| {
                        format!("starting camera after {attempts} attempts")
                    });
                }
            }
        }
        Ok(false)
    }

    fn publish(&self) {
        publish(&self.board, StatusModel::from(&self.coordinator.snapshot()));
    }
}

async fn next_command(
    commands: &mut Option<UnboundedReceiver<BridgeCommand>>,
) -> Option<BridgeCommand> {
    match commands {
        Some(receiver) => receiver.recv().await,
        None => std::future::pending().await,
    }
}

/// Appends a finished workout to the store, adding the exercise to the
/// catalog when it is not there yet. Workouts without a completed set are
/// not recorded.
pub fn record_workout<S: WorkoutStore>(
    store: &mut S,
    summary: &WorkoutSummary,
) -> StoreResult<Option<WorkoutLog>> {
    if summary.sets_completed == 0 {
        return Ok(None);
    }
    store.seed_predefined()?;
    let exercise = match store.find_exercise(&summary.exercise_name)? {
        Some(exercise) => exercise,
        None => store.add_exercise(&summary.exercise_name, None)?,
    };
    let log = store.add_log(NewWorkoutLog {
        exercise_id: exercise.id,
        sets: summary.sets_completed,
        reps: summary.target_reps,
        duration_seconds: Some(summary.elapsed_seconds),
        notes: (summary.sets_completed < summary.target_sets).then(|| {
            format!(
                "stopped after {} of {} sets",
                summary.sets_completed, summary.target_sets
            )
        }),
    })?;
    Ok(Some(log))
}
