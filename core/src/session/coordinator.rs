use crate::capture::{CaptureDevice, CaptureGuard};
use crate::pose_interface::{DetectorLoader, PoseDetector};
use crate::prelude::{CancelToken, TrackerConfig, TrackerResult};
use crate::processing::{FramePipeline, FrameTimestamps, OverlaySink};
use crate::session::timer::{RestTimer, TimerState};
use crate::session::workout::{SessionHandle, WorkoutSession};
use crate::telemetry::{LogManager, MetricsRecorder, PipelineMetrics};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::task::JoinHandle;

pub const CAMERA_DENIED_FEEDBACK: &str = "Camera access denied";
pub const CAMERA_STARTED_FEEDBACK: &str = "Camera started. Get into position...";
pub const MODEL_LOADING_FEEDBACK: &str = "Loading pose detection model...";
pub const MODEL_READY_FEEDBACK: &str = "Pose detection ready!";
pub const MODEL_ERROR_FEEDBACK: &str = "Error loading pose detection model";

const DEFAULT_EXERCISE: &str = "Exercise";
const DEFAULT_SETS: u32 = 3;
const DEFAULT_REPS: u32 = 10;

/// Parameters handed over by the screen that opened the tracking view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionParams {
    pub exercise_name: Option<String>,
    pub sets: Option<u32>,
    pub reps: Option<u32>,
}

impl SessionParams {
    pub fn new(exercise_name: impl Into<String>, sets: u32, reps: u32) -> Self {
        Self {
            exercise_name: Some(exercise_name.into()),
            sets: Some(sets),
            reps: Some(reps),
        }
    }

    /// Exercise name, target sets and target reps with blanks and zeros
    /// replaced by defaults.
    pub fn resolved(&self) -> (String, u32, u32) {
        let name = self
            .exercise_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_EXERCISE)
            .to_string();
        let sets = self.sets.filter(|&sets| sets > 0).unwrap_or(DEFAULT_SETS);
        let reps = self.reps.filter(|&reps| reps > 0).unwrap_or(DEFAULT_REPS);
        (name, sets, reps)
    }
}

/// Outcome of a finished session, suitable for a workout log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutSummary {
    pub exercise_name: String,
    pub sets_completed: u32,
    pub target_sets: u32,
    pub target_reps: u32,
    pub reps_in_current_set: u32,
    pub elapsed_seconds: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoordinatorSnapshot {
    pub session: WorkoutSession,
    pub timer: TimerState,
    pub metrics: PipelineMetrics,
    pub camera_active: bool,
}

struct RunningPipeline<P: PoseDetector, O: OverlaySink> {
    handle: JoinHandle<FramePipeline<P, O>>,
    token: CancelToken,
}

/// Lifecycle glue for one tracking view.
///
/// Owns the capture device, the workout session, the rest timer and the
/// frame pipeline task. Leaving the view always stops the pipeline first,
/// then releases the camera, then stops the session.
pub struct SessionCoordinator<D, L, O>
where
    D: CaptureDevice,
    L: DetectorLoader,
    O: OverlaySink + Clone,
{
    config: TrackerConfig,
    session: SessionHandle,
    timer: RestTimer,
    device: Arc<Mutex<D>>,
    camera: Option<CaptureGuard<D>>,
    loader: L,
    detector: Option<L::Detector>,
    overlay: O,
    timestamps: FrameTimestamps,
    running: Option<RunningPipeline<L::Detector, O>>,
    metrics: Arc<MetricsRecorder>,
    started_at: Option<Instant>,
    logger: LogManager,
}

impl<D, L, O> SessionCoordinator<D, L, O>
where
    D: CaptureDevice,
    L: DetectorLoader,
    O: OverlaySink + Clone,
{
    pub fn new(config: TrackerConfig, device: D, loader: L, overlay: O) -> TrackerResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            session: SessionHandle::new(),
            timer: RestTimer::new(),
            device: Arc::new(Mutex::new(device)),
            camera: None,
            loader,
            detector: None,
            overlay,
            timestamps: FrameTimestamps::new(),
            running: None,
            metrics: Arc::new(MetricsRecorder::new()),
            started_at: None,
            logger: LogManager::new("coordinator"),
        })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn session(&self) -> SessionHandle {
        self.session.clone()
    }

    pub fn timer(&self) -> &RestTimer {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut RestTimer {
        &mut self.timer
    }

    pub fn metrics(&self) -> PipelineMetrics {
        self.metrics.snapshot()
    }

    pub fn is_camera_active(&self) -> bool {
        self.camera.as_ref().is_some_and(|guard| !guard.is_released())
    }

    pub fn is_detector_loaded(&self) -> bool {
        self.detector.is_some() || self.running.is_some()
    }

    /// Entering the tracking view: starts a fresh workout session. A frame
    /// loop left over from a previous session is stopped first.
    pub async fn enter(&mut self, params: SessionParams) {
        self.stop_camera().await;
        let (name, sets, reps) = params.resolved();
        self.logger
            .record(&format!("session start: {name} {sets}x{reps}"));
        self.session.update(|session| session.start(name, reps, sets));
        self.started_at = Some(Instant::now());
    }

    /// Acquires the camera, loads the detector if needed and spawns the
    /// frame loop. Failures leave the camera released and are reported
    /// through the session feedback as well as the returned error.
    pub async fn start_camera(&mut self) -> TrackerResult<()> {
        if self.running.is_some() {
            return Ok(());
        }

        let guard = match CaptureGuard::acquire(self.device.clone(), &self.config.capture) {
            Ok(guard) => guard,
            Err(err) => {
                self.logger.warn(&format!("camera unavailable: {err}"));
                self.session
                    .update(|session| session.set_feedback(CAMERA_DENIED_FEEDBACK));
                return Err(err.into());
            }
        };
        self.session
            .update(|session| session.set_feedback(CAMERA_STARTED_FEEDBACK));

        let detector = match self.detector.take() {
            Some(detector) => detector,
            None => {
                self.session
                    .update(|session| session.set_feedback(MODEL_LOADING_FEEDBACK));
                match self.loader.load().await {
                    Ok(detector) => {
                        self.session
                            .update(|session| session.set_feedback(MODEL_READY_FEEDBACK));
                        detector
                    }
                    Err(err) => {
                        self.logger.warn(&format!("detector load failed: {err}"));
                        self.session
                            .update(|session| session.set_feedback(MODEL_ERROR_FEEDBACK));
                        drop(guard);
                        return Err(err.into());
                    }
                }
            }
        };

        let limb = self
            .session
            .read(|session| session.exercise_name().map(|name| self.config.limb_for(name)))
            .unwrap_or(self.config.default_limb);
        let pipeline = FramePipeline::new(
            detector,
            self.overlay.clone(),
            &self.config,
            limb,
            self.timestamps,
            self.metrics.clone(),
        );
        let token = CancelToken::new();
        let generation = self.session.generation();
        let handle = tokio::spawn(pipeline.run(
            guard.feed(),
            self.session.clone(),
            generation,
            token.clone(),
        ));

        self.camera = Some(guard);
        self.running = Some(RunningPipeline { handle, token });
        Ok(())
    }

    /// Stops the frame loop and releases the camera. Safe to call repeatedly.
    pub async fn stop_camera(&mut self) {
        if let Some(running) = self.running.take() {
            running.token.cancel();
            match running.handle.await {
                Ok(pipeline) => {
                    let (detector, timestamps) = pipeline.into_parts();
                    self.detector = Some(detector);
                    self.timestamps = timestamps;
                }
                Err(err) => self
                    .logger
                    .warn(&format!("frame loop ended abnormally: {err}")),
            }
        }
        if let Some(mut guard) = self.camera.take() {
            guard.release();
        }
    }

    /// Advances to the next set and arms the rest timer for it.
    pub fn next_set(&mut self) -> bool {
        let advanced = self.session.update(|session| {
            session
                .advance_set()
                .then(|| (session.current_set(), session.exercise_name().map(String::from)))
        });
        let Some((set_number, exercise)) = advanced else {
            return false;
        };
        self.logger.record(&format!("set {set_number} started"));
        if self.config.rest_seconds > 0 {
            self.timer
                .start(self.config.rest_seconds, exercise, set_number);
        }
        true
    }

    /// Leaving the tracking view. Returns the summary of the session that was
    /// running, if any.
    pub async fn finish(&mut self) -> Option<WorkoutSummary> {
        self.stop_camera().await;
        let elapsed_seconds = self
            .started_at
            .take()
            .map(|started| started.elapsed().as_secs())
            .unwrap_or(0);
        let summary = self.session.read(|session| {
            session.is_tracking().then(|| WorkoutSummary {
                exercise_name: session.exercise_name().unwrap_or(DEFAULT_EXERCISE).to_string(),
                sets_completed: session.current_set(),
                target_sets: session.target_sets(),
                target_reps: session.target_reps(),
                reps_in_current_set: session.current_reps(),
                elapsed_seconds,
            })
        });
        self.session.update(WorkoutSession::stop);
        if let Some(summary) = &summary {
            self.logger.record(&format!(
                "session finished: {} sets of {} {}",
                summary.sets_completed, summary.target_reps, summary.exercise_name
            ));
        }
        summary
    }

    pub fn snapshot(&self) -> CoordinatorSnapshot {
        CoordinatorSnapshot {
            session: self.session.snapshot(),
            timer: self.timer.snapshot(),
            metrics: self.metrics.snapshot(),
            camera_active: self.is_camera_active(),
        }
    }
}

impl<D, L, O> Drop for SessionCoordinator<D, L, O>
where
    D: CaptureDevice,
    L: DetectorLoader,
    O: OverlaySink + Clone,
{
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            running.token.cancel();
            running.handle.abort();
        }
        if let Some(mut guard) = self.camera.take() {
            guard.release();
        }
        self.session.update(WorkoutSession::stop);
    }
}
