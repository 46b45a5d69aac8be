use crate::capture::CaptureConstraints;
use crate::pose_interface::TrackedLimb;
use crate::processing::rep_detector::RepThresholds;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::pin::pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// Shared configuration for the tracking core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub contract_threshold_deg: f32,
    pub extend_threshold_deg: f32,
    /// Landmarks below this visibility are treated as missing. Zero accepts all.
    pub min_visibility: f32,
    pub frame_interval_ms: u64,
    pub capture: CaptureConstraints,
    pub default_limb: TrackedLimb,
    pub exercise_limbs: BTreeMap<String, TrackedLimb>,
    pub rest_seconds: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            contract_threshold_deg: 60.0,
            extend_threshold_deg: 160.0,
            min_visibility: 0.0,
            frame_interval_ms: 16,
            capture: CaptureConstraints::default(),
            default_limb: TrackedLimb::LeftArm,
            exercise_limbs: BTreeMap::new(),
            rest_seconds: 60,
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> TrackerResult<()> {
        let in_range = |deg: f32| deg.is_finite() && (0.0..=180.0).contains(&deg);
        if !in_range(self.contract_threshold_deg) || !in_range(self.extend_threshold_deg) {
            return Err(TrackerError::InvalidConfig(
                "angle thresholds must lie within [0, 180] degrees".into(),
            ));
        }
        if self.contract_threshold_deg >= self.extend_threshold_deg {
            return Err(TrackerError::InvalidConfig(format!(
                "contract threshold {} must be below extend threshold {}",
                self.contract_threshold_deg, self.extend_threshold_deg
            )));
        }
        if self.frame_interval_ms == 0 {
            return Err(TrackerError::InvalidConfig(
                "frame interval must be at least 1 ms".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.min_visibility) {
            return Err(TrackerError::InvalidConfig(
                "minimum visibility must lie within [0, 1]".into(),
            ));
        }
        Ok(())
    }

    pub fn thresholds(&self) -> RepThresholds {
        RepThresholds {
            contract_deg: self.contract_threshold_deg,
            extend_deg: self.extend_threshold_deg,
        }
    }

    /// Limb tracked for `exercise`; names match case-insensitively.
    pub fn limb_for(&self, exercise: &str) -> TrackedLimb {
        self.exercise_limbs
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(exercise.trim()))
            .map(|(_, limb)| *limb)
            .unwrap_or(self.default_limb)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CaptureError {
    #[error("camera access denied: {0}")]
    Denied(String),
    #[error("camera unavailable: {0}")]
    Unavailable(String),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DetectorError {
    #[error("pose detector failed to initialize: {0}")]
    Initialization(String),
    #[error("pose inference failed: {0}")]
    Inference(String),
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("store i/o failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("store serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("invalid record: {0}")]
    Invalid(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Common error type for the tracking core.
#[derive(thiserror::Error, Debug)]
pub enum TrackerError {
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Detector(#[from] DetectorError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type TrackerResult<T> = Result<T, TrackerError>;

#[derive(Debug, Default)]
struct CancelState {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Liveness flag shared between a session owner and the tasks it spawns.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<CancelState>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once `cancel` has been called.
    pub async fn cancelled(&self) {
        loop {
            let mut notified = pin!(self.inner.notify.notified());
            notified.as_mut().enable();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = TrackerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.thresholds().contract_deg, 60.0);
        assert_eq!(config.thresholds().extend_deg, 160.0);
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let config = TrackerConfig {
            contract_threshold_deg: 150.0,
            extend_threshold_deg: 90.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(TrackerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn limb_lookup_ignores_case_and_falls_back() {
        let mut config = TrackerConfig::default();
        config
            .exercise_limbs
            .insert("Squats".to_string(), TrackedLimb::LeftLeg);
        assert_eq!(config.limb_for("squats"), TrackedLimb::LeftLeg);
        assert_eq!(config.limb_for("Bicep Curls"), TrackedLimb::LeftArm);
    }

    #[test]
    fn default_config_tracks_left_arm_for_every_exercise() {
        let config = TrackerConfig::default();
        assert!(config.exercise_limbs.is_empty());
        for exercise in ["Squats", "Lunges", "Push-ups", "Bicep Curls"] {
            assert_eq!(config.limb_for(exercise), TrackedLimb::LeftArm);
        }
    }

    #[test]
    fn config_deserializes_partial_json() {
        let config: TrackerConfig =
            serde_json::from_str(r#"{"contract_threshold_deg": 45.0, "rest_seconds": 30}"#)
                .unwrap();
        assert_eq!(config.contract_threshold_deg, 45.0);
        assert_eq!(config.extend_threshold_deg, 160.0);
        assert_eq!(config.rest_seconds, 30);
    }

    #[tokio::test]
    async fn cancel_wakes_waiters() {
        let token = CancelToken::new();
        let waiter = {
            let token = token.clone();
            tokio::spawn(async move { token.cancelled().await })
        };
        tokio::task::yield_now().await;
        token.cancel();
        waiter.await.unwrap();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn cancelled_returns_immediately_after_cancel() {
        let token = CancelToken::new();
        token.cancel();
        token.cancelled().await;
    }
}
