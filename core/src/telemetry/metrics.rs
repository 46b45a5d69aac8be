use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Point-in-time copy of the pipeline counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineMetrics {
    pub frames: u64,
    pub frames_without_pose: u64,
    pub degenerate_angles: u64,
    pub reps: u64,
    pub detector_errors: u64,
}

pub struct MetricsRecorder {
    inner: Mutex<PipelineMetrics>,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(PipelineMetrics::default()),
        }
    }

    pub fn record_frame(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.frames += 1;
        }
    }

    pub fn record_no_pose(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.frames_without_pose += 1;
        }
    }

    pub fn record_degenerate(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.degenerate_angles += 1;
        }
    }

    pub fn record_rep(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.reps += 1;
        }
    }

    pub fn record_error(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.detector_errors += 1;
        }
    }

    pub fn snapshot(&self) -> PipelineMetrics {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            PipelineMetrics::default()
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
