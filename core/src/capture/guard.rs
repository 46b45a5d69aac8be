use crate::capture::{CaptureConstraints, CaptureDevice};
use crate::pose_interface::VideoFrame;
use crate::prelude::CaptureError;
use crate::telemetry::LogManager;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

fn lock_device<D>(device: &Mutex<D>) -> MutexGuard<'_, D> {
    device.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Scoped ownership of a started capture device.
///
/// The guard is the only handle able to stop the device. Releasing is
/// idempotent and also happens on drop, so every exit path halts the stream.
pub struct CaptureGuard<D: CaptureDevice> {
    device: Arc<Mutex<D>>,
    released: Arc<AtomicBool>,
    logger: LogManager,
}

impl<D: CaptureDevice> CaptureGuard<D> {
    pub fn acquire(
        device: Arc<Mutex<D>>,
        constraints: &CaptureConstraints,
    ) -> Result<Self, CaptureError> {
        lock_device(&device).start(constraints)?;
        let logger = LogManager::new("capture");
        logger.record(&format!(
            "capture started at {}x{}",
            constraints.width, constraints.height
        ));
        Ok(Self {
            device,
            released: Arc::new(AtomicBool::new(false)),
            logger,
        })
    }

    /// Read-only frame access for the frame pipeline.
    pub fn feed(&self) -> FrameFeed<D> {
        FrameFeed {
            device: self.device.clone(),
            released: self.released.clone(),
        }
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    pub fn release(&mut self) {
        if self.released.swap(true, Ordering::SeqCst) {
            return;
        }
        lock_device(&self.device).stop();
        self.logger.record("capture released");
    }
}

impl<D: CaptureDevice> Drop for CaptureGuard<D> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Frame source handed to the pipeline; cannot start or stop the device.
pub struct FrameFeed<D: CaptureDevice> {
    device: Arc<Mutex<D>>,
    released: Arc<AtomicBool>,
}

impl<D: CaptureDevice> FrameFeed<D> {
    pub fn grab(&self) -> Option<VideoFrame> {
        if self.released.load(Ordering::SeqCst) {
            return None;
        }
        lock_device(&self.device).grab()
    }
}

impl<D: CaptureDevice> Clone for FrameFeed<D> {
    fn clone(&self) -> Self {
        Self {
            device: self.device.clone(),
            released: self.released.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct StubCamera {
        active: bool,
        deny: bool,
        starts: usize,
        stops: usize,
        next: u64,
    }

    impl CaptureDevice for StubCamera {
        fn start(&mut self, _constraints: &CaptureConstraints) -> Result<(), CaptureError> {
            if self.deny {
                return Err(CaptureError::Denied("permission dismissed".into()));
            }
            self.starts += 1;
            self.active = true;
            Ok(())
        }

        fn grab(&mut self) -> Option<VideoFrame> {
            if !self.active {
                return None;
            }
            self.next += 1;
            Some(VideoFrame::new(self.next, 640, 480, Vec::new()))
        }

        fn stop(&mut self) {
            self.stops += 1;
            self.active = false;
        }

        fn is_active(&self) -> bool {
            self.active
        }
    }

    #[test]
    fn drop_releases_device_once() {
        let device = Arc::new(Mutex::new(StubCamera::default()));
        {
            let mut guard =
                CaptureGuard::acquire(device.clone(), &CaptureConstraints::default()).unwrap();
            assert!(lock_device(&device).is_active());
            guard.release();
            guard.release();
        }
        let camera = lock_device(&device);
        assert!(!camera.is_active());
        assert_eq!(camera.stops, 1);
    }

    #[test]
    fn feed_goes_silent_after_release() {
        let device = Arc::new(Mutex::new(StubCamera::default()));
        let mut guard =
            CaptureGuard::acquire(device.clone(), &CaptureConstraints::default()).unwrap();
        let feed = guard.feed();
        assert_eq!(feed.grab().map(|f| f.sequence), Some(1));
        guard.release();
        assert!(feed.grab().is_none());
    }

    #[test]
    fn denied_start_yields_no_guard() {
        let device = Arc::new(Mutex::new(StubCamera {
            deny: true,
            ..Default::default()
        }));
        let result = CaptureGuard::acquire(device.clone(), &CaptureConstraints::default());
        assert!(matches!(result, Err(CaptureError::Denied(_))));
        assert_eq!(lock_device(&device).stops, 0);
    }

    #[test]
    fn default_constraints_request_vga_without_audio() {
        let constraints = CaptureConstraints::default();
        assert_eq!((constraints.width, constraints.height), (640, 480));
        assert!(!constraints.audio);
    }
}
