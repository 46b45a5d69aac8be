use crate::generator::profile::MotionProfile;
use anyhow::Context;
use repcore::prelude::TrackerConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Values taken from the command line that win over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub exercise: Option<String>,
    pub sets: Option<u32>,
    pub reps: Option<u32>,
    pub rest_seconds: Option<u32>,
    pub store_path: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub exercise: String,
    pub sets: u32,
    pub reps: u32,
    pub tracker: TrackerConfig,
    pub motion: MotionProfile,
    pub store_path: PathBuf,
    /// Upper bound on one workout, rests included.
    pub max_duration_secs: u64,
    pub start_attempts: u32,
    /// Number of initial model loads that fail, to exercise the retry path.
    pub load_failures: u32,
    /// Advance to the next set as soon as the current one is complete.
    pub auto_advance: bool,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            exercise: "Bicep Curls".to_string(),
            sets: 3,
            reps: 10,
            tracker: TrackerConfig {
                rest_seconds: 10,
                ..TrackerConfig::default()
            },
            motion: MotionProfile::default(),
            store_path: PathBuf::from("tools/data/workouts.json"),
            max_duration_secs: 600,
            start_attempts: 3,
            load_failures: 0,
            auto_advance: true,
        }
    }
}

impl TrainerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading trainer config {}", path_ref.display()))?;
        let config: TrainerConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing trainer config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(overrides: ConfigOverrides) -> Self {
        let mut config = Self::default();
        config.apply(overrides);
        config
    }

    pub fn apply(&mut self, overrides: ConfigOverrides) {
        if let Some(exercise) = overrides.exercise {
            self.exercise = exercise;
        }
        if let Some(sets) = overrides.sets {
            self.sets = sets;
        }
        if let Some(reps) = overrides.reps {
            self.reps = reps;
        }
        if let Some(rest_seconds) = overrides.rest_seconds {
            self.tracker.rest_seconds = rest_seconds;
        }
        if let Some(store_path) = overrides.store_path {
            self.store_path = store_path;
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.tracker.validate().context("validating tracker section")?;
        self.motion.validate().context("validating motion section")?;
        if self.exercise.trim().is_empty() {
            anyhow::bail!("exercise name must not be blank");
        }
        if self.sets == 0 || self.reps == 0 {
            anyhow::bail!("sets and reps must be at least 1");
        }
        if self.start_attempts == 0 {
            anyhow::bail!("start_attempts must be at least 1");
        }
        Ok(())
    }
}
