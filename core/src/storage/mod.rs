//! Exercise catalog, workout history and preference records.
//!
//! The tracking core never depends on this module; callers record failures
//! here as view-level errors while tracking keeps running.

pub mod json;
pub mod memory;
pub mod records;

pub use json::JsonFileStore;
pub use memory::MemoryStore;
pub use records::{
    ExerciseRecord, NewWorkoutLog, ThemeMode, UserPreferences, WorkoutLog, PREDEFINED_EXERCISES,
};

use crate::prelude::{StoreError, StoreResult};
use chrono::Utc;
use serde::{Deserialize, Serialize};

pub trait WorkoutStore {
    /// Predefined exercises first, then alphabetical by name.
    fn list_exercises(&self) -> StoreResult<Vec<ExerciseRecord>>;
    fn add_exercise(
        &mut self,
        name: &str,
        youtube_url: Option<&str>,
    ) -> StoreResult<ExerciseRecord>;
    fn delete_exercise(&mut self, id: &str) -> StoreResult<()>;
    /// Newest first.
    fn list_logs(&self) -> StoreResult<Vec<WorkoutLog>>;
    fn add_log(&mut self, log: NewWorkoutLog) -> StoreResult<WorkoutLog>;
    fn delete_log(&mut self, id: &str) -> StoreResult<()>;
    fn theme(&self) -> StoreResult<ThemeMode>;
    fn save_theme(&mut self, mode: ThemeMode) -> StoreResult<()>;
    /// Inserts the built-in catalog when no exercises exist yet.
    fn seed_predefined(&mut self) -> StoreResult<usize>;

    fn find_exercise(&self, name: &str) -> StoreResult<Option<ExerciseRecord>> {
        Ok(self
            .list_exercises()?
            .into_iter()
            .find(|exercise| exercise.name.eq_ignore_ascii_case(name.trim())))
    }
}

/// Record tables shared by the store backends.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreData {
    exercises: Vec<ExerciseRecord>,
    logs: Vec<WorkoutLog>,
    preferences: Option<UserPreferences>,
    next_id: u64,
}

impl StoreData {
    fn allocate_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn insert_exercise(
        &mut self,
        name: &str,
        youtube_url: Option<&str>,
        is_predefined: bool,
    ) -> StoreResult<ExerciseRecord> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::Invalid(
                "exercise name must not be blank".into(),
            ));
        }
        let record = ExerciseRecord {
            id: self.allocate_id("exercise"),
            name: name.to_string(),
            youtube_url: youtube_url
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(String::from),
            is_predefined,
            created_at: Utc::now(),
        };
        self.exercises.push(record.clone());
        Ok(record)
    }

    pub(crate) fn list_exercises(&self) -> Vec<ExerciseRecord> {
        let mut exercises = self.exercises.clone();
        exercises.sort_by(|a, b| {
            b.is_predefined
                .cmp(&a.is_predefined)
                .then_with(|| a.name.cmp(&b.name))
        });
        exercises
    }

    pub(crate) fn add_exercise(
        &mut self,
        name: &str,
        youtube_url: Option<&str>,
    ) -> StoreResult<ExerciseRecord> {
        self.insert_exercise(name, youtube_url, false)
    }

    pub(crate) fn delete_exercise(&mut self, id: &str) -> StoreResult<()> {
        let before = self.exercises.len();
        self.exercises.retain(|exercise| exercise.id != id);
        if self.exercises.len() == before {
            return Err(StoreError::NotFound(format!("exercise {id}")));
        }
        Ok(())
    }

    pub(crate) fn list_logs(&self) -> Vec<WorkoutLog> {
        let mut logs: Vec<WorkoutLog> = self.logs.iter().rev().cloned().collect();
        logs.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        logs
    }

    pub(crate) fn add_log(&mut self, log: NewWorkoutLog) -> StoreResult<WorkoutLog> {
        if !self
            .exercises
            .iter()
            .any(|exercise| exercise.id == log.exercise_id)
        {
            return Err(StoreError::NotFound(format!(
                "exercise {}",
                log.exercise_id
            )));
        }
        let record = WorkoutLog {
            id: self.allocate_id("log"),
            exercise_id: log.exercise_id,
            sets: log.sets,
            reps: log.reps,
            duration_seconds: log.duration_seconds,
            completed_at: Utc::now(),
            notes: log.notes,
        };
        self.logs.push(record.clone());
        Ok(record)
    }

    pub(crate) fn delete_log(&mut self, id: &str) -> StoreResult<()> {
        let before = self.logs.len();
        self.logs.retain(|log| log.id != id);
        if self.logs.len() == before {
            return Err(StoreError::NotFound(format!("workout log {id}")));
        }
        Ok(())
    }

    pub(crate) fn theme(&self) -> ThemeMode {
        self.preferences
            .as_ref()
            .map(|preferences| preferences.theme_mode)
            .unwrap_or_default()
    }

    pub(crate) fn save_theme(&mut self, mode: ThemeMode) {
        match self.preferences.as_mut() {
            Some(preferences) => {
                preferences.theme_mode = mode;
                preferences.updated_at = Utc::now();
            }
            None => {
                let id = self.allocate_id("preferences");
                self.preferences = Some(UserPreferences {
                    id,
                    theme_mode: mode,
                    updated_at: Utc::now(),
                });
            }
        }
    }

    pub(crate) fn seed_predefined(&mut self) -> StoreResult<usize> {
        if !self.exercises.is_empty() {
            return Ok(0);
        }
        for name in PREDEFINED_EXERCISES {
            self.insert_exercise(name, None, true)?;
        }
        Ok(PREDEFINED_EXERCISES.len())
    }
}
