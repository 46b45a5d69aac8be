use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Exercises shipped with every catalog.
pub const PREDEFINED_EXERCISES: [&str; 5] = [
    "Push-ups",
    "Squats",
    "Bicep Curls",
    "Lunges",
    "Shoulder Press",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseRecord {
    pub id: String,
    pub name: String,
    pub youtube_url: Option<String>,
    pub is_predefined: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutLog {
    pub id: String,
    pub exercise_id: String,
    pub sets: u32,
    pub reps: u32,
    pub duration_seconds: Option<u64>,
    pub completed_at: DateTime<Utc>,
    pub notes: Option<String>,
}

/// Insert payload for [`WorkoutLog`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewWorkoutLog {
    pub exercise_id: String,
    pub sets: u32,
    pub reps: u32,
    pub duration_seconds: Option<u64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreferences {
    pub id: String,
    pub theme_mode: ThemeMode,
    pub updated_at: DateTime<Utc>,
}
