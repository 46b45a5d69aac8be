use crate::prelude::StoreResult;
use crate::storage::{
    ExerciseRecord, NewWorkoutLog, StoreData, ThemeMode, WorkoutLog, WorkoutStore,
};

/// Volatile store for tests and one-off sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: StoreData,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WorkoutStore for MemoryStore {
    fn list_exercises(&self) -> StoreResult<Vec<ExerciseRecord>> {
        Ok(self.data.list_exercises())
    }

    fn add_exercise(
        &mut self,
        name: &str,
        youtube_url: Option<&str>,
    ) -> StoreResult<ExerciseRecord> {
        self.data.add_exercise(name, youtube_url)
    }

    fn delete_exercise(&mut self, id: &str) -> StoreResult<()> {
        self.data.delete_exercise(id)
    }

    fn list_logs(&self) -> StoreResult<Vec<WorkoutLog>> {
        Ok(self.data.list_logs())
    }

    fn add_log(&mut self, log: NewWorkoutLog) -> StoreResult<WorkoutLog> {
        self.data.add_log(log)
    }

    fn delete_log(&mut self, id: &str) -> StoreResult<()> {
        self.data.delete_log(id)
    }

    fn theme(&self) -> StoreResult<ThemeMode> {
        Ok(self.data.theme())
    }

    fn save_theme(&mut self, mode: ThemeMode) -> StoreResult<()> {
        self.data.save_theme(mode);
        Ok(())
    }

    fn seed_predefined(&mut self) -> StoreResult<usize> {
        self.data.seed_predefined()
    }
}
