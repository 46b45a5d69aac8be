use crate::prelude::StoreResult;
use crate::storage::{
    ExerciseRecord, NewWorkoutLog, StoreData, ThemeMode, WorkoutLog, WorkoutStore,
};
use crate::telemetry::LogManager;
use std::fs;
use std::path::{Path, PathBuf};

/// Store persisted as a single JSON document, rewritten after every change.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    data: StoreData,
    logger: LogManager,
}

impl JsonFileStore {
    /// Opens `path`, starting empty when the file does not exist yet.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            if contents.trim().is_empty() {
                StoreData::default()
            } else {
                serde_json::from_str(&contents)?
            }
        } else {
            StoreData::default()
        };
        Ok(Self {
            path,
            data,
            logger: LogManager::new("store"),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&self.data)?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, contents)?;
        fs::rename(&staging, &self.path)?;
        self.logger
            .detail(&format!("store written to {}", self.path.display()));
        Ok(())
    }

    /// Applies `change` and writes the result; the in-memory copy is rolled
    /// back if the write fails.
    fn mutate<R>(
        &mut self,
        change: impl FnOnce(&mut StoreData) -> StoreResult<R>,
    ) -> StoreResult<R> {
        let backup = self.data.clone();
        let result = change(&mut self.data).and_then(|value| {
            self.persist()?;
            Ok(value)
        });
        if result.is_err() {
            self.data = backup;
        }
        result
    }
}

impl WorkoutStore for JsonFileStore {
    fn list_exercises(&self) -> StoreResult<Vec<ExerciseRecord>> {
        Ok(self.data.list_exercises())
    }

    fn add_exercise(
        &mut self,
        name: &str,
        youtube_url: Option<&str>,
    ) -> StoreResult<ExerciseRecord> {
        self.mutate(|data| data.add_exercise(name, youtube_url))
    }

    fn delete_exercise(&mut self, id: &str) -> StoreResult<()> {
        self.mutate(|data| data.delete_exercise(id))
    }

    fn list_logs(&self) -> StoreResult<Vec<WorkoutLog>> {
        Ok(self.data.list_logs())
    }

    fn add_log(&mut self, log: NewWorkoutLog) -> StoreResult<WorkoutLog> {
        self.mutate(|data| data.add_log(log))
    }

    fn delete_log(&mut self, id: &str) -> StoreResult<()> {
        self.mutate(|data| data.delete_log(id))
    }

    fn theme(&self) -> StoreResult<ThemeMode> {
        Ok(self.data.theme())
    }

    fn save_theme(&mut self, mode: ThemeMode) -> StoreResult<()> {
        self.mutate(|data| {
            data.save_theme(mode);
            Ok(())
        })
    }

    fn seed_predefined(&mut self) -> StoreResult<usize> {
        if !self.data.list_exercises().is_empty() {
            return Ok(0);
        }
        self.mutate(StoreData::seed_predefined)
    }
}
