//! In-memory store for tests and benchmarks.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::{ClassworkError, Result};
use crate::model::{ExerciseList, ProgressRecord, StudentId};
use crate::store::ProgressBook;
use crate::traits::{ExerciseSource, ProgressStore};

/// A store that keeps lists and progress in memory.
///
/// Counts saves and can be told to fail them, so callers can check how a
/// failed write is handled without touching the filesystem.
#[derive(Default)]
pub struct MemoryStore {
    lists: Mutex<HashMap<String, ExerciseList>>,
    progress: Mutex<ProgressBook>,
    save_count: AtomicU32,
    fail_saves: AtomicBool,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding one list.
    pub fn with_list(list: ExerciseList) -> Self {
        let store = Self::new();
        store.insert_list(list);
        store
    }

    pub fn insert_list(&self, list: ExerciseList) {
        lock(&self.lists).insert(list.name.clone(), list);
    }

    /// Put a record in place without counting it as a save.
    pub fn seed_progress(&self, student: StudentId, list: &str, record: ProgressRecord) {
        lock(&self.progress)
            .entry(student)
            .or_default()
            .insert(list.to_string(), record);
    }

    /// Make every following save fail (or succeed again).
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::Relaxed);
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> u32 {
        self.save_count.load(Ordering::Relaxed)
    }

    /// The stored record, bypassing the trait.
    pub fn record(&self, student: StudentId, list: &str) -> Option<ProgressRecord> {
        lock(&self.progress)
            .get(&student)
            .and_then(|lists| lists.get(list))
            .cloned()
    }
}

impl ProgressStore for MemoryStore {
    fn load_progress(&self, student: StudentId, list: &str) -> Result<Option<ProgressRecord>> {
        Ok(self.record(student, list))
    }

    fn save_progress(
        &self,
        student: StudentId,
        list: &str,
        record: &ProgressRecord,
    ) -> Result<()> {
        if self.fail_saves.load(Ordering::Relaxed) {
            return Err(ClassworkError::io(
                "memory",
                std::io::Error::new(std::io::ErrorKind::Other, "injected save failure"),
            ));
        }
        lock(&self.progress)
            .entry(student)
            .or_default()
            .insert(list.to_string(), record.clone());
        self.save_count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn progress_for_student(
        &self,
        student: StudentId,
    ) -> Result<BTreeMap<String, ProgressRecord>> {
        Ok(lock(&self.progress)
            .get(&student)
            .cloned()
            .unwrap_or_default())
    }
}

impl ExerciseSource for MemoryStore {
    fn load_list(&self, name: &str) -> Result<ExerciseList> {
        lock(&self.lists)
            .get(name)
            .cloned()
            .ok_or_else(|| ClassworkError::NotFound(format!("exercise list '{name}'")))
    }
}
