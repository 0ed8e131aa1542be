//! Storage seams for the core.
//!
//! The answering session and the aggregator only talk to these traits, so
//! they run unchanged against the JSON [`FileStore`](crate::store::FileStore)
//! and the in-memory [`MemoryStore`](crate::mock::MemoryStore).

use std::collections::BTreeMap;

use crate::error::Result;
use crate::model::{ExerciseList, ProgressRecord, StudentId};

/// Loads and saves per-(student, list) progress records.
///
/// Saving is a whole-record write: the stored record is replaced.
pub trait ProgressStore {
    /// The stored record, or `None` if the student never touched the list.
    fn load_progress(&self, student: StudentId, list: &str) -> Result<Option<ProgressRecord>>;

    /// Replace the stored record.
    fn save_progress(&self, student: StudentId, list: &str, record: &ProgressRecord)
        -> Result<()>;

    /// Every record of one student, keyed by list name.
    fn progress_for_student(&self, student: StudentId)
        -> Result<BTreeMap<String, ProgressRecord>>;

    /// The stored record brought back in line with `list`.
    ///
    /// Anything normalization drops (responses past the cursor, labels the
    /// list does not offer) is logged and never reaches the caller.
    fn load_normalized(
        &self,
        student: StudentId,
        list: &ExerciseList,
    ) -> Result<Option<ProgressRecord>> {
        let Some(mut record) = self.load_progress(student, &list.name)? else {
            return Ok(None);
        };
        if record.normalize(list) {
            tracing::warn!(
                student,
                list = %list.name,
                "stored progress did not match the list and was normalized"
            );
        }
        Ok(Some(record))
    }
}

/// Resolves exercise lists by storage key.
pub trait ExerciseSource {
    /// Load a list; a missing list is [`ClassworkError::NotFound`](crate::error::ClassworkError::NotFound).
    fn load_list(&self, name: &str) -> Result<ExerciseList>;
}
