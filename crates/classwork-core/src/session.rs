//! The per-student answering state machine.
//!
//! A session walks one student through one exercise list, persisting the
//! progress record through a [`ProgressStore`] after every answer, on stop,
//! on retake, and (depending on [`BackPolicy`]) on going back.
//!
//! Every mutating call builds the next record, writes it, and only then
//! commits it to the session: a failed write leaves the session exactly as
//! it was before the call.

use serde::{Deserialize, Serialize};

use crate::error::{ClassworkError, Result};
use crate::model::{Exercise, ExerciseList, ProgressRecord, StudentId};
use crate::traits::ProgressStore;

/// When a step back is written to the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackPolicy {
    /// Persist the regressed cursor right away.
    #[default]
    Immediate,
    /// Only move the in-session position; the stored cursor stays where it
    /// was until the next `answer` or `stop`.
    Deferred,
}

/// Where a session is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Presenting the exercise at this index.
    Active(usize),
    /// Every exercise answered; the record is complete.
    Completed,
    /// Stopped by the student; resumable later.
    Paused,
}

/// Snapshot of how far a session has come.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
    pub is_complete: bool,
}

/// Drives one student through one exercise list.
pub struct AnsweringSession<'a, S: ProgressStore + ?Sized> {
    store: &'a S,
    student: StudentId,
    list: &'a ExerciseList,
    /// The record as last persisted (or freshly created).
    record: ProgressRecord,
    position: usize,
    state: SessionState,
    policy: BackPolicy,
    resumed: bool,
}

impl<'a, S: ProgressStore + ?Sized> AnsweringSession<'a, S> {
    /// Open a session, loading the stored record or starting fresh.
    ///
    /// A stored record is normalized against the list before use. Nothing is
    /// written until the first mutating call.
    pub fn open(
        store: &'a S,
        student: StudentId,
        list: &'a ExerciseList,
        policy: BackPolicy,
    ) -> Result<Self> {
        if list.is_empty() {
            return Err(ClassworkError::NotFound(format!(
                "exercise list '{}' has no exercises",
                list.name
            )));
        }

        if let Some(index) = list.first_unanswerable() {
            return Err(ClassworkError::InvalidInput(format!(
                "exercise {} of list '{}' offers no alternative",
                index + 1,
                list.name
            )));
        }

        let record = store
            .load_normalized(student, list)?
            .unwrap_or_default();

        let state = if record.is_complete() {
            SessionState::Completed
        } else {
            SessionState::Active(record.cursor)
        };
        let resumed = matches!(state, SessionState::Active(i) if i > 0);

        Ok(Self {
            store,
            student,
            list,
            position: record.cursor,
            record,
            state,
            policy,
            resumed,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Index presented to the student (may differ from the stored cursor
    /// after a deferred step back).
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn record(&self) -> &ProgressRecord {
        &self.record
    }

    pub fn list(&self) -> &ExerciseList {
        self.list
    }

    pub fn student(&self) -> StudentId {
        self.student
    }

    /// Whether the session picked up a partially answered list.
    pub fn is_resumed(&self) -> bool {
        self.resumed
    }

    /// The exercise being presented, while active.
    pub fn current(&self) -> Option<&Exercise> {
        match self.state {
            SessionState::Active(i) => self.list.get(i),
            _ => None,
        }
    }

    pub fn progress(&self) -> SessionProgress {
        let total = self.list.len();
        let answered = match self.state {
            SessionState::Completed => total,
            _ => self.position,
        };
        SessionProgress {
            total,
            answered,
            remaining: total - answered,
            is_complete: self.record.is_complete(),
        }
    }

    fn active_index(&self, op: &str) -> Result<usize> {
        match self.state {
            SessionState::Active(i) => Ok(i),
            SessionState::Completed => Err(ClassworkError::InvalidInput(format!(
                "cannot {op}: the list is already complete"
            ))),
            SessionState::Paused => Err(ClassworkError::InvalidInput(format!(
                "cannot {op}: the session was stopped"
            ))),
        }
    }

    fn persist(&self, record: &ProgressRecord) -> Result<()> {
        self.store
            .save_progress(self.student, &self.list.name, record)
            .inspect_err(|e| {
                tracing::warn!(
                    student = self.student,
                    list = %self.list.name,
                    error = %e,
                    "failed to persist progress"
                );
            })
    }

    /// Answer the presented exercise and advance.
    ///
    /// `letter` is matched case-insensitively against the offered labels.
    /// Returns the new cursor.
    pub fn answer(&mut self, letter: &str) -> Result<usize> {
        let index = self.active_index("answer")?;
        let exercise = self
            .list
            .get(index)
            .ok_or_else(|| ClassworkError::NotFound(format!("exercise {index}")))?;
        let label = exercise.accept(letter)?;

        let mut next = self.record.clone();
        next.record_answer(index, label, self.list.len());
        self.persist(&next)?;

        self.record = next;
        self.position = self.record.cursor;
        self.state = if self.record.is_complete() {
            tracing::info!(student = self.student, list = %self.list.name, "list completed");
            SessionState::Completed
        } else {
            SessionState::Active(self.position)
        };
        Ok(self.position)
    }

    /// Step back to the previous exercise. A no-op on the first exercise.
    ///
    /// Returns the new position.
    pub fn back(&mut self) -> Result<usize> {
        let index = self.active_index("go back")?;
        if index == 0 {
            return Ok(0);
        }
        let target = index - 1;

        if self.policy == BackPolicy::Immediate {
            let mut next = self.record.clone();
            next.rewind_to(target);
            self.persist(&next)?;
            self.record = next;
        }

        self.position = target;
        self.state = SessionState::Active(target);
        Ok(target)
    }

    /// Save the current position and pause the session.
    ///
    /// Responses at or beyond the position are dropped so the stored record
    /// keeps every response below its cursor; the status is unchanged.
    pub fn stop(&mut self) -> Result<()> {
        let index = self.active_index("stop")?;

        let mut next = self.record.clone();
        next.rewind_to(index);
        self.persist(&next)?;

        self.record = next;
        self.state = SessionState::Paused;
        tracing::debug!(student = self.student, list = %self.list.name, cursor = index, "paused");
        Ok(())
    }

    /// Reset a complete record and start over from the first exercise.
    ///
    /// Not declining is the caller's decision; declining simply drops the
    /// session and leaves the complete record untouched.
    pub fn retake(&mut self) -> Result<()> {
        if !self.record.is_complete() {
            return Err(ClassworkError::InvalidInput(
                "only a complete list can be retaken".into(),
            ));
        }

        let next = ProgressRecord::new();
        self.persist(&next)?;

        self.record = next;
        self.position = 0;
        self.state = SessionState::Active(0);
        self.resumed = false;
        tracing::info!(student = self.student, list = %self.list.name, "list restarted for retake");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::mock::MemoryStore;
    use crate::model::{Exercise, Status, NOT_OFFERED};

    const STUDENT: StudentId = 1234567;

    fn list(keys: &[&str]) -> ExerciseList {
        let exercises = keys
            .iter()
            .enumerate()
            .map(|(i, key)| {
                Exercise::new(
                    format!("Tema {i}"),
                    format!("Pergunta {i}"),
                    vec!["x".into(), "y".into(), NOT_OFFERED.into()],
                    Some(*key),
                )
                .unwrap()
            })
            .collect();
        ExerciseList::new("lista.json", exercises)
    }

    #[test]
    fn n_answers_complete_the_list() {
        for n in 1..=5 {
            let keys = vec!["a"; n];
            let list = list(&keys);
            let store = MemoryStore::new();
            let mut session = AnsweringSession::open(&store, STUDENT, &list, BackPolicy::Immediate).unwrap();
            for i in 0..n {
                assert_eq!(session.state(), SessionState::Active(i));
                assert_eq!(session.answer(if i % 2 == 0 { "a" } else { "B" }).unwrap(), i + 1);
            }
            assert_eq!(session.state(), SessionState::Completed);
            let stored = store.record(STUDENT, "lista.json").unwrap();
            assert_eq!(stored.cursor, n);
            assert_eq!(stored.status, Status::Complete);
            assert_eq!(store.save_count(), n as u32);
            assert!(session.progress().is_complete);
        }
    }

    #[test]
    fn invalid_letter_changes_nothing() {
        let list = list(&["a", "b"]);
        let store = MemoryStore::new();
        let mut session = AnsweringSession::open(&store, STUDENT, &list, BackPolicy::Immediate).unwrap();
        // 'c' is not offered
        assert!(session.answer("c").unwrap_err().is_input_error());
        assert!(session.answer("parar").is_err());
        assert_eq!(session.state(), SessionState::Active(0));
        assert_eq!(store.save_count(), 0);
        assert!(store.record(STUDENT, "lista.json").is_none());
    }

    #[test]
    fn back_on_first_exercise_is_noop() {
        let list = list(&["a", "b"]);
        let store = MemoryStore::new();
        let mut session = AnsweringSession::open(&store, STUDENT, &list, BackPolicy::Immediate).unwrap();
        assert_eq!(session.back().unwrap(), 0);
        assert_eq!(session.state(), SessionState::Active(0));
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn immediate_back_persists_regressed_cursor() {
        let list = list(&["a", "b", "a"]);
        let store = MemoryStore::new();
        let mut session = AnsweringSession::open(&store, STUDENT, &list, BackPolicy::Immediate).unwrap();
        session.answer("a").unwrap();
        session.answer("b").unwrap();
        assert_eq!(session.back().unwrap(), 1);

        let stored = store.record(STUDENT, "lista.json").unwrap();
        assert_eq!(stored.cursor, 1);
        assert_eq!(stored.responses, BTreeMap::from([(0, 'a')]));

        session.answer("a").unwrap();
        let stored = store.record(STUDENT, "lista.json").unwrap();
        assert_eq!(stored.cursor, 2);
        assert_eq!(stored.responses, BTreeMap::from([(0, 'a'), (1, 'a')]));
    }

    #[test]
    fn deferred_back_leaves_stored_cursor_until_stop() {
        let list = list(&["a", "b", "a"]);
        let store = MemoryStore::new();
        let mut session = AnsweringSession::open(&store, STUDENT, &list, BackPolicy::Deferred).unwrap();
        session.answer("a").unwrap();
        session.answer("b").unwrap();
        let saves = store.save_count();

        assert_eq!(session.back().unwrap(), 1);
        assert_eq!(session.position(), 1);
        assert_eq!(store.save_count(), saves);
        assert_eq!(store.record(STUDENT, "lista.json").unwrap().cursor, 2);

        session.stop().unwrap();
        let stored = store.record(STUDENT, "lista.json").unwrap();
        assert_eq!(stored.cursor, 1);
        assert_eq!(stored.responses, BTreeMap::from([(0, 'a')]));
        assert_eq!(stored.status, Status::InProgress);
    }

    #[test]
    fn deferred_back_then_answer_rewrites_from_position() {
        let list = list(&["a", "b", "a"]);
        let store = MemoryStore::new();
        let mut session = AnsweringSession::open(&store, STUDENT, &list, BackPolicy::Deferred).unwrap();
        session.answer("a").unwrap();
        session.answer("b").unwrap();
        session.back().unwrap();
        session.back().unwrap();
        assert_eq!(session.answer("b").unwrap(), 1);

        let stored = store.record(STUDENT, "lista.json").unwrap();
        assert_eq!(stored.cursor, 1);
        assert_eq!(stored.responses, BTreeMap::from([(0, 'b')]));
    }

    #[test]
    fn stop_pauses_and_resumes() {
        let list = list(&["b", "a"]);
        let store = MemoryStore::new();
        {
            let mut session = AnsweringSession::open(&store, STUDENT, &list, BackPolicy::Immediate).unwrap();
            session.answer("b").unwrap();
            session.stop().unwrap();
            assert_eq!(session.state(), SessionState::Paused);
            assert!(session.answer("a").is_err());
            assert!(session.stop().is_err());
        }

        let session = AnsweringSession::open(&store, STUDENT, &list, BackPolicy::Immediate).unwrap();
        assert!(session.is_resumed());
        assert_eq!(session.state(), SessionState::Active(1));
        assert_eq!(session.current().unwrap().prompt, "Pergunta 1");
        assert_eq!(
            session.progress(),
            SessionProgress {
                total: 2,
                answered: 1,
                remaining: 1,
                is_complete: false
            }
        );
    }

    #[test]
    fn retake_requires_complete_record() {
        let list = list(&["a"]);
        let store = MemoryStore::new();
        let mut session = AnsweringSession::open(&store, STUDENT, &list, BackPolicy::Immediate).unwrap();
        assert!(session.retake().unwrap_err().is_input_error());

        session.answer("a").unwrap();
        session.retake().unwrap();
        assert_eq!(session.state(), SessionState::Active(0));
        let stored = store.record(STUDENT, "lista.json").unwrap();
        assert_eq!(stored, ProgressRecord::new());
    }

    #[test]
    fn completed_record_opens_completed_and_survives_decline() {
        let list = list(&["a"]);
        let store = MemoryStore::new();
        let mut done = ProgressRecord::new();
        done.record_answer(0, 'b', 1);
        store.seed_progress(STUDENT, "lista.json", done.clone());

        let mut session = AnsweringSession::open(&store, STUDENT, &list, BackPolicy::Immediate).unwrap();
        assert_eq!(session.state(), SessionState::Completed);
        assert!(session.current().is_none());
        assert!(session.answer("a").is_err());
        assert!(session.back().is_err());
        drop(session);

        assert_eq!(store.record(STUDENT, "lista.json"), Some(done));
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn failed_write_leaves_session_untouched() {
        let list = list(&["a", "b"]);
        let store = MemoryStore::new();
        let mut session = AnsweringSession::open(&store, STUDENT, &list, BackPolicy::Immediate).unwrap();
        session.answer("a").unwrap();

        store.set_fail_saves(true);
        let err = session.answer("b").unwrap_err();
        assert!(matches!(err, ClassworkError::Io { .. }));
        assert_eq!(session.state(), SessionState::Active(1));
        assert_eq!(session.record().cursor, 1);
        assert!(session.back().is_err());
        assert_eq!(session.position(), 1);
        assert!(session.stop().is_err());
        assert_eq!(session.state(), SessionState::Active(1));

        store.set_fail_saves(false);
        assert_eq!(session.answer("b").unwrap(), 2);
    }

    #[test]
    fn empty_list_is_not_found() {
        let empty = ExerciseList::new("vazia.json", vec![]);
        let store = MemoryStore::new();
        let result = AnsweringSession::open(&store, STUDENT, &empty, BackPolicy::Immediate);
        assert!(matches!(result, Err(ClassworkError::NotFound(_))));
    }

    #[test]
    fn stale_record_is_normalized_on_open() {
        let list = list(&["a", "b"]);
        let store = MemoryStore::new();
        store.seed_progress(
            STUDENT,
            "lista.json",
            ProgressRecord {
                cursor: 9,
                responses: BTreeMap::from([(0, 'a'), (1, 'z')]),
                status: Status::InProgress,
            },
        );
        let session = AnsweringSession::open(&store, STUDENT, &list, BackPolicy::Immediate).unwrap();
        assert_eq!(session.state(), SessionState::Completed);
        assert_eq!(session.record().responses, BTreeMap::from([(0, 'a')]));
    }

    #[test]
    fn list_with_no_offered_alternative_is_refused() {
        let mut holes = list(&["a"]);
        holes.exercises.push(Exercise::from_parts(
            "Tema".into(),
            "Vazia".into(),
            vec![NOT_OFFERED.into(), NOT_OFFERED.into(), NOT_OFFERED.into()],
            None,
        ));
        let store = MemoryStore::new();
        let err = AnsweringSession::open(&store, STUDENT, &holes, BackPolicy::Immediate)
            .err()
            .unwrap();
        assert!(err.is_input_error());
        assert!(err.to_string().contains("exercise 2"));
        assert_eq!(store.load_progress(STUDENT, "lista.json").unwrap(), None);
    }
}
