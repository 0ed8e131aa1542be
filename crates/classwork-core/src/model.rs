//! Core data model types for classwork.
//!
//! Exercises and exercise lists are authored outside the core and are
//! read-only here. Progress records are the only state the answering session
//! mutates.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ClassworkError, Result};

/// Numeric user identifier (matrícula).
pub type StudentId = u32;

/// Labels of the alternatives stored for each exercise, in order.
pub const OPTION_LABELS: [char; 3] = ['a', 'b', 'c'];

/// Alternative text meaning "this option is not offered".
pub const NOT_OFFERED: &str = "N/A";

/// Parse a user- or file-supplied option label into its lowercase form.
///
/// Accepts exactly one ASCII letter, surrounding whitespace ignored.
pub fn parse_label(input: &str) -> Option<char> {
    let mut chars = input.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => Some(c.to_ascii_lowercase()),
        _ => None,
    }
}

/// One offered alternative of an exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExerciseOption<'a> {
    /// Lowercase label (`'a'`, `'b'`, ...).
    pub label: char,
    pub text: &'a str,
}

/// A single multiple-choice exercise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exercise {
    pub topic: String,
    pub prompt: String,
    /// Alternative texts by position; [`NOT_OFFERED`] marks a hole.
    alternatives: Vec<String>,
    correct: Option<char>,
}

impl Exercise {
    /// Author a new exercise.
    ///
    /// Exactly one text per entry of [`OPTION_LABELS`] is required; at least
    /// one of them must be offered, and the correct label (if any) must name
    /// an offered alternative.
    pub fn new(
        topic: impl Into<String>,
        prompt: impl Into<String>,
        alternatives: Vec<String>,
        correct: Option<&str>,
    ) -> Result<Self> {
        let topic = topic.into();
        let prompt = prompt.into();

        if topic.trim().is_empty() {
            return Err(ClassworkError::InvalidInput("topic is empty".into()));
        }
        if prompt.trim().is_empty() {
            return Err(ClassworkError::InvalidInput("prompt is empty".into()));
        }
        if alternatives.len() < OPTION_LABELS.len() {
            return Err(ClassworkError::InvalidInput(format!(
                "at least {} alternatives are required, got {}",
                OPTION_LABELS.len(),
                alternatives.len()
            )));
        }
        if alternatives.len() > OPTION_LABELS.len() {
            return Err(ClassworkError::InvalidInput(format!(
                "at most {} alternatives are supported, got {}",
                OPTION_LABELS.len(),
                alternatives.len()
            )));
        }

        let correct = match correct.map(str::trim).filter(|c| !c.is_empty()) {
            None => None,
            Some(raw) => Some(parse_label(raw).ok_or_else(|| {
                ClassworkError::InvalidInput(format!("correct answer '{raw}' is not a letter"))
            })?),
        };

        let exercise = Self::from_parts(topic, prompt, alternatives, correct);
        if exercise.labels().is_empty() {
            return Err(ClassworkError::InvalidInput(
                "every alternative is marked N/A".into(),
            ));
        }
        if let Some(label) = exercise.correct {
            if exercise.option_text(label).is_none() {
                return Err(ClassworkError::InvalidInput(format!(
                    "correct answer '{label}' is not an offered alternative"
                )));
            }
        }
        Ok(exercise)
    }

    /// Build an exercise as stored, without authoring checks.
    pub(crate) fn from_parts(
        topic: String,
        prompt: String,
        alternatives: Vec<String>,
        correct: Option<char>,
    ) -> Self {
        Self {
            topic,
            prompt,
            alternatives,
            correct,
        }
    }

    /// Raw alternative texts by position, including holes.
    pub fn alternatives(&self) -> &[String] {
        &self.alternatives
    }

    /// The offered alternatives, in label order.
    pub fn options(&self) -> impl Iterator<Item = ExerciseOption<'_>> {
        self.alternatives
            .iter()
            .zip(OPTION_LABELS)
            .filter(|(text, _)| text.as_str() != NOT_OFFERED)
            .map(|(text, label)| ExerciseOption {
                label,
                text: text.as_str(),
            })
    }

    /// Labels of the offered alternatives.
    pub fn labels(&self) -> Vec<char> {
        self.options().map(|o| o.label).collect()
    }

    /// Text of the offered alternative with this label.
    pub fn option_text(&self, label: char) -> Option<&str> {
        let label = label.to_ascii_lowercase();
        self.options().find(|o| o.label == label).map(|o| o.text)
    }

    /// The correct label, when the author defined one.
    pub fn correct(&self) -> Option<char> {
        self.correct
    }

    /// The correct label if it names an offered alternative.
    ///
    /// A key pointing at an "N/A" slot can never be answered, so it grades
    /// like an exercise without a key.
    pub fn answer_key(&self) -> Option<char> {
        self.correct.filter(|&label| self.option_text(label).is_some())
    }

    /// Whether at least one alternative is offered.
    pub fn is_answerable(&self) -> bool {
        self.options().next().is_some()
    }

    /// Validate an answer for this exercise, returning its normalized label.
    pub fn accept(&self, input: &str) -> Result<char> {
        parse_label(input)
            .filter(|label| self.option_text(*label).is_some())
            .ok_or_else(|| {
                let valid: Vec<String> = self.labels().iter().map(char::to_string).collect();
                ClassworkError::InvalidInput(format!(
                    "'{}' is not one of {}",
                    input.trim(),
                    valid.join("/")
                ))
            })
    }
}

/// A named, ordered exercise list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseList {
    /// Storage key (e.g. `matematica.json`).
    pub name: String,
    pub exercises: Vec<Exercise>,
}

impl ExerciseList {
    pub fn new(name: impl Into<String>, exercises: Vec<Exercise>) -> Self {
        Self {
            name: name.into(),
            exercises,
        }
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Exercise> {
        self.exercises.get(index)
    }

    /// Number of exercises whose answer key names an offered option.
    pub fn keyed_count(&self) -> usize {
        self.exercises
            .iter()
            .filter(|e| e.answer_key().is_some())
            .count()
    }

    /// Index of the first exercise that offers no alternative at all.
    pub fn first_unanswerable(&self) -> Option<usize> {
        self.exercises.iter().position(|e| !e.is_answerable())
    }
}

/// Completion status of a progress record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    #[default]
    #[serde(rename = "iniciado")]
    InProgress,
    #[serde(rename = "completo")]
    Complete,
}

impl Status {
    /// The status implied by a cursor position.
    pub fn for_cursor(cursor: usize, len: usize) -> Self {
        if cursor >= len {
            Status::Complete
        } else {
            Status::InProgress
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::InProgress => write!(f, "in progress"),
            Status::Complete => write!(f, "complete"),
        }
    }
}

/// Persisted answering progress of one student on one list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    /// Index of the next unanswered exercise.
    #[serde(rename = "progresso")]
    pub cursor: usize,
    /// Chosen label per exercise index, only for indices below the cursor.
    #[serde(rename = "respostas", default)]
    pub responses: BTreeMap<usize, char>,
    #[serde(default)]
    pub status: Status,
}

impl ProgressRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_complete(&self) -> bool {
        self.status == Status::Complete
    }

    /// Whether the record counts towards class aggregates.
    pub fn has_progress(&self) -> bool {
        self.is_complete() || self.cursor > 0
    }

    /// Record `label` for exercise `index` and advance the cursor past it.
    ///
    /// Responses at or beyond the new cursor are discarded.
    pub fn record_answer(&mut self, index: usize, label: char, len: usize) {
        self.responses.insert(index, label);
        self.cursor = index + 1;
        self.responses.retain(|&k, _| k < self.cursor);
        self.status = Status::for_cursor(self.cursor, len);
    }

    /// Move the cursor back to `position`, discarding responses at or beyond it.
    pub fn rewind_to(&mut self, position: usize) {
        self.cursor = position;
        self.responses.retain(|&k, _| k < position);
    }

    /// Bring a stored record back in line with the list it belongs to.
    ///
    /// Clamps the cursor, drops responses that are out of range or name no
    /// offered option, and recomputes the status. Returns `true` if anything
    /// changed.
    pub fn normalize(&mut self, list: &ExerciseList) -> bool {
        let before = self.clone();
        self.cursor = self.cursor.min(list.len());
        let cursor = self.cursor;
        self.responses.retain(|&k, label| {
            k < cursor
                && list
                    .get(k)
                    .is_some_and(|e| e.option_text(*label).is_some())
        });
        for label in self.responses.values_mut() {
            *label = label.to_ascii_lowercase();
        }
        self.status = Status::for_cursor(self.cursor, list.len());
        *self != before
    }

    /// Consume the record and return it normalized against `list`.
    pub fn normalized(mut self, list: &ExerciseList) -> Self {
        self.normalize(list);
        self
    }
}
