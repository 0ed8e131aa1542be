//! Single-student scoring.
//!
//! Both [`score`] and [`review`] are pure: they read the list and the
//! responses and keep no state between calls.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{Exercise, ExerciseList};

/// How one exercise was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Correct,
    Incorrect,
    Unanswered,
    /// Answered, but the exercise has no usable answer key.
    Undefined,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Correct => write!(f, "correct"),
            Verdict::Incorrect => write!(f, "incorrect"),
            Verdict::Unanswered => write!(f, "unanswered"),
            Verdict::Undefined => write!(f, "no answer key"),
        }
    }
}

/// Judge one response against one exercise.
///
/// A key naming an alternative the exercise does not offer counts as no key.
pub fn verdict(exercise: &Exercise, response: Option<char>) -> Verdict {
    match (response, exercise.answer_key()) {
        (None, _) => Verdict::Unanswered,
        (Some(_), None) => Verdict::Undefined,
        (Some(given), Some(key)) if given.to_ascii_lowercase() == key => Verdict::Correct,
        (Some(_), Some(_)) => Verdict::Incorrect,
    }
}

/// Detail of one incorrect answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncorrectItem {
    /// 0-based exercise index.
    pub index: usize,
    pub topic: String,
    pub prompt: String,
    pub chosen_label: char,
    /// `None` when the stored label names no offered alternative.
    pub chosen_text: Option<String>,
    pub correct_label: char,
    pub correct_text: Option<String>,
}

/// Score of one attempt at a list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub total: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub unanswered: usize,
    /// Answered exercises without a defined correct option.
    pub undefined: usize,
    pub incorrect_items: Vec<IncorrectItem>,
}

impl ScoreSummary {
    /// Answers that counted towards correct/incorrect.
    pub fn graded(&self) -> usize {
        self.correct + self.incorrect
    }

    /// Percentage of graded answers that were correct.
    pub fn percent(&self) -> Option<f64> {
        let graded = self.graded();
        (graded > 0).then(|| self.correct as f64 / graded as f64 * 100.0)
    }
}

/// Score a set of responses against a list.
///
/// Responses for indices outside the list are ignored.
pub fn score(list: &ExerciseList, responses: &BTreeMap<usize, char>) -> ScoreSummary {
    let mut summary = ScoreSummary {
        total: list.len(),
        ..ScoreSummary::default()
    };

    for (index, exercise) in list.exercises.iter().enumerate() {
        let response = responses.get(&index).copied();
        match verdict(exercise, response) {
            Verdict::Correct => summary.correct += 1,
            Verdict::Unanswered => summary.unanswered += 1,
            Verdict::Undefined => summary.undefined += 1,
            Verdict::Incorrect => {
                summary.incorrect += 1;
                if let (Some(chosen), Some(key)) = (response, exercise.answer_key()) {
                    summary.incorrect_items.push(IncorrectItem {
                        index,
                        topic: exercise.topic.clone(),
                        prompt: exercise.prompt.clone(),
                        chosen_label: chosen.to_ascii_lowercase(),
                        chosen_text: exercise.option_text(chosen).map(str::to_string),
                        correct_label: key,
                        correct_text: exercise.option_text(key).map(str::to_string),
                    });
                }
            }
        }
    }

    summary
}

/// One exercise as shown when a student reviews a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewItem {
    pub index: usize,
    pub topic: String,
    pub prompt: String,
    pub chosen: Option<char>,
    pub chosen_text: Option<String>,
    pub correct: Option<char>,
    pub correct_text: Option<String>,
    pub verdict: Verdict,
}

/// Every exercise of a list with the student's answer and the answer key.
pub fn review(list: &ExerciseList, responses: &BTreeMap<usize, char>) -> Vec<ReviewItem> {
    list.exercises
        .iter()
        .enumerate()
        .map(|(index, exercise)| {
            let chosen = responses.get(&index).map(char::to_ascii_lowercase);
            let correct = exercise.answer_key();
            ReviewItem {
                index,
                topic: exercise.topic.clone(),
                prompt: exercise.prompt.clone(),
                chosen,
                chosen_text: chosen
                    .and_then(|c| exercise.option_text(c))
                    .map(str::to_string),
                correct,
                correct_text: correct
                    .and_then(|c| exercise.option_text(c))
                    .map(str::to_string),
                verdict: verdict(exercise, chosen),
            }
        })
        .collect()
}
