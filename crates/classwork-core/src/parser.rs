//! Exercise list parser.
//!
//! Loads exercise lists from their JSON files, checks their shape, and
//! validates them for authoring mistakes.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ClassworkError, Result};
use crate::model::{parse_label, Exercise, ExerciseList, NOT_OFFERED};
use crate::schema;

/// Wire form of one exercise in a list file.
#[derive(Debug, Serialize, Deserialize)]
struct JsonExercise {
    #[serde(rename = "Tema")]
    tema: String,
    #[serde(rename = "Enunciado")]
    enunciado: String,
    #[serde(rename = "Alternativa A", default = "not_offered")]
    alternativa_a: String,
    #[serde(rename = "Alternativa B", default = "not_offered")]
    alternativa_b: String,
    #[serde(rename = "Alternativa C", default = "not_offered")]
    alternativa_c: String,
    #[serde(
        rename = "RespostaCorreta",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    resposta_correta: Option<String>,
}

fn not_offered() -> String {
    NOT_OFFERED.to_string()
}

impl From<JsonExercise> for Exercise {
    fn from(raw: JsonExercise) -> Self {
        let correct = raw.resposta_correta.as_deref().and_then(parse_label);
        Exercise::from_parts(
            raw.tema,
            raw.enunciado,
            vec![raw.alternativa_a, raw.alternativa_b, raw.alternativa_c],
            correct,
        )
    }
}

impl From<&Exercise> for JsonExercise {
    fn from(ex: &Exercise) -> Self {
        let alt = |i: usize| {
            ex.alternatives()
                .get(i)
                .cloned()
                .unwrap_or_else(not_offered)
        };
        Self {
            tema: ex.topic.clone(),
            enunciado: ex.prompt.clone(),
            alternativa_a: alt(0),
            alternativa_b: alt(1),
            alternativa_c: alt(2),
            resposta_correta: ex.correct().map(|c| c.to_string()),
        }
    }
}

/// Parse an exercise list from a JSON string.
///
/// Malformed JSON and schema mismatches are both reported as
/// [`ClassworkError::DataCorrupt`].
pub fn parse_exercise_list_str(name: &str, content: &str, source: &Path) -> Result<ExerciseList> {
    let value: Value =
        serde_json::from_str(content).map_err(|e| ClassworkError::DataCorrupt {
            path: source.to_path_buf(),
            fields: vec![format!("<json> ({e})")],
        })?;
    parse_exercise_list_value(name, value, source)
}

/// Convert an already-parsed JSON value into an exercise list.
pub fn parse_exercise_list_value(name: &str, value: Value, source: &Path) -> Result<ExerciseList> {
    let bad = schema::exercise_list_fields(&value);
    if !bad.is_empty() {
        return Err(ClassworkError::DataCorrupt {
            path: source.to_path_buf(),
            fields: bad,
        });
    }

    let raw: Vec<JsonExercise> =
        serde_json::from_value(value).map_err(|e| ClassworkError::DataCorrupt {
            path: source.to_path_buf(),
            fields: vec![e.to_string()],
        })?;

    Ok(ExerciseList::new(
        name,
        raw.into_iter().map(Exercise::from).collect(),
    ))
}

/// Read and strictly parse a list file; the list is named after the file.
pub fn load_exercise_list(path: &Path) -> Result<ExerciseList> {
    let content =
        std::fs::read_to_string(path).map_err(|e| ClassworkError::io(path, e))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    parse_exercise_list_str(&name, &content, path)
}

/// The JSON value stored for a list.
pub fn exercise_list_to_value(list: &ExerciseList) -> Value {
    let raw: Vec<JsonExercise> = list.exercises.iter().map(JsonExercise::from).collect();
    serde_json::to_value(raw).unwrap_or(Value::Array(Vec::new()))
}

/// A warning from exercise list validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// 0-based exercise index (if applicable).
    pub index: Option<usize>,
    /// Warning message.
    pub message: String,
}

/// Validate an exercise list for common authoring issues.
pub fn validate_exercise_list(list: &ExerciseList) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if list.is_empty() {
        warnings.push(ValidationWarning {
            index: None,
            message: "list has no exercises".into(),
        });
    }

    let mut seen_prompts = std::collections::HashSet::new();
    for (i, ex) in list.exercises.iter().enumerate() {
        let mut warn = |message: String| {
            warnings.push(ValidationWarning {
                index: Some(i),
                message,
            })
        };

        if ex.prompt.trim().is_empty() {
            warn("prompt is empty".into());
        } else if !seen_prompts.insert(ex.prompt.trim()) {
            warn(format!("duplicate prompt: {}", ex.prompt.trim()));
        }

        let offered = ex.labels().len();
        if offered == 0 {
            warn("no alternative is offered; the list cannot be answered".into());
        } else if offered == 1 {
            warn("only one alternative is offered".into());
        }

        match ex.correct() {
            None => warn("no correct answer defined; excluded from scoring".into()),
            Some(label) if ex.option_text(label).is_none() => warn(format!(
                "correct answer '{label}' is not an offered alternative; excluded from scoring"
            )),
            Some(_) => {}
        }
    }

    warnings
}
