//! Shape checks for the persisted JSON stores.
//!
//! Each check walks a parsed [`Value`] and returns the path of every field
//! that does not match the store's schema, e.g. `[1].Enunciado` or
//! `["1234567"]["mat.json"].progresso`. An empty result means the value can
//! be deserialized into the typed model.

use serde_json::{Map, Value};

use crate::model::parse_label;

/// Keys of the alternative fields of an exercise, in label order.
pub const ALTERNATIVE_KEYS: [&str; 3] = ["Alternativa A", "Alternativa B", "Alternativa C"];

/// Check an exercise list file: an array of exercise objects.
pub fn exercise_list_fields(value: &Value) -> Vec<String> {
    let Some(items) = value.as_array() else {
        return vec!["<root> (expected an array of exercises)".into()];
    };

    let mut bad = Vec::new();
    for (i, item) in items.iter().enumerate() {
        let Some(obj) = item.as_object() else {
            bad.push(format!("[{i}]"));
            continue;
        };
        for key in ["Tema", "Enunciado"] {
            if !obj.get(key).is_some_and(Value::is_string) {
                bad.push(format!("[{i}].{key}"));
            }
        }
        for key in ALTERNATIVE_KEYS {
            if obj.get(key).is_some_and(|v| !v.is_string()) {
                bad.push(format!("[{i}].{key}"));
            }
        }
        match obj.get("RespostaCorreta") {
            None | Some(Value::Null) => {}
            Some(Value::String(s)) if s.trim().is_empty() || parse_label(s).is_some() => {}
            Some(_) => bad.push(format!("[{i}].RespostaCorreta")),
        }
    }
    bad
}

/// Check the progress store: student id → list name → record.
pub fn progress_fields(value: &Value) -> Vec<String> {
    let Some(students) = value.as_object() else {
        return vec!["<root> (expected an object keyed by student id)".into()];
    };

    let mut bad = Vec::new();
    for (student, lists) in students {
        let student_path = format!("[{student:?}]");
        if student.parse::<u32>().is_err() {
            bad.push(student_path.clone());
        }
        let Some(lists) = lists.as_object() else {
            bad.push(student_path);
            continue;
        };
        for (list, record) in lists {
            let path = format!("{student_path}[{list:?}]");
            check_record(&path, record, &mut bad);
        }
    }
    bad
}

fn check_record(path: &str, record: &Value, bad: &mut Vec<String>) {
    let Some(obj) = record.as_object() else {
        bad.push(path.to_string());
        return;
    };
    if !obj.get("progresso").is_some_and(Value::is_u64) {
        bad.push(format!("{path}.progresso"));
    }
    match obj.get("respostas") {
        None => {}
        Some(Value::Object(responses)) => {
            for (index, label) in responses {
                let label_ok = label.as_str().is_some_and(|s| parse_label(s).is_some());
                if index.parse::<usize>().is_err() || !label_ok {
                    bad.push(format!("{path}.respostas[{index:?}]"));
                }
            }
        }
        Some(_) => bad.push(format!("{path}.respostas")),
    }
    match obj.get("status").and_then(Value::as_str) {
        None if !obj.contains_key("status") => {}
        Some("iniciado") | Some("completo") => {}
        _ => bad.push(format!("{path}.status")),
    }
}

/// Check the roster store: class name → `{alunos, listas}`.
pub fn roster_fields(value: &Value) -> Vec<String> {
    let Some(classes) = value.as_object() else {
        return vec!["<root> (expected an object keyed by class name)".into()];
    };

    let mut bad = Vec::new();
    for (class, entry) in classes {
        let path = format!("[{class:?}]");
        let Some(obj) = entry.as_object() else {
            bad.push(path);
            continue;
        };
        if !array_of(obj, "alunos", |v| {
            v.as_u64().is_some_and(|n| u32::try_from(n).is_ok())
        }) {
            bad.push(format!("{path}.alunos"));
        }
        if !array_of(obj, "listas", Value::is_string) {
            bad.push(format!("{path}.listas"));
        }
    }
    bad
}

/// Check the user store: id string → user object.
pub fn user_fields(value: &Value) -> Vec<String> {
    let Some(users) = value.as_object() else {
        return vec!["<root> (expected an object keyed by matricula)".into()];
    };

    let mut bad = Vec::new();
    for (id, entry) in users {
        let path = format!("[{id:?}]");
        let Some(obj) = entry.as_object() else {
            bad.push(path);
            continue;
        };
        if !obj
            .get("matricula")
            .and_then(Value::as_u64)
            .is_some_and(|n| u32::try_from(n).is_ok())
        {
            bad.push(format!("{path}.matricula"));
        }
        if !obj.get("idade").is_some_and(Value::is_u64) {
            bad.push(format!("{path}.idade"));
        }
        for key in ["nome", "senha"] {
            if !obj.get(key).is_some_and(Value::is_string) {
                bad.push(format!("{path}.{key}"));
            }
        }
        if !matches!(
            obj.get("tipo").and_then(Value::as_str),
            Some("aluno") | Some("professor")
        ) {
            bad.push(format!("{path}.tipo"));
        }
    }
    bad
}

/// Absent is fine; present must be an array whose items all satisfy `item_ok`.
fn array_of(obj: &Map<String, Value>, key: &str, item_ok: impl Fn(&Value) -> bool) -> bool {
    match obj.get(key) {
        None => true,
        Some(Value::Array(items)) => items.iter().all(item_ok),
        Some(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn exercise_list_reports_each_bad_field() {
        let value = json!([
            {"Tema": "Soma", "Enunciado": "2+2?", "Alternativa A": "4", "RespostaCorreta": "a"},
            {"Tema": 3, "Alternativa B": ["x"], "RespostaCorreta": "zz"},
            "not an exercise"
        ]);
        let bad = exercise_list_fields(&value);
        assert_eq!(
            bad,
            vec![
                "[1].Tema",
                "[1].Enunciado",
                "[1].Alternativa B",
                "[1].RespostaCorreta",
                "[2]"
            ]
        );
    }

    #[test]
    fn exercise_list_must_be_array() {
        assert_eq!(exercise_list_fields(&json!({})).len(), 1);
        assert!(exercise_list_fields(&json!([])).is_empty());
    }

    #[test]
    fn progress_fields_accepts_wire_format() {
        let value = json!({
            "1234567": {"mat.json": {"progresso": 1, "respostas": {"0": "b"}, "status": "iniciado"}}
        });
        assert!(progress_fields(&value).is_empty());
    }

    #[test]
    fn progress_fields_flags_bad_record() {
        let value = json!({
            "abc": {},
            "1234567": {"mat.json": {"progresso": -1, "respostas": ["b"], "status": "feito"}}
        });
        let bad = progress_fields(&value);
        assert!(bad.contains(&"[\"abc\"]".to_string()));
        assert!(bad.contains(&"[\"1234567\"][\"mat.json\"].progresso".to_string()));
        assert!(bad.contains(&"[\"1234567\"][\"mat.json\"].respostas".to_string()));
        assert!(bad.contains(&"[\"1234567\"][\"mat.json\"].status".to_string()));
    }

    #[test]
    fn roster_and_user_fields() {
        let rosters = json!({"Turma A": {"alunos": [1234567, "x"], "listas": ["m.json"]}});
        assert_eq!(roster_fields(&rosters), vec!["[\"Turma A\"].alunos"]);

        let users = json!({"1234567": {
            "matricula": 1234567, "nome": "Ana", "idade": 20, "tipo": "monitor", "senha": "s"
        }});
        assert_eq!(user_fields(&users), vec!["[\"1234567\"].tipo"]);
    }
}
