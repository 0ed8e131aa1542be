//! The `classwork lists` command.

use std::io::{self, Write};

use anyhow::{bail, Context, Result};
use comfy_table::{Cell, Table};

use classwork_core::model::{ExerciseList, ProgressRecord, StudentId};
use classwork_core::traits::{ExerciseSource, ProgressStore};

use super::answer::write_exercise;
use super::Workspace;

/// `(class, list)` pairs a student can answer, in roster order.
pub fn assigned_lists(ws: &Workspace, student: StudentId) -> Result<Vec<(String, String)>> {
    let rosters = ws.store.load_rosters().context("failed to load classes")?;
    Ok(rosters
        .classes_for_student(student)
        .into_iter()
        .flat_map(|roster| {
            roster
                .lists
                .iter()
                .map(move |list| (roster.name.clone(), list.clone()))
        })
        .collect())
}

/// Fail unless `list` reaches the student through one of their classes.
pub fn ensure_assigned(ws: &Workspace, student: StudentId, list: &str) -> Result<()> {
    if assigned_lists(ws, student)?.iter().any(|(_, l)| l == list) {
        Ok(())
    } else {
        bail!("list '{list}' is not assigned to any class of student {student}")
    }
}

fn status_text(record: Option<&ProgressRecord>, len: Option<usize>) -> String {
    match (record, len) {
        (None, _) => "not started".into(),
        (Some(r), _) if r.is_complete() => "complete".into(),
        (Some(r), Some(len)) => format!("in progress ({}/{len})", r.cursor),
        (Some(r), None) => format!("in progress ({})", r.cursor),
    }
}

/// Print every exercise of an assigned list without the answer key.
pub fn write_list<W: Write>(out: &mut W, list: &ExerciseList) -> io::Result<()> {
    writeln!(out, "--- {} ({} exercises) ---", list.name, list.len())?;
    for (index, exercise) in list.exercises.iter().enumerate() {
        write_exercise(out, index, list.len(), exercise)?;
    }
    Ok(())
}

pub fn execute(ws: &Workspace, student: &str, show: Option<&str>) -> Result<()> {
    let user = ws.student(student)?;

    if let Some(list_name) = show {
        ensure_assigned(ws, user.id, list_name)?;
        let list = ws.store.load_list(list_name)?;
        write_list(&mut io::stdout().lock(), &list)?;
        return Ok(());
    }

    let assigned = assigned_lists(ws, user.id)?;
    if assigned.is_empty() {
        println!("No lists assigned to {} yet.", user.name);
        return Ok(());
    }

    let progress = ws.store.progress_for_student(user.id)?;

    let mut table = Table::new();
    table.set_header(vec!["Class", "List", "Exercises", "Status"]);
    for (class, name) in &assigned {
        let list = ws.store.load_list(name).ok();
        let record = progress.get(name).cloned().map(|r| match &list {
            Some(list) => r.normalized(list),
            None => r,
        });
        let len = list.as_ref().map(ExerciseList::len);
        table.add_row(vec![
            Cell::new(class),
            Cell::new(name),
            Cell::new(len.map_or_else(|| "unavailable".to_string(), |n| n.to_string())),
            Cell::new(status_text(record.as_ref(), len)),
        ]);
    }

    println!("Lists for {} ({}):", user.name, user.id);
    println!("{table}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use classwork_core::model::{Exercise, NOT_OFFERED};

    #[test]
    fn list_view_shows_options_but_not_the_key() {
        let list = ExerciseList::new(
            "mat.json",
            vec![Exercise::new(
                "Soma",
                "2+2?",
                vec!["3".into(), "4".into(), NOT_OFFERED.into()],
                Some("b"),
            )
            .unwrap()],
        );
        let mut out = Vec::new();
        write_list(&mut out, &list).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("--- mat.json (1 exercises) ---"));
        assert!(text.contains("Exercise 1 of 1"));
        assert!(text.contains("  A) 3"));
        assert!(text.contains("  B) 4"));
        assert!(!text.contains("C)"));
        assert!(!text.to_lowercase().contains("correct"));
    }

    #[test]
    fn status_text_variants() {
        let mut record = ProgressRecord::new();
        assert_eq!(status_text(None, Some(2)), "not started");
        record.record_answer(0, 'a', 2);
        assert_eq!(status_text(Some(&record), Some(2)), "in progress (1/2)");
        record.record_answer(1, 'a', 2);
        assert_eq!(status_text(Some(&record), Some(2)), "complete");
    }
}
