//! The `classwork review` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use classwork_core::scoring::{review, ReviewItem, Verdict};
use classwork_core::traits::{ExerciseSource, ProgressStore};

use super::Workspace;

fn answer_cell(label: Option<char>, text: Option<&str>) -> String {
    match (label, text) {
        (None, _) => "-".into(),
        (Some(l), Some(t)) => format!("{}) {t}", l.to_ascii_uppercase()),
        (Some(l), None) => format!("{} (not offered)", l.to_ascii_uppercase()),
    }
}

fn review_table(items: &[ReviewItem]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["#", "Topic", "Prompt", "Your answer", "Correct answer", "Result"]);
    for item in items {
        table.add_row(vec![
            Cell::new(item.index + 1),
            Cell::new(&item.topic),
            Cell::new(&item.prompt),
            Cell::new(answer_cell(item.chosen, item.chosen_text.as_deref())),
            Cell::new(answer_cell(item.correct, item.correct_text.as_deref())),
            Cell::new(item.verdict),
        ]);
    }
    table
}

pub fn execute(ws: &Workspace, student: &str, list_name: Option<&str>) -> Result<()> {
    let user = ws.student(student)?;

    let Some(list_name) = list_name else {
        let progress = ws.store.progress_for_student(user.id)?;
        if progress.is_empty() {
            println!("{} has not answered any list yet.", user.name);
            return Ok(());
        }
        let mut table = Table::new();
        table.set_header(vec!["List", "Answered", "Status"]);
        for (name, record) in progress {
            let record = match ws.store.load_list(&name) {
                Ok(list) => record.normalized(&list),
                Err(_) => record,
            };
            table.add_row(vec![
                Cell::new(name),
                Cell::new(record.responses.len()),
                Cell::new(record.status),
            ]);
        }
        println!("Lists answered by {}:", user.name);
        println!("{table}");
        println!("Run again with --list <name> to review one of them.");
        return Ok(());
    };

    let list = ws.store.load_list(list_name)?;
    let responses = ws
        .store
        .load_normalized(user.id, &list)?
        .map(|r| r.responses)
        .unwrap_or_default();
    let items = review(&list, &responses);

    let correct = items.iter().filter(|i| i.verdict == Verdict::Correct).count();
    println!("Review of '{}' for {}:", list.name, user.name);
    println!("{}", review_table(&items));
    println!("{correct} of {} correct.", items.len());
    Ok(())
}
