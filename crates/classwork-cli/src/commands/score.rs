//! The `classwork score` command, plus the score printout shared with `answer`.

use std::io::{self, Write};

use anyhow::Result;
use comfy_table::{Cell, Table};

use classwork_core::report::format_ratio;
use classwork_core::scoring::{score, ScoreSummary};
use classwork_core::traits::{ExerciseSource, ProgressStore};

use super::Workspace;

fn option_display(label: char, text: Option<&str>) -> String {
    let label = label.to_ascii_uppercase();
    match text {
        Some(text) => format!("{label}) {text}"),
        None => format!("{label} (not an offered option)"),
    }
}

/// Print a score table followed by the detail of every incorrect answer.
pub fn write_score<W: Write>(out: &mut W, summary: &ScoreSummary) -> io::Result<()> {
    let mut table = Table::new();
    table.set_header(vec![
        "Exercises",
        "Correct",
        "Incorrect",
        "Unanswered",
        "No key",
        "Score",
    ]);
    table.add_row(vec![
        Cell::new(summary.total),
        Cell::new(summary.correct),
        Cell::new(summary.incorrect),
        Cell::new(summary.unanswered),
        Cell::new(summary.undefined),
        Cell::new(format_ratio(summary.percent())),
    ]);
    writeln!(out, "{table}")?;
    writeln!(
        out,
        "Score: {}/{} ({})",
        summary.correct,
        summary.graded(),
        format_ratio(summary.percent())
    )?;

    if !summary.incorrect_items.is_empty() {
        writeln!(out, "\nIncorrect answers:")?;
        for item in &summary.incorrect_items {
            writeln!(out, "\nExercise {} ({})", item.index + 1, item.topic)?;
            writeln!(out, "  {}", item.prompt)?;
            writeln!(
                out,
                "  Your answer:    {}",
                option_display(item.chosen_label, item.chosen_text.as_deref())
            )?;
            writeln!(
                out,
                "  Correct answer: {}",
                option_display(item.correct_label, item.correct_text.as_deref())
            )?;
        }
    }
    Ok(())
}

pub fn execute(ws: &Workspace, student: &str, list_name: &str) -> Result<()> {
    let user = ws.student(student)?;
    let list = ws.store.load_list(list_name)?;
    let Some(record) = ws.store.load_normalized(user.id, &list)? else {
        println!("{} has not started '{list_name}' yet.", user.name);
        return Ok(());
    };

    println!(
        "{} on '{}' ({}):",
        user.name,
        list.name,
        record.status
    );
    let summary = score(&list, &record.responses);
    write_score(&mut io::stdout().lock(), &summary)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use classwork_core::scoring::IncorrectItem;

    #[test]
    fn score_printout_lists_mistakes() {
        let summary = ScoreSummary {
            total: 3,
            correct: 1,
            incorrect: 1,
            unanswered: 1,
            undefined: 0,
            incorrect_items: vec![IncorrectItem {
                index: 1,
                topic: "Soma".into(),
                prompt: "Quanto é 2+2?".into(),
                chosen_label: 'a',
                chosen_text: Some("3".into()),
                correct_label: 'b',
                correct_text: Some("4".into()),
            }],
        };
        let mut out = Vec::new();
        write_score(&mut out, &summary).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Score: 1/2 (50.0%)"));
        assert!(text.contains("Exercise 2 (Soma)"));
        assert!(text.contains("Your answer:    A) 3"));
        assert!(text.contains("Correct answer: B) 4"));
    }

    #[test]
    fn option_without_text() {
        assert_eq!(option_display('c', None), "C (not an offered option)");
    }
}
