//! The `classwork report` command.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use comfy_table::{Cell, Table};

use classwork_core::report::{format_ratio, ClassReport};
use classwork_core::statistics::{class_report, list_report};
use classwork_report::html::{generate_html, write_html_report};

use super::Workspace;

pub fn execute(
    ws: &Workspace,
    class: &str,
    list: Option<&str>,
    format: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    let rosters = ws.store.load_rosters().context("failed to load classes")?;
    let roster = rosters.get(class)?;

    let report = match list {
        Some(list) => list_report(roster, list, &ws.store, &ws.store)?,
        None => class_report(roster, &ws.store, &ws.store)?,
    };

    let rendered = match format {
        "json" => {
            if let Some(path) = &output {
                report.save_json(path)?;
                println!("Report written to {}", path.display());
                return Ok(());
            }
            serde_json::to_string_pretty(&report).context("failed to serialize report")?
        }
        "markdown" | "md" => report.to_markdown(),
        "html" => {
            if let Some(path) = &output {
                write_html_report(&report, path)?;
                println!("Report written to {}", path.display());
                return Ok(());
            }
            generate_html(&report)
        }
        "text" => text_report(&report),
        other => bail!("unknown format '{other}' (expected text, json, markdown, html)"),
    };

    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, rendered)
                .with_context(|| format!("failed to write report to {}", path.display()))?;
            println!("Report written to {}", path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

fn text_report(report: &ClassReport) -> String {
    let mut text = format!(
        "Class {}: {} students, {} lists\n",
        report.class_name,
        report.students.len(),
        report.lists.len()
    );
    for u in &report.unavailable {
        text.push_str(&format!("Unavailable: {} ({})\n", u.list, u.reason));
    }
    if report.lists.is_empty() {
        if report.unavailable.is_empty() {
            text.push_str("No lists assigned.\n");
        }
        return text;
    }

    let mut summary = Table::new();
    summary.set_header(vec!["List", "Correct", "Counted", "Students", "Ratio"]);
    for perf in &report.lists {
        let r = &perf.result;
        summary.add_row(vec![
            Cell::new(&r.list),
            Cell::new(r.numerator),
            Cell::new(r.denominator),
            Cell::new(r.students_counted),
            Cell::new(format_ratio(r.ratio)),
        ]);
    }
    text.push_str(&format!("{summary}\n"));

    for perf in &report.lists {
        let mut table = Table::new();
        table.set_header(vec!["Student", "Correct", "Counted", "Status"]);
        for s in &perf.per_student {
            table.add_row(vec![
                Cell::new(s.student),
                Cell::new(s.correct),
                Cell::new(s.counted),
                Cell::new(s.status_label()),
            ]);
        }
        text.push_str(&format!("\n{}\n{table}\n", perf.result.list));
    }
    text
}
