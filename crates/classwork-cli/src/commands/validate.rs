//! The `classwork validate` command.

use std::path::Path;

use anyhow::Result;

use classwork_core::parser::{load_exercise_list, validate_exercise_list};

use super::Workspace;

pub fn execute(ws: &Workspace, list: &str) -> Result<()> {
    let given = Path::new(list);
    let path = if given.is_file() {
        given.to_path_buf()
    } else {
        ws.store.list_path(list)?
    };

    let exercises = load_exercise_list(&path)?;
    println!("List: {} ({} exercises)", exercises.name, exercises.len());

    let warnings = validate_exercise_list(&exercises);
    for w in &warnings {
        let prefix = w
            .index
            .map(|i| format!("  [{}]", i + 1))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("List valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
