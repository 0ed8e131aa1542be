//! The `classwork init` command.

use std::path::Path;

use anyhow::{Context, Result};

use classwork_core::model::{Exercise, ExerciseList, NOT_OFFERED};

use super::Workspace;

/// File name of the example list written by `init`.
pub const EXAMPLE_LIST: &str = "exemplo.json";

pub fn execute(ws: &Workspace) -> Result<()> {
    if Path::new("classwork.toml").exists() {
        println!("classwork.toml already exists, skipping.");
    } else {
        let body = toml::to_string_pretty(&ws.config).context("failed to render config")?;
        std::fs::write("classwork.toml", format!("{CONFIG_HEADER}{body}"))
            .context("failed to write classwork.toml")?;
        println!("Created classwork.toml");
    }

    ws.store
        .ensure_layout()
        .context("failed to create the data directory")?;
    println!("Data directory ready at {}", ws.config.data_dir.display());

    if ws.store.list_path(EXAMPLE_LIST)?.exists() {
        println!("{EXAMPLE_LIST} already exists, skipping.");
    } else {
        ws.store.save_list(&example_list()?)?;
        println!("Created {EXAMPLE_LIST}");
    }

    println!("\nNext steps:");
    println!("  1. classwork register --id 1000001 --name Ana --age 20 --password s --confirm-password s");
    println!("  2. classwork class create turma-a && classwork class add-student --class turma-a --student 1000001");
    println!("  3. classwork class assign-list --class turma-a --list {EXAMPLE_LIST}");
    println!("  4. classwork answer --student 1000001 --list {EXAMPLE_LIST}");

    Ok(())
}

fn example_list() -> Result<ExerciseList> {
    let exercises = vec![
        Exercise::new(
            "Soma",
            "Quanto é 2 + 2?",
            vec!["3".into(), "4".into(), "5".into()],
            Some("b"),
        )?,
        Exercise::new(
            "Capitais",
            "Qual é a capital do Brasil?",
            vec!["Brasília".into(), "Salvador".into(), NOT_OFFERED.into()],
            Some("a"),
        )?,
    ];
    Ok(ExerciseList::new(EXAMPLE_LIST, exercises))
}

const CONFIG_HEADER: &str = "# classwork configuration
#
# data_dir    directory holding every JSON store (${VAR} references are expanded)
# back_policy immediate | deferred: when a step back is written to disk

";
