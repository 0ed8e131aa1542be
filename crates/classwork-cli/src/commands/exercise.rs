//! The `classwork exercise` commands.

use anyhow::Result;
use clap::Subcommand;

use classwork_core::model::{Exercise, NOT_OFFERED};

use super::Workspace;

#[derive(Subcommand)]
pub enum ExerciseAction {
    /// Append one exercise to a list, creating the list if needed
    Add {
        /// List file name, e.g. matematica.json
        #[arg(long)]
        list: String,

        #[arg(long)]
        topic: String,

        #[arg(long)]
        prompt: String,

        /// Alternative A
        #[arg(long)]
        a: String,

        /// Alternative B
        #[arg(long)]
        b: String,

        /// Alternative C ("N/A" if not offered)
        #[arg(long, default_value = NOT_OFFERED)]
        c: String,

        /// Label of the correct alternative
        #[arg(long)]
        correct: Option<String>,
    },
}

pub fn execute(ws: &Workspace, action: ExerciseAction) -> Result<()> {
    match action {
        ExerciseAction::Add {
            list,
            topic,
            prompt,
            a,
            b,
            c,
            correct,
        } => {
            let exercise = Exercise::new(topic, prompt, vec![a, b, c], correct.as_deref())?;
            if exercise.correct().is_none() {
                tracing::warn!(list = %list, "exercise has no correct answer and will not be scored");
            }
            let count = ws.store.append_exercise(&list, exercise)?;
            println!("Added exercise {count} to {}", list.trim());
        }
    }
    Ok(())
}
