//! The `classwork class` commands.

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use comfy_table::{Cell, Table};

use classwork_core::report::format_ratio;
use classwork_core::statistics::aggregate;
use classwork_core::traits::ExerciseSource;
use classwork_core::ClassworkError;

use super::Workspace;

#[derive(Subcommand)]
pub enum ClassAction {
    /// Create an empty class
    Create {
        /// Class name
        name: String,
    },

    /// Add a registered student to a class
    AddStudent {
        #[arg(long)]
        class: String,

        #[arg(long)]
        student: String,
    },

    /// Remove a student from a class
    RemoveStudent {
        #[arg(long)]
        class: String,

        #[arg(long)]
        student: String,
    },

    /// Assign an existing exercise list to a class
    AssignList {
        #[arg(long)]
        class: String,

        #[arg(long)]
        list: String,
    },

    /// Show every class, or one class with its performance
    Show {
        #[arg(long)]
        class: Option<String>,
    },
}

pub fn execute(ws: &Workspace, action: ClassAction) -> Result<()> {
    let mut rosters = ws.store.load_rosters().context("failed to load classes")?;

    match action {
        ClassAction::Create { name } => {
            rosters.create_class(&name)?;
            ws.store.save_rosters(&rosters)?;
            println!("Created class {}", name.trim());
        }
        ClassAction::AddStudent { class, student } => {
            let user = ws.student(&student)?;
            if rosters.add_student(&class, user.id)? {
                ws.store.save_rosters(&rosters)?;
                println!("Added {} ({}) to {class}", user.name, user.id);
            } else {
                println!("{} is already in {class}", user.id);
            }
        }
        ClassAction::RemoveStudent { class, student } => {
            let id = classwork_core::accounts::parse_id(&student)?;
            rosters.remove_student(&class, id)?;
            ws.store.save_rosters(&rosters)?;
            println!("Removed {id} from {class}");
        }
        ClassAction::AssignList { class, list } => {
            let exercises = ws.store.load_list(&list)?;
            if exercises.is_empty() {
                bail!("list '{list}' has no exercises");
            }
            if let Some(index) = exercises.first_unanswerable() {
                bail!(
                    "exercise {} of list '{list}' offers no alternative",
                    index + 1
                );
            }
            if rosters.assign_list(&class, &list)? {
                ws.store.save_rosters(&rosters)?;
                println!("Assigned {list} to {class}");
            } else {
                println!("{list} is already assigned to {class}");
            }
        }
        ClassAction::Show { class: None } => {
            if rosters.is_empty() {
                println!("No classes yet.");
                return Ok(());
            }
            let mut table = Table::new();
            table.set_header(vec!["Class", "Students", "Lists"]);
            for roster in rosters.iter() {
                table.add_row(vec![
                    Cell::new(&roster.name),
                    Cell::new(roster.students.len()),
                    Cell::new(roster.lists.join(", ")),
                ]);
            }
            println!("{table}");
        }
        ClassAction::Show { class: Some(class) } => {
            let roster = rosters.get(&class)?;
            let users = ws.store.load_users().context("failed to load users")?;

            println!("Class {}", roster.name);
            println!("\nStudents:");
            if roster.students.is_empty() {
                println!("  (none)");
            }
            for id in &roster.students {
                let name = users.get(*id).map_or("(unregistered)", |u| u.name.as_str());
                println!("  {id}  {name}");
            }

            println!("\nLists:");
            if roster.lists.is_empty() {
                println!("  (none)");
                return Ok(());
            }
            let mut table = Table::new();
            table.set_header(vec!["List", "Students counted", "Correct", "Counted", "Ratio"]);
            for name in &roster.lists {
                match aggregate(roster, name, &ws.store, &ws.store) {
                    Ok(r) => table.add_row(vec![
                        Cell::new(&r.list),
                        Cell::new(r.students_counted),
                        Cell::new(r.numerator),
                        Cell::new(r.denominator),
                        Cell::new(format_ratio(r.ratio)),
                    ]),
                    Err(err @ (ClassworkError::NotFound(_) | ClassworkError::DataCorrupt { .. })) => {
                        tracing::warn!(list = %name, error = %err, "list unavailable");
                        table.add_row(vec![
                            Cell::new(name),
                            Cell::new("-"),
                            Cell::new("-"),
                            Cell::new("-"),
                            Cell::new("unavailable"),
                        ])
                    }
                    Err(err) => return Err(err.into()),
                };
            }
            println!("{table}");
        }
    }

    Ok(())
}
