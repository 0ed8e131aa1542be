//! classwork CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

use commands::Workspace;

#[derive(Parser)]
#[command(
    name = "classwork",
    version,
    about = "Multiple-choice exercise lists for classes"
)]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory (overrides the config file and CLASSWORK_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create classwork.toml, the data directory, and an example list
    Init,

    /// Register a new account
    Register {
        /// 7-digit matricula
        #[arg(long)]
        id: String,

        #[arg(long)]
        name: String,

        #[arg(long)]
        age: String,

        /// aluno or professor
        #[arg(long, default_value = "aluno")]
        role: String,

        #[arg(long)]
        password: String,

        /// Must repeat --password
        #[arg(long)]
        confirm_password: String,
    },

    /// Check account credentials
    Login {
        #[arg(long)]
        id: String,

        #[arg(long)]
        password: String,
    },

    /// Show the lists available to a student through their classes
    Lists {
        #[arg(long)]
        student: String,

        /// Print the exercises of one assigned list without answering
        #[arg(long)]
        show: Option<String>,
    },

    /// Answer a list interactively (reads answers from stdin)
    Answer {
        #[arg(long)]
        student: String,

        /// List file name, e.g. matematica.json
        #[arg(long)]
        list: String,
    },

    /// Show a student's score on a list
    Score {
        #[arg(long)]
        student: String,

        #[arg(long)]
        list: String,
    },

    /// Review answers against the answer key
    Review {
        #[arg(long)]
        student: String,

        /// List to review; omit to see every list the student touched
        #[arg(long)]
        list: Option<String>,
    },

    /// Manage classes
    Class {
        #[command(subcommand)]
        action: commands::class::ClassAction,
    },

    /// Author exercises
    Exercise {
        #[command(subcommand)]
        action: commands::exercise::ExerciseAction,
    },

    /// Validate an exercise list file
    Validate {
        /// List name in the data directory, or a path to a list file
        #[arg(long)]
        list: String,
    },

    /// Class performance report
    Report {
        #[arg(long)]
        class: String,

        /// Restrict the report to one list
        #[arg(long)]
        list: Option<String>,

        /// Output format: text, json, markdown, html
        #[arg(long, default_value = "text")]
        format: String,

        /// Write the report to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("classwork=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = Workspace::load(cli.config.as_deref(), cli.data_dir).and_then(|ws| {
        match cli.command {
            Commands::Init => commands::init::execute(&ws),
            Commands::Register {
                id,
                name,
                age,
                role,
                password,
                confirm_password,
            } => commands::register::execute(&ws, id, name, age, role, password, confirm_password),
            Commands::Login { id, password } => commands::login::execute(&ws, &id, &password),
            Commands::Lists { student, show } => {
                commands::lists::execute(&ws, &student, show.as_deref())
            }
            Commands::Answer { student, list } => commands::answer::execute(&ws, &student, &list),
            Commands::Score { student, list } => commands::score::execute(&ws, &student, &list),
            Commands::Review { student, list } => {
                commands::review::execute(&ws, &student, list.as_deref())
            }
            Commands::Class { action } => commands::class::execute(&ws, action),
            Commands::Exercise { action } => commands::exercise::execute(&ws, action),
            Commands::Validate { list } => commands::validate::execute(&ws, &list),
            Commands::Report {
                class,
                list,
                format,
                output,
            } => commands::report::execute(&ws, &class, list.as_deref(), &format, output),
        }
    });

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
