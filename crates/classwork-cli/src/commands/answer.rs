//! The `classwork answer` command: the interactive answering loop.

use std::io::{self, BufRead, Write};

use anyhow::Result;

use classwork_core::model::Exercise;
use classwork_core::scoring::{score, ScoreSummary};
use classwork_core::session::{AnsweringSession, SessionState};
use classwork_core::traits::{ExerciseSource, ProgressStore};

use super::lists::ensure_assigned;
use super::score::write_score;
use super::Workspace;

/// How an interactive run ended.
#[derive(Debug)]
pub enum Outcome {
    Completed(ScoreSummary),
    /// Stopped by the student or by end of input; progress is saved.
    Paused,
    /// The list was already complete and the student chose not to retake it.
    Declined,
}

/// Read one trimmed, lowercased line. `None` at end of input.
fn read_command<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_lowercase()))
}

fn is_yes(reply: &str) -> bool {
    matches!(reply, "y" | "yes" | "s" | "sim")
}

/// Print one exercise with its offered alternatives.
pub fn write_exercise<W: Write>(
    out: &mut W,
    index: usize,
    total: usize,
    exercise: &Exercise,
) -> io::Result<()> {
    writeln!(out, "\nExercise {} of {total}", index + 1)?;
    writeln!(out, "Topic: {}", exercise.topic)?;
    writeln!(out, "{}", exercise.prompt)?;
    for option in exercise.options() {
        writeln!(out, "  {}) {}", option.label.to_ascii_uppercase(), option.text)?;
    }
    Ok(())
}

/// Run a session against line-oriented input until it completes or pauses.
pub fn drive<S, R, W>(
    session: &mut AnsweringSession<'_, S>,
    input: &mut R,
    out: &mut W,
) -> Result<Outcome>
where
    S: ProgressStore + ?Sized,
    R: BufRead,
    W: Write,
{
    let total = session.list().len();

    if session.state() == SessionState::Completed {
        writeln!(out, "You already completed '{}'.", session.list().name)?;
        write!(out, "Retake it? (y/n): ")?;
        out.flush()?;
        match read_command(input)? {
            Some(reply) if is_yes(&reply) => {
                session.retake()?;
                writeln!(out, "List restarted.")?;
            }
            _ => {
                writeln!(out, "Keeping your previous answers.")?;
                return Ok(Outcome::Declined);
            }
        }
    } else if session.is_resumed() {
        writeln!(out, "Resuming at exercise {}.", session.position() + 1)?;
    }

    while let Some(exercise) = session.current() {
        let index = session.position();
        write_exercise(out, index, total, exercise)?;
        let labels: Vec<String> = exercise.labels().iter().map(char::to_string).collect();
        let labels = labels.join("/");

        if index > 0 {
            write!(out, "Your answer ({labels}, 'back', or 'stop' to save and exit): ")?;
        } else {
            write!(out, "Your answer ({labels}, or 'stop' to save and exit): ")?;
        }
        out.flush()?;

        let Some(command) = read_command(input)? else {
            session.stop()?;
            writeln!(out, "\nInput closed. Progress saved.")?;
            return Ok(Outcome::Paused);
        };

        match command.as_str() {
            "stop" | "parar" => {
                session.stop()?;
                writeln!(out, "Progress saved. You can continue this list later.")?;
                return Ok(Outcome::Paused);
            }
            "back" | "voltar" => {
                if index == 0 {
                    writeln!(out, "Already at the first exercise.")?;
                } else {
                    session.back()?;
                    writeln!(out, "Going back to the previous exercise.")?;
                }
            }
            letter => match session.answer(letter) {
                Ok(_) => {}
                Err(e) if e.is_input_error() => {
                    writeln!(out, "Invalid option, choose one of {labels}.")?;
                }
                Err(e) => return Err(e.into()),
            },
        }
    }

    let summary = score(session.list(), &session.record().responses);
    writeln!(out, "\nYou completed '{}'!", session.list().name)?;
    write_score(out, &summary)?;
    Ok(Outcome::Completed(summary))
}

pub fn execute(ws: &Workspace, student: &str, list_name: &str) -> Result<()> {
    let user = ws.student(student)?;
    ensure_assigned(ws, user.id, list_name)?;
    let list = ws.store.load_list(list_name)?;
    let mut session = AnsweringSession::open(&ws.store, user.id, &list, ws.config.back_policy)?;

    let mut input = io::stdin().lock();
    let mut out = io::stdout().lock();
    writeln!(out, "--- {} ---", list.name)?;
    match drive(&mut session, &mut input, &mut out)? {
        Outcome::Completed(summary) => tracing::info!(
            student = user.id,
            list = %list.name,
            correct = summary.correct,
            graded = summary.graded(),
            "final score"
        ),
        Outcome::Paused => {
            tracing::debug!(student = user.id, list = %list.name, "answering paused")
        }
        Outcome::Declined => {
            tracing::debug!(student = user.id, list = %list.name, "retake declined")
        }
    }
    Ok(())
}
