//! The `classwork login` command.

use anyhow::{Context, Result};

use super::Workspace;

pub fn execute(ws: &Workspace, id: &str, password: &str) -> Result<()> {
    let users = ws.store.load_users().context("failed to load users")?;
    let user = users.login(id, password)?;
    println!("Welcome, {} ({})", user.name, user.role);
    Ok(())
}
