//! The `classwork register` command.

use anyhow::{Context, Result};

use classwork_core::accounts::Registration;

use super::Workspace;

pub fn execute(
    ws: &Workspace,
    id: String,
    name: String,
    age: String,
    role: String,
    password: String,
    password_confirmation: String,
) -> Result<()> {
    let user = Registration {
        id,
        name,
        age,
        role,
        password,
        password_confirmation,
    }
    .validate()?;

    let mut users = ws.store.load_users().context("failed to load users")?;
    users.register(user.clone())?;
    ws.store.save_users(&users)?;

    tracing::info!(id = user.id, role = %user.role, "registered user");
    println!("Registered {} {} ({})", user.role, user.name, user.id);
    Ok(())
}
