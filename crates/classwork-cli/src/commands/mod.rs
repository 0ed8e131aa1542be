//! One module per subcommand, plus the shared [`Workspace`].

pub mod answer;
pub mod class;
pub mod exercise;
pub mod init;
pub mod lists;
pub mod login;
pub mod register;
pub mod report;
pub mod review;
pub mod score;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use classwork_core::accounts::{parse_id, Role, User};
use classwork_core::config::{load_config_from, ClassworkConfig};
use classwork_core::store::FileStore;
use classwork_core::ClassworkError;

/// Resolved configuration and the stores it points at.
pub struct Workspace {
    pub config: ClassworkConfig,
    pub store: FileStore,
}

impl Workspace {
    /// Load the config, letting `--data-dir` win over file and environment.
    pub fn load(config_path: Option<&Path>, data_dir: Option<PathBuf>) -> Result<Self> {
        let mut config = load_config_from(config_path)?;
        if let Some(dir) = data_dir {
            config = config.with_data_dir(dir);
        }
        tracing::debug!(data_dir = %config.data_dir.display(), "using data directory");
        let store = FileStore::from_config(&config);
        Ok(Self { config, store })
    }

    /// Look up a registered student by matricula.
    pub fn student(&self, id: &str) -> Result<User> {
        let id = parse_id(id)?;
        let users = self.store.load_users().context("failed to load users")?;
        let user = users
            .get(id)
            .cloned()
            .ok_or_else(|| ClassworkError::NotFound(format!("student {id} is not registered")))?;
        if user.role != Role::Student {
            bail!("{} ({id}) is not a student", user.name);
        }
        Ok(user)
    }
}
