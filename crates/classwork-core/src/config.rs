//! Configuration loading and store path layout.
//!
//! Nothing here is global: a [`ClassworkConfig`] is loaded once and the
//! derived [`StorePaths`] are handed to whatever opens the stores.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::session::BackPolicy;

/// File name of the user store inside the data directory.
pub const USERS_FILE: &str = "usuarios.json";
/// File name of the roster store inside the data directory.
pub const ROSTERS_FILE: &str = "turmas.json";
/// File name of the progress store inside the data directory.
pub const PROGRESS_FILE: &str = "progresso_alunos.json";
/// Directory holding one JSON file per exercise list.
pub const LISTS_DIR: &str = "listas_de_exercicios";

/// Environment variable overriding `data_dir`.
pub const DATA_DIR_ENV: &str = "CLASSWORK_DATA_DIR";

/// Top-level classwork configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassworkConfig {
    /// Directory holding every JSON store.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Whether going back persists the regressed cursor right away.
    #[serde(default)]
    pub back_policy: BackPolicy,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./classwork-data")
}

impl Default for ClassworkConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            back_policy: BackPolicy::default(),
        }
    }
}

impl ClassworkConfig {
    /// Replace the data directory, keeping everything else.
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    /// Paths of every store under the configured data directory.
    pub fn store_paths(&self) -> StorePaths {
        StorePaths::under(&self.data_dir)
    }
}

/// Locations of the JSON stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    pub users: PathBuf,
    pub rosters: PathBuf,
    pub progress: PathBuf,
    pub lists_dir: PathBuf,
}

impl StorePaths {
    /// The standard layout below `data_dir`.
    pub fn under(data_dir: &Path) -> Self {
        Self {
            users: data_dir.join(USERS_FILE),
            rosters: data_dir.join(ROSTERS_FILE),
            progress: data_dir.join(PROGRESS_FILE),
            lists_dir: data_dir.join(LISTS_DIR),
        }
    }
}

/// Expand a configured data path.
///
/// `${VAR}` references are replaced by the variable's value (empty when
/// unset) and a leading `~/` by the home directory. An unterminated `${` is
/// kept as written.
fn expand_data_dir(raw: &str) -> PathBuf {
    let mut expanded = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start + 2..].find('}') else {
            break;
        };
        expanded.push_str(&rest[..start]);
        let name = &rest[start + 2..start + 2 + len];
        expanded.push_str(&std::env::var(name).unwrap_or_default());
        rest = &rest[start + 3 + len..];
    }
    expanded.push_str(rest);

    if let Some(tail) = expanded.strip_prefix("~/") {
        if let Some(home) = home_dir() {
            return home.join(tail);
        }
    }
    PathBuf::from(expanded)
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order without a path:
/// 1. `classwork.toml` in the current directory
/// 2. `~/.config/classwork/config.toml`
///
/// `CLASSWORK_DATA_DIR` overrides `data_dir` from either file.
pub fn load_config_from(path: Option<&Path>) -> Result<ClassworkConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("classwork.toml");
        if local.exists() {
            Some(local)
        } else {
            home_dir()
                .map(|home| home.join(".config").join("classwork").join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = parse_config_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded config");
            config
        }
        None => ClassworkConfig::default(),
    };

    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.trim().is_empty() {
            config.data_dir = PathBuf::from(dir);
        }
    }

    Ok(config)
}

/// Parse a TOML config string, expanding `${VAR}` and `~/` in `data_dir`.
pub fn parse_config_str(content: &str) -> Result<ClassworkConfig> {
    let mut config: ClassworkConfig = toml::from_str(content)?;
    let raw = config.data_dir.to_string_lossy().into_owned();
    config.data_dir = expand_data_dir(&raw);
    Ok(config)
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
}
