//! JSON file storage.
//!
//! [`load_json`] and [`save_json`] are the raw load/save pair: absent, empty,
//! or unparseable files fall back to the caller's default (with a warning),
//! and saving creates parent directories and rewrites the whole file.
//! [`FileStore`] builds the typed stores on top of them and adds schema
//! checks, so JSON that parses but has the wrong shape is reported as
//! [`ClassworkError::DataCorrupt`] instead of being read with silent defaults.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;

use crate::accounts::UserBook;
use crate::config::{ClassworkConfig, StorePaths};
use crate::error::{ClassworkError, Result};
use crate::model::{Exercise, ExerciseList, ProgressRecord, StudentId};
use crate::parser::{exercise_list_to_value, parse_exercise_list_value};
use crate::roster::RosterBook;
use crate::schema;
use crate::traits::{ExerciseSource, ProgressStore};

/// The whole progress store: student → list name → record.
pub type ProgressBook = BTreeMap<StudentId, BTreeMap<String, ProgressRecord>>;

/// Read a file as JSON.
///
/// `Ok(None)` when the file is absent, empty, or not valid JSON; the last
/// case is logged. Other read failures are returned.
fn read_value(path: &Path) -> Result<Option<Value>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(ClassworkError::io(path, e)),
    };
    if content.trim().is_empty() {
        return Ok(None);
    }
    match serde_json::from_str(&content) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "corrupt or invalid JSON, using default data"
            );
            Ok(None)
        }
    }
}

/// Load JSON from `path`, returning `default` if the file is absent, empty,
/// unreadable, or does not parse into `T`.
pub fn load_json<T: DeserializeOwned>(path: &Path, default: T) -> T {
    match read_value(path) {
        Ok(Some(value)) => match serde_json::from_value(value) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unexpected JSON shape, using default data");
                default
            }
        },
        Ok(None) => default,
        Err(e) => {
            tracing::warn!(error = %e, "failed to read file, using default data");
            default
        }
    }
}

/// Load a typed store, checking its shape with `check` first.
fn load_checked<T>(path: &Path, check: fn(&Value) -> Vec<String>) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let Some(value) = read_value(path)? else {
        return Ok(T::default());
    };
    let bad = check(&value);
    if !bad.is_empty() {
        return Err(ClassworkError::DataCorrupt {
            path: path.to_path_buf(),
            fields: bad,
        });
    }
    serde_json::from_value(value).map_err(|e| ClassworkError::DataCorrupt {
        path: path.to_path_buf(),
        fields: vec![e.to_string()],
    })
}

/// Save `data` as pretty-printed JSON, creating parent directories as needed.
pub fn save_json<T: Serialize + ?Sized>(data: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ClassworkError::io(parent, e))?;
    }

    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    data.serialize(&mut ser)
        .map_err(|e| ClassworkError::io(path, std::io::Error::from(e)))?;

    std::fs::write(path, buf).map_err(|e| ClassworkError::io(path, e))?;
    tracing::debug!(path = %path.display(), "saved");
    Ok(())
}

/// The JSON stores under one data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    paths: StorePaths,
}

impl FileStore {
    pub fn new(paths: StorePaths) -> Self {
        Self { paths }
    }

    pub fn from_config(config: &ClassworkConfig) -> Self {
        Self::new(config.store_paths())
    }

    pub fn paths(&self) -> &StorePaths {
        &self.paths
    }

    /// Create the lists directory and empty store files that do not exist yet.
    pub fn ensure_layout(&self) -> Result<()> {
        std::fs::create_dir_all(&self.paths.lists_dir)
            .map_err(|e| ClassworkError::io(&self.paths.lists_dir, e))?;
        for path in [&self.paths.users, &self.paths.rosters, &self.paths.progress] {
            if !path.exists() {
                save_json(&serde_json::json!({}), path)?;
            }
        }
        Ok(())
    }

    pub fn load_users(&self) -> Result<UserBook> {
        load_checked(&self.paths.users, schema::user_fields)
    }

    pub fn save_users(&self, users: &UserBook) -> Result<()> {
        save_json(users, &self.paths.users)
    }

    pub fn load_rosters(&self) -> Result<RosterBook> {
        load_checked(&self.paths.rosters, schema::roster_fields)
    }

    pub fn save_rosters(&self, rosters: &RosterBook) -> Result<()> {
        save_json(rosters, &self.paths.rosters)
    }

    pub fn load_progress_book(&self) -> Result<ProgressBook> {
        load_checked(&self.paths.progress, schema::progress_fields)
    }

    pub fn save_progress_book(&self, book: &ProgressBook) -> Result<()> {
        save_json(book, &self.paths.progress)
    }

    /// Path of a list file. Names are plain file names inside the lists directory.
    pub fn list_path(&self, name: &str) -> Result<PathBuf> {
        let name = name.trim();
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(ClassworkError::InvalidInput(format!(
                "invalid list name '{name}'"
            )));
        }
        Ok(self.paths.lists_dir.join(name))
    }

    pub fn save_list(&self, list: &ExerciseList) -> Result<()> {
        let path = self.list_path(&list.name)?;
        save_json(&exercise_list_to_value(list), &path)
    }

    /// Append one exercise to a list, creating the list if needed.
    ///
    /// Returns the new number of exercises.
    pub fn append_exercise(&self, list_name: &str, exercise: Exercise) -> Result<usize> {
        let mut list = match self.load_list(list_name) {
            Ok(list) => list,
            Err(ClassworkError::NotFound(_)) => ExerciseList::new(list_name.trim(), Vec::new()),
            Err(e) => return Err(e),
        };
        list.exercises.push(exercise);
        self.save_list(&list)?;
        Ok(list.len())
    }

    /// Names of every stored list, sorted.
    pub fn list_names(&self) -> Result<Vec<String>> {
        let entries = match std::fs::read_dir(&self.paths.lists_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(ClassworkError::io(&self.paths.lists_dir, e)),
        };
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| ClassworkError::io(&self.paths.lists_dir, e))?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }
}

impl ProgressStore for FileStore {
    fn load_progress(&self, student: StudentId, list: &str) -> Result<Option<ProgressRecord>> {
        let book = self.load_progress_book()?;
        Ok(book.get(&student).and_then(|lists| lists.get(list)).cloned())
    }

    fn save_progress(
        &self,
        student: StudentId,
        list: &str,
        record: &ProgressRecord,
    ) -> Result<()> {
        let mut book = self.load_progress_book()?;
        book.entry(student)
            .or_default()
            .insert(list.to_string(), record.clone());
        self.save_progress_book(&book)
    }

    fn progress_for_student(
        &self,
        student: StudentId,
    ) -> Result<BTreeMap<String, ProgressRecord>> {
        let mut book = self.load_progress_book()?;
        Ok(book.remove(&student).unwrap_or_default())
    }
}

impl ExerciseSource for FileStore {
    fn load_list(&self, name: &str) -> Result<ExerciseList> {
        let path = self.list_path(name)?;
        if !path.exists() {
            return Err(ClassworkError::NotFound(format!("exercise list '{name}'")));
        }
        match read_value(&path)? {
            Some(value) => parse_exercise_list_value(name.trim(), value, &path),
            None => Ok(ExerciseList::new(name.trim(), Vec::new())),
        }
    }
}
