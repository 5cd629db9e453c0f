//! TOML file backed completion flags.
//!
//! The file holds a single `[flags]` table keyed by
//! [`TutorialType::completion_key`]:
//!
//! ```toml
//! [flags]
//! crafting_completed = true
//! buy_hint_completed = true
//! ```
//!
//! A missing file reads as "nothing completed". Unknown keys are preserved
//! on write. Filesystem access goes through `cap_std::fs_utf8`.

use std::collections::BTreeMap;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ProgressStore, key_of};
use crate::error::ProgressError;
use crate::tutorial::TutorialType;

/// File name used under the data directory.
const PROGRESS_FILE_NAME: &str = "progress.toml";

/// Application directory under the data directory.
const APP_DIR: &str = "tutorseq";

#[derive(Debug, Default, Serialize, Deserialize)]
struct ProgressFile {
    #[serde(default)]
    flags: BTreeMap<String, bool>,
}

/// Resolves the default progress file location from the environment.
///
/// Uses `$XDG_DATA_HOME/tutorseq/progress.toml`, falling back to
/// `$HOME/.local/share/tutorseq/progress.toml`. Returns `None` when neither
/// variable is set.
#[must_use]
pub fn default_progress_path<E: mockable::Env>(env: &E) -> Option<Utf8PathBuf> {
    let non_empty = |name: &str| env.string(name).filter(|value| !value.is_empty());
    let data_home = non_empty("XDG_DATA_HOME")
        .map(Utf8PathBuf::from)
        .or_else(|| non_empty("HOME").map(|home| Utf8PathBuf::from(home).join(".local/share")))?;
    Some(data_home.join(APP_DIR).join(PROGRESS_FILE_NAME))
}

/// Completion flags stored in a TOML file.
#[derive(Debug, Clone)]
pub struct TomlProgressStore {
    path: Utf8PathBuf,
}

impl TomlProgressStore {
    /// Creates a store backed by the file at `path`. The file is created on
    /// first write.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    fn split_path(&self) -> (&Utf8Path, &str) {
        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_str().is_empty())
            .unwrap_or_else(|| Utf8Path::new("."));
        let file_name = self.path.file_name().unwrap_or(PROGRESS_FILE_NAME);
        (parent, file_name)
    }

    fn io_error(&self, error: &io::Error) -> ProgressError {
        ProgressError::Io {
            path: self.path.clone(),
            message: error.to_string(),
        }
    }

    fn load(&self) -> Result<ProgressFile, ProgressError> {
        let (parent, file_name) = self.split_path();
        let dir = match Dir::open_ambient_dir(parent, ambient_authority()) {
            Ok(dir) => dir,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(ProgressFile::default()),
            Err(e) => return Err(self.io_error(&e)),
        };
        let content = match dir.read_to_string(file_name) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(ProgressFile::default()),
            Err(e) => return Err(self.io_error(&e)),
        };
        toml::from_str(&content).map_err(|e| ProgressError::Parse {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    fn save(&self, file: &ProgressFile) -> Result<(), ProgressError> {
        let (parent, file_name) = self.split_path();
        Dir::create_ambient_dir_all(parent, ambient_authority())
            .map_err(|e| self.io_error(&e))?;
        let dir =
            Dir::open_ambient_dir(parent, ambient_authority()).map_err(|e| self.io_error(&e))?;
        let content = toml::to_string(file).map_err(|e| ProgressError::Parse {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        dir.write(file_name, content)
            .map_err(|e| self.io_error(&e))?;
        debug!(path = %self.path, "progress file written");
        Ok(())
    }
}

impl ProgressStore for TomlProgressStore {
    fn is_completed(&self, tutorial: TutorialType) -> Result<bool, ProgressError> {
        let key = key_of(tutorial)?;
        Ok(self.load()?.flags.get(key).copied().unwrap_or(false))
    }

    fn mark_completed(&self, tutorial: TutorialType) -> Result<(), ProgressError> {
        let key = key_of(tutorial)?;
        let mut file = self.load()?;
        if file.flags.get(key) == Some(&true) {
            return Ok(());
        }
        file.flags.insert(String::from(key), true);
        self.save(&file)
    }

    fn reset(&self) -> Result<(), ProgressError> {
        let mut file = self.load()?;
        for tutorial in TutorialType::ACTIVE {
            if let Some(key) = tutorial.completion_key() {
                file.flags.remove(key);
            }
        }
        self.save(&file)
    }
}
