//! Progress and language persistence.
//!
//! The contract is total: `load` hands back defaults when nothing usable is
//! stored, `save` logs failures instead of returning them. Fallible I/O lives
//! in private helpers returning [`StoreError`].

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing::{debug, error, warn};

use crate::domain::{Language, Progress};

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("I/O error on {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("invalid JSON in {path}: {source}")]
  Json {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("unknown language tag {0:?}")]
  UnknownLanguage(String),
}

pub trait ProgressStore: Send + Sync {
  fn load(&self) -> Progress;
  fn save(&self, progress: &Progress);
}

pub trait LanguageStore: Send + Sync {
  fn load(&self) -> Language;
  fn save(&self, lang: Language);
}

/// File-backed stores: progress as JSON, the language as a bare tag.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
  progress_path: PathBuf,
  language_path: PathBuf,
  /// Returned while no valid tag has been stored.
  default_language: Language,
}

impl JsonFileStore {
  pub fn new(progress_path: impl Into<PathBuf>, language_path: impl Into<PathBuf>) -> Self {
    Self {
      progress_path: progress_path.into(),
      language_path: language_path.into(),
      default_language: Language::default(),
    }
  }

  pub fn with_default_language(mut self, lang: Language) -> Self {
    self.default_language = lang;
    self
  }

  fn read_progress(&self) -> Result<Option<Progress>, StoreError> {
    let Some(raw) = read_optional(&self.progress_path)? else {
      return Ok(None);
    };
    serde_json::from_str(&raw)
      .map(Some)
      .map_err(|source| StoreError::Json { path: self.progress_path.clone(), source })
  }

  fn write_progress(&self, progress: &Progress) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(progress)
      .map_err(|source| StoreError::Json { path: self.progress_path.clone(), source })?;
    write_file(&self.progress_path, &json)
  }

  fn read_language(&self) -> Result<Option<Language>, StoreError> {
    let Some(raw) = read_optional(&self.language_path)? else {
      return Ok(None);
    };
    Language::from_tag(&raw)
      .map(Some)
      .ok_or_else(|| StoreError::UnknownLanguage(raw.trim().to_string()))
  }
}

impl ProgressStore for JsonFileStore {
  fn load(&self) -> Progress {
    match self.read_progress() {
      Ok(Some(p)) => p,
      Ok(None) => {
        debug!(target: "progress", path = %self.progress_path.display(), "no stored progress; using defaults");
        Progress::default()
      }
      Err(e) => {
        error!(target: "progress", error = %e, "failed to load progress; using defaults");
        Progress::default()
      }
    }
  }

  fn save(&self, progress: &Progress) {
    if let Err(e) = self.write_progress(progress) {
      error!(target: "progress", error = %e, "failed to save progress");
    }
  }
}

impl LanguageStore for JsonFileStore {
  fn load(&self) -> Language {
    match self.read_language() {
      Ok(lang) => lang.unwrap_or(self.default_language),
      Err(e) => {
        warn!(target: "progress", error = %e, "failed to load language; using default");
        self.default_language
      }
    }
  }

  fn save(&self, lang: Language) {
    if let Err(e) = write_file(&self.language_path, lang.tag()) {
      error!(target: "progress", error = %e, "failed to save language");
    }
  }
}

fn read_optional(path: &Path) -> Result<Option<String>, StoreError> {
  match std::fs::read_to_string(path) {
    Ok(s) if s.trim().is_empty() => Ok(None),
    Ok(s) => Ok(Some(s)),
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
    Err(source) => Err(StoreError::Io { path: path.to_path_buf(), source }),
  }
}

fn write_file(path: &Path, contents: &str) -> Result<(), StoreError> {
  let io = |source| StoreError::Io { path: path.to_path_buf(), source };
  if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
    std::fs::create_dir_all(dir).map_err(io)?;
  }
  std::fs::write(path, contents).map_err(io)
}

/// In-process stores for tests and throwaway runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
  progress: Mutex<Option<Progress>>,
  language: Mutex<Option<Language>>,
}

impl ProgressStore for MemoryStore {
  fn load(&self) -> Progress {
    self.progress.lock().map(|p| p.clone().unwrap_or_default()).unwrap_or_default()
  }

  fn save(&self, progress: &Progress) {
    if let Ok(mut slot) = self.progress.lock() {
      *slot = Some(progress.clone());
    }
  }
}

impl LanguageStore for MemoryStore {
  fn load(&self) -> Language {
    self.language.lock().map(|l| l.unwrap_or_default()).unwrap_or_default()
  }

  fn save(&self, lang: Language) {
    if let Ok(mut slot) = self.language.lock() {
      *slot = Some(lang);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::LevelRecord;

  fn file_store(dir: &tempfile::TempDir) -> JsonFileStore {
    JsonFileStore::new(dir.path().join("data/progress.json"), dir.path().join("data/language.txt"))
  }

  #[test]
  fn missing_files_load_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir);
    assert_eq!(ProgressStore::load(&store), Progress::default());
    assert_eq!(LanguageStore::load(&store), Language::Ca);
  }

  #[test]
  fn progress_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir);
    let mut p = Progress { total_points: 120, onboarding_complete: true, ..Progress::default() };
    p.completed_levels.insert(3, LevelRecord { stars: 2, score: 50 });
    p.badges.push("first_steps".into());

    ProgressStore::save(&store, &p);
    assert_eq!(ProgressStore::load(&store), p);

    let raw = std::fs::read_to_string(dir.path().join("data/progress.json")).unwrap();
    assert!(raw.contains("\"highestUnlockedLevel\""));
    assert!(raw.contains("\"onboardingComplete\": true"));
  }

  #[test]
  fn corrupt_progress_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir);
    std::fs::create_dir_all(dir.path().join("data")).unwrap();
    std::fs::write(dir.path().join("data/progress.json"), "{not json").unwrap();
    assert_eq!(ProgressStore::load(&store), Progress::default());
    assert!(matches!(store.read_progress(), Err(StoreError::Json { .. })));
  }

  #[test]
  fn language_is_stored_as_a_tag() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir);
    LanguageStore::save(&store, Language::De);
    assert_eq!(std::fs::read_to_string(dir.path().join("data/language.txt")).unwrap(), "de");
    assert_eq!(LanguageStore::load(&store), Language::De);

    std::fs::write(dir.path().join("data/language.txt"), "klingon").unwrap();
    assert_eq!(LanguageStore::load(&store), Language::Ca);
  }

  #[test]
  fn configured_default_language_applies_until_saved() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir).with_default_language(Language::Es);
    assert_eq!(LanguageStore::load(&store), Language::Es);
    LanguageStore::save(&store, Language::En);
    assert_eq!(LanguageStore::load(&store), Language::En);
  }

  #[test]
  fn memory_store_keeps_last_save() {
    let store = MemoryStore::default();
    assert_eq!(ProgressStore::load(&store).current_level, 1);
    let p = Progress { current_level: 4, highest_unlocked_level: 4, ..Progress::default() };
    ProgressStore::save(&store, &p);
    assert_eq!(ProgressStore::load(&store), p);
    LanguageStore::save(&store, Language::Es);
    assert_eq!(LanguageStore::load(&store), Language::Es);
  }
}
