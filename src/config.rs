//! Loading game configuration (session sizes, scoring, storage paths) from TOML.
//!
//! Every field is optional; see `GameConfig` and `StorageConfig` for defaults.

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::Language;
use crate::generator::MAX_LEVEL;

#[derive(Clone, Debug, Deserialize, Default, PartialEq)]
pub struct AppConfig {
  #[serde(default)]
  pub game: GameConfig,
  #[serde(default)]
  pub storage: StorageConfig,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
  pub questions_per_level: usize,
  pub onboarding_questions: usize,
  /// Highest level the placement test draws questions from.
  pub onboarding_max_level: u32,
  pub points_per_question: u32,
  pub max_level: u32,
  pub default_language: Language,
  /// Fixed seed for reproducible question streams (demos, debugging).
  pub rng_seed: Option<u64>,
}

impl Default for GameConfig {
  fn default() -> Self {
    Self {
      questions_per_level: 8,
      onboarding_questions: 10,
      onboarding_max_level: 6,
      points_per_question: 10,
      max_level: MAX_LEVEL,
      default_language: Language::Ca,
      rng_seed: None,
    }
  }
}

impl GameConfig {
  pub fn max_level_score(&self) -> u32 {
    self.points_per_question.saturating_mul(self.questions_per_level as u32)
  }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
  pub progress_path: String,
  pub language_path: String,
}

impl Default for StorageConfig {
  fn default() -> Self {
    Self {
      progress_path: "./data/progress.json".into(),
      language_path: "./data/language.txt".into(),
    }
  }
}

/// Attempt to load `AppConfig` from FRACTA_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_config_from_env() -> Option<AppConfig> {
  let path = std::env::var("FRACTA_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<AppConfig>(&s) {
      Ok(cfg) => {
        info!(target: "fracta_backend", %path, "Loaded game config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "fracta_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "fracta_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
