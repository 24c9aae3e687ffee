//! Domain models: question kinds, generated questions, languages and learner progress.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Problem archetypes. Serialized names are the ones the frontend keys its text on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionKind {
  #[serde(rename = "simplify")]
  Simplify,
  #[serde(rename = "whichLarger")]
  WhichLarger,
  #[serde(rename = "add")]
  Add,
  #[serde(rename = "subtract")]
  Subtract,
  #[serde(rename = "multiply")]
  Multiply,
  #[serde(rename = "divide")]
  Divide,
  #[serde(rename = "convertToDecimal")]
  ConvertToDecimal,
  #[serde(rename = "visualRepresent")]
  VisualRepresent,
}

impl QuestionKind {
  pub const ALL: [QuestionKind; 8] = [
    QuestionKind::Simplify,
    QuestionKind::WhichLarger,
    QuestionKind::Add,
    QuestionKind::Subtract,
    QuestionKind::Multiply,
    QuestionKind::Divide,
    QuestionKind::ConvertToDecimal,
    QuestionKind::VisualRepresent,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      QuestionKind::Simplify => "simplify",
      QuestionKind::WhichLarger => "whichLarger",
      QuestionKind::Add => "add",
      QuestionKind::Subtract => "subtract",
      QuestionKind::Multiply => "multiply",
      QuestionKind::Divide => "divide",
      QuestionKind::ConvertToDecimal => "convertToDecimal",
      QuestionKind::VisualRepresent => "visualRepresent",
    }
  }

  /// Operator between the two operands in the prompt, for binary archetypes.
  pub fn operator(self) -> Option<&'static str> {
    match self {
      QuestionKind::WhichLarger => Some("vs"),
      QuestionKind::Add => Some("+"),
      QuestionKind::Subtract => Some("-"),
      QuestionKind::Multiply => Some("×"),
      QuestionKind::Divide => Some("÷"),
      _ => None,
    }
  }
}

impl std::fmt::Display for QuestionKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Display languages shipped with the game.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
  #[default]
  Ca,
  En,
  De,
  Es,
}

impl Language {
  pub fn from_tag(tag: &str) -> Option<Self> {
    match tag.trim().to_ascii_lowercase().as_str() {
      "ca" => Some(Language::Ca),
      "en" => Some(Language::En),
      "de" => Some(Language::De),
      "es" => Some(Language::Es),
      _ => None,
    }
  }

  pub fn tag(self) -> &'static str {
    match self {
      Language::Ca => "ca",
      Language::En => "en",
      Language::De => "de",
      Language::Es => "es",
    }
  }
}

/// A generated problem. Immutable once produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
  #[serde(rename = "type")]
  pub kind: QuestionKind,
  /// Operands as shown to the learner ("3/4 + 1/2", "2/5 vs 1/3", "3/4").
  pub question: String,
  /// Canonical answer text: a fraction, a two-place decimal, or a segment count.
  pub answer: String,
  // Visual questions only, so consumers never re-parse `question`.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub numerator: Option<i64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub denominator: Option<i64>,
  pub language: Language,
}

/// Result recorded for a finished level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelRecord {
  pub stars: u8,
  pub score: u32,
}

/// Learner progress as kept by the progress store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
  #[serde(default = "first_level")]
  pub current_level: u32,
  #[serde(default = "first_level")]
  pub highest_unlocked_level: u32,
  #[serde(default)]
  pub total_points: u32,
  #[serde(default)]
  pub completed_levels: BTreeMap<u32, LevelRecord>,
  #[serde(default)]
  pub badges: Vec<String>,
  #[serde(default)]
  pub onboarding_complete: bool,
}

fn first_level() -> u32 {
  1
}

impl Default for Progress {
  fn default() -> Self {
    Self {
      current_level: 1,
      highest_unlocked_level: 1,
      total_points: 0,
      completed_levels: BTreeMap::new(),
      badges: Vec::new(),
      onboarding_complete: false,
    }
  }
}
