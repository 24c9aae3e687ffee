//! Localized strings the backend hands out with questions and badges.
//! English is the fallback whenever a table has no entry for a language.

use crate::domain::{Language, QuestionKind};

/// One string per shipped language.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Localized {
  pub ca: &'static str,
  pub en: &'static str,
  pub de: &'static str,
  pub es: &'static str,
}

impl Localized {
  pub fn get(&self, lang: Language) -> &'static str {
    let s = match lang {
      Language::Ca => self.ca,
      Language::En => self.en,
      Language::De => self.de,
      Language::Es => self.es,
    };
    if s.is_empty() { self.en } else { s }
  }
}

macro_rules! text {
  ($ca:expr, $en:expr, $de:expr, $es:expr) => {
    Localized { ca: $ca, en: $en, de: $de, es: $es }
  };
}
pub(crate) use text;

/// Instruction line shown above a question of the given kind.
pub fn instruction(kind: QuestionKind, lang: Language) -> &'static str {
  let t = match kind {
    QuestionKind::Simplify => text!(
      "Simplifica la fracció",
      "Simplify the fraction",
      "Kürze den Bruch",
      "Simplifica la fracción"
    ),
    QuestionKind::WhichLarger => text!(
      "Quina fracció és més gran?",
      "Which fraction is larger?",
      "Welcher Bruch ist größer?",
      "¿Qué fracción es mayor?"
    ),
    QuestionKind::Add => text!("Suma les fraccions", "Add the fractions", "Addiere die Brüche", "Suma las fracciones"),
    QuestionKind::Subtract => text!(
      "Resta les fraccions",
      "Subtract the fractions",
      "Subtrahiere die Brüche",
      "Resta las fracciones"
    ),
    QuestionKind::Multiply => text!(
      "Multiplica les fraccions",
      "Multiply the fractions",
      "Multipliziere die Brüche",
      "Multiplica las fracciones"
    ),
    QuestionKind::Divide => text!("Divideix les fraccions", "Divide the fractions", "Dividiere die Brüche", "Divide las fracciones"),
    QuestionKind::ConvertToDecimal => text!(
      "Converteix a decimal (2 decimals)",
      "Convert to a decimal (2 places)",
      "Wandle in eine Dezimalzahl um (2 Stellen)",
      "Convierte a decimal (2 decimales)"
    ),
    QuestionKind::VisualRepresent => text!(
      "Representa la fracció amb barres",
      "Represent the fraction with bars",
      "Stelle den Bruch mit Balken dar",
      "Representa la fracción con barras"
    ),
  };
  t.get(lang)
}
