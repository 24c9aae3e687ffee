//! Level-driven fraction question generation.
//!
//! Flow:
//! 1) The level selects a weighted pool of archetypes (`archetype_weights`).
//! 2) One archetype is drawn with probability proportional to its weight.
//! 3) Operands are drawn inside the archetype's level-dependent bounds and the
//!    canonical answer is computed with the fraction utilities.
//!
//! Randomness comes from a [`RandomSource`] so tests can script every draw.
//! Generation never fails: an empty pool falls back to a small simplify question.

use rand::Rng;
use tracing::{debug, instrument};

use crate::domain::{Language, Question, QuestionKind};
use crate::fraction::{format_fraction, simplify_fraction, to_decimal_text};

/// Highest level the tier table distinguishes.
pub const MAX_LEVEL: u32 = 15;

/// Share of visual questions that use an improper fraction (more than one bar).
const IMPROPER_PROBABILITY: f64 = 0.3;

/// Denominator bounds shared by compare, visual and the fallback question.
const SMALL_DEN_MIN: i64 = 2;
const SMALL_DEN_MAX: i64 = 8;

/// Strategy for the random draws generation needs.
pub trait RandomSource {
  /// Uniform integer in `[min, max]`. Returns `min` when the range is empty.
  fn int_in(&mut self, min: i64, max: i64) -> i64;
  /// Uniform float in `[0, 1)`.
  fn unit(&mut self) -> f64;
}

/// Adapter from any `rand` generator (thread rng, seeded `StdRng`, ...).
#[derive(Debug)]
pub struct RngSource<R>(pub R);

impl<R: Rng> RandomSource for RngSource<R> {
  fn int_in(&mut self, min: i64, max: i64) -> i64 {
    if max <= min {
      return min;
    }
    self.0.gen_range(min..=max)
  }

  fn unit(&mut self) -> f64 {
    self.0.gen::<f64>()
  }
}

/// Archetype weights for a level, in order of first appearance.
///
/// Tiers are cumulative; an archetype listed by several tiers gains one unit of
/// weight per tier. Drawing from these weights has exactly the distribution of
/// a uniform pick over the tier list with its repeated entries.
pub fn archetype_weights(level: u32) -> Vec<(QuestionKind, u32)> {
  let mut pool: Vec<(QuestionKind, u32)> = Vec::new();
  let mut bump = |kind: QuestionKind| match pool.iter_mut().find(|(k, _)| *k == kind) {
    Some((_, w)) => *w += 1,
    None => pool.push((kind, 1)),
  };

  if level >= 1 {
    bump(QuestionKind::Simplify);
    bump(QuestionKind::VisualRepresent);
  }
  if level >= 2 {
    bump(QuestionKind::WhichLarger);
    bump(QuestionKind::VisualRepresent);
  }
  if level >= 3 {
    bump(QuestionKind::Simplify);
    bump(QuestionKind::VisualRepresent);
  }
  if level >= 4 {
    bump(QuestionKind::Add);
    bump(QuestionKind::Subtract);
  }
  if level >= 6 {
    bump(QuestionKind::Multiply);
  }
  if level >= 7 {
    bump(QuestionKind::Divide);
  }
  if level >= 9 {
    bump(QuestionKind::ConvertToDecimal);
  }
  pool
}

/// Weighted draw. `None` only for an empty pool.
fn draw_kind(pool: &[(QuestionKind, u32)], rng: &mut dyn RandomSource) -> Option<QuestionKind> {
  let total: u32 = pool.iter().map(|(_, w)| w).sum();
  if total == 0 {
    return None;
  }
  let mut ticket = rng.int_in(0, i64::from(total) - 1);
  for (kind, weight) in pool {
    let weight = i64::from(*weight);
    if ticket < weight {
      return Some(*kind);
    }
    ticket -= weight;
  }
  pool.last().map(|(k, _)| *k)
}

/// Produce one question for `level`.
#[instrument(level = "debug", skip(rng))]
pub fn generate_question(level: u32, language: Language, rng: &mut dyn RandomSource) -> Question {
  let pool = archetype_weights(level);
  let Some(kind) = draw_kind(&pool, rng) else {
    debug!(target: "question", level, "empty archetype pool; using fallback simplify");
    return fallback_simplify(language, rng);
  };

  let level = i64::from(level.min(MAX_LEVEL));
  let q = match kind {
    QuestionKind::Simplify => simplify(level, language, rng),
    QuestionKind::WhichLarger => which_larger(language, rng),
    QuestionKind::Add | QuestionKind::Multiply | QuestionKind::Divide => binary(kind, level, language, rng),
    QuestionKind::Subtract => subtract(level, language, rng),
    QuestionKind::ConvertToDecimal => decimal(level, language, rng),
    QuestionKind::VisualRepresent => visual(language, rng),
  };
  debug!(target: "question", level, kind = %q.kind, question = %q.question, "generated");
  q
}

/// Levels used by the placement test: two questions per level, capped.
pub fn onboarding_level(index: usize, max_level: u32) -> u32 {
  let level = u32::try_from(index / 2 + 1).unwrap_or(u32::MAX);
  level.min(max_level)
}

fn arithmetic_max_den(level: i64) -> i64 {
  (8 + level).min(12)
}

fn proper(den: i64, rng: &mut dyn RandomSource) -> i64 {
  rng.int_in(1, den - 1)
}

fn text_question(kind: QuestionKind, question: String, answer: String, language: Language) -> Question {
  Question { kind, question, answer, numerator: None, denominator: None, language }
}

fn simplify(level: i64, language: Language, rng: &mut dyn RandomSource) -> Question {
  let max_den = (12 + 2 * level).min(20);
  let den = rng.int_in(2, max_den);
  let num = rng.int_in(1, 2 * den - 1);
  let s = simplify_fraction(num, den);
  text_question(
    QuestionKind::Simplify,
    format!("{}/{}", num, den),
    format_fraction(s.numerator, s.denominator),
    language,
  )
}

fn which_larger(language: Language, rng: &mut dyn RandomSource) -> Question {
  let den1 = rng.int_in(SMALL_DEN_MIN, SMALL_DEN_MAX);
  let num1 = proper(den1, rng);
  let den2 = rng.int_in(SMALL_DEN_MIN, SMALL_DEN_MAX);
  let num2 = proper(den2, rng);

  // num1/den1 > num2/den2, exact; ties go to the second operand.
  let larger = if num1 * den2 > num2 * den1 {
    format!("{}/{}", num1, den1)
  } else {
    format!("{}/{}", num2, den2)
  };
  text_question(
    QuestionKind::WhichLarger,
    format!("{}/{} vs {}/{}", num1, den1, num2, den2),
    larger,
    language,
  )
}

fn binary(kind: QuestionKind, level: i64, language: Language, rng: &mut dyn RandomSource) -> Question {
  let max_den = arithmetic_max_den(level);
  let den1 = rng.int_in(2, max_den);
  let num1 = proper(den1, rng);
  let den2 = rng.int_in(2, max_den);
  let num2 = proper(den2, rng);

  let (n, d) = match kind {
    QuestionKind::Add => (num1 * den2 + num2 * den1, den1 * den2),
    QuestionKind::Multiply => (num1 * num2, den1 * den2),
    _ => (num1 * den2, den1 * num2),
  };
  let s = simplify_fraction(n, d);
  text_question(
    kind,
    format!("{}/{} {} {}/{}", num1, den1, kind.operator().unwrap_or("?"), num2, den2),
    format_fraction(s.numerator, s.denominator),
    language,
  )
}

fn subtract(level: i64, language: Language, rng: &mut dyn RandomSource) -> Question {
  let max_den = arithmetic_max_den(level);
  // Floor of 3: den1 = 2 leaves no proper numerator >= 2, so the first operand would be "2/2".
  let den1 = rng.int_in(3, max_den);
  let num1 = rng.int_in(2, den1 - 1);
  let mut den2 = rng.int_in(2, max_den);
  let mut bound = (num1 * den2 / den1).min(den2 - 1);
  if bound < 1 {
    // Second operand would always exceed the first; share the denominator.
    den2 = den1;
    bound = num1;
  }
  let num2 = rng.int_in(1, bound);

  let s = simplify_fraction(num1 * den2 - num2 * den1, den1 * den2);
  text_question(
    QuestionKind::Subtract,
    format!("{}/{} - {}/{}", num1, den1, num2, den2),
    format_fraction(s.numerator, s.denominator),
    language,
  )
}

fn decimal(level: i64, language: Language, rng: &mut dyn RandomSource) -> Question {
  let den = rng.int_in(2, arithmetic_max_den(level));
  let num = proper(den, rng);
  text_question(
    QuestionKind::ConvertToDecimal,
    format!("{}/{}", num, den),
    to_decimal_text(num, den),
    language,
  )
}

fn visual(language: Language, rng: &mut dyn RandomSource) -> Question {
  let den = rng.int_in(SMALL_DEN_MIN, SMALL_DEN_MAX);
  let is_proper = rng.unit() > IMPROPER_PROBABILITY;
  let num = if is_proper { proper(den, rng) } else { rng.int_in(den, den * 2) };
  Question {
    kind: QuestionKind::VisualRepresent,
    question: format!("{}/{}", num, den),
    answer: num.to_string(),
    numerator: Some(num),
    denominator: Some(den),
    language,
  }
}

fn fallback_simplify(language: Language, rng: &mut dyn RandomSource) -> Question {
  let den = rng.int_in(SMALL_DEN_MIN, SMALL_DEN_MAX);
  let num = proper(den, rng);
  let s = simplify_fraction(num, den);
  text_question(
    QuestionKind::Simplify,
    format!("{}/{}", num, den),
    format_fraction(s.numerator, s.denominator),
    language,
  )
}
