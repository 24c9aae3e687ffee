//! Answer checking.
//!
//! Both sides are parsed as fractions and compared in canonical form, so "0.5",
//! "1/2" and "2/4" are the same answer. When either side does not parse, the
//! comparison degrades to normalized string equality. Nothing here can fail:
//! the worst outcome is "incorrect".

use serde::Serialize;
use tracing::{debug, instrument};

use crate::domain::{Question, QuestionKind};
use crate::fraction::{fractions_equal, parse_fraction};
use crate::util::normalize_answer;

/// Outcome of judging one submission inside a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Judgement {
  Correct,
  Incorrect,
  /// Nothing to judge yet (blank text, or no segment selected).
  Incomplete,
}

impl Judgement {
  pub fn is_correct(self) -> bool {
    matches!(self, Judgement::Correct)
  }

  fn from_bool(ok: bool) -> Self {
    if ok { Judgement::Correct } else { Judgement::Incorrect }
  }
}

#[instrument(level = "debug", skip_all)]
pub fn check_answer(user_answer: &str, correct_answer: &str) -> bool {
  match (parse_fraction(user_answer), parse_fraction(correct_answer)) {
    (Some(user), Some(expected)) => fractions_equal(user, expected),
    _ => {
      debug!(target: "question", "answer not fraction-parseable; comparing normalized text");
      normalize_answer(user_answer) == normalize_answer(correct_answer)
    }
  }
}

/// Judge a submission for a question the way the game screen does.
///
/// Visual questions are answered with the selected segment count, which must
/// equal the question's numerator; "0" means nothing was selected yet.
/// Every other question goes through [`check_answer`].
pub fn judge(question: &Question, answer: &str) -> Judgement {
  match question.kind {
    QuestionKind::VisualRepresent => judge_segment_count(question, answer),
    _ => {
      if answer.trim().is_empty() {
        Judgement::Incomplete
      } else {
        Judgement::from_bool(check_answer(answer, &question.answer))
      }
    }
  }
}

fn judge_segment_count(question: &Question, answer: &str) -> Judgement {
  let answer = answer.trim();
  if answer.is_empty() || answer == "0" {
    return Judgement::Incomplete;
  }
  let Some(numerator) = question.numerator else {
    return Judgement::Incorrect;
  };
  match answer.parse::<i64>() {
    Ok(count) => Judgement::from_bool(count == numerator),
    Err(_) => Judgement::Incorrect,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::Language;

  fn visual(numerator: i64, denominator: i64) -> Question {
    Question {
      kind: QuestionKind::VisualRepresent,
      question: format!("{numerator}/{denominator}"),
      answer: numerator.to_string(),
      numerator: Some(numerator),
      denominator: Some(denominator),
      language: Language::En,
    }
  }

  #[test]
  fn equivalent_notations_are_accepted() {
    assert!(check_answer("0.5", "1/2"));
    assert!(check_answer("2/4", "1/2"));
    assert!(check_answer(" 1 / 2 ", "0.50"));
    assert!(check_answer("3", "6/2"));
    assert!(!check_answer("1/3", "1/2"));
  }

  #[test]
  fn decimal_answers_compare_at_two_places() {
    assert!(check_answer("0.33", "0.33"));
    assert!(check_answer("0.333", "0.33"));
    assert!(!check_answer("1/3", "0.33"));
  }

  #[test]
  fn unparseable_input_falls_back_to_text_equality() {
    assert!(check_answer("Half", "half"));
    assert!(check_answer("t w o", "two"));
    assert!(!check_answer("", "1/2"));
    assert!(!check_answer("abc", "1/2"));
    assert!(!check_answer("1/0", "1/2"));
  }

  #[test]
  fn symmetric_for_parseable_pairs() {
    let samples = ["1/2", "2/4", "0.5", "3", "6/2", "-1/2", "0.25", "1/4", "7/8"];
    for a in samples {
      for b in samples {
        assert_eq!(check_answer(a, b), check_answer(b, a), "{a} vs {b}");
      }
    }
  }

  #[test]
  fn visual_questions_compare_segment_count_with_numerator() {
    let q = visual(3, 4);
    assert_eq!(judge(&q, "0"), Judgement::Incomplete);
    assert_eq!(judge(&q, ""), Judgement::Incomplete);
    assert_eq!(judge(&q, "2"), Judgement::Incorrect);
    assert_eq!(judge(&q, "3"), Judgement::Correct);
    assert_eq!(judge(&q, "three"), Judgement::Incorrect);
  }

  #[test]
  fn text_questions_need_non_blank_answers() {
    let q = Question {
      kind: QuestionKind::Add,
      question: "1/4 + 1/4".into(),
      answer: "1/2".into(),
      numerator: None,
      denominator: None,
      language: Language::En,
    };
    assert_eq!(judge(&q, "   "), Judgement::Incomplete);
    assert_eq!(judge(&q, "2/4"), Judgement::Correct);
    assert_eq!(judge(&q, "1/4"), Judgement::Incorrect);
  }
}
