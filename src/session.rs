//! Quiz sessions: a fixed list of generated questions with one answer slot each.
//!
//! A level session plays questions of one level and ends in a level result; an
//! onboarding session plays the placement test and ends in a starting level.

use thiserror::Error;
use uuid::Uuid;

use crate::checker::{judge, Judgement};
use crate::domain::Question;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPurpose {
  Level(u32),
  Onboarding,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionKind {
  Level,
  Onboarding,
}

impl SessionPurpose {
  pub fn kind(self) -> SessionKind {
    match self {
      SessionPurpose::Level(_) => SessionKind::Level,
      SessionPurpose::Onboarding => SessionKind::Onboarding,
    }
  }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
  #[error("question index {index} out of range (session has {len})")]
  NoSuchQuestion { index: usize, len: usize },
  #[error("question {index} already answered")]
  AlreadyAnswered { index: usize },
  #[error("session already finished")]
  Finished,
}

#[derive(Clone, Debug)]
pub struct QuizSession {
  pub id: String,
  pub purpose: SessionPurpose,
  pub questions: Vec<Question>,
  /// `None` until a judged (non-blank) answer lands in the slot.
  answers: Vec<Option<bool>>,
  finished: bool,
}

impl QuizSession {
  pub fn new(purpose: SessionPurpose, questions: Vec<Question>) -> Self {
    let answers = vec![None; questions.len()];
    Self { id: Uuid::new_v4().to_string(), purpose, questions, answers, finished: false }
  }

  /// Judge `answer` for question `index`. Incomplete submissions leave the slot
  /// open; the first judged answer is final.
  pub fn submit(&mut self, index: usize, answer: &str) -> Result<Judgement, SessionError> {
    if self.finished {
      return Err(SessionError::Finished);
    }
    let len = self.questions.len();
    let question = self.questions.get(index).ok_or(SessionError::NoSuchQuestion { index, len })?;
    if self.answers[index].is_some() {
      return Err(SessionError::AlreadyAnswered { index });
    }
    let judgement = judge(question, answer);
    if judgement != Judgement::Incomplete {
      self.answers[index] = Some(judgement.is_correct());
    }
    Ok(judgement)
  }

  pub fn correct(&self) -> usize {
    self.answers.iter().filter(|a| **a == Some(true)).count()
  }

  pub fn answered(&self) -> usize {
    self.answers.iter().filter(|a| a.is_some()).count()
  }

  pub fn len(&self) -> usize {
    self.questions.len()
  }

  /// Close the session (early finishes allowed) and return the correct count.
  pub fn finish(&mut self) -> Result<usize, SessionError> {
    if self.finished {
      return Err(SessionError::Finished);
    }
    self.finished = true;
    Ok(self.correct())
  }
}
