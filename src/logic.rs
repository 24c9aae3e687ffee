//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Serving single questions and judging answers to them
//!   - Level sessions (start, answer, finish into a level result)
//!   - Onboarding sessions (start, answer, finish into a placement)
//!   - Progress, language and badge reads/writes

use tracing::{info, instrument};

use crate::badges;
use crate::checker::{check_answer, judge, Judgement};
use crate::domain::{Language, Progress};
use crate::error::ApiError;
use crate::generator::onboarding_level;
use crate::protocol::*;
use crate::scoring::{apply_level_result, apply_placement, placement_level};
use crate::session::{QuizSession, SessionKind, SessionPurpose};
use crate::state::AppState;

/// Resolve an optional language tag, falling back to the stored language.
pub fn resolve_language(state: &AppState, tag: Option<&str>) -> Result<Language, ApiError> {
  match tag {
    None => Ok(state.current_language()),
    Some(t) => Language::from_tag(t).ok_or_else(|| ApiError::BadLanguage(t.to_string())),
  }
}

fn check_level(state: &AppState, level: u32) -> Result<u32, ApiError> {
  let max = state.config.game.max_level;
  if (1..=max).contains(&level) {
    Ok(level)
  } else {
    Err(ApiError::BadLevel { level, max })
  }
}

#[instrument(level = "info", skip(state))]
pub async fn serve_question(state: &AppState, level: Option<u32>, lang: Option<&str>) -> Result<QuestionOut, ApiError> {
  let lang = resolve_language(state, lang)?;
  let level = match level {
    Some(l) => check_level(state, l)?,
    None => state.progress.load().current_level,
  };
  let (id, q) = state.issue_question(level, lang).await;
  info!(target: "question", %id, level, kind = %q.kind, "question served");
  Ok(to_out(Some(id), &q, level))
}

#[instrument(level = "info", skip(state, answer), fields(%question_id, answer_len = answer.len()))]
pub async fn evaluate_answer(state: &AppState, question_id: &str, answer: &str) -> Result<AnswerOut, ApiError> {
  let mut questions = state.questions.write().await;
  let q = questions
    .get(question_id)
    .ok_or_else(|| ApiError::UnknownQuestion(question_id.to_string()))?;
  let judgement = judge(q, answer);
  info!(target: "question", id = %question_id, ?judgement, "answer evaluated");
  // A judged question is spent; incomplete answers may try again.
  let expected = match judgement {
    Judgement::Incomplete => None,
    _ => questions.remove(question_id).map(|q| q.answer),
  };
  Ok(AnswerOut { correct: judgement.is_correct(), judgement, expected })
}

/// Stateless checker endpoint: compare two answer strings.
pub fn check_pair(answer: &str, expected: &str) -> CheckOut {
  CheckOut { correct: check_answer(answer, expected) }
}

#[instrument(level = "info", skip(state))]
pub async fn start_level(state: &AppState, level: u32, lang: Option<&str>) -> Result<SessionOut, ApiError> {
  let level = check_level(state, level)?;
  let lang = resolve_language(state, lang)?;
  let questions = (0..state.config.game.questions_per_level)
    .map(|_| state.generate(level, lang))
    .collect();
  let session = QuizSession::new(SessionPurpose::Level(level), questions);
  let out = SessionOut {
    id: session.id.clone(),
    level: Some(level),
    questions: session.questions.iter().map(|q| to_out(None, q, level)).collect(),
  };
  info!(target: "session", id = %out.id, level, questions = out.questions.len(), "level session started");
  state.insert_session(session).await;
  Ok(out)
}

#[instrument(level = "info", skip(state))]
pub async fn start_onboarding(state: &AppState, lang: Option<&str>) -> Result<SessionOut, ApiError> {
  let lang = resolve_language(state, lang)?;
  let game = &state.config.game;
  let levels: Vec<u32> = (0..game.onboarding_questions)
    .map(|i| onboarding_level(i, game.onboarding_max_level))
    .collect();
  let questions = levels.iter().map(|&l| state.generate(l, lang)).collect();
  let session = QuizSession::new(SessionPurpose::Onboarding, questions);
  let out = SessionOut {
    id: session.id.clone(),
    level: None,
    questions: session
      .questions
      .iter()
      .zip(&levels)
      .map(|(q, &l)| to_out(None, q, l))
      .collect(),
  };
  info!(target: "session", id = %out.id, questions = out.questions.len(), "onboarding session started");
  state.insert_session(session).await;
  Ok(out)
}

/// Submit an answer to a session question. `kind` selects level vs onboarding
/// sessions; a session of the other kind is reported as unknown.
#[instrument(level = "info", skip(state, answer), fields(%session_id, answer_len = answer.len()))]
pub async fn answer_in_session(
  state: &AppState,
  kind: SessionKind,
  session_id: &str,
  index: usize,
  answer: &str,
) -> Result<SessionAnswerOut, ApiError> {
  let mut sessions = state.sessions.write().await;
  let session = sessions
    .get_mut(session_id)
    .filter(|s| s.purpose.kind() == kind)
    .ok_or_else(|| ApiError::UnknownSession(session_id.to_string()))?;

  let judgement = session.submit(index, answer)?;
  let expected = match judgement {
    Judgement::Incomplete => None,
    _ => session.questions.get(index).map(|q| q.answer.clone()),
  };
  let score = points(state, session.correct());
  info!(target: "session", id = %session_id, index, ?judgement, answered = session.answered(), score, "session answer judged");
  Ok(SessionAnswerOut {
    judgement,
    correct: judgement.is_correct(),
    expected,
    answered: session.answered(),
    score,
  })
}

/// Remove a session of the given kind from the store; sessions are gone once finished.
async fn take_session(state: &AppState, kind: SessionKind, session_id: &str) -> Result<QuizSession, ApiError> {
  let mut sessions = state.sessions.write().await;
  if !sessions.get(session_id).is_some_and(|s| s.purpose.kind() == kind) {
    return Err(ApiError::UnknownSession(session_id.to_string()));
  }
  sessions
    .remove(session_id)
    .ok_or_else(|| ApiError::UnknownSession(session_id.to_string()))
}

fn points(state: &AppState, correct: usize) -> u32 {
  state.config.game.points_per_question.saturating_mul(correct as u32)
}

#[instrument(level = "info", skip(state), fields(%session_id))]
pub async fn finish_level(state: &AppState, session_id: &str) -> Result<LevelFinishOut, ApiError> {
  let mut session = take_session(state, SessionKind::Level, session_id).await?;
  let SessionPurpose::Level(level) = session.purpose else {
    return Err(ApiError::UnknownSession(session_id.to_string()));
  };
  let correct = session.finish()?;

  let score = points(state, correct);
  let max_score = state.config.game.max_level_score();
  let current = state.progress.load();
  let update = apply_level_result(&current, level, score, max_score, state.config.game.max_level);
  state.progress.save(&update.progress);

  info!(target: "session", id = %session_id, level, score, max_score, stars = update.stars, "level session finished");
  Ok(LevelFinishOut {
    level,
    score,
    max_score,
    stars: update.stars,
    new_badges: update.new_badges,
    progress: update.progress,
  })
}

#[instrument(level = "info", skip(state), fields(%session_id))]
pub async fn finish_onboarding(state: &AppState, session_id: &str) -> Result<OnboardingFinishOut, ApiError> {
  let mut session = take_session(state, SessionKind::Onboarding, session_id).await?;
  let (correct, total) = (session.finish()?, session.len());

  let starting_level = placement_level(correct, total);
  let progress = apply_placement(&state.progress.load(), starting_level);
  state.progress.save(&progress);

  info!(target: "session", id = %session_id, correct, total, starting_level, "onboarding finished");
  Ok(OnboardingFinishOut { correct, total, starting_level, progress })
}

pub fn get_progress(state: &AppState) -> Progress {
  state.progress.load()
}

#[instrument(level = "info", skip(state, progress), fields(level = progress.current_level, points = progress.total_points))]
pub fn put_progress(state: &AppState, progress: Progress) -> Progress {
  state.progress.save(&progress);
  info!(target: "progress", "progress replaced");
  progress
}

pub fn get_language(state: &AppState) -> LanguageBody {
  LanguageBody { language: state.current_language().tag().to_string() }
}

#[instrument(level = "info", skip(state))]
pub fn put_language(state: &AppState, tag: &str) -> Result<LanguageBody, ApiError> {
  let lang = Language::from_tag(tag).ok_or_else(|| ApiError::BadLanguage(tag.to_string()))?;
  state.language.save(lang);
  info!(target: "progress", lang = lang.tag(), "language stored");
  Ok(LanguageBody { language: lang.tag().to_string() })
}

pub fn list_badges(state: &AppState, lang: Option<&str>) -> Result<BadgesOut, ApiError> {
  let lang = resolve_language(state, lang)?;
  let p = state.progress.load();
  Ok(BadgesOut {
    total_earned: badges::total_earned(p.total_points, &p.badges),
    badges: badges::all_with_status(p.total_points, &p.badges, lang),
  })
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use super::*;
  use crate::config::AppConfig;
  use crate::session::SessionError;
  use crate::state::seeded_rng;
  use crate::store::MemoryStore;

  fn state() -> AppState {
    let mem = Arc::new(MemoryStore::default());
    AppState::with_parts(AppConfig::default(), mem.clone(), mem, seeded_rng(Some(11)))
  }

  async fn answer_all(state: &AppState, kind: SessionKind, id: &str, right: usize) {
    let questions = state.sessions.read().await[id].questions.clone();
    for (i, q) in questions.iter().enumerate() {
      let text = if i < right { q.answer.clone() } else { "999/1".to_string() };
      answer_in_session(state, kind, id, i, &text).await.unwrap();
    }
  }

  #[tokio::test]
  async fn served_question_is_judged_against_its_answer() {
    let s = state();
    let out = serve_question(&s, Some(3), Some("en")).await.unwrap();
    let id = out.id.clone().unwrap();
    let expected = s.get_question(&id).await.unwrap().answer;
    let res = evaluate_answer(&s, &id, &expected).await.unwrap();
    assert!(res.correct);
    assert_eq!(res.expected, Some(expected.clone()));
    assert!(matches!(evaluate_answer(&s, "nope", "1").await, Err(ApiError::UnknownQuestion(_))));
  }

  #[tokio::test]
  async fn judged_question_is_discarded() {
    let s = state();
    let id = serve_question(&s, Some(2), None).await.unwrap().id.unwrap();
    let first = evaluate_answer(&s, &id, "999/7").await.unwrap();
    assert!(!first.correct);
    assert!(s.get_question(&id).await.is_none());
    let revealed = first.expected.unwrap();
    assert!(matches!(evaluate_answer(&s, &id, &revealed).await, Err(ApiError::UnknownQuestion(_))));

    for _ in 0..50 {
      serve_question(&s, Some(2), None).await.unwrap();
    }
    assert_eq!(s.questions.read().await.len(), 50);
  }

  #[tokio::test]
  async fn blank_answer_keeps_question_and_hides_expected() {
    let s = state();
    let id = serve_question(&s, Some(5), None).await.unwrap().id.unwrap();
    let res = evaluate_answer(&s, &id, "  ").await.unwrap();
    assert_eq!(res.judgement, Judgement::Incomplete);
    assert!(res.expected.is_none());
    assert!(s.get_question(&id).await.is_some());
  }

  #[tokio::test]
  async fn bad_level_and_language_are_rejected() {
    let s = state();
    assert!(matches!(serve_question(&s, Some(0), None).await, Err(ApiError::BadLevel { .. })));
    assert!(matches!(start_level(&s, 16, None).await, Err(ApiError::BadLevel { level: 16, max: 15 })));
    assert!(matches!(serve_question(&s, Some(1), Some("fr")).await, Err(ApiError::BadLanguage(_))));
  }

  #[tokio::test]
  async fn full_level_unlocks_next_and_saves_progress() {
    let s = state();
    let started = start_level(&s, 1, Some("ca")).await.unwrap();
    assert_eq!(started.questions.len(), 8);
    answer_all(&s, SessionKind::Level, &started.id, 7).await;

    let done = finish_level(&s, &started.id).await.unwrap();
    assert_eq!((done.score, done.max_score, done.stars), (70, 80, 3));
    assert_eq!(done.new_badges, vec!["first_steps", "level_1_badge"]);
    assert_eq!(get_progress(&s), done.progress);
    assert_eq!(done.progress.highest_unlocked_level, 2);

    assert!(matches!(finish_level(&s, &started.id).await, Err(ApiError::UnknownSession(_))));
    assert!(s.sessions.read().await.is_empty());
  }

  #[tokio::test]
  async fn revealed_answer_cannot_be_resubmitted() {
    let s = state();
    let started = start_level(&s, 4, None).await.unwrap();
    let questions = s.sessions.read().await[&started.id].questions.clone();
    for (i, _) in questions.iter().enumerate() {
      let first = answer_in_session(&s, SessionKind::Level, &started.id, i, "999/7").await.unwrap();
      let revealed = first.expected.unwrap();
      assert!(matches!(
        answer_in_session(&s, SessionKind::Level, &started.id, i, &revealed).await,
        Err(ApiError::Session(SessionError::AlreadyAnswered { .. }))
      ));
    }
    let done = finish_level(&s, &started.id).await.unwrap();
    assert_eq!((done.score, done.stars), (0, 0));
  }

  #[tokio::test]
  async fn blank_session_answer_is_incomplete() {
    let s = state();
    let started = start_level(&s, 2, None).await.unwrap();
    let res = answer_in_session(&s, SessionKind::Level, &started.id, 0, "   ").await.unwrap();
    assert_eq!(res.judgement, Judgement::Incomplete);
    assert_eq!((res.answered, res.score), (0, 0));
    assert!(res.expected.is_none());
  }

  #[tokio::test]
  async fn sessions_are_not_interchangeable() {
    let s = state();
    let level = start_level(&s, 1, None).await.unwrap();
    let onboarding = start_onboarding(&s, None).await.unwrap();
    assert!(matches!(
      answer_in_session(&s, SessionKind::Onboarding, &level.id, 0, "1").await,
      Err(ApiError::UnknownSession(_))
    ));
    assert!(matches!(finish_level(&s, &onboarding.id).await, Err(ApiError::UnknownSession(_))));
    assert!(matches!(finish_onboarding(&s, &level.id).await, Err(ApiError::UnknownSession(_))));
  }

  #[tokio::test]
  async fn onboarding_places_the_learner() {
    let s = state();
    let started = start_onboarding(&s, Some("es")).await.unwrap();
    let levels: Vec<u32> = started.questions.iter().map(|q| q.level).collect();
    assert_eq!(levels, vec![1, 1, 2, 2, 3, 3, 4, 4, 5, 5]);

    answer_all(&s, SessionKind::Onboarding, &started.id, 8).await;
    let done = finish_onboarding(&s, &started.id).await.unwrap();
    assert_eq!((done.correct, done.total, done.starting_level), (8, 10, 5));
    assert!(done.progress.onboarding_complete);
    assert_eq!(get_progress(&s).current_level, 5);
    assert!(matches!(finish_onboarding(&s, &started.id).await, Err(ApiError::UnknownSession(_))));
  }

  #[test]
  fn language_round_trip_and_badges() {
    let s = state();
    assert_eq!(get_language(&s).language, "ca");
    assert_eq!(put_language(&s, "DE").unwrap().language, "de");
    assert!(matches!(put_language(&s, "xx"), Err(ApiError::BadLanguage(_))));

    put_progress(&s, Progress { total_points: 450, ..Progress::default() });
    let b = list_badges(&s, None).unwrap();
    assert_eq!(b.badges.len(), 20);
    assert_eq!(b.total_earned, 3);
    assert!(b.badges.iter().any(|x| x.name == "Bruchmeister"));
  }
}
