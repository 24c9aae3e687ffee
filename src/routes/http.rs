//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented; failures come back as `ApiError` responses.

use std::sync::Arc;
use axum::{extract::{Path, Query, State}, Json, response::IntoResponse};
use tracing::instrument;

use crate::domain::Progress;
use crate::error::ApiError;
use crate::logic::*;
use crate::protocol::*;
use crate::session::SessionKind;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_get_question(
  State(state): State<Arc<AppState>>,
  Query(q): Query<QuestionQuery>,
) -> Result<Json<QuestionOut>, ApiError> {
  serve_question(&state, q.level, q.lang.as_deref()).await.map(Json)
}

#[instrument(level = "info", skip(state, body), fields(%body.question_id, answer_len = body.answer.len()))]
pub async fn http_post_answer(
  State(state): State<Arc<AppState>>,
  Json(body): Json<AnswerIn>,
) -> Result<Json<AnswerOut>, ApiError> {
  evaluate_answer(&state, &body.question_id, &body.answer).await.map(Json)
}

#[instrument(level = "info", skip(body))]
pub async fn http_post_check(Json(body): Json<CheckIn>) -> impl IntoResponse {
  Json(check_pair(&body.answer, &body.expected))
}

#[instrument(level = "info", skip(state))]
pub async fn http_start_level(
  State(state): State<Arc<AppState>>,
  Json(body): Json<LevelStartIn>,
) -> Result<Json<SessionOut>, ApiError> {
  start_level(&state, body.level, body.lang.as_deref()).await.map(Json)
}

#[instrument(level = "info", skip(state, body), fields(index = body.index))]
pub async fn http_level_answer(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<SessionAnswerIn>,
) -> Result<Json<SessionAnswerOut>, ApiError> {
  answer_in_session(&state, SessionKind::Level, &id, body.index, &body.answer).await.map(Json)
}

#[instrument(level = "info", skip(state))]
pub async fn http_finish_level(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<LevelFinishOut>, ApiError> {
  finish_level(&state, &id).await.map(Json)
}

#[instrument(level = "info", skip(state))]
pub async fn http_start_onboarding(
  State(state): State<Arc<AppState>>,
  body: Option<Json<OnboardingStartIn>>,
) -> Result<Json<SessionOut>, ApiError> {
  let body = body.map(|Json(b)| b).unwrap_or_default();
  start_onboarding(&state, body.lang.as_deref()).await.map(Json)
}

#[instrument(level = "info", skip(state, body), fields(index = body.index))]
pub async fn http_onboarding_answer(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<SessionAnswerIn>,
) -> Result<Json<SessionAnswerOut>, ApiError> {
  answer_in_session(&state, SessionKind::Onboarding, &id, body.index, &body.answer).await.map(Json)
}

#[instrument(level = "info", skip(state))]
pub async fn http_finish_onboarding(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<OnboardingFinishOut>, ApiError> {
  finish_onboarding(&state, &id).await.map(Json)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_progress(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(get_progress(&state))
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_put_progress(
  State(state): State<Arc<AppState>>,
  Json(body): Json<Progress>,
) -> impl IntoResponse {
  Json(put_progress(&state, body))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_language(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(get_language(&state))
}

#[instrument(level = "info", skip(state))]
pub async fn http_put_language(
  State(state): State<Arc<AppState>>,
  Json(body): Json<LanguageBody>,
) -> Result<Json<LanguageBody>, ApiError> {
  put_language(&state, &body.language).map(Json)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_badges(
  State(state): State<Arc<AppState>>,
  Query(q): Query<LangQuery>,
) -> Result<Json<BadgesOut>, ApiError> {
  list_badges(&state, q.lang.as_deref()).map(Json)
}
