//! API-facing errors. Each maps to an HTTP status and a `{ "error": ... }` body;
//! the WebSocket channel sends the same text in an `error` message.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use thiserror::Error;
use tracing::warn;

use crate::session::SessionError;

#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unknown question id: {0}")]
  UnknownQuestion(String),

  #[error("unknown session id: {0}")]
  UnknownSession(String),

  #[error("level {level} is outside 1..={max}")]
  BadLevel { level: u32, max: u32 },

  #[error("unsupported language tag: {0:?}")]
  BadLanguage(String),

  #[error("no visual model; send visual_start first")]
  NoVisualModel,

  #[error(transparent)]
  Session(#[from] SessionError),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::UnknownQuestion(_) | ApiError::UnknownSession(_) => StatusCode::NOT_FOUND,
      ApiError::BadLevel { .. } | ApiError::BadLanguage(_) | ApiError::NoVisualModel => StatusCode::BAD_REQUEST,
      ApiError::Session(SessionError::NoSuchQuestion { .. }) => StatusCode::BAD_REQUEST,
      ApiError::Session(SessionError::AlreadyAnswered { .. } | SessionError::Finished) => StatusCode::CONFLICT,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    warn!(target: "fracta_backend", %status, error = %self, "request rejected");
    (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
  }
}
