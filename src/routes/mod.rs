//! Router assembly: HTTP endpoints, WebSocket upgrade, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket at `/ws`
/// - quiz, session, progress and badge API under `/api/v1/...`
/// - Static SPA from `./static` with index fallback
/// - CORS (allow any origin/method/headers)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    let static_service = ServeDir::new("./static")
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new("./static/index.html"));

    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // Single questions
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/question", get(http::http_get_question))
        .route("/api/v1/answer", post(http::http_post_answer))
        .route("/api/v1/check", post(http::http_post_check))
        // Sessions
        .route("/api/v1/level", post(http::http_start_level))
        .route("/api/v1/level/:id/answer", post(http::http_level_answer))
        .route("/api/v1/level/:id/finish", post(http::http_finish_level))
        .route("/api/v1/onboarding", post(http::http_start_onboarding))
        .route("/api/v1/onboarding/:id/answer", post(http::http_onboarding_answer))
        .route("/api/v1/onboarding/:id/finish", post(http::http_finish_onboarding))
        // Learner data
        .route(
            "/api/v1/progress",
            get(http::http_get_progress).put(http::http_put_progress),
        )
        .route(
            "/api/v1/language",
            get(http::http_get_language).put(http::http_put_language),
        )
        .route("/api/v1/badges", get(http::http_get_badges))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Frontend fallback
        .fallback_service(static_service)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::AppConfig;
    use crate::state::seeded_rng;
    use crate::store::MemoryStore;

    fn app() -> (Router, Arc<AppState>) {
        let mem = Arc::new(MemoryStore::default());
        let state = Arc::new(AppState::with_parts(
            AppConfig::default(),
            mem.clone(),
            mem,
            seeded_rng(Some(5)),
        ));
        (build_router(state.clone()), state)
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                req = req.header("content-type", "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let resp = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn health() {
        let (app, _) = app();
        let (status, body) = call(&app, Method::GET, "/api/v1/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "ok": true }));
    }

    #[tokio::test]
    async fn question_then_answer() {
        let (app, state) = app();
        let (status, q) = call(&app, Method::GET, "/api/v1/question?level=5&lang=de", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(q["language"], "de");
        assert!(q["instruction"].as_str().is_some_and(|s| !s.is_empty()));

        let id = q["id"].as_str().unwrap().to_string();
        let expected = state.get_question(&id).await.unwrap().answer;
        let (status, res) = call(
            &app,
            Method::POST,
            "/api/v1/answer",
            Some(json!({ "questionId": id, "answer": expected })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(res["correct"], true);
        assert_eq!(res["judgement"], "correct");

        let (status, _) = call(
            &app,
            Method::POST,
            "/api/v1/answer",
            Some(json!({ "questionId": id, "answer": "1/2" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn errors_map_to_statuses() {
        let (app, _) = app();
        let (status, body) = call(&app, Method::GET, "/api/v1/question?level=99", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("99"));

        let (status, _) = call(
            &app,
            Method::POST,
            "/api/v1/answer",
            Some(json!({ "questionId": "nope", "answer": "1/2" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(&app, Method::POST, "/api/v1/level/nope/finish", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn stateless_check() {
        let (app, _) = app();
        let (_, res) = call(
            &app,
            Method::POST,
            "/api/v1/check",
            Some(json!({ "answer": "0.5", "expected": "2/4" })),
        )
        .await;
        assert_eq!(res, json!({ "correct": true }));
    }

    #[tokio::test]
    async fn level_session_over_http() {
        let (app, state) = app();
        let (status, started) = call(&app, Method::POST, "/api/v1/level", Some(json!({ "level": 2 }))).await;
        assert_eq!(status, StatusCode::OK);
        let id = started["id"].as_str().unwrap().to_string();
        assert_eq!(started["questions"].as_array().unwrap().len(), 8);

        let questions = state.sessions.read().await[&id].questions.clone();
        for (i, q) in questions.iter().enumerate() {
            let (status, res) = call(
                &app,
                Method::POST,
                &format!("/api/v1/level/{id}/answer"),
                Some(json!({ "index": i, "answer": q.answer })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(res["judgement"], "correct");
        }

        let (status, _) = call(
            &app,
            Method::POST,
            &format!("/api/v1/level/{id}/answer"),
            Some(json!({ "index": 0, "answer": questions[0].answer })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, done) = call(&app, Method::POST, &format!("/api/v1/level/{id}/finish"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(done["score"], 80);
        assert_eq!(done["stars"], 3);
        assert_eq!(done["progress"]["highestUnlockedLevel"], 3);

        let (status, _) = call(&app, Method::POST, &format!("/api/v1/level/{id}/finish"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, progress) = call(&app, Method::GET, "/api/v1/progress", None).await;
        assert_eq!(progress["totalPoints"], 80);
    }

    #[tokio::test]
    async fn onboarding_without_body() {
        let (app, _) = app();
        let (status, started) = call(&app, Method::POST, "/api/v1/onboarding", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(started["questions"].as_array().unwrap().len(), 10);
        let id = started["id"].as_str().unwrap();

        let (status, done) = call(&app, Method::POST, &format!("/api/v1/onboarding/{id}/finish"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(done["startingLevel"], 1);
        assert_eq!(done["progress"]["onboardingComplete"], true);
    }

    #[tokio::test]
    async fn language_and_badges() {
        let (app, _) = app();
        let (_, lang) = call(&app, Method::GET, "/api/v1/language", None).await;
        assert_eq!(lang, json!({ "language": "ca" }));

        let (status, _) = call(&app, Method::PUT, "/api/v1/language", Some(json!({ "language": "fr" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, lang) = call(&app, Method::PUT, "/api/v1/language", Some(json!({ "language": "en" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(lang["language"], "en");

        let (status, badges) = call(&app, Method::GET, "/api/v1/badges", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(badges["totalEarned"], 1);
        assert_eq!(badges["badges"][0]["name"], "First Steps");
    }

    #[tokio::test]
    async fn progress_can_be_replaced() {
        let (app, _) = app();
        let body = json!({ "currentLevel": 4, "highestUnlockedLevel": 6, "totalPoints": 90 });
        let (status, _) = call(&app, Method::PUT, "/api/v1/progress", Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        let (_, p) = call(&app, Method::GET, "/api/v1/progress", None).await;
        assert_eq!(p["currentLevel"], 4);
        assert_eq!(p["badges"], json!([]));
        assert_eq!(p["onboardingComplete"], false);
    }
}
