//! Fracta · Fraction Quiz Backend
//!
//! - Axum HTTP + WebSocket API
//! - Question generation by level, answer checking, level and placement sessions
//! - Progress, language and badges persisted to local files
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT               : u16 (default 3000)
//!   FRACTA_CONFIG_PATH : path to TOML config ([game] and [storage] tables)
//!   LOG_LEVEL          : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT         : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod fraction;
mod checker;
mod generator;
mod visual;
mod i18n;
mod badges;
mod scoring;
mod session;
mod store;
mod config;
mod error;
mod state;
mod protocol;
mod logic;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Shared state: config, stores, question and session maps.
  let state = Arc::new(AppState::new());

  let app = build_router(state.clone());

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "fracta_backend", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
