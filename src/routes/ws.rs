//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic; replies go out as one JSON message each.
//!
//! A connection owns at most one visual model. Its "selected count changed"
//! signal is queued on a channel and flushed as `selected_count` messages after
//! the reply to the message that caused it.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument};

use crate::error::ApiError;
use crate::logic::*;
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::state::AppState;
use crate::util::trunc_for_log;
use crate::visual::VisualSelection;

/// Per-connection state.
pub struct WsConnection {
  visual: Option<VisualSelection>,
  counts_tx: mpsc::UnboundedSender<String>,
  counts_rx: mpsc::UnboundedReceiver<String>,
}

impl WsConnection {
  pub fn new() -> Self {
    let (counts_tx, counts_rx) = mpsc::unbounded_channel();
    Self { visual: None, counts_tx, counts_rx }
  }

  fn visual_mut(&mut self) -> Result<&mut VisualSelection, ApiError> {
    self.visual.as_mut().ok_or(ApiError::NoVisualModel)
  }

  /// Re-key the model, creating it (and wiring its count signal) on first use.
  fn start_visual(&mut self, numerator: u32, denominator: u32) {
    match self.visual.as_mut() {
      Some(v) => {
        v.rekey(numerator, denominator);
      }
      None => {
        let mut v = VisualSelection::new(numerator, denominator);
        let tx = self.counts_tx.clone();
        v.subscribe(Box::new(move |count: &str| {
          let _ = tx.send(count.to_string());
        }));
        self.visual = Some(v);
      }
    }
  }

  fn visual_state(&mut self) -> Result<ServerWsMessage, ApiError> {
    Ok(ServerWsMessage::VisualState { state: self.visual_mut()?.snapshot() })
  }

  fn drain_counts(&mut self, out: &mut Vec<ServerWsMessage>) {
    while let Ok(count) = self.counts_rx.try_recv() {
      out.push(ServerWsMessage::SelectedCount { count });
    }
  }
}

impl Default for WsConnection {
  fn default() -> Self {
    Self::new()
  }
}

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "fracta_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "fracta_backend", "WebSocket connected");
  let mut conn = WsConnection::new();
  'recv: while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        let replies = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "fracta_backend", msg = %trunc_for_log(&txt, 200), "WS received");
            handle_client_ws(incoming, &state, &mut conn).await
          }
          Err(e) => vec![ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) }],
        };

        for reply in replies {
          let out = serde_json::to_string(&reply).unwrap_or_else(|e| {
            serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
          });
          if let Err(e) = socket.send(Message::Text(out)).await {
            error!(target: "fracta_backend", error = %e, "WS send error");
            break 'recv;
          }
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "fracta_backend", "WebSocket disconnected");
}

/// Handle one client message: the direct reply first, then any queued count signals.
#[instrument(level = "info", skip(state, conn))]
pub async fn handle_client_ws(msg: ClientWsMessage, state: &AppState, conn: &mut WsConnection) -> Vec<ServerWsMessage> {
  let mut out = match dispatch(msg, state, conn).await {
    Ok(reply) => vec![reply],
    Err(e) => vec![ServerWsMessage::Error { message: e.to_string() }],
  };
  conn.drain_counts(&mut out);
  out
}

async fn dispatch(msg: ClientWsMessage, state: &AppState, conn: &mut WsConnection) -> Result<ServerWsMessage, ApiError> {
  match msg {
    ClientWsMessage::Ping => Ok(ServerWsMessage::Pong),

    ClientWsMessage::NewQuestion { level, lang } => {
      let question = serve_question(state, Some(level), lang.as_deref()).await?;
      Ok(ServerWsMessage::Question { question })
    }

    ClientWsMessage::SubmitAnswer { question_id, answer } => {
      evaluate_answer(state, &question_id, &answer).await.map(ServerWsMessage::AnswerResult)
    }

    ClientWsMessage::VisualStart { numerator, denominator } => {
      conn.start_visual(numerator, denominator);
      conn.visual_state()
    }

    ClientWsMessage::AddBar => {
      conn.visual_mut()?.add_bar();
      conn.visual_state()
    }

    ClientWsMessage::AddPartition { bar_id } => {
      conn.visual_mut()?.add_partition(bar_id);
      conn.visual_state()
    }

    ClientWsMessage::SegmentPress { bar_id, segment } => {
      conn.visual_mut()?.press(bar_id, segment);
      conn.visual_state()
    }

    ClientWsMessage::SegmentMove { bar_id, segment } => {
      conn.visual_mut()?.move_to(bar_id, segment);
      conn.visual_state()
    }

    ClientWsMessage::SegmentRelease { bar_id, segment } => {
      conn.visual_mut()?.release(bar_id, segment);
      conn.visual_state()
    }

    ClientWsMessage::ReleaseOutside => {
      conn.visual_mut()?.release_outside();
      conn.visual_state()
    }

    ClientWsMessage::SegmentToggle { bar_id, segment } => {
      conn.visual_mut()?.toggle(bar_id, segment);
      conn.visual_state()
    }

    ClientWsMessage::SubmitVisual { question_id } => {
      let answer = conn.visual_mut()?.selected_count_text();
      evaluate_answer(state, &question_id, &answer).await.map(ServerWsMessage::AnswerResult)
    }
  }
}
