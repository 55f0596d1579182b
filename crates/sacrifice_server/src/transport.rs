//! HTTP and WebSocket surface.

use crate::{ClientMessage, ServerConfig, ServerError, Session, SessionHandle, SessionSnapshot};
use axum::{
    Json, Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;
use futures::{SinkExt, StreamExt};
use sacrifice_rules::ChessRules;
use tracing::{debug, info, instrument, warn};

/// Routes: `/ws` for clients, `/health` and `/status` for operators.
pub fn router(handle: SessionHandle) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .route("/status", get(status))
        .with_state(handle)
}

/// Starts a session loop for `config` and serves until Ctrl+C.
#[instrument(skip(config), fields(bind = %config.bind_address()))]
pub async fn run(config: ServerConfig) -> Result<(), ServerError> {
    let session = Session::new(ChessRules::new(), config.inactivity_policy(), Utc::now());
    let (handle, session_task) = SessionHandle::spawn(session);

    let served = serve(&config, handle).await;

    // Sockets still open at shutdown hold handles; stop the loop regardless.
    session_task.abort();
    served
}

/// Binds to the configured address and serves `handle` until Ctrl+C.
#[instrument(skip(config, handle), fields(bind = %config.bind_address()))]
pub async fn serve(config: &ServerConfig, handle: SessionHandle) -> Result<(), ServerError> {
    let listener = tokio::net::TcpListener::bind((config.host().as_str(), *config.port())).await?;
    info!("Server ready at http://{}/", config.bind_address());
    info!("Clients connect via ws://{}/ws", config.bind_address());

    axum::serve(listener, router(handle))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

async fn health() -> &'static str {
    "ok"
}

async fn status(
    State(handle): State<SessionHandle>,
) -> Result<Json<SessionSnapshot>, (StatusCode, String)> {
    handle
        .snapshot()
        .await
        .map(Json)
        .map_err(|e| (StatusCode::SERVICE_UNAVAILABLE, e.to_string()))
}

async fn ws_handler(
    State(handle): State<SessionHandle>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(handle, socket))
}

#[instrument(skip_all)]
async fn handle_socket(handle: SessionHandle, socket: WebSocket) {
    let (id, mut outbound) = match handle.connect() {
        Ok(registered) => registered,
        Err(e) => {
            warn!(error = %e, "Could not register connection");
            return;
        }
    };
    let (mut ws_tx, mut ws_rx) = socket.split();

    // Writer: session messages to JSON text frames.
    let writer = tokio::spawn(async move {
        while let Some(message) = outbound.recv().await {
            let text = match serde_json::to_string(&message) {
                Ok(text) => text,
                Err(e) => {
                    warn!(error = %e, "Failed to encode outbound message");
                    continue;
                }
            };
            if ws_tx.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    // Reader: client frames to session commands.
    while let Some(frame) = ws_rx.next().await {
        match frame {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(text.as_str()) {
                Ok(message) => {
                    if let Err(e) = handle.send(id, message) {
                        warn!(connection_id = %id, error = %e, "Session loop unavailable");
                        break;
                    }
                }
                Err(e) => {
                    warn!(connection_id = %id, error = %e, "Dropping malformed frame");
                }
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!(connection_id = %id, error = %e, "WebSocket read failed");
                break;
            }
        }
    }

    if let Err(e) = handle.disconnect(id) {
        warn!(connection_id = %id, error = %e, "Could not report disconnect");
    }
    writer.abort();
}
