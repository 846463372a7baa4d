use crate::AppState;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::StreamExt;
use log::*;

/// Upgrades `/ws` to a WebSocket and registers the client for broadcasts.
/// Any origin is accepted.
pub(crate) async fn ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<AppState>,
) -> impl IntoResponse {
    ws.on_failed_upgrade(|e| warn!("WebSocket upgrade failed: {e}"))
        .on_upgrade(move |socket| handle_socket(socket, app_state))
}

async fn handle_socket(socket: WebSocket, app_state: AppState) {
    let manager = app_state.relay_manager;

    // The write half goes into the registry; this task keeps the read half only
    // to notice when the client goes away.
    let (sink, mut stream) = socket.split();
    let connection = manager.register_connection(sink);
    let connection_id = connection.id().clone();

    while let Some(message) = stream.next().await {
        match message {
            Ok(Message::Close(frame)) => {
                debug!("Client {connection_id} sent close: {frame:?}");
                break;
            }
            // Inbound frames carry no meaning
            Ok(other) => debug!("Ignoring inbound frame from client {connection_id}: {other:?}"),
            Err(e) => {
                debug!("Client {connection_id} read failed: {e}");
                break;
            }
        }
    }

    manager.unregister_connection(&connection_id);
    if let Err(e) = connection.close().await {
        debug!("Closing client {connection_id}: {e}");
    }
}
