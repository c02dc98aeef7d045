use axum::debug_handler;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tower_sessions::Session;

use crate::error::{AppError, AppResult};
use crate::{AppState, auth};

/// Global broadcast socket. Membership is bound to a logged-in session at
/// connect time; anonymous upgrades are refused. Frames are relayed
/// verbatim to every connected client, the sender included. Nothing is
/// persisted and late joiners get no backlog.
#[debug_handler(state = AppState)]
pub(crate) async fn chat_ws(
    State(db_pool): State<SqlitePool>,
    State(chat_tx): State<broadcast::Sender<String>>,
    session: Session,
    ws: WebSocketUpgrade,
) -> AppResult<Response> {
    let Some(user) = auth::identity(&db_pool, &session).await? else {
        return Err(AppError::Unauthorized);
    };

    tracing::info!(username = %user.username, "chat client connected");
    Ok(ws.on_upgrade(move |stream| relay(stream, chat_tx, user.username)))
}

async fn relay(stream: WebSocket, tx: broadcast::Sender<String>, username: String) {
    let mut rx = tx.subscribe();
    let (mut sender, mut receiver) = stream.split();

    let fan_out = tokio::spawn(async move {
        while let Ok(line) = rx.recv().await {
            if sender.send(Message::Text(line.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(frame)) = receiver.next().await {
        if let Message::Text(text) = frame {
            // Delivery order is receipt order at the channel; a send only
            // fails when no client is subscribed, which is fine to drop.
            let _ = tx.send(text.to_string());
        }
    }

    fan_out.abort();
    tracing::info!(username = %username, "chat client disconnected");
}
