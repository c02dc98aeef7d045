//! Realtime chat: a single global websocket broadcast plus the persisted
//! per-room REST surface.

mod page;
mod room;
mod ws;

use axum::Router;
use axum::routing::{get, post};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(page::chat_page))
        .route("/ws", get(ws::chat_ws))
        .route("/room/{room_id}", get(room::room_history))
        .route("/message", post(room::send_message))
}
