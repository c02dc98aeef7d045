use axum::debug_handler;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::error::AppResult;
use crate::{include_res, res, store};

/// Persisted history of one room, oldest first.
#[debug_handler]
pub(crate) async fn room_history(
    Path(room_id): Path<String>,
    State(db_pool): State<SqlitePool>,
) -> AppResult<Response> {
    let mut items = String::new();
    for message in store::messages_in_room(&db_pool, &room_id).await? {
        let author = store::user_by_id(&db_pool, &message.user_id)
            .await?
            .map(|u| u.username)
            .unwrap_or_else(|| "unknown".to_owned());
        items += &res::fill(include_res!(str, "/pages/chat_room_message.html"), &[
            ("author", &res::escape(&author)),
            ("body", &res::escape(&message.body)),
        ]);
    }

    let body = res::fill(include_res!(str, "/pages/chat_room.html"), &[
        ("room_id", &res::escape(&room_id)),
        ("messages", &items),
    ]);
    Ok(Html(body).into_response())
}

#[derive(Deserialize)]
pub(crate) struct SendMessageBody {
    room_id: String,
    user_id: String,
    message: String,
}

/// Stores a chat message through the REST surface and echoes the record.
#[debug_handler]
pub(crate) async fn send_message(
    State(db_pool): State<SqlitePool>,
    Json(body): Json<SendMessageBody>,
) -> AppResult<Response> {
    let stored =
        store::insert_message(&db_pool, &body.room_id, &body.user_id, &body.message).await?;
    Ok((StatusCode::CREATED, Json(stored)).into_response())
}
