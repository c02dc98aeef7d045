use axum::debug_handler;
use axum::extract::State;
use axum::response::{Html, IntoResponse, Response};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::error::AppResult;
use crate::{auth, include_res, res, session};

#[debug_handler]
pub(crate) async fn chat_page(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let user = match auth::require_login(&db_pool, &session, "/chat").await? {
        Ok(user) => user,
        Err(to_login) => return Ok(to_login),
    };

    let (success, error) = session::take_flash(&session).await?;
    let body = res::fill(include_res!(str, "/pages/chat.html"), &[
        ("flash", &res::flash_html(success, error)),
        ("username", &res::escape(&user.username)),
    ]);
    Ok(Html(body).into_response())
}
