//! Landing pages.

use axum::debug_handler;
use axum::extract::State;
use axum::response::{Html, IntoResponse, Response};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::error::AppResult;
use crate::{auth, include_res, res, session};

async fn render(db_pool: &SqlitePool, session: &Session, template: &str) -> AppResult<Response> {
    let user = auth::identity(db_pool, session).await?;
    let (success, error) = session::take_flash(session).await?;
    let username = user
        .map(|u| res::escape(&u.username))
        .unwrap_or_else(|| "guest".to_owned());
    let body = res::fill(template, &[
        ("flash", &res::flash_html(success, error)),
        ("username", &username),
    ]);
    Ok(Html(body).into_response())
}

#[debug_handler]
pub async fn index(State(db_pool): State<SqlitePool>, session: Session) -> AppResult<Response> {
    render(&db_pool, &session, include_res!(str, "/pages/index.html")).await
}

#[debug_handler]
pub async fn home(State(db_pool): State<SqlitePool>, session: Session) -> AppResult<Response> {
    render(&db_pool, &session, include_res!(str, "/pages/home.html")).await
}
