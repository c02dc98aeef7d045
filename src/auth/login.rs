use axum::extract::State;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::{Form, debug_handler};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::error::AppResult;
use crate::session::{self, RETURN_TO, USER_ID};
use crate::{include_res, res, store};

use super::verify_password;

#[derive(Deserialize)]
pub(crate) struct LoginForm {
    username: String,
    password: String,
}

#[debug_handler]
pub(crate) async fn login_page(session: Session) -> AppResult<Response> {
    let (success, error) = session::take_flash(&session).await?;
    let body = res::fill(include_res!(str, "/pages/login.html"), &[(
        "flash",
        &res::flash_html(success, error),
    )]);
    Ok(Html(body).into_response())
}

#[debug_handler]
pub(crate) async fn login(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    // Unknown user and wrong password are indistinguishable to the caller.
    let user = match store::user_by_username(&db_pool, form.username.trim()).await? {
        Some(user) if verify_password(&form.password, &user.password_hash) => user,
        _ => {
            session::flash_error(&session, "Invalid username or password.").await?;
            return Ok(Redirect::to("/login").into_response());
        }
    };

    session.insert(USER_ID, &user.id).await?;
    session::flash_success(&session, "Logged in!").await?;
    tracing::info!(username = %user.username, "user logged in");

    let return_to = session
        .remove::<String>(RETURN_TO)
        .await?
        .unwrap_or_else(|| "/".to_owned());
    Ok(Redirect::to(&return_to).into_response())
}
