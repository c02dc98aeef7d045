use axum::extract::State;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::{Form, debug_handler};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::error::{AppError, AppResult};
use crate::session::{self, USER_ID};
use crate::{include_res, res, store};

use super::hash_password;

#[derive(Deserialize)]
pub(crate) struct RegisterForm {
    email: String,
    username: String,
    password: String,
}

#[debug_handler]
pub(crate) async fn register_page(session: Session) -> AppResult<Response> {
    let (success, error) = session::take_flash(&session).await?;
    let body = res::fill(include_res!(str, "/pages/register.html"), &[(
        "flash",
        &res::flash_html(success, error),
    )]);
    Ok(Html(body).into_response())
}

#[debug_handler]
pub(crate) async fn register(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> AppResult<Response> {
    if form.email.trim().is_empty() || form.username.trim().is_empty() || form.password.is_empty() {
        session::flash_error(&session, "Email, username and password are all required.").await?;
        return Ok(Redirect::to("/register").into_response());
    }

    let password_hash = hash_password(&form.password)?;
    match store::create_user(&db_pool, form.username.trim(), form.email.trim(), &password_hash).await
    {
        Ok(user) => {
            session.insert(USER_ID, &user.id).await?;
            session::flash_success(&session, "Welcome! Your account has been created.").await?;
            tracing::info!(username = %user.username, "user registered");
            Ok(Redirect::to("/").into_response())
        }
        Err(AppError::DuplicateIdentity) => {
            session::flash_error(&session, "An account with that email or username already exists.")
                .await?;
            Ok(Redirect::to("/register").into_response())
        }
        Err(e) => Err(e),
    }
}
