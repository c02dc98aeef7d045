//! Session/auth gate: registration, login, logout and the per-request
//! identity resolution passed explicitly to handlers.

mod login;
mod logout;
mod password;
mod register;

use axum::Router;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::error::AppResult;
use crate::models::User;
use crate::session::{RETURN_TO, USER_ID};
use crate::{AppState, store};

pub use password::hash_password;
pub(crate) use password::verify_password;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", get(register::register_page).post(register::register))
        .route("/login", get(login::login_page).post(login::login))
        .route("/logout", get(logout::logout))
}

/// Resolves the identity bound to the session, if any. Handlers call this
/// explicitly instead of relying on request-mutating middleware.
pub async fn identity(db_pool: &SqlitePool, session: &Session) -> AppResult<Option<User>> {
    let Some(user_id) = session.get::<String>(USER_ID).await? else {
        return Ok(None);
    };
    store::user_by_id(db_pool, &user_id).await
}

/// Identity, or a redirect to the login page that remembers where the
/// caller was headed so login can send them back.
pub async fn require_login(
    db_pool: &SqlitePool,
    session: &Session,
    return_to: &str,
) -> AppResult<Result<User, Response>> {
    match identity(db_pool, session).await? {
        Some(user) => Ok(Ok(user)),
        None => {
            session.insert(RETURN_TO, return_to).await?;
            Ok(Err(Redirect::to("/login").into_response()))
        }
    }
}
