use axum::response::Redirect;
use axum::debug_handler;
use tower_sessions::Session;

use crate::error::AppResult;
use crate::session;

/// Idempotent: logging out an already-anonymous session still succeeds.
#[debug_handler]
pub(crate) async fn logout(session: Session) -> AppResult<Redirect> {
    session.clear().await;
    session::flash_success(&session, "Logged out.").await?;
    Ok(Redirect::to("/"))
}
