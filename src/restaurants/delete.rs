use axum::debug_handler;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::error::AppResult;
use crate::{auth, policy, session, store};

#[debug_handler]
pub(crate) async fn remove(
    Path(id): Path<String>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let user = match auth::require_login(&db_pool, &session, &format!("/restaurants/{id}")).await? {
        Ok(user) => user,
        Err(to_login) => return Ok(to_login),
    };

    let Some(restaurant) = store::restaurant_by_id(&db_pool, &id).await? else {
        session::flash_error(&session, "That restaurant could not be found.").await?;
        return Ok(Redirect::to("/restaurants").into_response());
    };

    if !policy::can_modify_restaurant(&user, &restaurant) {
        session::flash_error(&session, "You do not have permission to delete this restaurant.")
            .await?;
        return Ok(Redirect::to(&format!("/restaurants/{id}")).into_response());
    }

    // Reviews go with the restaurant, in one transaction.
    store::delete_restaurant(&db_pool, &id).await?;

    session::flash_success(&session, "Restaurant deleted.").await?;
    Ok(Redirect::to("/restaurants").into_response())
}
