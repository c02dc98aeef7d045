use axum::debug_handler;
use axum::extract::State;
use axum::response::{Html, IntoResponse, Redirect, Response};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::error::AppResult;
use crate::{auth, include_res, policy, res, session, store};

/// Master-only listing of every restaurant with its author.
#[debug_handler]
pub(crate) async fn manage(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let user = match auth::require_login(&db_pool, &session, "/restaurants/foodmanage").await? {
        Ok(user) => user,
        Err(to_login) => return Ok(to_login),
    };

    if !policy::can_manage_users(&user) {
        session::flash_error(&session, "You do not have permission to access that page.").await?;
        return Ok(Redirect::to("/").into_response());
    }

    let mut rows = String::new();
    for restaurant in store::list_all_restaurants(&db_pool).await? {
        let author = store::user_by_id(&db_pool, &restaurant.author_id)
            .await?
            .map(|u| u.username)
            .unwrap_or_else(|| "unknown".to_owned());
        rows += &res::fill(include_res!(str, "/pages/restaurants/manage_row.html"), &[
            ("id", &restaurant.id),
            ("name", &res::escape(&restaurant.name)),
            ("cuisine", &res::escape(&restaurant.cuisine)),
            ("author", &res::escape(&author)),
        ]);
    }

    let (success, error) = session::take_flash(&session).await?;
    let body = res::fill(include_res!(str, "/pages/restaurants/foodmanage.html"), &[
        ("flash", &res::flash_html(success, error)),
        ("rows", &rows),
    ]);
    Ok(Html(body).into_response())
}
