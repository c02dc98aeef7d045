use axum::debug_handler;
use axum::extract::{Multipart, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::error::AppResult;
use crate::uploads::{self, UploadStore};
use crate::{AppState, auth, include_res, res, session, store};

#[debug_handler]
pub(crate) async fn new_page(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    if let Err(to_login) = auth::require_login(&db_pool, &session, "/restaurants/new").await? {
        return Ok(to_login);
    }

    let (success, error) = session::take_flash(&session).await?;
    let body = res::fill(include_res!(str, "/pages/restaurants/new.html"), &[(
        "flash",
        &res::flash_html(success, error),
    )]);
    Ok(Html(body).into_response())
}

#[debug_handler(state = AppState)]
pub(crate) async fn create(
    State(db_pool): State<SqlitePool>,
    State(upload_store): State<UploadStore>,
    session: Session,
    multipart: Multipart,
) -> AppResult<Response> {
    let user = match auth::require_login(&db_pool, &session, "/restaurants/new").await? {
        Ok(user) => user,
        Err(to_login) => return Ok(to_login),
    };

    let (fields, images) =
        uploads::collect_form(&upload_store, multipart, uploads::MAX_RESTAURANT_IMAGES).await?;

    let (Some(name), Some(cuisine), Some(description)) = (
        uploads::text_field(&fields, "name"),
        uploads::text_field(&fields, "cuisine"),
        uploads::text_field(&fields, "description"),
    ) else {
        session::flash_error(&session, "Name, cuisine and description are all required.").await?;
        return Ok(Redirect::to("/restaurants/new").into_response());
    };

    let restaurant = store::create_restaurant(
        &db_pool,
        store::NewRestaurant {
            name,
            cuisine,
            description,
            location: uploads::text_field(&fields, "location"),
            author_id: &user.id,
        },
        &images,
    )
    .await?;

    session::flash_success(&session, "New restaurant added!").await?;
    Ok(Redirect::to(&format!("/restaurants/{}", restaurant.id)).into_response())
}
