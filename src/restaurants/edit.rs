use axum::debug_handler;
use axum::extract::{Multipart, Path, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::error::AppResult;
use crate::uploads::{self, UploadStore};
use crate::{AppState, auth, include_res, policy, res, session, store};

#[debug_handler]
pub(crate) async fn edit_page(
    Path(id): Path<String>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let user =
        match auth::require_login(&db_pool, &session, &format!("/restaurants/{id}/edit")).await? {
            Ok(user) => user,
            Err(to_login) => return Ok(to_login),
        };

    let Some(restaurant) = store::restaurant_by_id(&db_pool, &id).await? else {
        session::flash_error(&session, "That restaurant could not be found.").await?;
        return Ok(Redirect::to("/restaurants").into_response());
    };

    if !policy::can_modify_restaurant(&user, &restaurant) {
        session::flash_error(&session, "You do not have permission to edit this restaurant.")
            .await?;
        return Ok(Redirect::to(&format!("/restaurants/{id}")).into_response());
    }

    let (success, error) = session::take_flash(&session).await?;
    let body = res::fill(include_res!(str, "/pages/restaurants/edit.html"), &[
        ("flash", &res::flash_html(success, error)),
        ("id", &restaurant.id),
        ("name", &res::escape(&restaurant.name)),
        ("cuisine", &res::escape(&restaurant.cuisine)),
        ("description", &res::escape(&restaurant.description)),
        ("location", &res::escape(restaurant.location.as_deref().unwrap_or(""))),
    ]);
    Ok(Html(body).into_response())
}

#[debug_handler(state = AppState)]
pub(crate) async fn update(
    Path(id): Path<String>,
    State(db_pool): State<SqlitePool>,
    State(upload_store): State<UploadStore>,
    session: Session,
    multipart: Multipart,
) -> AppResult<Response> {
    let user =
        match auth::require_login(&db_pool, &session, &format!("/restaurants/{id}/edit")).await? {
            Ok(user) => user,
            Err(to_login) => return Ok(to_login),
        };

    let Some(restaurant) = store::restaurant_by_id(&db_pool, &id).await? else {
        session::flash_error(&session, "That restaurant could not be found.").await?;
        return Ok(Redirect::to("/restaurants").into_response());
    };

    if !policy::can_modify_restaurant(&user, &restaurant) {
        session::flash_error(&session, "You do not have permission to edit this restaurant.")
            .await?;
        return Ok(Redirect::to(&format!("/restaurants/{id}")).into_response());
    }

    let (fields, new_images) =
        uploads::collect_form(&upload_store, multipart, uploads::MAX_RESTAURANT_IMAGES).await?;

    let (Some(name), Some(cuisine), Some(description)) = (
        uploads::text_field(&fields, "name"),
        uploads::text_field(&fields, "cuisine"),
        uploads::text_field(&fields, "description"),
    ) else {
        session::flash_error(&session, "Name, cuisine and description are all required.").await?;
        return Ok(Redirect::to(&format!("/restaurants/{id}/edit")).into_response());
    };

    store::update_restaurant(
        &db_pool,
        &id,
        name,
        cuisine,
        description,
        uploads::text_field(&fields, "location"),
        &new_images,
    )
    .await?;

    session::flash_success(&session, "Restaurant updated.").await?;
    Ok(Redirect::to(&format!("/restaurants/{id}")).into_response())
}
