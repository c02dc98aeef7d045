//! Review handlers, nested under `/restaurants/{id}/reviews`.

use axum::debug_handler;
use axum::extract::{Multipart, Path, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::error::AppResult;
use crate::uploads::{self, UploadStore};
use crate::{AppState, auth, include_res, policy, res, session, store};

#[debug_handler(state = AppState)]
pub(crate) async fn create(
    Path(id): Path<String>,
    State(db_pool): State<SqlitePool>,
    State(upload_store): State<UploadStore>,
    session: Session,
    multipart: Multipart,
) -> AppResult<Response> {
    let user = match auth::require_login(&db_pool, &session, &format!("/restaurants/{id}")).await? {
        Ok(user) => user,
        Err(to_login) => return Ok(to_login),
    };

    let Some(restaurant) = store::restaurant_by_id(&db_pool, &id).await? else {
        session::flash_error(&session, "That restaurant could not be found.").await?;
        return Ok(Redirect::to("/restaurants").into_response());
    };

    let (fields, images) =
        uploads::collect_form(&upload_store, multipart, uploads::MAX_REVIEW_IMAGES).await?;

    // A rating must accompany every review; the body may be empty.
    let Some(rating) = uploads::text_field(&fields, "rating").and_then(|r| r.parse::<i64>().ok())
    else {
        session::flash_error(&session, "A rating is required.").await?;
        return Ok(Redirect::to(&format!("/restaurants/{id}")).into_response());
    };

    store::create_review(
        &db_pool,
        store::NewReview {
            restaurant_id: &restaurant.id,
            author_id: &user.id,
            body: uploads::text_field(&fields, "body").unwrap_or(""),
            rating,
            image: images.first(),
        },
    )
    .await?;

    session::flash_success(&session, "New review added!").await?;
    Ok(Redirect::to(&format!("/restaurants/{id}")).into_response())
}

#[debug_handler]
pub(crate) async fn edit_page(
    Path((id, review_id)): Path<(String, String)>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let path = format!("/restaurants/{id}/reviews/{review_id}/edit");
    let user = match auth::require_login(&db_pool, &session, &path).await? {
        Ok(user) => user,
        Err(to_login) => return Ok(to_login),
    };

    let (restaurant, review) = match (
        store::restaurant_by_id(&db_pool, &id).await?,
        store::review_by_id(&db_pool, &review_id).await?,
    ) {
        (Some(restaurant), Some(review)) => (restaurant, review),
        _ => {
            session::flash_error(&session, "That restaurant or review could not be found.").await?;
            return Ok(Redirect::to("/restaurants").into_response());
        }
    };

    if !policy::can_edit_review(&user, &review) {
        session::flash_error(&session, "You do not have permission to edit this review.").await?;
        return Ok(Redirect::to(&format!("/restaurants/{id}")).into_response());
    }

    let (success, error) = session::take_flash(&session).await?;
    let body = res::fill(include_res!(str, "/pages/reviews/edit.html"), &[
        ("flash", &res::flash_html(success, error)),
        ("restaurant_id", &restaurant.id),
        ("restaurant_name", &res::escape(&restaurant.name)),
        ("id", &review.id),
        ("rating", &review.rating.to_string()),
        ("body", &res::escape(&review.body)),
    ]);
    Ok(Html(body).into_response())
}

#[debug_handler(state = AppState)]
pub(crate) async fn update(
    Path((id, review_id)): Path<(String, String)>,
    State(db_pool): State<SqlitePool>,
    State(upload_store): State<UploadStore>,
    session: Session,
    multipart: Multipart,
) -> AppResult<Response> {
    let path = format!("/restaurants/{id}/reviews/{review_id}/edit");
    let user = match auth::require_login(&db_pool, &session, &path).await? {
        Ok(user) => user,
        Err(to_login) => return Ok(to_login),
    };

    let Some(review) = store::review_by_id(&db_pool, &review_id).await? else {
        session::flash_error(&session, "That review could not be found.").await?;
        return Ok(Redirect::to(&format!("/restaurants/{id}")).into_response());
    };

    if !policy::can_edit_review(&user, &review) {
        session::flash_error(&session, "You do not have permission to edit this review.").await?;
        return Ok(Redirect::to(&format!("/restaurants/{id}")).into_response());
    }

    let (fields, images) =
        uploads::collect_form(&upload_store, multipart, uploads::MAX_REVIEW_IMAGES).await?;

    let Some(rating) = uploads::text_field(&fields, "rating").and_then(|r| r.parse::<i64>().ok())
    else {
        session::flash_error(&session, "A rating is required.").await?;
        return Ok(Redirect::to(&path).into_response());
    };

    store::update_review(
        &db_pool,
        &review_id,
        uploads::text_field(&fields, "body").unwrap_or(""),
        rating,
        images.first(),
    )
    .await?;

    session::flash_success(&session, "Review updated.").await?;
    Ok(Redirect::to(&format!("/restaurants/{id}")).into_response())
}

#[debug_handler]
pub(crate) async fn remove(
    Path((id, review_id)): Path<(String, String)>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let user = match auth::require_login(&db_pool, &session, &format!("/restaurants/{id}")).await? {
        Ok(user) => user,
        Err(to_login) => return Ok(to_login),
    };

    let Some(review) = store::review_by_id(&db_pool, &review_id).await? else {
        session::flash_error(&session, "That review could not be found.").await?;
        return Ok(Redirect::to(&format!("/restaurants/{id}")).into_response());
    };

    if !policy::can_delete_review(&user, &review) {
        session::flash_error(&session, "You do not have permission to delete this review.").await?;
        return Ok(Redirect::to(&format!("/restaurants/{id}")).into_response());
    }

    store::delete_review(&db_pool, &review_id).await?;

    session::flash_success(&session, "Review deleted.").await?;
    Ok(Redirect::to(&format!("/restaurants/{id}")).into_response())
}
