//! Master user administration and self-service profile editing.

use axum::debug_handler;
use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{delete, get, put};
use axum::{Form, Router};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::error::{AppError, AppResult};
use crate::models::Role;
use crate::{AppState, auth, include_res, policy, res, session, store};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/manage", get(manage_page))
        .route("/manage/{id}/role", put(set_role))
        .route("/manage/{id}", delete(remove_user))
        .route("/{id}/edit", get(edit_page))
        .route("/{id}", put(update_profile))
}

#[debug_handler]
async fn manage_page(State(db_pool): State<SqlitePool>, session: Session) -> AppResult<Response> {
    let user = match auth::require_login(&db_pool, &session, "/users/manage").await? {
        Ok(user) => user,
        Err(to_login) => return Ok(to_login),
    };

    if !policy::can_manage_users(&user) {
        session::flash_error(&session, "You do not have permission to access that page.").await?;
        return Ok(Redirect::to("/").into_response());
    }

    let mut rows = String::new();
    for listed in store::list_users(&db_pool).await? {
        rows += &res::fill(include_res!(str, "/pages/users/manage_row.html"), &[
            ("id", &listed.id),
            ("username", &res::escape(&listed.username)),
            ("email", &res::escape(&listed.email)),
            ("role", listed.role.as_str()),
        ]);
    }

    let (success, error) = session::take_flash(&session).await?;
    let body = res::fill(include_res!(str, "/pages/users/manage.html"), &[
        ("flash", &res::flash_html(success, error)),
        ("rows", &rows),
    ]);
    Ok(Html(body).into_response())
}

#[derive(Deserialize)]
struct RoleForm {
    role: String,
}

#[debug_handler]
async fn set_role(
    Path(id): Path<String>,
    State(db_pool): State<SqlitePool>,
    session: Session,
    Form(form): Form<RoleForm>,
) -> AppResult<Response> {
    let user = match auth::require_login(&db_pool, &session, "/users/manage").await? {
        Ok(user) => user,
        Err(to_login) => return Ok(to_login),
    };

    if !policy::can_manage_users(&user) {
        session::flash_error(&session, "You do not have permission to do that.").await?;
        return Ok(Redirect::to("/").into_response());
    }

    let Some(role) = Role::parse(&form.role) else {
        session::flash_error(&session, "Unknown role.").await?;
        return Ok(Redirect::to("/users/manage").into_response());
    };

    store::set_role(&db_pool, &id, role).await?;

    session::flash_success(&session, "User role updated.").await?;
    Ok(Redirect::to("/users/manage").into_response())
}

#[debug_handler]
async fn remove_user(
    Path(id): Path<String>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let user = match auth::require_login(&db_pool, &session, "/users/manage").await? {
        Ok(user) => user,
        Err(to_login) => return Ok(to_login),
    };

    if !policy::can_manage_users(&user) {
        session::flash_error(&session, "You do not have permission to do that.").await?;
        return Ok(Redirect::to("/").into_response());
    }

    store::delete_user(&db_pool, &id).await?;

    session::flash_success(&session, "User deleted.").await?;
    Ok(Redirect::to("/users/manage").into_response())
}

#[debug_handler]
async fn edit_page(
    Path(id): Path<String>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let user = match auth::require_login(&db_pool, &session, &format!("/users/{id}/edit")).await? {
        Ok(user) => user,
        Err(to_login) => return Ok(to_login),
    };

    let Some(target) = store::user_by_id(&db_pool, &id).await? else {
        session::flash_error(&session, "User not found.").await?;
        return Ok(Redirect::to("/").into_response());
    };

    if !policy::can_edit_profile(&user, &target.id) {
        session::flash_error(&session, "You cannot edit another user's profile.").await?;
        return Ok(Redirect::to("/").into_response());
    }

    let (success, error) = session::take_flash(&session).await?;
    let body = res::fill(include_res!(str, "/pages/users/edit.html"), &[
        ("flash", &res::flash_html(success, error)),
        ("id", &target.id),
        ("username", &res::escape(&target.username)),
        ("email", &res::escape(&target.email)),
    ]);
    Ok(Html(body).into_response())
}

#[derive(Deserialize)]
struct ProfileForm {
    username: String,
    email: String,
}

#[debug_handler]
async fn update_profile(
    Path(id): Path<String>,
    State(db_pool): State<SqlitePool>,
    session: Session,
    Form(form): Form<ProfileForm>,
) -> AppResult<Response> {
    let user = match auth::require_login(&db_pool, &session, &format!("/users/{id}/edit")).await? {
        Ok(user) => user,
        Err(to_login) => return Ok(to_login),
    };

    let Some(target) = store::user_by_id(&db_pool, &id).await? else {
        session::flash_error(&session, "User not found.").await?;
        return Ok(Redirect::to("/").into_response());
    };

    if !policy::can_edit_profile(&user, &target.id) {
        session::flash_error(&session, "You cannot edit another user's profile.").await?;
        return Ok(Redirect::to("/").into_response());
    }

    let username = form.username.trim();
    let email = form.email.trim();
    if username.is_empty() || email.is_empty() {
        session::flash_error(&session, "Username and email are both required.").await?;
        return Ok(Redirect::to(&format!("/users/{id}/edit")).into_response());
    }

    match store::update_profile(&db_pool, &id, username, email).await {
        Ok(()) => {
            session::flash_success(&session, "Profile updated.").await?;
            Ok(Redirect::to("/").into_response())
        }
        Err(AppError::DuplicateIdentity) => {
            session::flash_error(&session, "That username or email is already taken.").await?;
            Ok(Redirect::to(&format!("/users/{id}/edit")).into_response())
        }
        Err(e) => Err(e),
    }
}
