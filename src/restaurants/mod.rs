//! Restaurant CRUD plus the master-only manage listing.

mod create;
mod delete;
mod edit;
mod list;
mod manage;
mod show;

use axum::Router;
use axum::routing::{get, post, put};

use crate::{AppState, reviews};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::list).post(create::create))
        .route("/new", get(create::new_page))
        // Static segment, must win over "/{id}".
        .route("/foodmanage", get(manage::manage))
        .route("/{id}", get(show::show).put(edit::update).delete(delete::remove))
        .route("/{id}/edit", get(edit::edit_page))
        .route("/{id}/reviews", post(reviews::create))
        .route("/{id}/reviews/{review_id}/edit", get(reviews::edit_page))
        .route(
            "/{id}/reviews/{review_id}",
            put(reviews::update).delete(reviews::remove),
        )
}
