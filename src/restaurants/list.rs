use axum::debug_handler;
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::error::AppResult;
use crate::{include_res, res, session, store};

#[derive(Deserialize)]
pub(crate) struct ListQuery {
    /// Raw so that non-numeric values coerce to page 1 instead of a 400.
    page: Option<String>,
}

#[debug_handler]
pub(crate) async fn list(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Query(ListQuery { page }): Query<ListQuery>,
) -> AppResult<Response> {
    let page = store::page_number(page.as_deref());
    let total_pages = store::total_pages(store::count_restaurants(&db_pool).await?);

    let mut cards = String::new();
    for restaurant in store::list_page(&db_pool, page).await? {
        let ratings = store::review_ratings(&db_pool, &restaurant.id).await?;
        let cover = store::images_for(&db_pool, &restaurant.id)
            .await?
            .into_iter()
            .next()
            .map(|image| format!("<img src=\"{}\" alt=\"{}\">", image.url, res::escape(&restaurant.name)))
            .unwrap_or_default();
        cards += &res::fill(include_res!(str, "/pages/restaurants/card.html"), &[
            ("id", &restaurant.id),
            ("name", &res::escape(&restaurant.name)),
            ("cuisine", &res::escape(&restaurant.cuisine)),
            ("average_rating", &store::average_rating(&ratings)),
            ("cover", &cover),
        ]);
    }

    let (success, error) = session::take_flash(&session).await?;
    let body = res::fill(include_res!(str, "/pages/restaurants/main.html"), &[
        ("flash", &res::flash_html(success, error)),
        ("cards", &cards),
        ("page", &page.to_string()),
        ("total_pages", &total_pages.to_string()),
    ]);
    Ok(Html(body).into_response())
}
