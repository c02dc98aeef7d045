use axum::debug_handler;
use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::config::Config;
use crate::error::AppResult;
use crate::{AppState, include_res, res, session, store};

#[debug_handler(state = AppState)]
pub(crate) async fn show(
    Path(id): Path<String>,
    State(db_pool): State<SqlitePool>,
    State(config): State<Config>,
    session: Session,
) -> AppResult<Response> {
    let Some(restaurant) = store::restaurant_by_id(&db_pool, &id).await? else {
        session::flash_error(&session, "That restaurant could not be found.").await?;
        return Ok(Redirect::to("/restaurants").into_response());
    };

    let mut gallery = String::new();
    for image in store::images_for(&db_pool, &id).await? {
        gallery += &format!(
            "<img src=\"{}\" alt=\"{}\">\n",
            image.url,
            res::escape(&restaurant.name)
        );
    }

    let reviews = store::reviews_for(&db_pool, &id).await?;
    let ratings: Vec<i64> = reviews.iter().map(|r| r.rating).collect();
    let mut review_items = String::new();
    for review in &reviews {
        let author = store::user_by_id(&db_pool, &review.author_id)
            .await?
            .map(|u| u.username)
            .unwrap_or_else(|| "unknown".to_owned());
        let image = review
            .image_url
            .as_deref()
            .map(|url| format!("<img src=\"{url}\" alt=\"review photo\">"))
            .unwrap_or_default();
        review_items += &res::fill(include_res!(str, "/pages/reviews/item.html"), &[
            ("restaurant_id", &id),
            ("id", &review.id),
            ("author", &res::escape(&author)),
            ("rating", &review.rating.to_string()),
            ("body", &res::escape(&review.body)),
            ("image", &image),
        ]);
    }

    let owner = store::user_by_id(&db_pool, &restaurant.author_id)
        .await?
        .map(|u| u.username)
        .unwrap_or_else(|| "unknown".to_owned());

    let (success, error) = session::take_flash(&session).await?;
    let body = res::fill(include_res!(str, "/pages/restaurants/show.html"), &[
        ("flash", &res::flash_html(success, error)),
        ("id", &restaurant.id),
        ("name", &res::escape(&restaurant.name)),
        ("cuisine", &res::escape(&restaurant.cuisine)),
        ("description", &res::escape(&restaurant.description)),
        ("location", &res::escape(restaurant.location.as_deref().unwrap_or(""))),
        ("author", &res::escape(&owner)),
        ("average_rating", &store::average_rating(&ratings)),
        ("images", &gallery),
        ("reviews", &review_items),
        ("map_api_key", config.map_api_key.as_deref().unwrap_or("")),
    ]);
    Ok(Html(body).into_response())
}
