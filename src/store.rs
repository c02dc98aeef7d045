//! Resource store: all persistence for users, restaurants, reviews and chat
//! messages, plus the pure listing/rating helpers derived from them.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{ChatMessage, Image, Restaurant, Review, Role, User};

/// Fixed page size for the restaurant listing.
pub const PER_PAGE: i64 = 12;

pub fn now() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}

/// Coerces the raw `?page=` value to a 1-based page number. Missing,
/// non-numeric and non-positive values all land on page 1.
pub fn page_number(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|page| *page >= 1)
        .unwrap_or(1)
}

pub fn total_pages(count: i64) -> i64 {
    (count + PER_PAGE - 1) / PER_PAGE
}

/// Arithmetic mean of review ratings to one decimal place, `"0.0"` when the
/// restaurant has no reviews yet. Always derived, never stored.
pub fn average_rating(ratings: &[i64]) -> String {
    if ratings.is_empty() {
        return "0.0".to_owned();
    }
    let sum: i64 = ratings.iter().sum();
    format!("{:.1}", sum as f64 / ratings.len() as f64)
}

fn map_insert_err(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => AppError::DuplicateIdentity,
        _ => AppError::Storage(err),
    }
}

// ---- users ----

async fn insert_user(
    pool: &SqlitePool,
    username: &str,
    email: &str,
    password_hash: &str,
    role: Role,
) -> AppResult<User> {
    let id = Uuid::now_v7().to_string();
    sqlx::query("INSERT INTO users (id,username,email,password_hash,role) VALUES (?,?,?,?,?)")
        .bind(&id)
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(role.as_str())
        .execute(pool)
        .await
        .map_err(map_insert_err)?;

    Ok(User {
        id,
        username: username.to_owned(),
        email: email.to_owned(),
        password_hash: password_hash.to_owned(),
        role,
    })
}

/// Registration always produces a member; promotion goes through
/// [`set_role`] or [`ensure_master`].
pub async fn create_user(
    pool: &SqlitePool,
    username: &str,
    email: &str,
    password_hash: &str,
) -> AppResult<User> {
    insert_user(pool, username, email, password_hash, Role::Member).await
}

/// Deployment bootstrap: the user-management screens are only reachable by
/// a master, so the first master has to come from outside the request
/// surface. Creates the account as master, or promotes it if the username
/// is already taken. Idempotent, safe to run on every startup.
pub async fn ensure_master(
    pool: &SqlitePool,
    username: &str,
    email: &str,
    password_hash: &str,
) -> AppResult<User> {
    if let Some(existing) = user_by_username(pool, username).await? {
        if existing.role != Role::Master {
            set_role(pool, &existing.id, Role::Master).await?;
        }
        return Ok(User { role: Role::Master, ..existing });
    }
    insert_user(pool, username, email, password_hash, Role::Master).await
}

pub async fn user_by_id(pool: &SqlitePool, id: &str) -> AppResult<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id=?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn user_by_username(pool: &SqlitePool, username: &str) -> AppResult<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username=?")
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn list_users(pool: &SqlitePool) -> AppResult<Vec<User>> {
    let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY username")
        .fetch_all(pool)
        .await?;
    Ok(users)
}

pub async fn update_profile(
    pool: &SqlitePool,
    id: &str,
    username: &str,
    email: &str,
) -> AppResult<()> {
    sqlx::query("UPDATE users SET username=?, email=? WHERE id=?")
        .bind(username)
        .bind(email)
        .bind(id)
        .execute(pool)
        .await
        .map_err(map_insert_err)?;
    Ok(())
}

pub async fn set_role(pool: &SqlitePool, id: &str, role: Role) -> AppResult<()> {
    sqlx::query("UPDATE users SET role=? WHERE id=?")
        .bind(role.as_str())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn delete_user(pool: &SqlitePool, id: &str) -> AppResult<()> {
    sqlx::query("DELETE FROM users WHERE id=?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

// ---- restaurants ----

pub struct NewRestaurant<'a> {
    pub name: &'a str,
    pub cuisine: &'a str,
    pub description: &'a str,
    pub location: Option<&'a str>,
    pub author_id: &'a str,
}

pub async fn create_restaurant(
    pool: &SqlitePool,
    new: NewRestaurant<'_>,
    images: &[Image],
) -> AppResult<Restaurant> {
    let id = Uuid::now_v7().to_string();
    let mut tx = pool.begin().await?;
    sqlx::query(
        "INSERT INTO restaurants (id,name,cuisine,description,location,author_id) VALUES (?,?,?,?,?,?)",
    )
    .bind(&id)
    .bind(new.name)
    .bind(new.cuisine)
    .bind(new.description)
    .bind(new.location)
    .bind(new.author_id)
    .execute(&mut *tx)
    .await?;

    for image in images {
        sqlx::query("INSERT INTO restaurant_images (restaurant_id,url,filename) VALUES (?,?,?)")
            .bind(&id)
            .bind(&image.url)
            .bind(&image.filename)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    Ok(Restaurant {
        id,
        name: new.name.to_owned(),
        cuisine: new.cuisine.to_owned(),
        description: new.description.to_owned(),
        location: new.location.map(str::to_owned),
        author_id: new.author_id.to_owned(),
    })
}

pub async fn restaurant_by_id(pool: &SqlitePool, id: &str) -> AppResult<Option<Restaurant>> {
    let restaurant = sqlx::query_as::<_, Restaurant>("SELECT * FROM restaurants WHERE id=?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(restaurant)
}

pub async fn images_for(pool: &SqlitePool, restaurant_id: &str) -> AppResult<Vec<Image>> {
    let images = sqlx::query_as::<_, Image>(
        "SELECT url,filename FROM restaurant_images WHERE restaurant_id=? ORDER BY rowid",
    )
    .bind(restaurant_id)
    .fetch_all(pool)
    .await?;
    Ok(images)
}

pub async fn count_restaurants(pool: &SqlitePool) -> AppResult<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM restaurants")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn list_page(pool: &SqlitePool, page: i64) -> AppResult<Vec<Restaurant>> {
    // Saturating: an absurdly large page must land past the end of the
    // listing, not overflow the OFFSET computation.
    let offset = PER_PAGE.saturating_mul(page.saturating_sub(1));
    let restaurants = sqlx::query_as::<_, Restaurant>(
        "SELECT * FROM restaurants ORDER BY rowid LIMIT ? OFFSET ?",
    )
    .bind(PER_PAGE)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(restaurants)
}

pub async fn list_all_restaurants(pool: &SqlitePool) -> AppResult<Vec<Restaurant>> {
    let restaurants = sqlx::query_as::<_, Restaurant>("SELECT * FROM restaurants ORDER BY rowid")
        .fetch_all(pool)
        .await?;
    Ok(restaurants)
}

/// Updates the editable fields and appends any newly uploaded images.
/// The author is immutable and is never touched here.
pub async fn update_restaurant(
    pool: &SqlitePool,
    id: &str,
    name: &str,
    cuisine: &str,
    description: &str,
    location: Option<&str>,
    new_images: &[Image],
) -> AppResult<()> {
    let mut tx = pool.begin().await?;
    sqlx::query("UPDATE restaurants SET name=?, cuisine=?, description=?, location=? WHERE id=?")
        .bind(name)
        .bind(cuisine)
        .bind(description)
        .bind(location)
        .bind(id)
        .execute(&mut *tx)
        .await?;
    for image in new_images {
        sqlx::query("INSERT INTO restaurant_images (restaurant_id,url,filename) VALUES (?,?,?)")
            .bind(id)
            .bind(&image.url)
            .bind(&image.filename)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    Ok(())
}

/// Explicit cascade: reviews and image rows go first, then the restaurant,
/// all inside one transaction so a failure cannot strand children.
pub async fn delete_restaurant(pool: &SqlitePool, id: &str) -> AppResult<()> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM reviews WHERE restaurant_id=?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM restaurant_images WHERE restaurant_id=?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM restaurants WHERE id=?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

// ---- reviews ----

pub struct NewReview<'a> {
    pub restaurant_id: &'a str,
    pub author_id: &'a str,
    pub body: &'a str,
    pub rating: i64,
    pub image: Option<&'a Image>,
}

pub async fn create_review(pool: &SqlitePool, new: NewReview<'_>) -> AppResult<Review> {
    let id = Uuid::now_v7().to_string();
    let created_at = now();
    sqlx::query(
        "INSERT INTO reviews (id,restaurant_id,author_id,body,rating,image_url,image_filename,created_at,updated_at)
         VALUES (?,?,?,?,?,?,?,?,?)",
    )
    .bind(&id)
    .bind(new.restaurant_id)
    .bind(new.author_id)
    .bind(new.body)
    .bind(new.rating)
    .bind(new.image.map(|i| i.url.as_str()))
    .bind(new.image.map(|i| i.filename.as_str()))
    .bind(created_at)
    .bind(created_at)
    .execute(pool)
    .await?;

    Ok(Review {
        id,
        restaurant_id: new.restaurant_id.to_owned(),
        author_id: new.author_id.to_owned(),
        body: new.body.to_owned(),
        rating: new.rating,
        image_url: new.image.map(|i| i.url.clone()),
        image_filename: new.image.map(|i| i.filename.clone()),
        created_at,
        updated_at: created_at,
    })
}

pub async fn review_by_id(pool: &SqlitePool, id: &str) -> AppResult<Option<Review>> {
    let review = sqlx::query_as::<_, Review>("SELECT * FROM reviews WHERE id=?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(review)
}

pub async fn reviews_for(pool: &SqlitePool, restaurant_id: &str) -> AppResult<Vec<Review>> {
    let reviews = sqlx::query_as::<_, Review>(
        "SELECT * FROM reviews WHERE restaurant_id=? ORDER BY created_at, id",
    )
    .bind(restaurant_id)
    .fetch_all(pool)
    .await?;
    Ok(reviews)
}

pub async fn review_ratings(pool: &SqlitePool, restaurant_id: &str) -> AppResult<Vec<i64>> {
    let rows: Vec<(i64,)> = sqlx::query_as("SELECT rating FROM reviews WHERE restaurant_id=?")
        .bind(restaurant_id)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(|(rating,)| rating).collect())
}

pub async fn update_review(
    pool: &SqlitePool,
    id: &str,
    body: &str,
    rating: i64,
    image: Option<&Image>,
) -> AppResult<()> {
    sqlx::query("UPDATE reviews SET body=?, rating=?, updated_at=? WHERE id=?")
        .bind(body)
        .bind(rating)
        .bind(now())
        .bind(id)
        .execute(pool)
        .await?;
    if let Some(image) = image {
        sqlx::query("UPDATE reviews SET image_url=?, image_filename=? WHERE id=?")
            .bind(&image.url)
            .bind(&image.filename)
            .bind(id)
            .execute(pool)
            .await?;
    }
    Ok(())
}

pub async fn delete_review(pool: &SqlitePool, id: &str) -> AppResult<()> {
    sqlx::query("DELETE FROM reviews WHERE id=?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

// ---- chat ----

pub async fn insert_message(
    pool: &SqlitePool,
    room_id: &str,
    user_id: &str,
    body: &str,
) -> AppResult<ChatMessage> {
    let id = Uuid::now_v7().to_string();
    let created_at = now();
    sqlx::query("INSERT INTO chat_messages (id,room_id,user_id,body,created_at) VALUES (?,?,?,?,?)")
        .bind(&id)
        .bind(room_id)
        .bind(user_id)
        .bind(body)
        .bind(created_at)
        .execute(pool)
        .await?;

    Ok(ChatMessage {
        id,
        room_id: room_id.to_owned(),
        user_id: user_id.to_owned(),
        body: body.to_owned(),
        created_at,
    })
}

/// Time-ordered history of one room. UUIDv7 ids break same-second ties.
pub async fn messages_in_room(pool: &SqlitePool, room_id: &str) -> AppResult<Vec<ChatMessage>> {
    let messages = sqlx::query_as::<_, ChatMessage>(
        "SELECT * FROM chat_messages WHERE room_id=? ORDER BY created_at, id",
    )
    .bind(room_id)
    .fetch_all(pool)
    .await?;
    Ok(messages)
}
