use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Closed role set. `master` moderates any restaurant/review and
/// administers users; everyone else is a `member`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    Member,
    Master,
}

impl Role {
    pub fn parse(raw: &str) -> Option<Role> {
        match raw {
            "member" => Some(Role::Member),
            "master" => Some(Role::Master),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Master => "master",
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
}

#[derive(Debug, Clone, FromRow)]
pub struct Restaurant {
    pub id: String,
    pub name: String,
    pub cuisine: String,
    pub description: String,
    pub location: Option<String>,
    /// Immutable after creation.
    pub author_id: String,
}

/// A stored upload, referenced from a restaurant or review.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Image {
    pub url: String,
    pub filename: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct Review {
    pub id: String,
    pub restaurant_id: String,
    pub author_id: String,
    pub body: String,
    pub rating: i64,
    pub image_url: Option<String>,
    pub image_filename: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ChatMessage {
    pub id: String,
    pub room_id: String,
    pub user_id: String,
    pub body: String,
    pub created_at: i64,
}
