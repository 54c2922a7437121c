//! User list model: a curated, votable collection of animals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserList {
    pub id: i64,

    pub title: String,

    pub author_id: i64,
    pub author_username: String,

    pub description: String,

    pub votes: i64,

    /// Unique, derived from `title`
    pub slug: String,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserListRequest {
    #[validate(length(min = 1, max = 128, message = "Title must be 1-128 characters"))]
    pub title: String,

    #[validate(length(min = 1, message = "Pick at least one animal"))]
    pub animal_ids: Vec<i64>,

    #[validate(length(max = 5000))]
    pub description: Option<String>,
}

pub const USER_LIST_EXISTS: &str = "A list with this title already exists.";
