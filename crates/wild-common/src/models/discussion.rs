//! Discussion model: a thread about one animal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Discussion {
    pub id: i64,

    pub title: String,

    pub author_id: i64,
    pub author_username: String,

    pub animal_id: i64,
    /// Joined from `animals.name`
    pub animal_name: String,
    /// Joined from `animals.slug`
    pub animal_slug: String,

    pub description: String,

    pub picture: Option<String>,

    pub votes: i64,

    /// Unique, derived from `title`
    pub slug: String,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateDiscussionRequest {
    #[validate(length(min = 1, max = 128, message = "Title must be 1-128 characters"))]
    pub title: String,

    pub animal_id: i64,

    #[validate(length(max = 5000))]
    pub description: Option<String>,
}

pub const DISCUSSION_EXISTS: &str = "A discussion with this title already exists.";
