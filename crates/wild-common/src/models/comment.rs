//! Comment model: a reply inside a discussion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,

    pub author_id: i64,
    pub author_username: String,

    pub discussion_id: i64,
    /// Joined from `discussions.title`, for profile listings
    pub discussion_title: String,
    pub discussion_slug: String,

    pub content: String,

    pub votes: i64,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, max = 5000, message = "Comment must be 1-5000 characters"))]
    pub content: String,
}
