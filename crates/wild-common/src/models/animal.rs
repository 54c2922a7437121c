//! Animal model: the catalogue entry everything else hangs off.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A catalogued animal.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Animal {
    pub id: i64,

    pub author_id: i64,
    /// Joined from `profiles.username`
    pub author_username: String,

    /// Unique display name (up to 128 chars)
    pub name: String,

    pub description: String,

    /// Media key of the picture
    pub picture: Option<String>,

    /// Net score (upvotes minus downvotes, plus any seeded base)
    pub votes: i64,

    /// Unique, derived from `name`
    pub slug: String,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAnimalRequest {
    #[validate(length(min = 1, max = 128, message = "Name must be 1-128 characters"))]
    pub name: String,

    #[validate(length(max = 5000))]
    pub description: Option<String>,
}

/// Duplicate-name message shown on the add-animal form.
pub const ANIMAL_EXISTS: &str = "An animal with this name already exists.";
