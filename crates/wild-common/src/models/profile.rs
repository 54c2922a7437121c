//! User profile model: the identity layer.
//!
//! One row per registered account. Everything a member authors, votes on or
//! signs points back here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use validator::Validate;

/// A registered member.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserProfile {
    pub id: i64,

    /// Unique username (3-32 chars, alphanumeric + underscores/hyphens)
    pub username: String,

    #[serde(skip_serializing)]
    pub email: Option<String>,

    /// Argon2id password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Media key of the profile picture
    pub picture: Option<String>,

    /// Free-form bio
    pub description: String,

    pub created_at: DateTime<Utc>,
}

/// Registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProfileRequest {
    #[validate(length(min = 3, max = 32, message = "Username must be 3-32 characters"))]
    #[validate(regex(
        path = *USERNAME_REGEX,
        message = "Username can only contain letters, numbers, underscores, and hyphens"
    ))]
    pub username: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 3, max = 32))]
    pub username: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// Edit-profile request. Pictures go through the upload endpoint.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 2000, message = "Bio can be at most 2000 characters"))]
    pub description: Option<String>,
}

/// Safe profile representation for API responses (no credentials).
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: i64,
    pub username: String,
    pub picture: Option<String>,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserProfile> for ProfileResponse {
    fn from(p: UserProfile) -> Self {
        Self {
            id: p.id,
            username: p.username,
            picture: p.picture,
            description: p.description,
            created_at: p.created_at,
        }
    }
}

pub static USERNAME_REGEX: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap());
