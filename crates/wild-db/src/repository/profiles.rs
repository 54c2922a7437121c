//! Profile repository: CRUD operations for member accounts.

use chrono::Utc;
use sqlx::SqlitePool;
use wild_common::{models::profile::UserProfile, pagination::PageWindow, sorting::ProfileSort};

use super::{contains_pattern, window_clause};

/// Create a new profile.
pub async fn create_profile(
    pool: &SqlitePool,
    username: &str,
    email: Option<&str>,
    password_hash: &str,
) -> Result<UserProfile, sqlx::Error> {
    sqlx::query_as::<_, UserProfile>(
        r#"
        INSERT INTO profiles (username, email, password_hash, description, created_at)
        VALUES (?, ?, ?, '', ?)
        RETURNING *
        "#,
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
}

/// Find a profile by its ID.
pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<UserProfile>, sqlx::Error> {
    sqlx::query_as::<_, UserProfile>("SELECT * FROM profiles WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Find a profile by username (case-insensitive).
pub async fn find_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<UserProfile>, sqlx::Error> {
    sqlx::query_as::<_, UserProfile>("SELECT * FROM profiles WHERE LOWER(username) = LOWER(?)")
        .bind(username)
        .fetch_optional(pool)
        .await
}

/// Find a profile by email.
pub async fn find_by_email(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<UserProfile>, sqlx::Error> {
    sqlx::query_as::<_, UserProfile>("SELECT * FROM profiles WHERE LOWER(email) = LOWER(?)")
        .bind(email)
        .fetch_optional(pool)
        .await
}

/// Update the bio.
pub async fn update_description(
    pool: &SqlitePool,
    id: i64,
    description: &str,
) -> Result<UserProfile, sqlx::Error> {
    sqlx::query_as::<_, UserProfile>(
        "UPDATE profiles SET description = ? WHERE id = ? RETURNING *",
    )
    .bind(description)
    .bind(id)
    .fetch_one(pool)
    .await
}

/// Point the profile at a new picture.
pub async fn set_picture(pool: &SqlitePool, id: i64, picture: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE profiles SET picture = ? WHERE id = ?")
        .bind(picture)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Count all profiles.
pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM profiles")
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}

/// List profiles in the requested order.
pub async fn list_sorted(
    pool: &SqlitePool,
    sort: ProfileSort,
    window: Option<PageWindow>,
) -> Result<Vec<UserProfile>, sqlx::Error> {
    let sql = format!(
        "SELECT * FROM profiles ORDER BY {}{}",
        sort.order_clause(),
        window_clause(window)
    );
    sqlx::query_as::<_, UserProfile>(&sql).fetch_all(pool).await
}

/// Profiles whose username contains `needle`.
pub async fn search_by_username(
    pool: &SqlitePool,
    needle: &str,
) -> Result<Vec<UserProfile>, sqlx::Error> {
    sqlx::query_as::<_, UserProfile>(
        r#"
        SELECT * FROM profiles
        WHERE username LIKE ? ESCAPE '\'
        ORDER BY username ASC
        "#,
    )
    .bind(contains_pattern(needle))
    .fetch_all(pool)
    .await
}

/// Pick up to `limit` random profiles (sample-content generation).
pub async fn random(pool: &SqlitePool, limit: i64) -> Result<Vec<UserProfile>, sqlx::Error> {
    sqlx::query_as::<_, UserProfile>("SELECT * FROM profiles ORDER BY RANDOM() LIMIT ?")
        .bind(limit)
        .fetch_all(pool)
        .await
}
