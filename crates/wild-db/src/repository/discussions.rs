//! Discussion repository: threads about an animal.

use chrono::Utc;
use sqlx::SqlitePool;
use wild_common::{
    models::discussion::Discussion,
    pagination::PageWindow,
    sorting::{EntityKind, SortOption},
};

use super::{contains_pattern, window_clause};

const SELECT: &str = r#"
    SELECT d.id, d.title, d.author_id, p.username AS author_username,
           d.animal_id, a.name AS animal_name, a.slug AS animal_slug,
           d.description, d.picture, d.votes, d.slug, d.created_at
    FROM discussions d
    JOIN profiles p ON p.id = d.author_id
    JOIN animals a ON a.id = d.animal_id
"#;

pub async fn create_discussion(
    pool: &SqlitePool,
    author_id: i64,
    animal_id: i64,
    title: &str,
    description: &str,
    slug: &str,
) -> Result<Discussion, sqlx::Error> {
    let id = sqlx::query(
        r#"
        INSERT INTO discussions (title, author_id, animal_id, description, votes, slug, created_at)
        VALUES (?, ?, ?, ?, 0, ?, ?)
        "#,
    )
    .bind(title)
    .bind(author_id)
    .bind(animal_id)
    .bind(description)
    .bind(slug)
    .bind(Utc::now())
    .execute(pool)
    .await?
    .last_insert_rowid();

    sqlx::query_as::<_, Discussion>(&format!("{SELECT} WHERE d.id = ?"))
        .bind(id)
        .fetch_one(pool)
        .await
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Discussion>, sqlx::Error> {
    sqlx::query_as::<_, Discussion>(&format!("{SELECT} WHERE d.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_slug(
    pool: &SqlitePool,
    slug: &str,
) -> Result<Option<Discussion>, sqlx::Error> {
    sqlx::query_as::<_, Discussion>(&format!("{SELECT} WHERE d.slug = ?"))
        .bind(slug)
        .fetch_optional(pool)
        .await
}

/// Whether a discussion already uses this exact title or would collide on slug.
pub async fn title_taken(pool: &SqlitePool, title: &str, slug: &str) -> Result<bool, sqlx::Error> {
    let row: (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM discussions WHERE title = ? OR slug = ?)")
            .bind(title)
            .bind(slug)
            .fetch_one(pool)
            .await?;
    Ok(row.0)
}

pub async fn set_picture(pool: &SqlitePool, id: i64, picture: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE discussions SET picture = ? WHERE id = ?")
        .bind(picture)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn count(pool: &SqlitePool, author_id: Option<i64>) -> Result<i64, sqlx::Error> {
    let row: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM discussions WHERE (? IS NULL OR author_id = ?)")
            .bind(author_id)
            .bind(author_id)
            .fetch_one(pool)
            .await?;
    Ok(row.0)
}

pub async fn list_sorted(
    pool: &SqlitePool,
    sort: SortOption,
    author_id: Option<i64>,
    window: Option<PageWindow>,
) -> Result<Vec<Discussion>, sqlx::Error> {
    let sql = format!(
        "{SELECT} WHERE (? IS NULL OR d.author_id = ?) ORDER BY {}{}",
        sort.order_clause(EntityKind::Discussion, "d."),
        window_clause(window)
    );
    sqlx::query_as::<_, Discussion>(&sql)
        .bind(author_id)
        .bind(author_id)
        .fetch_all(pool)
        .await
}

/// Discussions about one animal.
pub async fn list_for_animal(
    pool: &SqlitePool,
    animal_id: i64,
    sort: SortOption,
) -> Result<Vec<Discussion>, sqlx::Error> {
    let sql = format!(
        "{SELECT} WHERE d.animal_id = ? ORDER BY {}",
        sort.order_clause(EntityKind::Discussion, "d.")
    );
    sqlx::query_as::<_, Discussion>(&sql)
        .bind(animal_id)
        .fetch_all(pool)
        .await
}

pub async fn search_by_title(
    pool: &SqlitePool,
    needle: &str,
) -> Result<Vec<Discussion>, sqlx::Error> {
    sqlx::query_as::<_, Discussion>(&format!(
        "{SELECT} WHERE d.title LIKE ? ESCAPE '\\' ORDER BY d.title ASC"
    ))
    .bind(contains_pattern(needle))
    .fetch_all(pool)
    .await
}
