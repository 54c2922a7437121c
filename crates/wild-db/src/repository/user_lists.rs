//! User list repository.

use chrono::Utc;
use sqlx::SqlitePool;
use wild_common::{
    models::user_list::UserList,
    pagination::PageWindow,
    sorting::{EntityKind, SortOption},
};

use super::{contains_pattern, window_clause};

const SELECT: &str = r#"
    SELECT l.id, l.title, l.author_id, p.username AS author_username,
           l.description, l.votes, l.slug, l.created_at
    FROM user_lists l
    JOIN profiles p ON p.id = l.author_id
"#;

/// Create a list and attach its animals in one transaction.
pub async fn create_user_list(
    pool: &SqlitePool,
    author_id: i64,
    title: &str,
    description: &str,
    slug: &str,
    animal_ids: &[i64],
) -> Result<UserList, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let id = sqlx::query(
        r#"
        INSERT INTO user_lists (title, author_id, description, votes, slug, created_at)
        VALUES (?, ?, ?, 0, ?, ?)
        "#,
    )
    .bind(title)
    .bind(author_id)
    .bind(description)
    .bind(slug)
    .bind(Utc::now())
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    for animal_id in animal_ids {
        sqlx::query("INSERT OR IGNORE INTO user_list_animals (list_id, animal_id) VALUES (?, ?)")
            .bind(id)
            .bind(animal_id)
            .execute(&mut *tx)
            .await?;
    }

    let list = sqlx::query_as::<_, UserList>(&format!("{SELECT} WHERE l.id = ?"))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(list)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<UserList>, sqlx::Error> {
    sqlx::query_as::<_, UserList>(&format!("{SELECT} WHERE l.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_slug(pool: &SqlitePool, slug: &str) -> Result<Option<UserList>, sqlx::Error> {
    sqlx::query_as::<_, UserList>(&format!("{SELECT} WHERE l.slug = ?"))
        .bind(slug)
        .fetch_optional(pool)
        .await
}

pub async fn title_taken(pool: &SqlitePool, title: &str, slug: &str) -> Result<bool, sqlx::Error> {
    let row: (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM user_lists WHERE title = ? OR slug = ?)")
            .bind(title)
            .bind(slug)
            .fetch_one(pool)
            .await?;
    Ok(row.0)
}

pub async fn count(pool: &SqlitePool, author_id: Option<i64>) -> Result<i64, sqlx::Error> {
    let row: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM user_lists WHERE (? IS NULL OR author_id = ?)")
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
) -> Result<Vec<UserList>, sqlx::Error> {
    let sql = format!(
        "{SELECT} WHERE (? IS NULL OR l.author_id = ?) ORDER BY {}{}",
        sort.order_clause(EntityKind::UserList, "l."),
        window_clause(window)
    );
    sqlx::query_as::<_, UserList>(&sql)
        .bind(author_id)
        .bind(author_id)
        .fetch_all(pool)
        .await
}

pub async fn search_by_title(pool: &SqlitePool, needle: &str) -> Result<Vec<UserList>, sqlx::Error> {
    sqlx::query_as::<_, UserList>(&format!(
        "{SELECT} WHERE l.title LIKE ? ESCAPE '\\' ORDER BY l.title ASC"
    ))
    .bind(contains_pattern(needle))
    .fetch_all(pool)
    .await
}
