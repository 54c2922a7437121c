//! Comment repository: replies inside discussions.

use chrono::Utc;
use sqlx::SqlitePool;
use wild_common::{
    models::comment::Comment,
    sorting::{EntityKind, SortOption},
};

const SELECT: &str = r#"
    SELECT c.id, c.author_id, p.username AS author_username,
           c.discussion_id, d.title AS discussion_title, d.slug AS discussion_slug,
           c.content, c.votes, c.created_at
    FROM comments c
    JOIN profiles p ON p.id = c.author_id
    JOIN discussions d ON d.id = c.discussion_id
"#;

pub async fn create_comment(
    pool: &SqlitePool,
    author_id: i64,
    discussion_id: i64,
    content: &str,
) -> Result<Comment, sqlx::Error> {
    let id = sqlx::query(
        r#"
        INSERT INTO comments (author_id, discussion_id, content, votes, created_at)
        VALUES (?, ?, ?, 0, ?)
        "#,
    )
    .bind(author_id)
    .bind(discussion_id)
    .bind(content)
    .bind(Utc::now())
    .execute(pool)
    .await?
    .last_insert_rowid();

    sqlx::query_as::<_, Comment>(&format!("{SELECT} WHERE c.id = ?"))
        .bind(id)
        .fetch_one(pool)
        .await
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Comment>, sqlx::Error> {
    sqlx::query_as::<_, Comment>(&format!("{SELECT} WHERE c.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn count(pool: &SqlitePool, author_id: Option<i64>) -> Result<i64, sqlx::Error> {
    let row: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM comments WHERE (? IS NULL OR author_id = ?)")
            .bind(author_id)
            .bind(author_id)
            .fetch_one(pool)
            .await?;
    Ok(row.0)
}

/// Comments written by `author_id` (or everyone), in the requested order.
pub async fn list_sorted(
    pool: &SqlitePool,
    sort: SortOption,
    author_id: Option<i64>,
) -> Result<Vec<Comment>, sqlx::Error> {
    let sql = format!(
        "{SELECT} WHERE (? IS NULL OR c.author_id = ?) ORDER BY {}",
        sort.order_clause(EntityKind::Comment, "c.")
    );
    sqlx::query_as::<_, Comment>(&sql)
        .bind(author_id)
        .bind(author_id)
        .fetch_all(pool)
        .await
}

/// Comments under one discussion.
pub async fn list_for_discussion(
    pool: &SqlitePool,
    discussion_id: i64,
    sort: SortOption,
) -> Result<Vec<Comment>, sqlx::Error> {
    let sql = format!(
        "{SELECT} WHERE c.discussion_id = ? ORDER BY {}",
        sort.order_clause(EntityKind::Comment, "c.")
    );
    sqlx::query_as::<_, Comment>(&sql)
        .bind(discussion_id)
        .fetch_all(pool)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Database,
        repository::{animals, discussions, profiles},
    };

    #[tokio::test]
    async fn test_comments_for_discussion() {
        let db = Database::in_memory().await.unwrap();
        let author = profiles::create_profile(&db.pool, "testuser", None, "hash").await.unwrap();
        let lion = animals::create_animal(&db.pool, author.id, "Lion", "", "lion").await.unwrap();
        let thread = discussions::create_discussion(&db.pool, author.id, lion.id, "Lions", "", "lions")
            .await
            .unwrap();

        let first = create_comment(&db.pool, author.id, thread.id, "first!").await.unwrap();
        let second = create_comment(&db.pool, author.id, thread.id, "second").await.unwrap();
        assert_eq!(first.discussion_slug, "lions");

        let newest = list_for_discussion(&db.pool, thread.id, SortOption::Newest).await.unwrap();
        let ids: Vec<_> = newest.iter().map(|c| c.id).collect();
        assert_eq!(ids, [second.id, first.id]);

        let mine = list_sorted(&db.pool, SortOption::Oldest, Some(author.id)).await.unwrap();
        assert_eq!(mine[0].content, "first!");
    }
}
