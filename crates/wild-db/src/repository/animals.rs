//! Animal repository: the catalogue.

use chrono::Utc;
use sqlx::SqlitePool;
use wild_common::{
    models::animal::Animal,
    pagination::PageWindow,
    sorting::{EntityKind, SortOption},
};

use super::{contains_pattern, window_clause};

const SELECT: &str = r#"
    SELECT a.id, a.author_id, p.username AS author_username, a.name, a.description,
           a.picture, a.votes, a.slug, a.created_at
    FROM animals a
    JOIN profiles p ON p.id = a.author_id
"#;

/// Insert a new animal with a zero score.
pub async fn create_animal(
    pool: &SqlitePool,
    author_id: i64,
    name: &str,
    description: &str,
    slug: &str,
) -> Result<Animal, sqlx::Error> {
    create_with_votes(pool, author_id, name, description, None, slug, 0).await
}

/// Insert a new animal with an explicit picture and starting score (seeding).
pub async fn create_with_votes(
    pool: &SqlitePool,
    author_id: i64,
    name: &str,
    description: &str,
    picture: Option<&str>,
    slug: &str,
    votes: i64,
) -> Result<Animal, sqlx::Error> {
    let id = sqlx::query(
        r#"
        INSERT INTO animals (author_id, name, description, picture, votes, slug, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(author_id)
    .bind(name)
    .bind(description)
    .bind(picture)
    .bind(votes)
    .bind(slug)
    .bind(Utc::now())
    .execute(pool)
    .await?
    .last_insert_rowid();

    fetch_by_id(pool, id).await
}

async fn fetch_by_id(pool: &SqlitePool, id: i64) -> Result<Animal, sqlx::Error> {
    sqlx::query_as::<_, Animal>(&format!("{SELECT} WHERE a.id = ?"))
        .bind(id)
        .fetch_one(pool)
        .await
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Animal>, sqlx::Error> {
    sqlx::query_as::<_, Animal>(&format!("{SELECT} WHERE a.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_slug(pool: &SqlitePool, slug: &str) -> Result<Option<Animal>, sqlx::Error> {
    sqlx::query_as::<_, Animal>(&format!("{SELECT} WHERE a.slug = ?"))
        .bind(slug)
        .fetch_optional(pool)
        .await
}

/// Whether another animal already uses this exact name or would collide on slug.
pub async fn name_taken(pool: &SqlitePool, name: &str, slug: &str) -> Result<bool, sqlx::Error> {
    let row: (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM animals WHERE name = ? OR slug = ?)")
            .bind(name)
            .bind(slug)
            .fetch_one(pool)
            .await?;
    Ok(row.0)
}

pub async fn set_picture(pool: &SqlitePool, id: i64, picture: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE animals SET picture = ? WHERE id = ?")
        .bind(picture)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Count animals, optionally only those added by `author_id`.
pub async fn count(pool: &SqlitePool, author_id: Option<i64>) -> Result<i64, sqlx::Error> {
    let row: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM animals WHERE (? IS NULL OR author_id = ?)")
            .bind(author_id)
            .bind(author_id)
            .fetch_one(pool)
            .await?;
    Ok(row.0)
}

/// List animals in the requested order, optionally only those by `author_id`.
pub async fn list_sorted(
    pool: &SqlitePool,
    sort: SortOption,
    author_id: Option<i64>,
    window: Option<PageWindow>,
) -> Result<Vec<Animal>, sqlx::Error> {
    let sql = format!(
        "{SELECT} WHERE (? IS NULL OR a.author_id = ?) ORDER BY {}{}",
        sort.order_clause(EntityKind::Animal, "a."),
        window_clause(window)
    );
    sqlx::query_as::<_, Animal>(&sql)
        .bind(author_id)
        .bind(author_id)
        .fetch_all(pool)
        .await
}

/// Highest (`descending`) or lowest scored animals.
pub async fn top_by_votes(
    pool: &SqlitePool,
    descending: bool,
    limit: i64,
) -> Result<Vec<Animal>, sqlx::Error> {
    let sort = if descending {
        SortOption::Overrated
    } else {
        SortOption::Underrated
    };
    let sql = format!(
        "{SELECT} ORDER BY {} LIMIT ?",
        sort.order_clause(EntityKind::Animal, "a.")
    );
    sqlx::query_as::<_, Animal>(&sql)
        .bind(limit)
        .fetch_all(pool)
        .await
}

pub async fn count_in_list(pool: &SqlitePool, list_id: i64) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM user_list_animals WHERE list_id = ?")
        .bind(list_id)
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}

/// Animals on a user list, in the requested order.
pub async fn list_in_list(
    pool: &SqlitePool,
    list_id: i64,
    sort: SortOption,
    window: Option<PageWindow>,
) -> Result<Vec<Animal>, sqlx::Error> {
    let sql = format!(
        "{SELECT} JOIN user_list_animals ula ON ula.animal_id = a.id \
         WHERE ula.list_id = ? ORDER BY {}{}",
        sort.order_clause(EntityKind::Animal, "a."),
        window_clause(window)
    );
    sqlx::query_as::<_, Animal>(&sql)
        .bind(list_id)
        .fetch_all(pool)
        .await
}

/// Animals a petition is about, alphabetically.
pub async fn list_for_petition(
    pool: &SqlitePool,
    petition_id: i64,
) -> Result<Vec<Animal>, sqlx::Error> {
    sqlx::query_as::<_, Animal>(&format!(
        "{SELECT} JOIN petition_animals pa ON pa.animal_id = a.id \
         WHERE pa.petition_id = ? ORDER BY a.name ASC"
    ))
    .bind(petition_id)
    .fetch_all(pool)
    .await
}

/// Every animal, alphabetically (form choices).
pub async fn list_all(pool: &SqlitePool) -> Result<Vec<Animal>, sqlx::Error> {
    sqlx::query_as::<_, Animal>(&format!("{SELECT} ORDER BY a.name ASC"))
        .fetch_all(pool)
        .await
}

/// Which of `ids` exist. Used to reject dangling many-to-many references.
pub async fn existing_ids(pool: &SqlitePool, ids: &[i64]) -> Result<Vec<i64>, sqlx::Error> {
    let mut found = Vec::with_capacity(ids.len());
    for &id in ids {
        let row: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM animals WHERE id = ?)")
            .bind(id)
            .fetch_one(pool)
            .await?;
        if row.0 {
            found.push(id);
        }
    }
    Ok(found)
}

/// Animals whose name contains `needle`.
pub async fn search_by_name(pool: &SqlitePool, needle: &str) -> Result<Vec<Animal>, sqlx::Error> {
    sqlx::query_as::<_, Animal>(&format!(
        "{SELECT} WHERE a.name LIKE ? ESCAPE '\\' ORDER BY a.name ASC"
    ))
    .bind(contains_pattern(needle))
    .fetch_all(pool)
    .await
}

/// Pick up to `limit` random animals (sample-content generation).
pub async fn random(pool: &SqlitePool, limit: i64) -> Result<Vec<Animal>, sqlx::Error> {
    sqlx::query_as::<_, Animal>(&format!("{SELECT} ORDER BY RANDOM() LIMIT ?"))
        .bind(limit)
        .fetch_all(pool)
        .await
}
