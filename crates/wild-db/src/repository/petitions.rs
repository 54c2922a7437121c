//! Petition repository: petitions, their animals, and signatures.

use chrono::Utc;
use sqlx::SqlitePool;
use wild_common::{
    error::{WildError, WildResult},
    models::petition::{Petition, check_counts},
    pagination::PageWindow,
    sorting::{EntityKind, SortOption},
};

use super::{contains_pattern, window_clause};

const SELECT: &str = r#"
    SELECT t.id, t.title, t.author_id, p.username AS author_username, t.picture,
           t.description, t.decision_maker, t.goal, t.signatures, t.slug, t.created_at
    FROM petitions t
    JOIN profiles p ON p.id = t.author_id
"#;

/// Fields for a new petition.
#[derive(Debug)]
pub struct NewPetition<'a> {
    pub author_id: i64,
    pub title: &'a str,
    pub slug: &'a str,
    pub description: &'a str,
    pub decision_maker: &'a str,
    pub goal: i64,
    pub animal_ids: &'a [i64],
}

/// Result of a signing attempt.
#[derive(Debug)]
pub enum SignOutcome {
    Signed(Petition),
    AlreadySigned,
}

/// Create a petition and link its animals in one transaction.
pub async fn create_petition(pool: &SqlitePool, new: &NewPetition<'_>) -> WildResult<Petition> {
    check_counts(new.goal, 0)?;

    let mut tx = pool.begin().await?;
    let id = sqlx::query(
        r#"
        INSERT INTO petitions (title, author_id, description, decision_maker, goal, signatures, slug, created_at)
        VALUES (?, ?, ?, ?, ?, 0, ?, ?)
        "#,
    )
    .bind(new.title)
    .bind(new.author_id)
    .bind(new.description)
    .bind(new.decision_maker)
    .bind(new.goal)
    .bind(new.slug)
    .bind(Utc::now())
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    for animal_id in new.animal_ids {
        sqlx::query("INSERT OR IGNORE INTO petition_animals (petition_id, animal_id) VALUES (?, ?)")
            .bind(id)
            .bind(animal_id)
            .execute(&mut *tx)
            .await?;
    }

    let petition = sqlx::query_as::<_, Petition>(&format!("{SELECT} WHERE t.id = ?"))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(petition)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Petition>, sqlx::Error> {
    sqlx::query_as::<_, Petition>(&format!("{SELECT} WHERE t.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_slug(pool: &SqlitePool, slug: &str) -> Result<Option<Petition>, sqlx::Error> {
    sqlx::query_as::<_, Petition>(&format!("{SELECT} WHERE t.slug = ?"))
        .bind(slug)
        .fetch_optional(pool)
        .await
}

/// Whether a petition already uses this exact title or would collide on slug.
pub async fn title_taken(pool: &SqlitePool, title: &str, slug: &str) -> Result<bool, sqlx::Error> {
    let row: (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM petitions WHERE title = ? OR slug = ?)")
            .bind(title)
            .bind(slug)
            .fetch_one(pool)
            .await?;
    Ok(row.0)
}

pub async fn set_picture(pool: &SqlitePool, id: i64, picture: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE petitions SET picture = ? WHERE id = ?")
        .bind(picture)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn count(pool: &SqlitePool, author_id: Option<i64>) -> Result<i64, sqlx::Error> {
    let row: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM petitions WHERE (? IS NULL OR author_id = ?)")
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
) -> Result<Vec<Petition>, sqlx::Error> {
    let sql = format!(
        "{SELECT} WHERE (? IS NULL OR t.author_id = ?) ORDER BY {}{}",
        sort.order_clause(EntityKind::Petition, "t."),
        window_clause(window)
    );
    sqlx::query_as::<_, Petition>(&sql)
        .bind(author_id)
        .bind(author_id)
        .fetch_all(pool)
        .await
}

pub async fn search_by_title(pool: &SqlitePool, needle: &str) -> Result<Vec<Petition>, sqlx::Error> {
    sqlx::query_as::<_, Petition>(&format!(
        "{SELECT} WHERE t.title LIKE ? ESCAPE '\\' ORDER BY t.title ASC"
    ))
    .bind(contains_pattern(needle))
    .fetch_all(pool)
    .await
}

/// Whether `profile_id` has signed the petition.
pub async fn has_signed(
    pool: &SqlitePool,
    petition_id: i64,
    profile_id: i64,
) -> Result<bool, sqlx::Error> {
    let row: (bool,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM petition_signatures WHERE petition_id = ? AND profile_id = ?)",
    )
    .bind(petition_id)
    .bind(profile_id)
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}

/// Record a signature and bump the counter.
///
/// Fails with a validation error when the petition has already reached its
/// goal; the signature is not recorded in that case.
pub async fn sign(pool: &SqlitePool, petition_id: i64, profile_id: i64) -> WildResult<SignOutcome> {
    let mut tx = pool.begin().await?;

    let petition = sqlx::query_as::<_, Petition>(&format!("{SELECT} WHERE t.id = ?"))
        .bind(petition_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| WildError::not_found("Petition"))?;

    let inserted = sqlx::query(
        r#"
        INSERT INTO petition_signatures (petition_id, profile_id, created_at)
        VALUES (?, ?, ?)
        ON CONFLICT (petition_id, profile_id) DO NOTHING
        "#,
    )
    .bind(petition_id)
    .bind(profile_id)
    .bind(Utc::now())
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if inserted == 0 {
        return Ok(SignOutcome::AlreadySigned);
    }

    // dropping `tx` on error rolls the signature back
    check_counts(petition.goal, petition.signatures + 1)?;

    sqlx::query("UPDATE petitions SET signatures = signatures + 1 WHERE id = ?")
        .bind(petition_id)
        .execute(&mut *tx)
        .await?;

    let updated = sqlx::query_as::<_, Petition>(&format!("{SELECT} WHERE t.id = ?"))
        .bind(petition_id)
        .fetch_one(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(SignOutcome::Signed(updated))
}

/// Overwrite both counters (seeding). Enforces the petition invariants.
pub async fn set_counts(
    pool: &SqlitePool,
    petition_id: i64,
    goal: i64,
    signatures: i64,
) -> WildResult<()> {
    check_counts(goal, signatures)?;
    sqlx::query("UPDATE petitions SET goal = ?, signatures = ? WHERE id = ?")
        .bind(goal)
        .bind(signatures)
        .bind(petition_id)
        .execute(pool)
        .await?;
    Ok(())
}
