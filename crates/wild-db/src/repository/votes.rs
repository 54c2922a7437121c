//! Vote repository: one row per (target, profile), plus the cached net
//! score on the target itself.

use chrono::Utc;
use sqlx::SqlitePool;
use std::collections::HashMap;
use wild_common::{
    error::{WildError, WildResult},
    sorting::EntityKind,
    voting::{VoteAction, VoteState, transition},
};

/// Value stored in `votes.target_kind`.
fn kind_key(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Animal => "animal",
        EntityKind::Discussion => "discussion",
        EntityKind::Comment => "comment",
        EntityKind::UserList => "user_list",
        EntityKind::Petition => "petition",
    }
}

/// What `profile_id` currently has recorded against the target.
pub async fn current_vote(
    pool: &SqlitePool,
    kind: EntityKind,
    target_id: i64,
    profile_id: i64,
) -> Result<VoteState, sqlx::Error> {
    let direction: Option<(i64,)> = sqlx::query_as(
        "SELECT direction FROM votes WHERE target_kind = ? AND target_id = ? AND profile_id = ?",
    )
    .bind(kind_key(kind))
    .bind(target_id)
    .bind(profile_id)
    .fetch_optional(pool)
    .await?;
    Ok(VoteState::from_direction(direction.map(|d| d.0)))
}

/// Votes `profile_id` has cast on any of `target_ids`. Targets without a
/// vote are absent from the map.
pub async fn votes_by_profile(
    pool: &SqlitePool,
    kind: EntityKind,
    profile_id: i64,
    target_ids: &[i64],
) -> Result<HashMap<i64, VoteState>, sqlx::Error> {
    if target_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<(i64, i64)> = sqlx::query_as(
        "SELECT target_id, direction FROM votes WHERE target_kind = ? AND profile_id = ?",
    )
    .bind(kind_key(kind))
    .bind(profile_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .filter(|(target_id, _)| target_ids.contains(target_id))
        .map(|(target_id, direction)| (target_id, VoteState::from_direction(Some(direction))))
        .collect())
}

/// Current net score of a target, if it exists.
pub async fn score(
    pool: &SqlitePool,
    kind: EntityKind,
    target_id: i64,
) -> Result<Option<i64>, sqlx::Error> {
    if !kind.has_votes() {
        return Ok(None);
    }
    let sql = format!("SELECT votes FROM {} WHERE id = ?", kind.table());
    let row: Option<(i64,)> = sqlx::query_as(&sql)
        .bind(target_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|r| r.0))
}

/// Apply a vote click and return the target's new net score.
///
/// The vote row and the counter move together in one transaction.
pub async fn apply_vote(
    pool: &SqlitePool,
    kind: EntityKind,
    target_id: i64,
    profile_id: i64,
    action: VoteAction,
) -> WildResult<i64> {
    if !kind.has_votes() {
        return Err(WildError::validation(format!(
            "{} cannot be voted on",
            kind.category()
        )));
    }

    let mut tx = pool.begin().await?;

    let select_votes = format!("SELECT votes FROM {} WHERE id = ?", kind.table());
    let (votes,): (i64,) = sqlx::query_as(&select_votes)
        .bind(target_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| WildError::not_found(kind.category()))?;

    let stored: Option<(i64,)> = sqlx::query_as(
        "SELECT direction FROM votes WHERE target_kind = ? AND target_id = ? AND profile_id = ?",
    )
    .bind(kind_key(kind))
    .bind(target_id)
    .bind(profile_id)
    .fetch_optional(&mut *tx)
    .await?;

    let current = VoteState::from_direction(stored.map(|d| d.0));
    let step = transition(current, action);
    if step.is_noop() {
        return Ok(votes);
    }

    match step.next.direction() {
        Some(direction) => {
            sqlx::query(
                r#"
                INSERT INTO votes (target_kind, target_id, profile_id, direction, created_at)
                VALUES (?, ?, ?, ?, ?)
                ON CONFLICT (target_kind, target_id, profile_id)
                DO UPDATE SET direction = excluded.direction, created_at = excluded.created_at
                "#,
            )
            .bind(kind_key(kind))
            .bind(target_id)
            .bind(profile_id)
            .bind(direction)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;
        }
        None => {
            sqlx::query(
                "DELETE FROM votes WHERE target_kind = ? AND target_id = ? AND profile_id = ?",
            )
            .bind(kind_key(kind))
            .bind(target_id)
            .bind(profile_id)
            .execute(&mut *tx)
            .await?;
        }
    }

    let update = format!(
        "UPDATE {} SET votes = votes + ? WHERE id = ? RETURNING votes",
        kind.table()
    );
    let (count,): (i64,) = sqlx::query_as(&update)
        .bind(step.delta)
        .bind(target_id)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::debug!(kind = kind.category(), target_id, profile_id, count, "Vote applied");
    Ok(count)
}
