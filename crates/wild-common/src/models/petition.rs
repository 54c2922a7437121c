//! Petition model: signatures counted against a goal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::WildError;

/// Default signature goal for new petitions.
pub const DEFAULT_GOAL: i64 = 10;

pub const PETITION_EXISTS: &str = "A petition with this title already exists.";

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Petition {
    pub id: i64,

    pub title: String,

    pub author_id: i64,
    pub author_username: String,

    pub picture: Option<String>,

    pub description: String,

    /// Person or organisation able to grant the petition
    pub decision_maker: String,

    pub goal: i64,

    pub signatures: i64,

    /// Unique, derived from `title`
    pub slug: String,

    pub created_at: DateTime<Utc>,
}

impl Petition {
    /// Width of the progress bar as a whole percentage.
    pub fn progress_width(&self) -> i64 {
        progress_width(self.signatures, self.goal)
    }
}

/// `floor(signatures / goal * 100)`, or 0 for a zero goal.
pub fn progress_width(signatures: i64, goal: i64) -> i64 {
    if goal == 0 {
        0
    } else {
        signatures * 100 / goal
    }
}

/// Check the counters a petition may be saved with.
pub fn check_counts(goal: i64, signatures: i64) -> Result<(), WildError> {
    if signatures < 0 {
        return Err(WildError::validation("Signatures cannot be negative"));
    }
    if goal < 0 {
        return Err(WildError::validation("Goal cannot be negative"));
    }
    if signatures > goal {
        return Err(WildError::validation(
            "Signatures cannot be greater than goal",
        ));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePetitionRequest {
    #[validate(length(min = 1, max = 128, message = "Title must be 1-128 characters"))]
    pub title: String,

    #[validate(length(max = 128, message = "Decision maker can be at most 128 characters"))]
    pub decision_maker: Option<String>,

    /// Number of signatures to aim for
    #[validate(range(min = 10, message = "Goal must be at least 10 signatures"))]
    pub goal: Option<i64>,

    #[serde(default)]
    pub animal_ids: Vec<i64>,

    #[validate(length(max = 5000))]
    pub description: Option<String>,
}
