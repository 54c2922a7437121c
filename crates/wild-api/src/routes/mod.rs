//! API route modules and the bits they share.

pub mod animals;
pub mod auth;
pub mod discussions;
pub mod health;
pub mod home;
pub mod lists;
pub mod petitions;
pub mod profiles;
pub mod uploads;
pub mod votes;

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use wild_common::{
    error::{WildError, WildResult},
    pagination::Page,
    sorting::EntityKind,
    voting::VoteState,
};
use wild_db::repository::votes as vote_repo;

use crate::middleware::AuthContext;

/// Where anonymous clients are sent by `/vote` and `/sign`.
pub const LOGIN_URL: &str = "/api/v1/auth/login";

/// `?sort_by=&page=` accepted by every list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub sort_by: Option<String>,
    pub page: Option<String>,
}

/// A sorted, paginated listing.
#[derive(Debug, Serialize)]
pub struct SortedPage<T> {
    /// Resolved sort key (`most_signed`)
    pub sort_by: &'static str,
    /// Display form (`most signed`)
    pub sort_label: String,
    #[serde(flatten)]
    pub page: Page<T>,
}

/// Body of the small status endpoints (`/vote`, `/sign`).
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StatusResponse {
    Success {
        #[serde(skip_serializing_if = "Option::is_none")]
        count: Option<i64>,
    },
    AlreadySigned,
    Error,
    Login {
        login_url: &'static str,
    },
}

impl StatusResponse {
    pub fn login() -> Self {
        Self::Login {
            login_url: LOGIN_URL,
        }
    }
}

/// How the viewer voted on one target. Anonymous viewers get `none`.
pub(crate) async fn viewer_vote(
    pool: &SqlitePool,
    viewer: Option<&AuthContext>,
    kind: EntityKind,
    target_id: i64,
) -> WildResult<VoteState> {
    match viewer {
        Some(auth) => Ok(vote_repo::current_vote(pool, kind, target_id, auth.profile_id).await?),
        None => Ok(VoteState::None),
    }
}

pub(crate) fn page_size() -> u32 {
    wild_common::config::get().pagination.page_size
}

/// Wrap a non-domain failure (hashing, token signing, storage IO).
pub(crate) fn internal(e: impl std::fmt::Display) -> WildError {
    WildError::Internal(anyhow::anyhow!("{e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_response_shapes() {
        let json = |r: StatusResponse| serde_json::to_value(r).unwrap();
        assert_eq!(
            json(StatusResponse::Success { count: Some(3) }),
            serde_json::json!({"status": "success", "count": 3})
        );
        assert_eq!(
            json(StatusResponse::Success { count: None }),
            serde_json::json!({"status": "success"})
        );
        assert_eq!(json(StatusResponse::Error), serde_json::json!({"status": "error"}));
        assert_eq!(
            json(StatusResponse::AlreadySigned),
            serde_json::json!({"status": "already_signed"})
        );
        assert_eq!(
            json(StatusResponse::login()),
            serde_json::json!({"status": "login", "login_url": "/api/v1/auth/login"})
        );
    }
}
