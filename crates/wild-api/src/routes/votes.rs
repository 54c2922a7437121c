//! Voting and petition signing.
//!
//! GET /api/v1/vote?category=&id=&status=
//! GET /api/v1/sign?petition_id=
//!
//! Both answer with a small status object instead of HTTP errors, so the
//! client can update a counter in place.

use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    middleware,
    routing::get,
};
use serde::Deserialize;
use std::sync::Arc;
use wild_common::{error::WildError, sorting::EntityKind, voting::VoteAction};
use wild_db::repository::{
    petitions::{self, SignOutcome},
    votes,
};

use super::StatusResponse;
use crate::{AppState, middleware::AuthContext};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/vote", get(vote))
        .route("/sign", get(sign_petition))
        .route_layer(middleware::from_fn(
            crate::middleware::optional_auth_middleware,
        ))
}

#[derive(Deserialize)]
struct VoteQuery {
    category: Option<String>,
    id: Option<String>,
    status: Option<String>,
}

async fn vote(
    auth: Option<Extension<AuthContext>>,
    State(state): State<Arc<AppState>>,
    Query(query): Query<VoteQuery>,
) -> Json<StatusResponse> {
    let Some(Extension(auth)) = auth else {
        return Json(StatusResponse::login());
    };

    let kind = query.category.as_deref().and_then(EntityKind::from_category);
    let target_id = query.id.as_deref().and_then(|id| id.trim().parse::<i64>().ok());
    let (Some(kind), Some(target_id)) = (kind, target_id) else {
        tracing::warn!(category = ?query.category, id = ?query.id, "Vote on unknown target");
        return Json(StatusResponse::Error);
    };

    let pool = &state.db.pool;
    let result = match query.status.as_deref().and_then(VoteAction::parse) {
        Some(action) => votes::apply_vote(pool, kind, target_id, auth.profile_id, action).await,
        // unrecognised clicks leave the vote alone but still report the count
        None => match votes::score(pool, kind, target_id).await {
            Ok(Some(count)) => Ok(count),
            Ok(None) => Err(WildError::not_found(kind.category())),
            Err(e) => Err(e.into()),
        },
    };

    match result {
        Ok(count) => Json(StatusResponse::Success { count: Some(count) }),
        Err(e) => {
            tracing::warn!(error = %e, target_id, profile_id = auth.profile_id, "Vote failed");
            Json(StatusResponse::Error)
        }
    }
}

#[derive(Deserialize)]
struct SignQuery {
    petition_id: Option<String>,
}

async fn sign_petition(
    auth: Option<Extension<AuthContext>>,
    State(state): State<Arc<AppState>>,
    Query(query): Query<SignQuery>,
) -> Json<StatusResponse> {
    let Some(Extension(auth)) = auth else {
        return Json(StatusResponse::login());
    };

    let Some(petition_id) = query
        .petition_id
        .as_deref()
        .and_then(|id| id.trim().parse::<i64>().ok())
    else {
        return Json(StatusResponse::Error);
    };

    match petitions::sign(&state.db.pool, petition_id, auth.profile_id).await {
        Ok(SignOutcome::Signed(petition)) => {
            tracing::info!(
                petition_id,
                profile_id = auth.profile_id,
                signatures = petition.signatures,
                "Petition signed"
            );
            Json(StatusResponse::Success { count: None })
        }
        Ok(SignOutcome::AlreadySigned) => Json(StatusResponse::AlreadySigned),
        Err(e) => {
            tracing::warn!(error = %e, petition_id, profile_id = auth.profile_id, "Signing failed");
            Json(StatusResponse::Error)
        }
    }
}
