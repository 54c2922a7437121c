//! Authentication routes: register, login, refresh.
//!
//! Registering creates the member's profile in the same step.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use wild_common::{
    error::{WildError, WildResult},
    models::profile::{CreateProfileRequest, LoginRequest, ProfileResponse, UserProfile},
    validation::validate_request,
};
use wild_db::repository::profiles;

use super::internal;
use crate::{
    AppState,
    auth::{self, TokenPair},
};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh_token))
}

#[derive(Serialize)]
struct AuthResponse {
    profile: ProfileResponse,
    #[serde(flatten)]
    tokens: TokenPair,
}

#[derive(Deserialize)]
struct RefreshRequest {
    refresh_token: String,
}

fn issue_tokens(profile: &UserProfile) -> WildResult<TokenPair> {
    let config = wild_common::config::get();
    auth::generate_token_pair(
        profile.id,
        &profile.username,
        &config.auth.jwt_secret,
        config.auth.access_token_ttl_secs,
        config.auth.refresh_token_ttl_secs,
    )
    .map_err(internal)
}

/// POST /api/v1/auth/register
async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateProfileRequest>,
) -> WildResult<Json<AuthResponse>> {
    validate_request(&body)?;

    if profiles::find_by_username(&state.db.pool, &body.username)
        .await?
        .is_some()
    {
        return Err(WildError::AlreadyExists {
            message: "A user with that username already exists.".into(),
        });
    }

    if let Some(ref email) = body.email {
        if profiles::find_by_email(&state.db.pool, email).await?.is_some() {
            return Err(WildError::AlreadyExists {
                message: "A user with that email already exists.".into(),
            });
        }
    }

    let password_hash = auth::hash_password(&body.password).map_err(internal)?;

    let profile = profiles::create_profile(
        &state.db.pool,
        &body.username,
        body.email.as_deref(),
        &password_hash,
    )
    .await?;

    let tokens = issue_tokens(&profile)?;

    tracing::info!(profile_id = profile.id, username = %profile.username, "New profile registered");

    Ok(Json(AuthResponse {
        profile: profile.into(),
        tokens,
    }))
}

/// POST /api/v1/auth/login
async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> WildResult<Json<AuthResponse>> {
    validate_request(&body)?;

    let profile = profiles::find_by_username(&state.db.pool, &body.username)
        .await?
        .ok_or(WildError::InvalidCredentials)?;

    let valid = auth::verify_password(&body.password, &profile.password_hash)
        .map_err(|_| WildError::InvalidCredentials)?;
    if !valid {
        return Err(WildError::InvalidCredentials);
    }

    let tokens = issue_tokens(&profile)?;

    tracing::info!(profile_id = profile.id, "Profile logged in");

    Ok(Json(AuthResponse {
        profile: profile.into(),
        tokens,
    }))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a refresh token for a new token pair.
async fn refresh_token(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RefreshRequest>,
) -> WildResult<Json<TokenPair>> {
    let config = wild_common::config::get();

    let claims = auth::validate_token(&body.refresh_token, &config.auth.jwt_secret)
        .map_err(|_| WildError::InvalidToken)?;
    if claims.token_type != auth::REFRESH {
        return Err(WildError::InvalidToken);
    }

    let profile_id = claims.profile_id().ok_or(WildError::InvalidToken)?;

    // the profile may have been deleted since the token was issued
    let profile = profiles::find_by_id(&state.db.pool, profile_id)
        .await?
        .ok_or(WildError::InvalidToken)?;

    Ok(Json(issue_tokens(&profile)?))
}
