//! Profile routes.
//!
//! GET   /api/v1/profiles?sort_by=&page=
//! GET   /api/v1/profiles/{username}?tab=&sort_by=
//! PATCH /api/v1/profiles/@me

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    middleware,
    routing::{get, patch},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use wild_common::{
    error::{WildError, WildResult},
    models::profile::{ProfileResponse, UpdateProfileRequest},
    pagination::PageWindow,
    sorting::EntityKind,
    validation::validate_request,
};
use wild_db::{
    repository::profiles,
    sorter::{self, SortedEntities},
};

use super::{ListQuery, SortedPage, page_size};
use crate::{AppState, middleware::AuthContext};

pub fn router() -> Router<Arc<AppState>> {
    let public = Router::new()
        .route("/profiles", get(list_profiles))
        .route("/profiles/{username}", get(get_profile))
        .route_layer(middleware::from_fn(
            crate::middleware::optional_auth_middleware,
        ));

    let protected = Router::new()
        .route("/profiles/@me", patch(update_me))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware));

    public.merge(protected)
}

async fn list_profiles(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> WildResult<Json<SortedPage<ProfileResponse>>> {
    let pool = &state.db.pool;
    let total = profiles::count(pool).await?;
    let window = PageWindow::resolve(query.page.as_deref(), total, page_size());

    let (sort, rows) = sorter::sort_profiles(pool, query.sort_by.as_deref(), Some(window)).await?;

    Ok(Json(SortedPage {
        sort_by: sort.key(),
        sort_label: sort.key().to_string(),
        page: window.into_page(rows.into_iter().map(Into::into).collect()),
    }))
}

#[derive(Deserialize)]
struct ProfileQuery {
    tab: Option<String>,
    sort_by: Option<String>,
}

#[derive(Serialize)]
struct ProfileDetail {
    profile: ProfileResponse,
    /// Username of the signed-in viewer, if any
    loguser: Option<String>,
    tab: &'static str,
    sort_by: &'static str,
    sort_label: String,
    results: SortedEntities,
}

async fn get_profile(
    auth: Option<Extension<AuthContext>>,
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    Query(query): Query<ProfileQuery>,
) -> WildResult<Json<ProfileDetail>> {
    let pool = &state.db.pool;
    let profile = profiles::find_by_username(pool, &username)
        .await?
        .ok_or_else(|| WildError::not_found("Profile"))?;

    let kind = query
        .tab
        .as_deref()
        .and_then(EntityKind::from_category)
        .unwrap_or(EntityKind::Animal);

    let (sort, results) =
        sorter::sort_model(pool, query.sort_by.as_deref(), kind, Some(profile.id), None).await?;

    Ok(Json(ProfileDetail {
        profile: profile.into(),
        loguser: auth.map(|Extension(a)| a.username),
        tab: kind.category(),
        sort_by: sort.key(),
        sort_label: sort.label(),
        results,
    }))
}

async fn update_me(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<UpdateProfileRequest>,
) -> WildResult<Json<ProfileResponse>> {
    validate_request(&body)?;

    let profile = match body.description {
        Some(ref description) => {
            profiles::update_description(&state.db.pool, auth.profile_id, description).await?
        }
        None => profiles::find_by_id(&state.db.pool, auth.profile_id)
            .await?
            .ok_or_else(|| WildError::not_found("Profile"))?,
    };

    tracing::info!(profile_id = profile.id, "Profile updated");

    Ok(Json(profile.into()))
}
