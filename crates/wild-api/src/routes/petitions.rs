//! Petition routes.
//!
//! GET  /api/v1/petitions?sort_by=&page=
//! POST /api/v1/petitions
//! GET  /api/v1/petitions/{slug}   (progress and, when signed in, whether you signed)
//!
//! Signing lives in `votes.rs` (`/sign`).

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    middleware,
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;
use wild_common::{
    error::{WildError, WildResult},
    models::{
        animal::Animal,
        petition::{CreatePetitionRequest, DEFAULT_GOAL, PETITION_EXISTS, Petition},
    },
    pagination::PageWindow,
    sorting::{EntityKind, SortOption},
    validation::{slug_for, validate_request},
};
use wild_db::repository::{
    animals,
    petitions::{self, NewPetition},
};

use super::{ListQuery, SortedPage, lists::checked_animal_ids, page_size};
use crate::{AppState, middleware::AuthContext};

pub fn router() -> Router<Arc<AppState>> {
    let public = Router::new()
        .route("/petitions", get(list_petitions))
        .route("/petitions/{slug}", get(get_petition))
        .route_layer(middleware::from_fn(
            crate::middleware::optional_auth_middleware,
        ));

    let protected = Router::new()
        .route("/petitions", post(create_petition))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware));

    public.merge(protected)
}

async fn list_petitions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> WildResult<Json<SortedPage<Petition>>> {
    let pool = &state.db.pool;
    let total = petitions::count(pool, None).await?;
    let window = PageWindow::resolve(query.page.as_deref(), total, page_size());

    let sort = SortOption::resolve(query.sort_by.as_deref(), EntityKind::Petition);
    let rows = petitions::list_sorted(pool, sort, None, Some(window)).await?;

    Ok(Json(SortedPage {
        sort_by: sort.key(),
        sort_label: sort.label(),
        page: window.into_page(rows),
    }))
}

async fn create_petition(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreatePetitionRequest>,
) -> WildResult<Json<Petition>> {
    validate_request(&body)?;
    let slug = slug_for(&body.title)?;
    let pool = &state.db.pool;

    let animal_ids = checked_animal_ids(pool, &body.animal_ids).await?;
    if petitions::title_taken(pool, &body.title, &slug).await? {
        return Err(WildError::AlreadyExists {
            message: PETITION_EXISTS.into(),
        });
    }

    let petition = petitions::create_petition(
        pool,
        &NewPetition {
            author_id: auth.profile_id,
            title: &body.title,
            slug: &slug,
            description: body.description.as_deref().unwrap_or_default(),
            decision_maker: body.decision_maker.as_deref().unwrap_or_default(),
            goal: body.goal.unwrap_or(DEFAULT_GOAL),
            animal_ids: &animal_ids,
        },
    )
    .await?;

    tracing::info!(petition_id = petition.id, slug = %petition.slug, goal = petition.goal, "Petition created");

    Ok(Json(petition))
}

#[derive(Serialize)]
struct PetitionDetail {
    petition: Petition,
    animals: Vec<Animal>,
    progress_width: i64,
    has_signed: bool,
}

async fn get_petition(
    auth: Option<Extension<AuthContext>>,
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> WildResult<Json<PetitionDetail>> {
    let pool = &state.db.pool;
    let petition = petitions::find_by_slug(pool, &slug)
        .await?
        .ok_or_else(|| WildError::not_found("Petition"))?;

    let has_signed = match auth {
        Some(Extension(auth)) => petitions::has_signed(pool, petition.id, auth.profile_id).await?,
        None => false,
    };

    Ok(Json(PetitionDetail {
        animals: animals::list_for_petition(pool, petition.id).await?,
        progress_width: petition.progress_width(),
        has_signed,
        petition,
    }))
}
