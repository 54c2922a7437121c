//! Animal routes: the catalogue.
//!
//! GET  /api/v1/animals?sort_by=&page=   (sorted, paginated catalogue)
//! POST /api/v1/animals                  (add an animal)
//! GET  /api/v1/animals/{slug}?sort_by=  (one animal and its discussions)

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    middleware,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use wild_common::{
    error::{WildError, WildResult},
    models::{
        animal::{ANIMAL_EXISTS, Animal, CreateAnimalRequest},
        discussion::Discussion,
    },
    pagination::PageWindow,
    sorting::{EntityKind, SortOption},
    validation::{slug_for, validate_request},
    voting::VoteState,
};
use wild_db::{repository::animals, sorter};

use super::{ListQuery, SortedPage, page_size, viewer_vote};
use crate::{AppState, middleware::AuthContext};

pub fn router() -> Router<Arc<AppState>> {
    let public = Router::new()
        .route("/animals", get(list_animals))
        .route("/animals/{slug}", get(get_animal))
        .route_layer(middleware::from_fn(
            crate::middleware::optional_auth_middleware,
        ));

    let protected = Router::new()
        .route("/animals", post(create_animal))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware));

    public.merge(protected)
}

async fn list_animals(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> WildResult<Json<SortedPage<Animal>>> {
    let pool = &state.db.pool;
    let total = animals::count(pool, None).await?;
    let window = PageWindow::resolve(query.page.as_deref(), total, page_size());

    let sort = SortOption::resolve(query.sort_by.as_deref(), EntityKind::Animal);
    let rows = animals::list_sorted(pool, sort, None, Some(window)).await?;

    Ok(Json(SortedPage {
        sort_by: sort.key(),
        sort_label: sort.label(),
        page: window.into_page(rows),
    }))
}

async fn create_animal(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateAnimalRequest>,
) -> WildResult<Json<Animal>> {
    validate_request(&body)?;
    let slug = slug_for(&body.name)?;

    if animals::name_taken(&state.db.pool, &body.name, &slug).await? {
        return Err(WildError::AlreadyExists {
            message: ANIMAL_EXISTS.into(),
        });
    }

    let animal = animals::create_animal(
        &state.db.pool,
        auth.profile_id,
        &body.name,
        body.description.as_deref().unwrap_or_default(),
        &slug,
    )
    .await?;

    tracing::info!(animal_id = animal.id, slug = %animal.slug, author = %auth.username, "Animal added");

    Ok(Json(animal))
}

#[derive(Deserialize)]
struct DetailQuery {
    sort_by: Option<String>,
}

#[derive(Serialize)]
struct AnimalDetail {
    animal: Animal,
    /// The viewer's vote on the animal
    my_vote: VoteState,
    discussions: Vec<Discussion>,
    sort_by: &'static str,
    sort_label: String,
}

async fn get_animal(
    auth: Option<Extension<AuthContext>>,
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Query(query): Query<DetailQuery>,
) -> WildResult<Json<AnimalDetail>> {
    let animal = animals::find_by_slug(&state.db.pool, &slug)
        .await?
        .ok_or_else(|| WildError::not_found("Animal"))?;

    let viewer = auth.as_ref().map(|Extension(a)| a);
    let my_vote = viewer_vote(&state.db.pool, viewer, EntityKind::Animal, animal.id).await?;

    let (sort, discussions) =
        sorter::sort_animal_discussions(&state.db.pool, query.sort_by.as_deref(), animal.id)
            .await?;

    Ok(Json(AnimalDetail {
        animal,
        my_vote,
        discussions,
        sort_by: sort.key(),
        sort_label: sort.label(),
    }))
}
