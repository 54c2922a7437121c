//! User list routes.
//!
//! GET  /api/v1/lists?sort_by=&page=
//! POST /api/v1/lists
//! GET  /api/v1/lists/{slug}?sort_by=&page=  (the list and a page of its animals)

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    middleware,
    routing::{get, post},
};
use serde::Serialize;
use sqlx::SqlitePool;
use std::{collections::BTreeSet, sync::Arc};
use wild_common::{
    error::{WildError, WildResult},
    models::{
        animal::Animal,
        user_list::{CreateUserListRequest, USER_LIST_EXISTS, UserList},
    },
    pagination::PageWindow,
    sorting::{EntityKind, SortOption},
    validation::{slug_for, validate_request},
    voting::VoteState,
};
use wild_db::{
    repository::{animals, user_lists},
    sorter,
};

use super::{ListQuery, SortedPage, page_size, viewer_vote};
use crate::{AppState, middleware::AuthContext};

pub fn router() -> Router<Arc<AppState>> {
    let public = Router::new()
        .route("/lists", get(list_user_lists))
        .route("/lists/{slug}", get(get_user_list))
        .route_layer(middleware::from_fn(
            crate::middleware::optional_auth_middleware,
        ));

    let protected = Router::new()
        .route("/lists", post(create_user_list))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware));

    public.merge(protected)
}

/// Deduplicate `ids` and make sure every one names an animal.
pub(crate) async fn checked_animal_ids(pool: &SqlitePool, ids: &[i64]) -> WildResult<Vec<i64>> {
    let unique: Vec<i64> = ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
    let found = animals::existing_ids(pool, &unique).await?;
    if found.len() != unique.len() {
        return Err(WildError::validation("Select a valid animal"));
    }
    Ok(unique)
}

async fn list_user_lists(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> WildResult<Json<SortedPage<UserList>>> {
    let pool = &state.db.pool;
    let total = user_lists::count(pool, None).await?;
    let window = PageWindow::resolve(query.page.as_deref(), total, page_size());

    let sort = SortOption::resolve(query.sort_by.as_deref(), EntityKind::UserList);
    let rows = user_lists::list_sorted(pool, sort, None, Some(window)).await?;

    Ok(Json(SortedPage {
        sort_by: sort.key(),
        sort_label: sort.label(),
        page: window.into_page(rows),
    }))
}

async fn create_user_list(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateUserListRequest>,
) -> WildResult<Json<UserList>> {
    validate_request(&body)?;
    let slug = slug_for(&body.title)?;
    let pool = &state.db.pool;

    let animal_ids = checked_animal_ids(pool, &body.animal_ids).await?;
    if user_lists::title_taken(pool, &body.title, &slug).await? {
        return Err(WildError::AlreadyExists {
            message: USER_LIST_EXISTS.into(),
        });
    }

    let list = user_lists::create_user_list(
        pool,
        auth.profile_id,
        &body.title,
        body.description.as_deref().unwrap_or_default(),
        &slug,
        &animal_ids,
    )
    .await?;

    tracing::info!(list_id = list.id, slug = %list.slug, animals = animal_ids.len(), "List created");

    Ok(Json(list))
}

#[derive(Serialize)]
struct UserListDetail {
    user_list: UserList,
    my_vote: VoteState,
    animals: SortedPage<Animal>,
}

async fn get_user_list(
    auth: Option<Extension<AuthContext>>,
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Query(query): Query<ListQuery>,
) -> WildResult<Json<UserListDetail>> {
    let pool = &state.db.pool;
    let user_list = user_lists::find_by_slug(pool, &slug)
        .await?
        .ok_or_else(|| WildError::not_found("List"))?;
    let viewer = auth.as_ref().map(|Extension(a)| a);
    let my_vote = viewer_vote(pool, viewer, EntityKind::UserList, user_list.id).await?;

    let total = animals::count_in_list(pool, user_list.id).await?;
    let window = PageWindow::resolve(query.page.as_deref(), total, page_size());
    let (sort, rows) =
        sorter::sort_user_list_animals(pool, query.sort_by.as_deref(), user_list.id, Some(window))
            .await?;

    Ok(Json(UserListDetail {
        user_list,
        my_vote,
        animals: SortedPage {
            sort_by: sort.key(),
            sort_label: sort.label(),
            page: window.into_page(rows),
        },
    }))
}
