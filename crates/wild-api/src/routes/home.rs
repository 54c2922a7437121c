//! Landing page data, search, and the theme cookie.
//!
//! GET /api/v1/index                       (top and bottom five animals)
//! GET /api/v1/search?searched=&category=  (substring search in one category)
//! GET /api/v1/theme?theme=                (remember `dark` / `light`)

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use wild_common::{
    error::WildResult,
    models::{
        animal::Animal, discussion::Discussion, petition::Petition, profile::ProfileResponse,
        user_list::UserList,
    },
};
use wild_db::repository::{animals, discussions, petitions, profiles, user_lists};

use crate::AppState;

const INDEX_SIZE: i64 = 5;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/index", get(index))
        .route("/search", get(search))
        .route("/theme", get(set_theme))
}

#[derive(Serialize)]
struct IndexResponse {
    overrated_animals: Vec<Animal>,
    underrated_animals: Vec<Animal>,
}

async fn index(State(state): State<Arc<AppState>>) -> WildResult<Json<IndexResponse>> {
    let pool = &state.db.pool;
    Ok(Json(IndexResponse {
        overrated_animals: animals::top_by_votes(pool, true, INDEX_SIZE).await?,
        underrated_animals: animals::top_by_votes(pool, false, INDEX_SIZE).await?,
    }))
}

#[derive(Deserialize)]
struct SearchQuery {
    searched: Option<String>,
    category: Option<String>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum SearchResults {
    Animals(Vec<Animal>),
    Discussions(Vec<Discussion>),
    Lists(Vec<UserList>),
    Petitions(Vec<Petition>),
    Profiles(Vec<ProfileResponse>),
}

#[derive(Serialize)]
struct SearchResponse {
    searched: String,
    category: Option<String>,
    results: Option<SearchResults>,
}

async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> WildResult<Json<SearchResponse>> {
    let pool = &state.db.pool;
    let searched = query.searched.unwrap_or_default();

    if searched.trim().is_empty() {
        return Ok(Json(SearchResponse {
            searched: String::new(),
            category: query.category,
            results: None,
        }));
    }

    let results = match query.category.as_deref() {
        Some("Animals") => Some(SearchResults::Animals(
            animals::search_by_name(pool, &searched).await?,
        )),
        Some("Discussions") => Some(SearchResults::Discussions(
            discussions::search_by_title(pool, &searched).await?,
        )),
        Some("Lists") => Some(SearchResults::Lists(
            user_lists::search_by_title(pool, &searched).await?,
        )),
        Some("Petitions") => Some(SearchResults::Petitions(
            petitions::search_by_title(pool, &searched).await?,
        )),
        Some("Profiles") => Some(SearchResults::Profiles(
            profiles::search_by_username(pool, &searched)
                .await?
                .into_iter()
                .map(Into::into)
                .collect(),
        )),
        _ => None,
    };

    Ok(Json(SearchResponse {
        searched,
        category: query.category,
        results,
    }))
}

#[derive(Deserialize)]
struct ThemeQuery {
    theme: Option<String>,
}

async fn set_theme(jar: CookieJar, Query(query): Query<ThemeQuery>) -> (CookieJar, String) {
    match query.theme.as_deref() {
        Some(theme @ ("dark" | "light")) => {
            let cookie = Cookie::build(("theme", theme.to_string())).path("/");
            (jar.add(cookie), format!("Theme set to: {theme}"))
        }
        _ => (jar, "-1".to_string()),
    }
}
