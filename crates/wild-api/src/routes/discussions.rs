//! Discussion routes: threads about an animal, and their comments.
//!
//! GET  /api/v1/discussions?sort_by=&page=
//! POST /api/v1/discussions
//! GET  /api/v1/add_discussion?selected=<animal slug>
//! GET  /api/v1/discussions/{slug}?sort_by=
//! POST /api/v1/discussions/{slug}/comments

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
        animal::Animal,
        comment::{Comment, CreateCommentRequest},
        discussion::{CreateDiscussionRequest, DISCUSSION_EXISTS, Discussion},
    },
    pagination::PageWindow,
    sorting::{EntityKind, SortOption},
    validation::{slug_for, validate_request},
    voting::VoteState,
};
use wild_db::{
    repository::{animals, comments, discussions, votes},
    sorter,
};

use super::{ListQuery, SortedPage, page_size, viewer_vote};
use crate::{AppState, middleware::AuthContext};

pub fn router() -> Router<Arc<AppState>> {
    let public = Router::new()
        .route("/discussions", get(list_discussions))
        .route("/discussions/{slug}", get(get_discussion))
        .route_layer(middleware::from_fn(
            crate::middleware::optional_auth_middleware,
        ));

    let protected = Router::new()
        .route("/discussions", post(create_discussion))
        // kept outside `/discussions/` so it cannot shadow a slug
        .route("/add_discussion", get(new_discussion))
        .route("/discussions/{slug}/comments", post(create_comment))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware));

    public.merge(protected)
}

async fn list_discussions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> WildResult<Json<SortedPage<Discussion>>> {
    let pool = &state.db.pool;
    let total = discussions::count(pool, None).await?;
    let window = PageWindow::resolve(query.page.as_deref(), total, page_size());

    let sort = SortOption::resolve(query.sort_by.as_deref(), EntityKind::Discussion);
    let rows = discussions::list_sorted(pool, sort, None, Some(window)).await?;

    Ok(Json(SortedPage {
        sort_by: sort.key(),
        sort_label: sort.label(),
        page: window.into_page(rows),
    }))
}

async fn create_discussion(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateDiscussionRequest>,
) -> WildResult<Json<Discussion>> {
    validate_request(&body)?;
    let slug = slug_for(&body.title)?;
    let pool = &state.db.pool;

    if animals::find_by_id(pool, body.animal_id).await?.is_none() {
        return Err(WildError::validation("Select a valid animal"));
    }
    if discussions::title_taken(pool, &body.title, &slug).await? {
        return Err(WildError::AlreadyExists {
            message: DISCUSSION_EXISTS.into(),
        });
    }

    let discussion = discussions::create_discussion(
        pool,
        auth.profile_id,
        body.animal_id,
        &body.title,
        body.description.as_deref().unwrap_or_default(),
        &slug,
    )
    .await?;

    tracing::info!(discussion_id = discussion.id, slug = %discussion.slug, author = %auth.username, "Discussion started");

    Ok(Json(discussion))
}

#[derive(Deserialize)]
struct NewDiscussionQuery {
    selected: Option<String>,
}

#[derive(Serialize)]
struct NewDiscussionForm {
    animals: Vec<Animal>,
    /// Preselected animal, when `selected` names an existing one
    animal_id: Option<i64>,
}

async fn new_discussion(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NewDiscussionQuery>,
) -> WildResult<Json<NewDiscussionForm>> {
    let pool = &state.db.pool;
    let animal_id = match query.selected.as_deref().filter(|s| !s.is_empty()) {
        Some(slug) => animals::find_by_slug(pool, slug).await?.map(|a| a.id),
        None => None,
    };

    Ok(Json(NewDiscussionForm {
        animals: animals::list_all(pool).await?,
        animal_id,
    }))
}

#[derive(Deserialize)]
struct DetailQuery {
    sort_by: Option<String>,
}

/// A comment with the viewer's vote on it.
#[derive(Serialize)]
struct CommentView {
    #[serde(flatten)]
    comment: Comment,
    my_vote: VoteState,
}

#[derive(Serialize)]
struct DiscussionDetail {
    discussion: Discussion,
    my_vote: VoteState,
    comments: Vec<CommentView>,
    sort_by: &'static str,
    sort_label: String,
}

async fn get_discussion(
    auth: Option<Extension<AuthContext>>,
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Query(query): Query<DetailQuery>,
) -> WildResult<Json<DiscussionDetail>> {
    let pool = &state.db.pool;
    let discussion = discussions::find_by_slug(pool, &slug)
        .await?
        .ok_or_else(|| WildError::not_found("Discussion"))?;

    let viewer = auth.as_ref().map(|Extension(a)| a);
    let my_vote = viewer_vote(pool, viewer, EntityKind::Discussion, discussion.id).await?;

    let (sort, comments) =
        sorter::sort_discussion_comments(pool, query.sort_by.as_deref(), discussion.id).await?;

    let comment_votes = match viewer {
        Some(auth) => {
            let ids: Vec<i64> = comments.iter().map(|c| c.id).collect();
            votes::votes_by_profile(pool, EntityKind::Comment, auth.profile_id, &ids).await?
        }
        None => Default::default(),
    };
    let comments = comments
        .into_iter()
        .map(|comment| CommentView {
            my_vote: comment_votes
                .get(&comment.id)
                .copied()
                .unwrap_or(VoteState::None),
            comment,
        })
        .collect();

    Ok(Json(DiscussionDetail {
        discussion,
        my_vote,
        comments,
        sort_by: sort.key(),
        sort_label: sort.label(),
    }))
}

async fn create_comment(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Json(body): Json<CreateCommentRequest>,
) -> WildResult<Json<Comment>> {
    validate_request(&body)?;
    if body.content.trim().is_empty() {
        return Err(WildError::validation("Comment cannot be empty"));
    }

    let discussion = discussions::find_by_slug(&state.db.pool, &slug)
        .await?
        .ok_or_else(|| WildError::not_found("Discussion"))?;

    let comment =
        comments::create_comment(&state.db.pool, auth.profile_id, discussion.id, &body.content)
            .await?;

    tracing::info!(comment_id = comment.id, discussion_id = discussion.id, author = %auth.username, "Comment posted");

    Ok(Json(comment))
}
