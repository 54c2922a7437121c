//! Picture uploads (multipart/form-data, field `file`).
//!
//! POST /api/v1/animals/{slug}/picture
//! POST /api/v1/discussions/{slug}/picture
//! POST /api/v1/petitions/{slug}/picture
//! POST /api/v1/profiles/@me/picture
//!
//! Only the author of an animal, discussion or petition may replace its
//! picture. The previous file is removed once the new key is saved.

use axum::{
    Extension, Json, Router,
    extract::{Multipart, Path, State},
    middleware,
    routing::post,
};
use serde::Serialize;
use std::sync::Arc;
use wild_common::error::{WildError, WildResult};
use wild_db::{
    repository::{animals, discussions, petitions, profiles},
    storage::{self, MediaStore},
};

use super::internal;
use crate::{AppState, middleware::AuthContext};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/animals/{slug}/picture", post(upload_animal_picture))
        .route("/discussions/{slug}/picture", post(upload_discussion_picture))
        .route("/petitions/{slug}/picture", post(upload_petition_picture))
        .route("/profiles/@me/picture", post(upload_profile_picture))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware))
}

#[derive(Serialize)]
struct PictureResponse {
    picture: String,
    url: String,
}

/// The image part of an upload.
struct UploadedImage {
    ext: &'static str,
    data: Vec<u8>,
}

async fn read_image(mut multipart: Multipart) -> WildResult<UploadedImage> {
    let max_bytes = wild_common::config::get().storage.max_upload_bytes;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| WildError::validation(format!("Multipart error: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().map(str::to_string);
        let content_type = match field.content_type() {
            Some(ct) => ct.to_string(),
            None => storage::guess_content_type(filename.as_deref().unwrap_or_default()),
        };
        let Some(ext) = storage::image_extension(&content_type) else {
            return Err(WildError::validation(format!(
                "File type '{content_type}' is not allowed"
            )));
        };

        let bytes = field
            .bytes()
            .await
            .map_err(|e| WildError::validation(format!("Failed to read file: {e}")))?;
        if bytes.len() > max_bytes {
            return Err(WildError::validation(format!(
                "File too large: {} bytes (max {max_bytes} bytes)",
                bytes.len()
            )));
        }

        return Ok(UploadedImage {
            ext,
            data: bytes.to_vec(),
        });
    }

    Err(WildError::validation("No file field in request"))
}

/// Write the image and record its key with `save`.
///
/// The file being replaced is only removed once `save` succeeds. If it
/// fails, the new file is removed instead and the row keeps its picture.
async fn replace_picture<F, Fut>(
    storage: &MediaStore,
    category: &str,
    image: UploadedImage,
    previous: Option<String>,
    save: F,
) -> WildResult<String>
where
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = Result<(), sqlx::Error>>,
{
    let key = MediaStore::image_key(category, image.ext);
    storage.put_object(&key, &image.data).await.map_err(internal)?;

    if let Err(e) = save(key.clone()).await {
        if let Err(cleanup) = storage.delete_object(&key).await {
            tracing::warn!(key = %key, error = %cleanup, "Failed to remove unsaved picture");
        }
        return Err(e.into());
    }

    if let Some(old) = previous {
        if let Err(e) = storage.delete_object(&old).await {
            tracing::warn!(key = %old, error = %e, "Failed to remove replaced picture");
        }
    }
    Ok(key)
}

fn respond(key: String) -> Json<PictureResponse> {
    Json(PictureResponse {
        url: MediaStore::public_url(&key),
        picture: key,
    })
}

async fn upload_animal_picture(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    multipart: Multipart,
) -> WildResult<Json<PictureResponse>> {
    let animal = animals::find_by_slug(&state.db.pool, &slug)
        .await?
        .ok_or_else(|| WildError::not_found("Animal"))?;
    if animal.author_id != auth.profile_id {
        return Err(WildError::Forbidden);
    }

    let image = read_image(multipart).await?;
    let pool = &state.db.pool;
    let id = animal.id;
    let key = replace_picture(&state.storage, "animal", image, animal.picture, |key| async move {
        animals::set_picture(pool, id, &key).await
    })
    .await?;

    tracing::info!(animal_id = id, key = %key, "Animal picture updated");
    Ok(respond(key))
}

async fn upload_discussion_picture(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    multipart: Multipart,
) -> WildResult<Json<PictureResponse>> {
    let discussion = discussions::find_by_slug(&state.db.pool, &slug)
        .await?
        .ok_or_else(|| WildError::not_found("Discussion"))?;
    if discussion.author_id != auth.profile_id {
        return Err(WildError::Forbidden);
    }

    let image = read_image(multipart).await?;
    let pool = &state.db.pool;
    let id = discussion.id;
    let key = replace_picture(&state.storage, "discussion", image, discussion.picture, |key| async move {
        discussions::set_picture(pool, id, &key).await
    })
    .await?;

    tracing::info!(discussion_id = id, key = %key, "Discussion picture updated");
    Ok(respond(key))
}

async fn upload_petition_picture(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    multipart: Multipart,
) -> WildResult<Json<PictureResponse>> {
    let petition = petitions::find_by_slug(&state.db.pool, &slug)
        .await?
        .ok_or_else(|| WildError::not_found("Petition"))?;
    if petition.author_id != auth.profile_id {
        return Err(WildError::Forbidden);
    }

    let image = read_image(multipart).await?;
    let pool = &state.db.pool;
    let id = petition.id;
    let key = replace_picture(&state.storage, "petition", image, petition.picture, |key| async move {
        petitions::set_picture(pool, id, &key).await
    })
    .await?;

    tracing::info!(petition_id = id, key = %key, "Petition picture updated");
    Ok(respond(key))
}

async fn upload_profile_picture(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> WildResult<Json<PictureResponse>> {
    let profile = profiles::find_by_id(&state.db.pool, auth.profile_id)
        .await?
        .ok_or_else(|| WildError::not_found("Profile"))?;

    let image = read_image(multipart).await?;
    let pool = &state.db.pool;
    let id = profile.id;
    let key = replace_picture(&state.storage, "profile", image, profile.picture, |key| async move {
        profiles::set_picture(pool, id, &key).await
    })
    .await?;

    tracing::info!(profile_id = id, key = %key, "Profile picture updated");
    Ok(respond(key))
}
