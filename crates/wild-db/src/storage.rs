//! Local media storage.
//!
//! Uploaded pictures are written under `storage.data_dir` and served by the
//! API at `/media/<key>`. Keys look like `animal_images/<uuid>.<ext>`.

use anyhow::{Context, Result, bail};
use std::path::{Component, Path, PathBuf};
use uuid::Uuid;
use wild_common::config::StorageConfig;

/// URL prefix the router mounts the media directory under.
pub const MEDIA_URL: &str = "/media";

/// File extension for a picture content type accepted for upload.
pub fn image_extension(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/avif" => Some("avif"),
        "image/bmp" => Some("bmp"),
        _ => None,
    }
}

/// Content type for an upload whose part carried none.
pub fn guess_content_type(filename: &str) -> String {
    mime_guess::from_path(filename)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Filesystem-backed media store.
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(cfg: &StorageConfig) -> Self {
        Self::at(&cfg.data_dir)
    }

    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the media directory if it does not exist yet.
    pub async fn ensure_root(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("Failed to create media directory {}", self.root.display()))?;
        tracing::debug!(root = %self.root.display(), "Media directory ready");
        Ok(())
    }

    /// Fresh key for a picture of `category` (`animal`, `profile`, ...).
    pub fn image_key(category: &str, ext: &str) -> String {
        format!("{category}_images/{}.{ext}", Uuid::new_v4())
    }

    /// Write `data` under `key`, creating parent directories.
    /// Returns the key on success.
    pub async fn put_object(&self, key: &str, data: &[u8]) -> Result<String> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        tokio::fs::write(&path, data)
            .await
            .with_context(|| format!("Failed to write {key} to media storage"))?;
        tracing::debug!(key, size = data.len(), "Stored media object");
        Ok(key.to_string())
    }

    /// Delete an object. Missing objects are not an error.
    pub async fn delete_object(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to delete {key} from media storage")),
        }
    }

    /// Public URL the router serves `key` at.
    pub fn public_url(key: &str) -> String {
        format!("{MEDIA_URL}/{key}")
    }

    /// Resolve a key to a path inside the root, rejecting anything that
    /// could escape it.
    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        if key.is_empty()
            || !relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)))
        {
            bail!("Invalid media key: {key}");
        }
        Ok(self.root.join(relative))
    }
}
