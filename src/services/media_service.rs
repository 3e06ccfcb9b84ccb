use axum::extract::Multipart;
use axum::http::StatusCode;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::Media;
use crate::database::{Store, StoreError};
use crate::external::{MediaHost, UploadFile};
use crate::types::MediaKind;

const FILE_FIELD: &str = "file";

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("File size must be less than or equal to {limit_mb}MB")]
    FileTooLarge { limit_mb: usize },

    #[error("No file uploaded")]
    MissingFile,

    #[error("Invalid upload: {0}")]
    Multipart(String),

    #[error("Media not found")]
    NotFound,

    #[error("Media host error: {0}")]
    Host(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl MediaError {
    /// The limit is reported in whole MB, rounded up.
    fn too_large(limit: usize) -> Self {
        MediaError::FileTooLarge {
            limit_mb: limit.div_ceil(1024 * 1024),
        }
    }
}

/// Pull the `file` field out of a multipart body, reading it chunk by chunk
/// and failing as soon as it grows past `limit` bytes.
pub async fn read_upload(multipart: &mut Multipart, limit: usize) -> Result<UploadFile, MediaError> {
    let map_err = |e: axum::extract::multipart::MultipartError| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            MediaError::too_large(limit)
        } else {
            MediaError::Multipart(e.body_text())
        }
    };

    while let Some(mut field) = multipart.next_field().await.map_err(map_err)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        let mut bytes = Vec::new();
        while let Some(chunk) = field.chunk().await.map_err(map_err)? {
            if bytes.len() + chunk.len() > limit {
                tracing::warn!("Rejected upload '{}': over {} bytes", file_name, limit);
                return Err(MediaError::too_large(limit));
            }
            bytes.extend_from_slice(&chunk);
        }

        if bytes.is_empty() {
            return Err(MediaError::MissingFile);
        }

        return Ok(UploadFile {
            file_name,
            content_type,
            bytes,
        });
    }

    Err(MediaError::MissingFile)
}

/// Media records plus their binaries at the external host.
pub struct MediaService {
    store: Arc<dyn Store>,
    host: Arc<dyn MediaHost>,
}

impl MediaService {
    pub fn new(store: Arc<dyn Store>, host: Arc<dyn MediaHost>) -> Self {
        Self { store, host }
    }

    /// The record is written only after the host accepted the file, so a
    /// failed upload leaves nothing behind.
    pub async fn upload(&self, owner: Uuid, file: UploadFile) -> Result<Media, MediaError> {
        let kind = MediaKind::from_mime(&file.content_type);

        let asset = self.host.upload(&file, kind).await.map_err(|e| {
            tracing::error!("Upload of '{}' failed: {:#}", file.file_name, e);
            MediaError::Host(e.to_string())
        })?;

        let media = Media::new(asset.url, asset.public_id, kind, asset.size, owner);
        self.store.insert_media(&media).await?;

        tracing::info!("User {} uploaded {} {} ({} bytes)", owner, kind.as_str(), media.id, media.size);
        Ok(media)
    }

    pub async fn list(&self, owner: Uuid) -> Result<Vec<Media>, MediaError> {
        Ok(self.store.list_media_for_owner(owner).await?)
    }

    /// Only the owner's media is visible, so anyone else gets `NotFound`.
    pub async fn delete(&self, owner: Uuid, id: Uuid) -> Result<(), MediaError> {
        let media = self
            .store
            .find_owned_media(id, owner)
            .await?
            .ok_or(MediaError::NotFound)?;

        self.host.destroy(&media.public_id, media.kind).await.map_err(|e| {
            tracing::error!("Destroying asset {} failed: {:#}", media.public_id, e);
            MediaError::Host(e.to_string())
        })?;

        self.store.delete_media(media.id).await?;
        tracing::info!("User {} deleted media {}", owner, media.id);
        Ok(())
    }
}
