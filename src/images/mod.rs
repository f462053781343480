//! Post images: upload, presigned retrieval and best-effort removal.

use anyhow::Context;
use bytes::Bytes;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

/// An image received from a client, not yet stored.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub body: Bytes,
    pub content_type: String,
}

impl ImageUpload {
    pub fn new(body: Bytes, content_type: impl Into<String>) -> Result<Self, AppError> {
        let content_type = content_type.into();
        if body.is_empty() {
            return Err(AppError::validation("No image file was provided!"));
        }
        if !content_type.starts_with("image/") {
            return Err(AppError::validation("Uploaded file must be an image"));
        }
        Ok(Self { body, content_type })
    }
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}

fn object_key(donor_id: Uuid, image_id: Uuid, content_type: &str) -> String {
    let ext = ext_from_mime(content_type).unwrap_or("bin");
    format!("posts/{}/{}.{}", donor_id, image_id, ext)
}

/// Store an image and return its handle.
pub async fn store(st: &AppState, donor_id: Uuid, image: ImageUpload) -> anyhow::Result<String> {
    let key = object_key(donor_id, Uuid::new_v4(), &image.content_type);
    st.storage
        .put_object(&key, image.body, &image.content_type)
        .await
        .with_context(|| format!("put_object {}", key))?;
    debug!(%key, "image stored");
    Ok(key)
}

/// Remove an image without ever failing the caller.
pub async fn discard(st: &AppState, key: &str) {
    if let Err(e) = st.storage.delete_object(key).await {
        warn!(error = %e, %key, "image delete failed; continuing");
    }
}

pub async fn presign(st: &AppState, key: &str) -> anyhow::Result<String> {
    st.storage
        .presign_get(key, st.config.media.url_ttl_secs)
        .await
        .with_context(|| format!("presign url for {}", key))
}

pub async fn presign_many(st: &AppState, keys: &[&str]) -> anyhow::Result<Vec<String>> {
    let mut out = Vec::with_capacity(keys.len());
    for k in keys {
        out.push(presign(st, k).await?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_ext_from_mime() {
        assert_eq!(ext_from_mime("image/jpeg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/jpg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/png"), Some("png"));
        assert_eq!(ext_from_mime("image/webp"), Some("webp"));
        assert_eq!(ext_from_mime("image/heic"), Some("heic"));
        assert_eq!(ext_from_mime("image/gif"), None);
    }

    #[test]
    fn keys_are_grouped_by_donor() {
        let donor = Uuid::new_v4();
        let img = Uuid::new_v4();
        assert_eq!(
            object_key(donor, img, "image/png"),
            format!("posts/{donor}/{img}.png")
        );
        assert!(object_key(donor, img, "image/gif").ends_with(".bin"));
    }

    #[test]
    fn uploads_must_be_non_empty_images() {
        assert!(ImageUpload::new(Bytes::from_static(b"\xff\xd8"), "image/jpeg").is_ok());
        assert!(matches!(
            ImageUpload::new(Bytes::new(), "image/jpeg"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            ImageUpload::new(Bytes::from_static(b"%PDF"), "application/pdf"),
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn store_then_presign() {
        let state = AppState::fake();
        let donor = Uuid::new_v4();
        let upload = ImageUpload::new(Bytes::from_static(b"png"), "image/png").unwrap();
        let key = store(&state, donor, upload).await.unwrap();
        assert!(key.starts_with(&format!("posts/{donor}/")));

        let urls = presign_many(&state, &[key.as_str(), "x/y/z.webp"]).await.unwrap();
        assert_eq!(urls.len(), 2);
        assert!(urls[0].ends_with(&key));
        assert!(urls[1].contains("x/y/z.webp"));
    }

    #[tokio::test]
    async fn discard_swallows_storage_failures() {
        let storage = Arc::new(MemoryStorage {
            fail_deletes: true,
            ..Default::default()
        });
        let state = AppState::fake_with_storage(storage.clone());
        discard(&state, "posts/a/b.jpg").await;
        assert!(storage.deleted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn discard_removes_object() {
        let storage = Arc::new(MemoryStorage::default());
        let state = AppState::fake_with_storage(storage.clone());
        discard(&state, "posts/a/b.jpg").await;
        assert_eq!(*storage.deleted.lock().unwrap(), vec!["posts/a/b.jpg".to_string()]);
    }
}
