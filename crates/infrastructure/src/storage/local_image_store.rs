use async_trait::async_trait;
use chrono::Utc;
use domain::{DomainError, ImageMime, ImageStore, StoredImage};
use std::path::PathBuf;
use tracing::debug;
use uuid::Uuid;

/// Filesystem-backed image store.
///
/// Files land under `root` with a timestamp-and-uuid name and are served
/// back at `/uploads/{file_name}`.
pub struct LocalImageStore {
    root: PathBuf,
}

impl LocalImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn storage_err(e: std::io::Error) -> DomainError {
        DomainError::Storage(format!("image store error: {}", e))
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn store(&self, bytes: &[u8], mime: ImageMime) -> Result<StoredImage, DomainError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(Self::storage_err)?;

        let file_name = format!(
            "{}_{}{}",
            Utc::now().timestamp_millis(),
            Uuid::new_v4().simple(),
            mime.extension()
        );
        let path = self.root.join(&file_name);

        tokio::fs::write(&path, bytes)
            .await
            .map_err(Self::storage_err)?;

        debug!(file = %file_name, bytes = bytes.len(), "stored meter image");

        let url_path = format!("/uploads/{}", file_name);
        Ok(StoredImage {
            file_name,
            url_path,
        })
    }

    async fn remove(&self, file_name: &str) -> Result<(), DomainError> {
        if file_name.contains('/') || file_name.contains('\\') {
            return Err(DomainError::Storage(format!(
                "refusing to remove path-like file name: {}",
                file_name
            )));
        }

        match tokio::fs::remove_file(self.root.join(file_name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::storage_err(e)),
        }
    }
}
