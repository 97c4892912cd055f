use crate::error::DomainError;
use crate::image::ImageMime;
use async_trait::async_trait;

/// Reference to an image persisted by an `ImageStore`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// Bare file name inside the store, usable for later removal.
    pub file_name: String,
    /// Public path the HTTP layer serves the file under (e.g. `/uploads/x.jpg`).
    pub url_path: String,
}

/// Port for persisting the source images referenced by readings.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn store(&self, bytes: &[u8], mime: ImageMime) -> Result<StoredImage, DomainError>;

    /// Remove a previously stored image. Called when a reading insert fails
    /// after its image was already written, so no failure path leaves an
    /// orphaned file behind.
    async fn remove(&self, file_name: &str) -> Result<(), DomainError>;
}
