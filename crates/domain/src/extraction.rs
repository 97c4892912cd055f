use crate::error::DomainError;
use crate::image::ImageMime;
use async_trait::async_trait;

/// Port to the external image-understanding model.
///
/// Given raw image bytes and their MIME type, the collaborator returns free
/// text expected to contain the meter digits. Any transport or model failure
/// maps to `DomainError::ExtractionFailed`; the caller is responsible for
/// parsing the text into a numeric value and for bounding the call with a
/// timeout.
#[async_trait]
pub trait MeterImageExtractor: Send + Sync {
    async fn extract(&self, image: &[u8], mime: ImageMime) -> Result<String, DomainError>;
}
