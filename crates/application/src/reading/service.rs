use chrono::{DateTime, Utc};
use domain::{
    DomainError, ImageStore, MeasureType, MeterImageExtractor, NaturalKey, Reading,
    ReadingRepository,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};
use uuid::Uuid;

use crate::reading::commands::{ConfirmCommand, ListQuery, UploadCommand};
use crate::reading::parse::parse_extracted_value;

/// Upper bound on a single extraction call. A hung collaborator must not hold
/// the request open indefinitely.
pub const DEFAULT_EXTRACTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Receipt for a successfully created reading.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadReceipt {
    pub measure_uuid: Uuid,
    pub image_url: String,
    pub measure_value: f64,
}

/// Listing projection of a single reading.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingSummary {
    pub measure_uuid: Uuid,
    pub measure_datetime: DateTime<Utc>,
    pub measure_type: MeasureType,
    pub has_confirmed: bool,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomerReadings {
    pub customer_code: String,
    pub measures: Vec<ReadingSummary>,
}

/// Orchestrates the reading lifecycle: duplicate detection, extraction,
/// persistence, confirmation, and listing.
///
/// All collaborators are injected; the service holds no mutable state of its
/// own, so one instance serves concurrent requests.
pub struct ReadingLifecycleService {
    repository: Arc<dyn ReadingRepository>,
    extractor: Arc<dyn MeterImageExtractor>,
    image_store: Arc<dyn ImageStore>,
    extraction_timeout: Duration,
}

impl ReadingLifecycleService {
    pub fn new(
        repository: Arc<dyn ReadingRepository>,
        extractor: Arc<dyn MeterImageExtractor>,
        image_store: Arc<dyn ImageStore>,
    ) -> Self {
        Self {
            repository,
            extractor,
            image_store,
            extraction_timeout: DEFAULT_EXTRACTION_TIMEOUT,
        }
    }

    pub fn with_extraction_timeout(mut self, extraction_timeout: Duration) -> Self {
        self.extraction_timeout = extraction_timeout;
        self
    }

    /// Upload-and-extract: create a reading from a meter image.
    ///
    /// The natural-key pre-check runs before the extraction call so duplicate
    /// submissions never reach the model. The store's unique index remains the
    /// authoritative guard: a conflicting concurrent insert also surfaces as
    /// `DoubleReport`.
    pub async fn upload(&self, cmd: UploadCommand) -> Result<UploadReceipt, DomainError> {
        let key = NaturalKey::derive(
            cmd.customer_code.clone(),
            cmd.measure_type,
            cmd.measure_datetime,
        );

        if self.repository.find_by_natural_key(&key).await?.is_some() {
            info!(
                customer = %key.customer_code,
                measure_type = %key.measure_type,
                month = key.month,
                year = key.year,
                "duplicate reading rejected before extraction"
            );
            return Err(DomainError::DoubleReport);
        }

        let extraction = timeout(
            self.extraction_timeout,
            self.extractor.extract(&cmd.image.bytes, cmd.image.mime),
        )
        .await;

        let text = match extraction {
            Ok(result) => result?,
            Err(_) => {
                warn!(
                    customer = %key.customer_code,
                    timeout_secs = self.extraction_timeout.as_secs(),
                    "extraction call timed out"
                );
                return Err(DomainError::ExtractionFailed(
                    "extraction call timed out".to_string(),
                ));
            }
        };

        let value = parse_extracted_value(&text)?;

        let stored = self
            .image_store
            .store(&cmd.image.bytes, cmd.image.mime)
            .await?;

        let reading = Reading::new(
            cmd.customer_code,
            cmd.measure_type,
            cmd.measure_datetime,
            value,
            Some(stored.url_path.clone()),
        )?;

        if let Err(e) = self.repository.insert(&reading).await {
            // The image must not outlive a failed insert, whether the failure
            // is a concurrent duplicate caught by the unique index or a plain
            // storage error.
            if let Err(cleanup) = self.image_store.remove(&stored.file_name).await {
                warn!(
                    file = %stored.file_name,
                    error = %cleanup,
                    "failed to remove image after insert failure"
                );
            }
            return Err(e);
        }

        info!(
            measure_uuid = %reading.id(),
            customer = %reading.customer_code(),
            measure_type = %reading.measure_type(),
            value,
            "reading created"
        );

        Ok(UploadReceipt {
            measure_uuid: reading.id(),
            image_url: stored.url_path,
            measure_value: value,
        })
    }

    /// Confirm a reading with a human-verified value. One-way: a second
    /// confirmation fails with `ConfirmationDuplicate` regardless of value.
    pub async fn confirm(&self, cmd: ConfirmCommand) -> Result<(), DomainError> {
        let id = Uuid::parse_str(&cmd.measure_uuid)
            .map_err(|_| DomainError::MeasureNotFound(cmd.measure_uuid.clone()))?;

        let mut reading = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::MeasureNotFound(cmd.measure_uuid.clone()))?;

        reading.confirm(cmd.confirmed_value)?;
        self.repository.update(&reading).await?;

        info!(measure_uuid = %id, value = cmd.confirmed_value, "reading confirmed");
        Ok(())
    }

    /// List a customer's readings, optionally filtered by meter type.
    pub async fn list(&self, query: ListQuery) -> Result<CustomerReadings, DomainError> {
        let readings = self
            .repository
            .find_by_customer(&query.customer_code, query.measure_type)
            .await?;

        if readings.is_empty() {
            return Err(DomainError::MeasuresNotFound);
        }

        let measures = readings
            .into_iter()
            .map(|r| ReadingSummary {
                measure_uuid: r.id(),
                measure_datetime: r.measure_datetime(),
                measure_type: r.measure_type(),
                has_confirmed: r.is_confirmed(),
                image_url: r.image_url().unwrap_or_default().to_string(),
            })
            .collect();

        Ok(CustomerReadings {
            customer_code: query.customer_code.as_str().to_string(),
            measures,
        })
    }
}
