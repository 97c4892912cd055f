use bytes::Bytes;
use chrono::{DateTime, Utc};
use domain::{CustomerCode, DomainError, ImageMime, MeasureType};

/// Decoded image bytes together with their validated MIME type.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub bytes: Bytes,
    pub mime: ImageMime,
}

/// Validated input for the upload-and-extract operation.
///
/// Constructed through a single validation step: either every field is
/// well-formed or the caller gets `InvalidData` (the upload contract treats a
/// bad measure type as malformed input, unlike the listing filter).
#[derive(Debug, Clone)]
pub struct UploadCommand {
    pub(crate) customer_code: CustomerCode,
    pub(crate) measure_datetime: DateTime<Utc>,
    pub(crate) measure_type: MeasureType,
    pub(crate) image: ImagePayload,
}

impl UploadCommand {
    pub fn new(
        customer_code: &str,
        measure_datetime: &str,
        measure_type: &str,
        image: ImagePayload,
    ) -> Result<Self, DomainError> {
        let customer_code = CustomerCode::new(customer_code)?;

        let measure_datetime = DateTime::parse_from_rfc3339(measure_datetime)
            .map_err(|e| {
                DomainError::InvalidData(format!("measure_datetime is not ISO-8601: {}", e))
            })?
            .with_timezone(&Utc);

        let measure_type = MeasureType::parse(measure_type)
            .map_err(|_| DomainError::InvalidData("measure_type must be WATER or GAS".to_string()))?;

        if image.bytes.is_empty() {
            return Err(DomainError::InvalidData(
                "image payload is empty".to_string(),
            ));
        }

        Ok(Self {
            customer_code,
            measure_datetime,
            measure_type,
            image,
        })
    }

    pub fn customer_code(&self) -> &CustomerCode {
        &self.customer_code
    }

    pub fn measure_datetime(&self) -> DateTime<Utc> {
        self.measure_datetime
    }

    pub fn measure_type(&self) -> MeasureType {
        self.measure_type
    }
}

/// Validated input for the confirmation operation.
///
/// The id is kept as a string here: an id that is non-empty but not a valid
/// UUID cannot match any stored reading, so the service reports it as
/// `MEASURE_NOT_FOUND` rather than as malformed input.
#[derive(Debug, Clone)]
pub struct ConfirmCommand {
    pub(crate) measure_uuid: String,
    pub(crate) confirmed_value: f64,
}

impl ConfirmCommand {
    pub fn new(measure_uuid: &str, confirmed_value: f64) -> Result<Self, DomainError> {
        let measure_uuid = measure_uuid.trim().to_string();
        if measure_uuid.is_empty() {
            return Err(DomainError::InvalidData(
                "measure_uuid cannot be empty".to_string(),
            ));
        }
        if !confirmed_value.is_finite() {
            return Err(DomainError::InvalidData(
                "confirmed_value must be a finite number".to_string(),
            ));
        }

        Ok(Self {
            measure_uuid,
            confirmed_value,
        })
    }
}

/// Validated input for the listing operation. The type filter is optional and
/// case-insensitive; an unknown filter value fails with `InvalidType`.
#[derive(Debug, Clone)]
pub struct ListQuery {
    pub(crate) customer_code: CustomerCode,
    pub(crate) measure_type: Option<MeasureType>,
}

impl ListQuery {
    pub fn new(customer_code: &str, measure_type: Option<&str>) -> Result<Self, DomainError> {
        let customer_code = CustomerCode::new(customer_code)?;
        let measure_type = match measure_type {
            Some(raw) => Some(MeasureType::parse(raw)?),
            None => None,
        };

        Ok(Self {
            customer_code,
            measure_type,
        })
    }
}
