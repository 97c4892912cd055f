use crate::error::{DomainError, Result};
use crate::reading::{CustomerCode, MeasureType};
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Natural key identifying at most one reading per customer, meter type and
/// billing month.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NaturalKey {
    pub customer_code: CustomerCode,
    pub measure_type: MeasureType,
    pub month: i32,
    pub year: i32,
}

impl NaturalKey {
    /// Derive the key for a measurement timestamp (1-based calendar month).
    pub fn derive(
        customer_code: CustomerCode,
        measure_type: MeasureType,
        measure_datetime: DateTime<Utc>,
    ) -> Self {
        Self {
            customer_code,
            measure_type,
            month: measure_datetime.month() as i32,
            year: measure_datetime.year(),
        }
    }
}

/// A single meter reading.
///
/// Lifecycle: created once per successful upload-and-extract cycle, mutated
/// exactly once by confirmation, never deleted. `month` and `year` are derived
/// from `measure_datetime` at creation time and stored; they are the
/// natural-key components used for duplicate detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reading {
    id: Uuid,
    customer_code: CustomerCode,
    measure_type: MeasureType,
    measure_datetime: DateTime<Utc>,
    month: i32,
    year: i32,
    reading: f64,
    image_url: Option<String>,
    confirmed: Option<bool>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Reading {
    /// Create a new reading from a successful extraction.
    ///
    /// Rejects non-finite values: an extraction result that cannot be parsed
    /// to a real number must never reach storage.
    pub fn new(
        customer_code: CustomerCode,
        measure_type: MeasureType,
        measure_datetime: DateTime<Utc>,
        reading: f64,
        image_url: Option<String>,
    ) -> Result<Self> {
        if !reading.is_finite() {
            return Err(DomainError::InvalidData(
                "reading value must be a finite number".to_string(),
            ));
        }

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            month: measure_datetime.month() as i32,
            year: measure_datetime.year(),
            customer_code,
            measure_type,
            measure_datetime,
            reading,
            image_url,
            confirmed: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rehydrate a reading from storage. No derivation happens here; the
    /// stored month/year are authoritative.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: Uuid,
        customer_code: CustomerCode,
        measure_type: MeasureType,
        measure_datetime: DateTime<Utc>,
        month: i32,
        year: i32,
        reading: f64,
        image_url: Option<String>,
        confirmed: Option<bool>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            customer_code,
            measure_type,
            measure_datetime,
            month,
            year,
            reading,
            image_url,
            confirmed,
            created_at,
            updated_at,
        }
    }

    /// One-way human confirmation: overwrites the machine-extracted value.
    /// A reading already confirmed cannot be confirmed again.
    pub fn confirm(&mut self, confirmed_value: f64) -> Result<()> {
        if !confirmed_value.is_finite() {
            return Err(DomainError::InvalidData(
                "confirmed value must be a finite number".to_string(),
            ));
        }
        if self.is_confirmed() {
            return Err(DomainError::ConfirmationDuplicate);
        }

        self.reading = confirmed_value;
        self.confirmed = Some(true);
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn customer_code(&self) -> &CustomerCode {
        &self.customer_code
    }

    pub fn measure_type(&self) -> MeasureType {
        self.measure_type
    }

    pub fn measure_datetime(&self) -> DateTime<Utc> {
        self.measure_datetime
    }

    pub fn month(&self) -> i32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Current numeric value: the extraction result until confirmation, the
    /// human-confirmed value afterwards.
    pub fn value(&self) -> f64 {
        self.reading
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    /// Tri-state confirmation flag as stored (`None` = never confirmed).
    pub fn confirmed(&self) -> Option<bool> {
        self.confirmed
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmed.unwrap_or(false)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn natural_key(&self) -> NaturalKey {
        NaturalKey {
            customer_code: self.customer_code.clone(),
            measure_type: self.measure_type,
            month: self.month,
            year: self.year,
        }
    }
}
