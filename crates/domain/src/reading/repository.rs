use crate::error::DomainError;
use crate::reading::{CustomerCode, MeasureType, NaturalKey, Reading};
use async_trait::async_trait;
use uuid::Uuid;

/// Repository interface for Reading persistence
///
/// This trait defines the contract for reading storage and retrieval.
/// Implementations should be provided in the infrastructure layer.
///
/// The natural-key uniqueness invariant is enforced at the store: `insert`
/// must surface a unique-constraint violation as `DomainError::DoubleReport`
/// so that two concurrent uploads for the same key cannot both succeed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReadingRepository: Send + Sync {
    /// Insert a newly created reading
    async fn insert(&self, reading: &Reading) -> Result<(), DomainError>;

    /// Persist the confirmed state of an existing reading.
    ///
    /// The store must only write over an unconfirmed row: when the row was
    /// confirmed by a concurrent request after the caller read it, the
    /// implementation fails with `ConfirmationDuplicate` instead of
    /// overwriting.
    async fn update(&self, reading: &Reading) -> Result<(), DomainError>;

    /// Find reading by id
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Reading>, DomainError>;

    /// Find the reading occupying a natural key, if any
    async fn find_by_natural_key(&self, key: &NaturalKey) -> Result<Option<Reading>, DomainError>;

    /// All readings for a customer, optionally filtered by meter type
    async fn find_by_customer(
        &self,
        customer_code: &CustomerCode,
        measure_type: Option<MeasureType>,
    ) -> Result<Vec<Reading>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    #[tokio::test]
    async fn test_insert_conflict_surfaces_double_report() {
        let reading = Reading::new(
            CustomerCode::new("C1").unwrap(),
            MeasureType::Water,
            "2024-03-15T00:00:00Z".parse().unwrap(),
            123.4,
            None,
        )
        .unwrap();

        let mut repo = MockReadingRepository::new();
        repo.expect_insert()
            .times(1)
            .returning(|_| Err(DomainError::DoubleReport));

        let result = repo.insert(&reading).await;
        assert_eq!(result.unwrap_err(), DomainError::DoubleReport);
    }

    #[tokio::test]
    async fn test_find_by_id_miss_returns_none() {
        let id = Uuid::new_v4();
        let mut repo = MockReadingRepository::new();
        repo.expect_find_by_id()
            .with(eq(id))
            .times(1)
            .returning(|_| Ok(None));

        assert!(repo.find_by_id(id).await.unwrap().is_none());
    }
}
