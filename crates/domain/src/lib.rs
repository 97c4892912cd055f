//! Domain layer - Pure business logic with no external dependencies
//!
//! This crate contains:
//! - The Reading entity and its lifecycle rules
//! - Value Objects (CustomerCode, MeasureType, ImageMime)
//! - Ports to external collaborators (repository, extractor, image store)
//!
//! Principles:
//! - No dependencies on infrastructure
//! - Business rules enforced at domain level
//! - Testable in isolation

pub mod error;
pub mod extraction;
pub mod image;
pub mod reading;
pub mod storage;

// Re-export commonly used types
pub use error::DomainError;
pub use extraction::MeterImageExtractor;
pub use image::ImageMime;
pub use reading::{CustomerCode, MeasureType, NaturalKey, Reading, ReadingRepository};
pub use storage::{ImageStore, StoredImage};
