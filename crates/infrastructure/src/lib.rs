//! Infrastructure layer - External integrations

pub mod config;
pub mod database;
pub mod extraction;
pub mod storage;

pub use config::{AppConfig, GeminiConfig, ServerConfig};
pub use database::PostgresReadingRepository;
pub use extraction::GeminiVisionExtractor;
pub use storage::LocalImageStore;
