use crate::error::{DomainError, Result};
use serde::{Deserialize, Serialize};

/// Value object identifying the billed customer
///
/// Rules:
/// - Must be non-empty after trimming
/// - Max length 100 characters
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerCode(String);

impl CustomerCode {
    /// Create a new CustomerCode with validation
    pub fn new(code: impl Into<String>) -> Result<Self> {
        let code = code.into().trim().to_string();

        if code.is_empty() {
            return Err(DomainError::InvalidData(
                "customer code cannot be empty".to_string(),
            ));
        }

        if code.len() > 100 {
            return Err(DomainError::InvalidData(format!(
                "customer code too long: {} chars (max 100)",
                code.len()
            )));
        }

        Ok(Self(code))
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CustomerCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
