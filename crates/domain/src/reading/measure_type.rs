use crate::error::{DomainError, Result};
use serde::{Deserialize, Serialize};

/// Kind of utility meter a reading was taken from.
///
/// Stored and serialized upper-case (`WATER` / `GAS`); client input is
/// accepted case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MeasureType {
    Water,
    Gas,
}

impl MeasureType {
    /// Parse a client-supplied type. Anything other than WATER or GAS
    /// (after upper-casing) is rejected.
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "WATER" => Ok(Self::Water),
            "GAS" => Ok(Self::Gas),
            other => Err(DomainError::InvalidType(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Water => "WATER",
            Self::Gas => "GAS",
        }
    }
}

impl std::fmt::Display for MeasureType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_upper_case() {
        assert_eq!(MeasureType::parse("WATER").unwrap(), MeasureType::Water);
        assert_eq!(MeasureType::parse("GAS").unwrap(), MeasureType::Gas);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(MeasureType::parse("water").unwrap(), MeasureType::Water);
        assert_eq!(MeasureType::parse("Gas").unwrap(), MeasureType::Gas);
    }

    #[test]
    fn test_parse_rejects_unknown_type() {
        let result = MeasureType::parse("ELECTRICITY");
        assert_eq!(
            result.unwrap_err(),
            DomainError::InvalidType("ELECTRICITY".to_string())
        );
    }

    #[test]
    fn test_display_is_upper_case() {
        assert_eq!(format!("{}", MeasureType::Water), "WATER");
        assert_eq!(format!("{}", MeasureType::Gas), "GAS");
    }
}
