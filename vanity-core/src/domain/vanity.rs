//! Vanity address domain types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Where the pattern must appear in the generated address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Prefix,
    Suffix,
}

impl Position {
    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Prefix => "prefix",
            Position::Suffix => "suffix",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Position {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prefix" => Ok(Position::Prefix),
            "suffix" => Ok(Position::Suffix),
            _ => Err(RequestError::InvalidPosition(s.to_string())),
        }
    }
}

/// Errors raised while building a [`GenerationRequest`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("pattern cannot be empty")]
    EmptyPattern,

    #[error("position must be 'prefix' or 'suffix', got '{0}'")]
    InvalidPosition(String),
}

/// A request to search for an address containing `pattern` at `position`
///
/// Only emptiness is checked here. The server decides whether the characters
/// are legal for the address alphabet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    pattern: String,
    position: Position,
}

impl GenerationRequest {
    pub fn new(pattern: impl Into<String>, position: Position) -> Result<Self, RequestError> {
        let pattern = pattern.into();
        if pattern.is_empty() {
            return Err(RequestError::EmptyPattern);
        }
        Ok(Self { pattern, position })
    }

    pub fn prefix(pattern: impl Into<String>) -> Result<Self, RequestError> {
        Self::new(pattern, Position::Prefix)
    }

    pub fn suffix(pattern: impl Into<String>) -> Result<Self, RequestError> {
        Self::new(pattern, Position::Suffix)
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn position(&self) -> Position {
        self.position
    }
}

/// A generated keypair, both halves base58-encoded
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub public_key: String,
    pub private_key: String,
}

// Keeps the secret half out of logs and panic messages.
impl fmt::Debug for GenerationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationResult")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Position::Prefix).unwrap(),
            "\"prefix\""
        );
        assert_eq!(
            serde_json::from_str::<Position>("\"suffix\"").unwrap(),
            Position::Suffix
        );
        assert!(serde_json::from_str::<Position>("\"middle\"").is_err());
    }

    #[test]
    fn test_position_parses_case_insensitively() {
        assert_eq!("Prefix".parse::<Position>().unwrap(), Position::Prefix);
        assert_eq!(" SUFFIX ".parse::<Position>().unwrap(), Position::Suffix);
        assert_eq!(
            " Middle".parse::<Position>(),
            Err(RequestError::InvalidPosition(" Middle".to_string()))
        );
    }

    #[test]
    fn test_request_rejects_empty_pattern() {
        assert_eq!(
            GenerationRequest::new("", Position::Prefix),
            Err(RequestError::EmptyPattern)
        );
    }

    #[test]
    fn test_request_wire_shape() {
        let req = GenerationRequest::prefix("abc").unwrap();
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "pattern": "abc", "position": "prefix" })
        );
    }

    #[test]
    fn test_result_debug_hides_private_key() {
        let result = GenerationResult {
            public_key: "Abc123".to_string(),
            private_key: "5Kdsecret".to_string(),
        };
        let printed = format!("{:?}", result);
        assert!(printed.contains("Abc123"));
        assert!(!printed.contains("5Kdsecret"));
    }
}
