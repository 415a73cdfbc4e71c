//! Error types for CryptoJoule

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JouleError {
    /// A field expected to hold pure hex held something else.
    #[error("Invalid input format for {field}: {reason}")]
    InvalidInputFormat { field: String, reason: String },

    /// Hash chain operands of different byte counts.
    #[error("Invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Unknown modality: {0}")]
    UnknownModality(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("JSON error: {0}")]
    Json(String),
}

impl JouleError {
    pub(crate) fn invalid_input(field: &str, reason: impl Into<String>) -> Self {
        JouleError::InvalidInputFormat {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for JouleError {
    fn from(err: std::io::Error) -> Self {
        JouleError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for JouleError {
    fn from(err: serde_json::Error) -> Self {
        JouleError::Json(err.to_string())
    }
}

impl From<toml::de::Error> for JouleError {
    fn from(err: toml::de::Error) -> Self {
        JouleError::Config(err.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, JouleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = JouleError::invalid_input("merkle root", "non-hex character 'z'");
        assert_eq!(
            err.to_string(),
            "Invalid input format for merkle root: non-hex character 'z'"
        );

        let err = JouleError::InvalidLength {
            expected: 32,
            actual: 31,
        };
        assert_eq!(err.to_string(), "Invalid length: expected 32 bytes, got 31");

        assert_eq!(
            JouleError::UnknownModality("Umbra".into()).to_string(),
            "Unknown modality: Umbra"
        );
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: JouleError = io.into();
        assert!(matches!(err, JouleError::Io(msg) if msg.contains("gone")));
    }
}
