//! Error types for the meeting digest.
//!
//! The extraction core never fails: missing fields are `None`, malformed
//! blocks are skipped. Errors only come from the edges, i.e. loading
//! configuration and decoding raw message payloads.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DigestError {
    #[error("Failed to read config: {0}")]
    ConfigRead(String),

    #[error("Failed to parse config: {0}")]
    ConfigParse(String),

    #[error("Invalid view link pattern: {0}")]
    InvalidPattern(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid message timestamp: {0}")]
    InvalidTimestamp(String),
}

impl From<std::io::Error> for DigestError {
    fn from(err: std::io::Error) -> Self {
        DigestError::ConfigRead(err.to_string())
    }
}

impl From<serde_json::Error> for DigestError {
    fn from(err: serde_json::Error) -> Self {
        DigestError::ParseError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_become_config_read() {
        let err: DigestError = std::io::Error::from(std::io::ErrorKind::NotFound).into();
        assert!(matches!(err, DigestError::ConfigRead(_)));
    }

    #[test]
    fn json_errors_become_parse_errors() {
        let err: DigestError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, DigestError::ParseError(_)));
    }
}
