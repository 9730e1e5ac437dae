//! Error types for trove.

use thiserror::Error;

/// Result type alias using trove's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for trove operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Backing store operation failed (wraps sqlx::Error). Fatal for the
    /// current request; never silently degraded to empty results.
    #[error("Store unavailable: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Item not found
    #[error("Item not found: {0}")]
    ItemNotFound(uuid::Uuid),

    /// Embedding backend failed after retries were exhausted
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Search operation failed
    #[error("Search error: {0}")]
    Search(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed or missing caller input; surfaced immediately, never retried
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// HTTP status code this error maps to at the API boundary.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Database(_) => 503,
            Error::NotFound(_) | Error::ItemNotFound(_) => 404,
            Error::InvalidInput(_) => 400,
            Error::Embedding(_) | Error::Request(_) => 502,
            Error::Search(_)
            | Error::Serialization(_)
            | Error::Config(_)
            | Error::Internal(_)
            | Error::Io(_) => 500,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("test resource".to_string());
        assert_eq!(err.to_string(), "Not found: test resource");
    }

    #[test]
    fn test_error_display_item_not_found() {
        let id = Uuid::nil();
        let err = Error::ItemNotFound(id);
        assert_eq!(err.to_string(), format!("Item not found: {}", id));
    }

    #[test]
    fn test_error_display_embedding() {
        let err = Error::Embedding("failed to generate".to_string());
        assert_eq!(err.to_string(), "Embedding error: failed to generate");
    }

    #[test]
    fn test_error_display_search() {
        let err = Error::Search("index unavailable".to_string());
        assert_eq!(err.to_string(), "Search error: index unavailable");
    }

    #[test]
    fn test_error_display_serialization() {
        let err = Error::Serialization("invalid JSON".to_string());
        assert_eq!(err.to_string(), "Serialization error: invalid JSON");
    }

    #[test]
    fn test_error_display_config() {
        let err = Error::Config("missing API key".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing API key");
    }

    #[test]
    fn test_error_display_invalid_input() {
        let err = Error::InvalidInput("empty query".to_string());
        assert_eq!(err.to_string(), "Invalid input: empty query");
    }

    #[test]
    fn test_error_display_request() {
        let err = Error::Request("network unreachable".to_string());
        assert_eq!(err.to_string(), "Request error: network unreachable");
    }

    #[test]
    fn test_error_display_internal() {
        let err = Error::Internal("unexpected state".to_string());
        assert_eq!(err.to_string(), "Internal error: unexpected state");
    }

    #[test]
    fn test_error_display_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::Io(io_err);
        assert!(err.to_string().contains("I/O error:"));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number");
        assert!(json_err.is_err());

        let err: Error = json_err.unwrap_err().into();
        match err {
            Error::Serialization(msg) => {
                assert!(!msg.is_empty());
            }
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: Error = io_err.into();
        match err {
            Error::Io(_) => {} // Success
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_status_code_database_is_service_unavailable() {
        let err = Error::Database(sqlx::Error::PoolClosed);
        assert_eq!(err.status_code(), 503);
    }

    #[test]
    fn test_status_code_invalid_input_is_bad_request() {
        let err = Error::InvalidInput("empty query".to_string());
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_status_code_not_found() {
        assert_eq!(Error::NotFound("x".to_string()).status_code(), 404);
        assert_eq!(Error::ItemNotFound(Uuid::nil()).status_code(), 404);
    }

    #[test]
    fn test_status_code_embedding_is_bad_gateway() {
        let err = Error::Embedding("backend down".to_string());
        assert_eq!(err.status_code(), 502);
    }

    #[test]
    fn test_result_type_ok() {
        fn get_result() -> Result<i32> {
            Ok(42)
        }
        let result = get_result();
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), 42);
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }

    #[test]
    fn test_error_debug_format() {
        let err = Error::NotFound("test".to_string());
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("NotFound"));
    }
}
