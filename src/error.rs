//! Error types for store operations
//!
//! A missing id is never an error: loads and peeks report it as `Ok(None)`.

use thiserror::Error;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors surfaced by stores, the factory and cluster collaborators
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing map could not be read or written
    #[error("I/O error on '{map}': {message}")]
    Io { map: String, message: String },

    /// A named map already exists in the cluster with another value type
    #[error("map '{map}' already holds a different value type")]
    TypeMismatch { map: String },

    /// Invalid configuration value
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl StoreError {
    /// Build an I/O error for the given map
    pub fn io(map: impl Into<String>, message: impl Into<String>) -> Self {
        StoreError::Io {
            map: map.into(),
            message: message.into(),
        }
    }

    /// Check if this is a collaborator I/O failure
    pub fn is_io(&self) -> bool {
        matches!(self, StoreError::Io { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_display() {
        let err = StoreError::io("stores.jobs", "member unreachable");
        assert!(err.is_io());
        assert_eq!(err.to_string(), "I/O error on 'stores.jobs': member unreachable");
    }

    #[test]
    fn test_type_mismatch_is_not_io() {
        let err = StoreError::TypeMismatch { map: "x".into() };
        assert!(!err.is_io());
    }
}
