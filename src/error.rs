//! Error types for the cache library.
//!
//! Misses, expired keys and removal of absent keys are not errors. A
//! `CacheError` is either a rejected configuration or a failure in the
//! server/client plumbing. Internal consistency violations inside an engine
//! panic instead; they indicate a bug, not misuse.

use std::fmt;
use std::io;

/// The main error type for cache construction and the text protocol.
#[derive(Debug)]
pub enum CacheError {
    /// Capacity must be a positive number of entries.
    InvalidCapacity(usize),

    /// The policy name is not one of the known kinds.
    UnknownPolicy(String),

    /// A TTL that cannot be honoured (negative or unparsable).
    InvalidTtl(String),

    /// Any other rejected configuration.
    InvalidConfig(String),

    /// The command received was invalid or malformed.
    InvalidCommand(String),

    /// Failed to parse a protocol message.
    ParseError(String),

    /// An I/O error occurred (network).
    IoError(io::Error),
}

impl CacheError {
    /// Returns `true` for errors raised while constructing a cache.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            CacheError::InvalidCapacity(_)
                | CacheError::UnknownPolicy(_)
                | CacheError::InvalidTtl(_)
                | CacheError::InvalidConfig(_)
        )
    }
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::InvalidCapacity(capacity) => {
                write!(f, "invalid capacity: {} (must be at least 1)", capacity)
            }
            CacheError::UnknownPolicy(name) => {
                write!(f, "unknown eviction policy: '{}' (expected 'lru' or 'lfu')", name)
            }
            CacheError::InvalidTtl(reason) => write!(f, "invalid ttl: {}", reason),
            CacheError::InvalidConfig(reason) => write!(f, "invalid configuration: {}", reason),
            CacheError::InvalidCommand(cmd) => write!(f, "invalid command: '{}'", cmd),
            CacheError::ParseError(msg) => write!(f, "parse error: {}", msg),
            CacheError::IoError(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CacheError::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for CacheError {
    fn from(err: io::Error) -> Self {
        CacheError::IoError(err)
    }
}

/// A specialized Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CacheError::InvalidCapacity(0);
        assert_eq!(format!("{}", err), "invalid capacity: 0 (must be at least 1)");

        let err = CacheError::UnknownPolicy("mru".to_string());
        assert_eq!(
            format!("{}", err),
            "unknown eviction policy: 'mru' (expected 'lru' or 'lfu')"
        );

        let err = CacheError::InvalidTtl("-5 is negative".to_string());
        assert_eq!(format!("{}", err), "invalid ttl: -5 is negative");
    }

    #[test]
    fn test_configuration_classification() {
        assert!(CacheError::InvalidCapacity(0).is_configuration());
        assert!(CacheError::UnknownPolicy("x".into()).is_configuration());
        assert!(!CacheError::ParseError("x".into()).is_configuration());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused");
        let cache_err: CacheError = io_err.into();
        assert!(matches!(cache_err, CacheError::IoError(_)));
    }
}
