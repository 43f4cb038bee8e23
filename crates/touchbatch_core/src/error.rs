//! Error types for TouchBatch.

use thiserror::Error;

/// Result type for coordinator and repository operations.
pub type TouchResult<T> = Result<T, TouchError>;

/// Errors that can occur while flushing deferred touches.
///
/// Registration never fails. Every error here surfaces either from the
/// persistence layer during a flush or from unbalanced scope calls.
#[derive(Debug, Error)]
pub enum TouchError {
    /// The repository rejected a batched write.
    #[error("repository error: {message}")]
    Repository {
        /// Description of the failure.
        message: String,
    },

    /// A foreign persistence-layer error.
    #[error("backend error: {0}")]
    Backend(#[from] Box<dyn std::error::Error + Send + Sync>),

    /// A scope was closed while none was open.
    #[error("no open touch scope")]
    NoOpenScope,

    /// The fixpoint flush did not settle within the configured number of passes.
    #[error("flush did not settle after {passes} passes")]
    FlushPassLimit {
        /// Number of passes executed before giving up.
        passes: usize,
    },
}

impl TouchError {
    /// Creates a repository error.
    pub fn repository(message: impl Into<String>) -> Self {
        Self::Repository {
            message: message.into(),
        }
    }

    /// Creates a pass-limit error.
    pub fn flush_pass_limit(passes: usize) -> Self {
        Self::FlushPassLimit { passes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn repository_error_message() {
        let err = TouchError::repository("update failed");
        assert_eq!(err.to_string(), "repository error: update failed");
    }

    #[test]
    fn backend_error_from_boxed() {
        let io_err: Box<dyn std::error::Error + Send + Sync> =
            Box::new(io::Error::other("disk gone"));
        let err: TouchError = io_err.into();
        assert!(matches!(err, TouchError::Backend(_)));
        assert!(err.to_string().contains("disk gone"));
    }

    #[test]
    fn pass_limit_message() {
        let err = TouchError::flush_pass_limit(8);
        assert_eq!(err.to_string(), "flush did not settle after 8 passes");
    }
}
