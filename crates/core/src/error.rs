//! Error types for the ctxpack domain.
//!
//! Uses `thiserror` for ergonomic error definitions. Collaborator failures
//! are kept separate from engine errors: the engine absorbs the former and
//! only surfaces the latter to callers.

use thiserror::Error;

/// The top-level error type returned by the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The request was rejected before any source was consulted.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The caller cancelled the gather cycle. Partial results are discarded.
    #[error("Gather cancelled by caller")]
    Cancelled,

    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Result type alias using [`EngineError`].
pub type Result<T> = std::result::Result<T, EngineError>;

/// Failure reported by an external collaborator (file reader, search
/// backend, git, ...). Never fatal for a gather cycle.
#[derive(Debug, Clone, Error)]
pub enum CollaboratorError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {path}: {reason}")]
    PermissionDenied { path: String, reason: String },

    #[error("Not a git repository: {0}")]
    NotARepository(String),

    #[error("Timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Backend error: {0}")]
    Backend(String),
}

impl CollaboratorError {
    /// Map an I/O error for `path` onto the collaborator taxonomy.
    pub fn from_io(path: &str, err: &std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_string()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                path: path.to_string(),
                reason: err.to_string(),
            },
            _ => Self::Backend(format!("{path}: {err}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_request_displays_reason() {
        let err = EngineError::InvalidRequest("max_tokens must be > 0".into());
        assert!(err.to_string().contains("max_tokens"));
    }

    #[test]
    fn io_not_found_maps_to_not_found() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = CollaboratorError::from_io("src/a.ts", &io);
        assert!(matches!(err, CollaboratorError::NotFound(ref p) if p == "src/a.ts"));
    }

    #[test]
    fn io_permission_maps_to_permission_denied() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let err = CollaboratorError::from_io("/etc/shadow", &io);
        assert!(err.to_string().contains("/etc/shadow"));
        assert!(matches!(err, CollaboratorError::PermissionDenied { .. }));
    }

    #[test]
    fn timeout_displays_duration() {
        let err = CollaboratorError::Timeout { timeout_ms: 250 };
        assert_eq!(err.to_string(), "Timed out after 250ms");
    }
}
