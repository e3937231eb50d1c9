use std::io;

/// Error types for recall operations
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RecallError {
    /// Unknown session id, or its backing transcript vanished from disk.
    #[error("session not found: {session_id}")]
    SessionNotFound { session_id: String },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl RecallError {
    pub fn not_found(session_id: impl Into<String>) -> Self {
        RecallError::SessionNotFound {
            session_id: session_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display_names_the_session() {
        let err = RecallError::not_found("abc-123");
        assert_eq!(err.to_string(), "session not found: abc-123");
    }
}
