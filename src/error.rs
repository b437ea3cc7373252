use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("Verification gateway error: {0}")]
    Gateway(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Malformed data from gateway: {0}")]
    MalformedData(String),

    #[error("Invalid session state: {0}")]
    InvalidState(String),

    #[error("No batch has been loaded in this session")]
    NoActiveBatch,

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReviewError {
    /// Errors caused by the remote service that a retry may clear.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ReviewError::Gateway(_)
                | ReviewError::Http(_)
                | ReviewError::NotFound(_)
                | ReviewError::MalformedData(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ReviewError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_errors() {
        assert!(ReviewError::Gateway("HTTP 503".into()).is_recoverable());
        assert!(ReviewError::NotFound("doc-1".into()).is_recoverable());
        assert!(!ReviewError::NoActiveBatch.is_recoverable());
        assert!(!ReviewError::Config("bad".into()).is_recoverable());
    }
}
