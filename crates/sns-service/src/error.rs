use thiserror::Error;

/// Typed failure of a remote call.
///
/// Implementations must classify every failure into one of these so the
/// pipeline can decide between backoff, dropping a record, or propagating.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("Request throttled: {0}")]
    Throttling(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Service error: {0}")]
    Other(String),
}

impl ServiceError {
    pub fn is_throttling(&self) -> bool {
        matches!(self, ServiceError::Throttling(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound(_))
    }
}
