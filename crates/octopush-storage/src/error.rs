use std::fmt;

/// Failures of a record store backend.
///
/// A missing record is not an error: [`RecordStore::read`](crate::RecordStore::read)
/// returns `Ok(None)` for it.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("invalid record: {0}")]
    InvalidResource(String),

    #[error("storage backend failure: {0}")]
    Internal(String),
}

impl StorageError {
    pub fn invalid_resource(message: impl Into<String>) -> Self {
        Self::InvalidResource(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidResource(_) => ErrorCategory::Validation,
            Self::Internal(_) => ErrorCategory::Internal,
        }
    }
}

/// Coarse error class, used as a log field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Validation,
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Validation => "validation",
            Self::Internal => "internal",
        })
    }
}
