use std::fmt;

use octopush_core::UnresolvableReference;
use octopush_storage::{ErrorCategory, StorageError};
use thiserror::Error;

/// Which reference of the order graph an error is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceRole {
    /// The ServiceRequest's own id
    Order,
    /// `ServiceRequest.subject`
    Patient,
    /// `ServiceRequest.performer[0]`
    Performer,
    /// `ServiceRequest.requester`
    Requester,
    /// An entry of `Organization.endpoint`
    Endpoint,
}

impl ReferenceRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceRole::Order => "order",
            ReferenceRole::Patient => "patient",
            ReferenceRole::Performer => "performer",
            ReferenceRole::Requester => "requester",
            ReferenceRole::Endpoint => "endpoint",
        }
    }
}

impl fmt::Display for ReferenceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures while walking from the order to its endpoints.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("{role} reference {reference} is not an {expected} but: {found}")]
    RoutingMismatch {
        role: ReferenceRole,
        reference: String,
        expected: &'static str,
        found: String,
    },

    #[error("{role} reference {reference:?} cannot be resolved: {reason}")]
    InvalidReference {
        role: ReferenceRole,
        reference: String,
        reason: UnresolvableReference,
    },

    #[error("{resource_type}/{id} not found")]
    NotFound {
        resource_type: &'static str,
        id: i64,
    },

    #[error("{resource_type}/{id} is not a readable {resource_type}: {message}")]
    Decode {
        resource_type: &'static str,
        id: i64,
        message: String,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ResolutionError {
    /// Maps a reference parsing failure to the matching resolution error.
    pub fn from_reference(
        role: ReferenceRole,
        reference: &str,
        expected: &'static str,
        reason: UnresolvableReference,
    ) -> Self {
        match reason {
            UnresolvableReference::TypeMismatch { found, .. } => Self::RoutingMismatch {
                role,
                reference: reference.to_string(),
                expected,
                found,
            },
            reason => Self::InvalidReference {
                role,
                reference: reference.to_string(),
                reason,
            },
        }
    }

    pub fn is_routing_mismatch(&self) -> bool {
        matches!(self, Self::RoutingMismatch { .. })
    }
}

/// Failures while handing the payload to the push gateway.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The gateway answered with a status outside the accepted set.
    #[error("Failed : HTTP error code : {status}")]
    Status { status: u16, body: String },

    /// Malformed gateway URL, connection failure, timeout or a broken response stream.
    #[error("push gateway {url} unreachable: {reason}")]
    Transport { url: String, reason: String },

    #[error("failed to serialize notification payload: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DeliveryError {
    /// The HTTP status for `Status` errors.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

/// Any failure of a single pipeline run. All of them are terminal for the
/// event and none is retried.
#[derive(Debug, Error)]
pub enum PushError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PushError {
    /// Short label for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Resolution(ResolutionError::RoutingMismatch { .. }) => "routing_mismatch",
            Self::Resolution(ResolutionError::InvalidReference { .. }) => "invalid_reference",
            Self::Resolution(ResolutionError::NotFound { .. }) => "not_found",
            Self::Resolution(ResolutionError::Decode { .. }) => "decode",
            Self::Resolution(ResolutionError::Storage(e)) => match e.category() {
                ErrorCategory::Validation => "storage_validation",
                ErrorCategory::Internal => "storage",
            },
            Self::Delivery(DeliveryError::Status { .. }) => "delivery_status",
            Self::Delivery(DeliveryError::Transport { .. }) => "delivery_transport",
            Self::Delivery(DeliveryError::Serialization(_)) => "serialization",
            Self::InvalidConfig(_) => "invalid_config",
        }
    }
}
