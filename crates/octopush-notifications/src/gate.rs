//! Decides whether a write event should run the push pipeline at all.
//!
//! Failing any check is a silent no-op for the host: the reason is logged and
//! returned, never raised.

use std::fmt;

use octopush_core::ResourceEvent;

use crate::model::{RequestStatus, SERVICE_REQUEST, ServiceRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Neither a create nor an update
    UnsupportedOperation(&'static str),
    /// The written resource is not a ServiceRequest
    OtherResourceType(String),
    /// The event carries no resource snapshot
    MissingSnapshot,
    /// The snapshot cannot be read as a ServiceRequest
    UnreadableSnapshot(String),
    MissingStatus,
    /// The order status is not `active`
    Inactive(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedOperation(op) => write!(f, "operation {op} does not trigger push"),
            Self::OtherResourceType(t) => write!(f, "resource type {t} does not trigger push"),
            Self::MissingSnapshot => write!(f, "ServiceRequest is not readable: no snapshot"),
            Self::UnreadableSnapshot(reason) => {
                write!(f, "ServiceRequest is not readable: {reason}")
            }
            Self::MissingStatus => write!(f, "ServiceRequest has no status"),
            Self::Inactive(status) => write!(f, "ServiceRequest status is not active but {status}"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum GateDecision {
    Proceed(ServiceRequest),
    Skip(SkipReason),
}

impl GateDecision {
    pub fn is_proceed(&self) -> bool {
        matches!(self, Self::Proceed(_))
    }
}

/// Checks operation kind, resource type, snapshot shape and order status.
pub fn evaluate(event: &ResourceEvent) -> GateDecision {
    if !event.event_type.is_write() {
        return GateDecision::Skip(SkipReason::UnsupportedOperation(
            event.event_type.operation_code(),
        ));
    }

    if event.resource_type != SERVICE_REQUEST {
        return GateDecision::Skip(SkipReason::OtherResourceType(event.resource_type.clone()));
    }

    let Some(snapshot) = event.resource.as_ref() else {
        return GateDecision::Skip(SkipReason::MissingSnapshot);
    };

    let order: ServiceRequest = match serde_json::from_value(snapshot.clone()) {
        Ok(order) => order,
        Err(e) => return GateDecision::Skip(SkipReason::UnreadableSnapshot(e.to_string())),
    };

    if order.resource_type != SERVICE_REQUEST {
        return GateDecision::Skip(SkipReason::UnreadableSnapshot(format!(
            "snapshot is a {}",
            order.resource_type
        )));
    }

    match &order.status {
        Some(RequestStatus::Active) => GateDecision::Proceed(order),
        Some(other) => {
            let status = other.as_str().to_ascii_lowercase();
            GateDecision::Skip(SkipReason::Inactive(status))
        }
        None => GateDecision::Skip(SkipReason::MissingStatus),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn order(status: &str) -> serde_json::Value {
        json!({
            "resourceType": "ServiceRequest",
            "id": "42",
            "status": status,
            "subject": {"reference": "Patient/7"}
        })
    }

    #[test]
    fn test_active_create_and_update_proceed() {
        let created = ResourceEvent::created("ServiceRequest", "42", order("active"));
        let updated = ResourceEvent::updated("ServiceRequest", "42", order("Active"));
        assert!(evaluate(&created).is_proceed());
        assert!(evaluate(&updated).is_proceed());
    }

    #[test]
    fn test_delete_is_skipped() {
        let mut event = ResourceEvent::deleted("ServiceRequest", "42");
        event.resource = Some(order("active"));
        assert!(matches!(
            evaluate(&event),
            GateDecision::Skip(SkipReason::UnsupportedOperation("delete"))
        ));
    }

    #[test]
    fn test_other_resource_types_are_skipped() {
        let event = ResourceEvent::created("Patient", "7", json!({"resourceType": "Patient"}));
        assert!(matches!(
            evaluate(&event),
            GateDecision::Skip(SkipReason::OtherResourceType(t)) if t == "Patient"
        ));
    }

    #[test]
    fn test_snapshot_problems_are_skipped() {
        let mut event = ResourceEvent::created("ServiceRequest", "42", json!({}));
        event.resource = None;
        assert!(matches!(
            evaluate(&event),
            GateDecision::Skip(SkipReason::MissingSnapshot)
        ));

        let event = ResourceEvent::created("ServiceRequest", "42", json!("not an object"));
        assert!(matches!(
            evaluate(&event),
            GateDecision::Skip(SkipReason::UnreadableSnapshot(_))
        ));

        let event = ResourceEvent::created(
            "ServiceRequest",
            "42",
            json!({"resourceType": "Task", "status": "active"}),
        );
        assert!(matches!(
            evaluate(&event),
            GateDecision::Skip(SkipReason::UnreadableSnapshot(_))
        ));
    }

    #[test]
    fn test_inactive_or_missing_status_is_skipped() {
        for status in ["draft", "on-hold", "completed", "revoked", "whatever"] {
            let event = ResourceEvent::updated("ServiceRequest", "42", order(status));
            assert!(
                matches!(evaluate(&event), GateDecision::Skip(SkipReason::Inactive(_))),
                "status {status} must not proceed"
            );
        }

        let event = ResourceEvent::created(
            "ServiceRequest",
            "42",
            json!({"resourceType": "ServiceRequest", "id": "42"}),
        );
        assert!(matches!(
            evaluate(&event),
            GateDecision::Skip(SkipReason::MissingStatus)
        ));
    }

    #[test]
    fn test_skip_reason_display() {
        assert_eq!(
            SkipReason::Inactive("draft".into()).to_string(),
            "ServiceRequest status is not active but draft"
        );
    }
}
