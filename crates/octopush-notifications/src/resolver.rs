//! Walks the order's references to find who sent it and which endpoints
//! should be notified.
//!
//! - order id and `subject` are *self references*: they only label the
//!   notification
//! - `performer[0]` and `requester` are *routing references*: the performer
//!   organization contributes its endpoint list, the requester organization
//!   contributes the sender name
//!
//! Each family follows its own [`ReferencePolicy`]. Lookups go straight to the
//! record store on every call.

use std::sync::Arc;

use octopush_core::{UnresolvableReference, parse_reference};
use octopush_storage::RecordStore;
use serde::de::DeserializeOwned;

use crate::error::{ReferenceRole, ResolutionError};
use crate::model::{ORGANIZATION, Organization, PATIENT, Reference, SERVICE_REQUEST, ServiceRequest};
use crate::policy::{ReferencePolicy, ReferenceValidation};

/// What the resolver learned about one order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOrder {
    pub order_id: i64,
    pub patient_id: i64,
    /// Requester organization name, empty when unknown.
    pub sender: String,
    /// Endpoint references of the performer organization, in order.
    pub endpoint_refs: Vec<Reference>,
}

pub struct ReferenceResolver {
    store: Arc<dyn RecordStore>,
    validation: ReferenceValidation,
}

impl ReferenceResolver {
    pub fn new(store: Arc<dyn RecordStore>, validation: ReferenceValidation) -> Self {
        Self { store, validation }
    }

    pub async fn resolve(&self, order: &ServiceRequest) -> Result<ResolvedOrder, ResolutionError> {
        let order_id = self.self_reference_id(
            ReferenceRole::Order,
            order.self_reference().as_deref(),
            SERVICE_REQUEST,
        )?;

        let patient_id = self.self_reference_id(
            ReferenceRole::Patient,
            order.subject.as_ref().and_then(Reference::literal),
            PATIENT,
        )?;

        // Performer first: a bad performer aborts before the requester is read.
        let endpoint_refs = match routing_reference_id(
            self.validation.routing_references,
            ReferenceRole::Performer,
            order.primary_performer(),
            ORGANIZATION,
        )? {
            Some(id) => {
                let organization: Organization =
                    fetch_record(self.store.as_ref(), ORGANIZATION, id).await?;
                tracing::debug!(
                    organization_id = id,
                    endpoint_count = organization.endpoint.len(),
                    "Resolved performer organization"
                );
                organization.endpoint
            }
            None => Vec::new(),
        };

        let sender = match routing_reference_id(
            self.validation.routing_references,
            ReferenceRole::Requester,
            order.requester.as_ref(),
            ORGANIZATION,
        )? {
            Some(id) => {
                let organization: Organization =
                    fetch_record(self.store.as_ref(), ORGANIZATION, id).await?;
                organization.name.unwrap_or_default()
            }
            None => String::new(),
        };

        Ok(ResolvedOrder {
            order_id,
            patient_id,
            sender,
            endpoint_refs,
        })
    }

    /// Order and patient ids. Lenient policy logs and falls back to `0`.
    fn self_reference_id(
        &self,
        role: ReferenceRole,
        reference: Option<&str>,
        expected: &'static str,
    ) -> Result<i64, ResolutionError> {
        let Some(reference) = reference else {
            return match self.validation.self_references {
                ReferencePolicy::Strict => Err(ResolutionError::InvalidReference {
                    role,
                    reference: String::new(),
                    reason: UnresolvableReference::Invalid("empty reference".to_string()),
                }),
                ReferencePolicy::Lenient => {
                    tracing::info!(%role, "Reference is missing, using id 0");
                    Ok(0)
                }
            };
        };

        let parsed = parse_reference(reference).and_then(|r| r.expect_type(expected));
        match (parsed, self.validation.self_references) {
            (Ok(id), _) => Ok(id),
            (Err(reason), ReferencePolicy::Strict) => Err(ResolutionError::from_reference(
                role, reference, expected, reason,
            )),
            (Err(reason), ReferencePolicy::Lenient) => {
                tracing::info!(
                    %role,
                    reference,
                    error = %reason,
                    "Reference is not an {expected}, using id 0"
                );
                Ok(0)
            }
        }
    }
}

/// Validates a routing reference and returns its numeric id.
///
/// `Ok(None)` means there is nothing to follow: the reference is absent, or
/// it is unusable and the policy is lenient.
pub(crate) fn routing_reference_id(
    policy: ReferencePolicy,
    role: ReferenceRole,
    reference: Option<&Reference>,
    expected: &'static str,
) -> Result<Option<i64>, ResolutionError> {
    let Some(literal) = reference.and_then(Reference::literal) else {
        return Ok(None);
    };

    match parse_reference(literal).and_then(|r| r.expect_type(expected)) {
        Ok(id) => Ok(Some(id)),
        Err(reason) => {
            let err = ResolutionError::from_reference(role, literal, expected, reason);
            match policy {
                ReferencePolicy::Strict => {
                    tracing::info!(%role, error = %err, "Aborting push notification");
                    Err(err)
                }
                ReferencePolicy::Lenient => {
                    tracing::info!(%role, error = %err, "Ignoring unusable reference");
                    Ok(None)
                }
            }
        }
    }
}

/// Reads a record and decodes it as `T`, checking the declared `resourceType`.
pub(crate) async fn fetch_record<T: DeserializeOwned>(
    store: &dyn RecordStore,
    resource_type: &'static str,
    id: i64,
) -> Result<T, ResolutionError> {
    let stored = store
        .read(resource_type, id)
        .await?
        .ok_or(ResolutionError::NotFound { resource_type, id })?;

    if let Some(declared) = stored.declared_type()
        && declared != resource_type
    {
        return Err(ResolutionError::Decode {
            resource_type,
            id,
            message: format!("record declares resourceType {declared}"),
        });
    }

    serde_json::from_value(stored.resource).map_err(|e| ResolutionError::Decode {
        resource_type,
        id,
        message: e.to_string(),
    })
}
