//! Turns the performer's endpoint references into push tokens.

use std::sync::Arc;

use octopush_storage::RecordStore;

use crate::error::{ReferenceRole, ResolutionError};
use crate::model::{ENDPOINT, Endpoint, Reference};
use crate::policy::ReferencePolicy;
use crate::resolver::{fetch_record, routing_reference_id};

pub struct EndpointFilter {
    store: Arc<dyn RecordStore>,
    policy: ReferencePolicy,
}

impl EndpointFilter {
    pub fn new(store: Arc<dyn RecordStore>, policy: ReferencePolicy) -> Self {
        Self { store, policy }
    }

    /// Collects the contact values of every active endpoint, in reference
    /// order then contact order.
    ///
    /// Inactive endpoints are skipped. A mistyped reference aborts the whole
    /// collection under the strict policy. Tokens are not deduplicated: the
    /// same device registered on two endpoints is notified twice.
    pub async fn collect_tokens(
        &self,
        endpoint_refs: &[Reference],
    ) -> Result<Vec<String>, ResolutionError> {
        let mut tokens = Vec::new();

        for reference in endpoint_refs {
            let Some(id) =
                routing_reference_id(self.policy, ReferenceRole::Endpoint, Some(reference), ENDPOINT)?
            else {
                continue;
            };

            let endpoint: Endpoint = fetch_record(self.store.as_ref(), ENDPOINT, id).await?;
            if !endpoint.is_active() {
                tracing::debug!(
                    endpoint_id = id,
                    status = endpoint.status.as_ref().map(|s| s.as_str()).unwrap_or("none"),
                    "Skipping inactive endpoint"
                );
                continue;
            }

            for contact in endpoint.contact {
                match contact.value {
                    Some(token) => {
                        tracing::info!(endpoint_id = id, pushkey = %token, "Added pushtoken");
                        tokens.push(token);
                    }
                    None => {
                        tracing::debug!(endpoint_id = id, "Endpoint contact has no value");
                    }
                }
            }
        }

        Ok(tokens)
    }
}
