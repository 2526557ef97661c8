use std::sync::Arc;

use octopush_core::ResourceEvent;
use octopush_storage::RecordStore;

use crate::dispatcher::{DispatchOutcome, PushGateway};
use crate::error::PushError;
use crate::filter::EndpointFilter;
use crate::gate::{self, GateDecision, SkipReason};
use crate::model::ServiceRequest;
use crate::payload::{DEFAULT_APP_ID, NotificationBuilder, NotificationPayload};
use crate::policy::ReferenceValidation;
use crate::resolver::ReferenceResolver;

/// Result of a full pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    Skipped(SkipReason),
    Dispatched {
        outcome: DispatchOutcome,
        device_count: usize,
    },
}

/// Result of running every stage except delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prepared {
    Skipped(SkipReason),
    Ready(NotificationPayload),
}

/// Gate, resolver, filter, builder and gateway wired together.
///
/// Holds no per-event state, so one instance can serve concurrent events.
pub struct PushPipeline {
    store: Arc<dyn RecordStore>,
    gateway: Arc<dyn PushGateway>,
    validation: ReferenceValidation,
    builder: NotificationBuilder,
}

impl PushPipeline {
    pub fn new(store: Arc<dyn RecordStore>, gateway: Arc<dyn PushGateway>) -> Self {
        Self {
            store,
            gateway,
            validation: ReferenceValidation::default(),
            builder: NotificationBuilder::new(DEFAULT_APP_ID),
        }
    }

    pub fn with_app_id(mut self, app_id: impl Into<String>) -> Self {
        self.builder = NotificationBuilder::new(app_id);
        self
    }

    pub fn with_reference_validation(mut self, validation: ReferenceValidation) -> Self {
        self.validation = validation;
        self
    }

    pub fn gateway(&self) -> &dyn PushGateway {
        self.gateway.as_ref()
    }

    /// Runs the whole pipeline for one write event.
    pub async fn process(&self, event: &ResourceEvent) -> Result<PipelineOutcome, PushError> {
        let payload = match self.preview(event).await? {
            Prepared::Skipped(reason) => return Ok(PipelineOutcome::Skipped(reason)),
            Prepared::Ready(payload) => payload,
        };

        let device_count = payload.notification.devices.len();
        let outcome = self.gateway.deliver(&payload).await?;

        Ok(PipelineOutcome::Dispatched {
            outcome,
            device_count,
        })
    }

    /// Runs the gate and builds the payload without sending it.
    pub async fn preview(&self, event: &ResourceEvent) -> Result<Prepared, PushError> {
        let order = match gate::evaluate(event) {
            GateDecision::Proceed(order) => order,
            GateDecision::Skip(reason) => {
                tracing::info!(
                    resource_type = event.resource_type,
                    resource_id = event.resource_id,
                    reason = %reason,
                    "Push notification skipped"
                );
                return Ok(Prepared::Skipped(reason));
            }
        };

        let payload = self
            .build_payload(event.event_type.operation_code(), &order)
            .await?;
        Ok(Prepared::Ready(payload))
    }

    async fn build_payload(
        &self,
        event_kind: &str,
        order: &ServiceRequest,
    ) -> Result<NotificationPayload, PushError> {
        let resolver = ReferenceResolver::new(self.store.clone(), self.validation);
        let resolved = resolver.resolve(order).await?;

        let filter = EndpointFilter::new(self.store.clone(), self.validation.routing_references);
        let tokens = filter.collect_tokens(&resolved.endpoint_refs).await?;

        tracing::debug!(
            backend = self.store.backend_name(),
            order_id = resolved.order_id,
            patient_id = resolved.patient_id,
            sender = %resolved.sender,
            token_count = tokens.len(),
            "Resolved push targets"
        );

        Ok(self.builder.build(
            &tokens,
            event_kind,
            &resolved.sender,
            resolved.patient_id,
            resolved.order_id,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DeliveryError, ResolutionError};
    use async_trait::async_trait;
    use octopush_storage::InMemoryStore;
    use serde_json::json;
    use std::sync::Mutex;

    /// Records payloads instead of sending them.
    #[derive(Default)]
    struct RecordingGateway {
        sent: Mutex<Vec<NotificationPayload>>,
        fail_with: Option<u16>,
    }

    impl RecordingGateway {
        fn sent(&self) -> Vec<NotificationPayload> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PushGateway for RecordingGateway {
        fn name(&self) -> &str {
            "recording"
        }

        async fn deliver(
            &self,
            payload: &NotificationPayload,
        ) -> Result<DispatchOutcome, DeliveryError> {
            self.sent.lock().unwrap().push(payload.clone());
            match self.fail_with {
                Some(status) => Err(DeliveryError::Status {
                    status,
                    body: String::new(),
                }),
                None => Ok(DispatchOutcome {
                    status: 200,
                    body: String::new(),
                    elapsed_ms: 0,
                }),
            }
        }
    }

    fn store() -> Arc<InMemoryStore> {
        let store = InMemoryStore::new();
        store
            .load_bundle(json!([
                {"resourceType": "Organization", "id": "10",
                 "endpoint": [{"reference": "Endpoint/5"}, {"reference": "Endpoint/6"}]},
                {"resourceType": "Organization", "id": "11", "name": "Central Clinic"},
                {"resourceType": "Endpoint", "id": "5", "status": "active",
                 "contact": [{"value": "tok-a"}]},
                {"resourceType": "Endpoint", "id": "6", "status": "off",
                 "contact": [{"value": "tok-b"}]}
            ]))
            .unwrap();
        Arc::new(store)
    }

    fn order(status: &str, performer: &str) -> serde_json::Value {
        json!({
            "resourceType": "ServiceRequest",
            "id": "42",
            "status": status,
            "subject": {"reference": "Patient/7"},
            "performer": [{"reference": performer}],
            "requester": {"reference": "Organization/11"}
        })
    }

    #[tokio::test]
    async fn test_process_dispatches_once() {
        let gateway = Arc::new(RecordingGateway::default());
        let pipeline = PushPipeline::new(store(), gateway.clone());

        let event = ResourceEvent::updated("ServiceRequest", "42", order("active", "Organization/10"));
        let outcome = pipeline.process(&event).await.unwrap();

        assert!(matches!(
            outcome,
            PipelineOutcome::Dispatched { device_count: 1, .. }
        ));
        let sent = gateway.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].notification.kind, "update");
        assert_eq!(sent[0].notification.devices[0].pushkey, "tok-a");
    }

    #[tokio::test]
    async fn test_inactive_order_never_reaches_gateway() {
        let gateway = Arc::new(RecordingGateway::default());
        let pipeline = PushPipeline::new(store(), gateway.clone());

        for status in ["draft", "completed", "on-hold"] {
            let event =
                ResourceEvent::created("ServiceRequest", "42", order(status, "Organization/10"));
            let outcome = pipeline.process(&event).await.unwrap();
            assert!(matches!(outcome, PipelineOutcome::Skipped(SkipReason::Inactive(_))));
        }
        assert!(gateway.sent().is_empty());
    }

    #[tokio::test]
    async fn test_mismatch_never_reaches_gateway() {
        let gateway = Arc::new(RecordingGateway::default());
        let pipeline = PushPipeline::new(store(), gateway.clone());

        let event =
            ResourceEvent::created("ServiceRequest", "42", order("active", "Practitioner/10"));
        let err = pipeline.process(&event).await.unwrap_err();

        assert!(matches!(
            err,
            PushError::Resolution(ResolutionError::RoutingMismatch { .. })
        ));
        assert!(gateway.sent().is_empty());
    }

    #[tokio::test]
    async fn test_gateway_failure_is_reported() {
        let gateway = Arc::new(RecordingGateway {
            fail_with: Some(503),
            ..Default::default()
        });
        let pipeline = PushPipeline::new(store(), gateway.clone());

        let event = ResourceEvent::created("ServiceRequest", "42", order("active", "Organization/10"));
        let err = pipeline.process(&event).await.unwrap_err();
        assert_eq!(err.kind(), "delivery_status");
        assert_eq!(gateway.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_preview_does_not_send() {
        let gateway = Arc::new(RecordingGateway::default());
        let pipeline = PushPipeline::new(store(), gateway.clone()).with_app_id("org.example.test");

        let event = ResourceEvent::created("ServiceRequest", "42", order("active", "Organization/10"));
        let Prepared::Ready(payload) = pipeline.preview(&event).await.unwrap() else {
            panic!("expected a payload");
        };

        assert_eq!(payload.notification.devices[0].app_id, "org.example.test");
        assert_eq!(payload.notification.sender, "Central Clinic");
        assert!(gateway.sent().is_empty());
    }
}
