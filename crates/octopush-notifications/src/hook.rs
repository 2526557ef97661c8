//! Resource hook that runs the push pipeline after ServiceRequest writes.
//!
//! The write has already been committed when the hook runs, so nothing the
//! pipeline does is reported back to the host: skips and failures are logged
//! and `handle` returns `Ok(())`.

use std::sync::Arc;

use async_trait::async_trait;
use octopush_core::events::{HookError, ResourceEvent, ResourceEventType, ResourceHook};

use crate::model::SERVICE_REQUEST;
use crate::pipeline::{PipelineOutcome, PushPipeline};

pub struct PushHook {
    pipeline: Arc<PushPipeline>,
    enabled: bool,
}

impl PushHook {
    pub fn new(pipeline: Arc<PushPipeline>, enabled: bool) -> Self {
        Self { pipeline, enabled }
    }

    pub fn pipeline(&self) -> &PushPipeline {
        &self.pipeline
    }
}

#[async_trait]
impl ResourceHook for PushHook {
    fn name(&self) -> &str {
        "push_notification"
    }

    fn resource_types(&self) -> &[&str] {
        &[SERVICE_REQUEST]
    }

    fn event_types(&self) -> &[ResourceEventType] {
        &[ResourceEventType::Created, ResourceEventType::Updated]
    }

    async fn handle(&self, event: &ResourceEvent) -> Result<(), HookError> {
        if !self.enabled {
            return Ok(());
        }

        match self.pipeline.process(event).await {
            Ok(PipelineOutcome::Dispatched {
                outcome,
                device_count,
            }) => {
                tracing::info!(
                    resource_id = event.resource_id,
                    operation = event.event_type.operation_code(),
                    status = outcome.status,
                    device_count,
                    "Push notification sent"
                );
            }
            Ok(PipelineOutcome::Skipped(reason)) => {
                tracing::debug!(
                    resource_id = event.resource_id,
                    reason = %reason,
                    "No push notification for event"
                );
            }
            Err(e) => {
                tracing::error!(
                    resource_type = event.resource_type,
                    resource_id = event.resource_id,
                    kind = e.kind(),
                    error = %e,
                    "Failed to send push notification"
                );
            }
        }

        Ok(())
    }

    async fn on_start(&self) -> Result<(), HookError> {
        if !self.enabled {
            tracing::info!("Push notification hook disabled");
            return Ok(());
        }
        tracing::info!(
            gateway = self.pipeline.gateway().name(),
            "Push notification hook started"
        );
        Ok(())
    }
}
