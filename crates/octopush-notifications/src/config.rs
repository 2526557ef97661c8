use std::sync::Arc;
use std::time::Duration;

use octopush_storage::RecordStore;
use serde::{Deserialize, Serialize};

use crate::dispatcher::{GatewayTimeouts, HttpPushGateway};
use crate::error::PushError;
use crate::payload::DEFAULT_APP_ID;
use crate::pipeline::PushPipeline;
use crate::policy::{ReferencePolicy, ReferenceValidation, ResponsePolicy};

/// `[push]` section of the configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PushConfig {
    pub enabled: bool,
    /// Push gateway notify URL, e.g. `https://push.example.org/_matrix/push/v1/notify`
    pub gateway_url: String,
    /// Application id sent with every device entry
    pub app_id: String,
    pub request_timeout_ms: u64,
    pub connect_timeout_ms: u64,
    /// Gateway statuses treated as delivered
    pub accepted_statuses: Vec<u16>,
    pub self_references: ReferencePolicy,
    pub routing_references: ReferencePolicy,
}

impl Default for PushConfig {
    fn default() -> Self {
        let validation = ReferenceValidation::default();
        Self {
            enabled: true,
            gateway_url: String::new(),
            app_id: DEFAULT_APP_ID.to_string(),
            request_timeout_ms: 30_000,
            connect_timeout_ms: 10_000,
            accepted_statuses: ResponsePolicy::default().accepted_statuses().collect(),
            self_references: validation.self_references,
            routing_references: validation.routing_references,
        }
    }
}

impl PushConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !self.enabled {
            return Ok(());
        }
        if self.gateway_url.trim().is_empty() {
            return Err("push.gateway_url must be set when push is enabled".into());
        }
        if self.app_id.trim().is_empty() {
            return Err("push.app_id must not be empty".into());
        }
        if self.request_timeout_ms == 0 || self.connect_timeout_ms == 0 {
            return Err("push timeouts must be > 0".into());
        }
        if self.accepted_statuses.is_empty() {
            return Err("push.accepted_statuses must not be empty".into());
        }
        if let Some(bad) = self
            .accepted_statuses
            .iter()
            .find(|s| !(100..=599).contains(*s))
        {
            return Err(format!("push.accepted_statuses contains invalid HTTP status {bad}"));
        }
        Ok(())
    }

    pub fn timeouts(&self) -> GatewayTimeouts {
        GatewayTimeouts {
            request: Duration::from_millis(self.request_timeout_ms),
            connect: Duration::from_millis(self.connect_timeout_ms),
        }
    }

    pub fn response_policy(&self) -> ResponsePolicy {
        ResponsePolicy::new(self.accepted_statuses.iter().copied())
    }

    pub fn reference_validation(&self) -> ReferenceValidation {
        ReferenceValidation {
            self_references: self.self_references,
            routing_references: self.routing_references,
        }
    }

    pub fn build_gateway(&self) -> Result<HttpPushGateway, PushError> {
        HttpPushGateway::new(
            self.gateway_url.clone(),
            self.response_policy(),
            self.timeouts(),
        )
        .map_err(|e| PushError::InvalidConfig(e.to_string()))
    }

    pub fn build_pipeline(&self, store: Arc<dyn RecordStore>) -> Result<PushPipeline, PushError> {
        self.validate().map_err(PushError::InvalidConfig)?;
        let gateway = self.build_gateway()?;
        Ok(PushPipeline::new(store, Arc::new(gateway))
            .with_app_id(self.app_id.clone())
            .with_reference_validation(self.reference_validation()))
    }
}
