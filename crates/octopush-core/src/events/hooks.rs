//! The interface the host calls after a resource write has been committed.
//!
//! A hook runs after the write response is decided. Whatever it returns, the
//! write stands; the host only logs a returned error.

use async_trait::async_trait;

use super::types::{ResourceEvent, ResourceEventType};

#[derive(Debug, thiserror::Error)]
pub enum HookError {
    #[error("hook {hook} failed: {message}")]
    Failed { hook: String, message: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HookError {
    pub fn failed(hook: impl Into<String>, message: impl Into<String>) -> Self {
        HookError::Failed {
            hook: hook.into(),
            message: message.into(),
        }
    }
}

/// Post-write hook.
///
/// The host calls [`ResourceHook::handle`] only for events accepted by
/// [`ResourceHook::matches`], which filters on `resource_types` and
/// `event_types` (an empty list accepts everything).
///
/// ```ignore
/// struct AuditHook;
///
/// #[async_trait]
/// impl ResourceHook for AuditHook {
///     fn name(&self) -> &str { "audit" }
///     fn resource_types(&self) -> &[&str] { &["ServiceRequest"] }
///
///     async fn handle(&self, event: &ResourceEvent) -> Result<(), HookError> {
///         tracing::info!(resource_id = event.resource_id, "write observed");
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait ResourceHook: Send + Sync {
    fn name(&self) -> &str;

    fn resource_types(&self) -> &[&str];

    fn event_types(&self) -> &[ResourceEventType] {
        &[]
    }

    async fn handle(&self, event: &ResourceEvent) -> Result<(), HookError>;

    async fn on_start(&self) -> Result<(), HookError> {
        Ok(())
    }

    async fn on_shutdown(&self) -> Result<(), HookError> {
        Ok(())
    }

    fn matches(&self, event: &ResourceEvent) -> bool {
        let resource_types = self.resource_types();
        let event_types = self.event_types();

        let resource_ok = resource_types.is_empty()
            || resource_types.iter().any(|t| *t == event.resource_type);
        let event_ok = event_types.is_empty() || event_types.contains(&event.event_type);

        resource_ok && event_ok
    }
}
