//! Push gateway request body.
//!
//! ```json
//! { "notification": {
//!     "sender": "Central Clinic",
//!     "type": "create",
//!     "servicerequest_id": 42,
//!     "patient_id": 7,
//!     "devices": [ { "app_id": "care.amp.intensiv", "pushkey": "tok-a" } ]
//! } }
//! ```

use serde::{Deserialize, Serialize};

/// Application id the gateway uses to pick the push credentials.
pub const DEFAULT_APP_ID: &str = "care.amp.intensiv";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub notification: PushNotification,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushNotification {
    pub sender: String,
    /// Operation that triggered the push (`create` or `update`)
    #[serde(rename = "type")]
    pub kind: String,
    pub servicerequest_id: i64,
    pub patient_id: i64,
    pub devices: Vec<Device>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub app_id: String,
    pub pushkey: String,
}

/// Builds payloads for a fixed application id.
#[derive(Debug, Clone)]
pub struct NotificationBuilder {
    app_id: String,
}

impl NotificationBuilder {
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
        }
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// One device entry per token, in token order.
    pub fn build(
        &self,
        tokens: &[String],
        event_kind: &str,
        sender: &str,
        patient_id: i64,
        order_id: i64,
    ) -> NotificationPayload {
        let devices = tokens
            .iter()
            .map(|token| Device {
                app_id: self.app_id.clone(),
                pushkey: token.clone(),
            })
            .collect();

        NotificationPayload {
            notification: PushNotification {
                sender: sender.to_string(),
                kind: event_kind.to_string(),
                servicerequest_id: order_id,
                patient_id,
                devices,
            },
        }
    }
}

impl Default for NotificationBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_APP_ID)
    }
}
