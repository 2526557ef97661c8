//! Delivery of the notification payload to the push gateway.
//!
//! One POST per event, no retry. Which status codes count as delivered is
//! decided by the [`ResponsePolicy`].

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, header};
use url::Url;

use crate::error::DeliveryError;
use crate::payload::NotificationPayload;
use crate::policy::ResponsePolicy;

/// A gateway response the policy accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub status: u16,
    pub body: String,
    pub elapsed_ms: u32,
}

/// Something that can deliver a notification payload.
#[async_trait]
pub trait PushGateway: Send + Sync {
    fn name(&self) -> &str;

    async fn deliver(&self, payload: &NotificationPayload)
    -> Result<DispatchOutcome, DeliveryError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewayTimeouts {
    pub request: Duration,
    pub connect: Duration,
}

impl Default for GatewayTimeouts {
    fn default() -> Self {
        Self {
            request: Duration::from_secs(30),
            connect: Duration::from_secs(10),
        }
    }
}

/// HTTP push gateway (Sygnal-style `notify` endpoint).
pub struct HttpPushGateway {
    client: Client,
    gateway_url: String,
    policy: ResponsePolicy,
}

impl HttpPushGateway {
    /// The URL is only parsed when delivering, so a malformed URL shows up as a
    /// transport failure of the event that tried to use it.
    pub fn new(
        gateway_url: impl Into<String>,
        policy: ResponsePolicy,
        timeouts: GatewayTimeouts,
    ) -> Result<Self, DeliveryError> {
        let gateway_url = gateway_url.into();
        let client = Client::builder()
            .timeout(timeouts.request)
            .connect_timeout(timeouts.connect)
            .build()
            .map_err(|e| DeliveryError::Transport {
                url: gateway_url.clone(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self::with_client(client, gateway_url, policy))
    }

    /// Create with a custom client.
    pub fn with_client(client: Client, gateway_url: impl Into<String>, policy: ResponsePolicy) -> Self {
        Self {
            client,
            gateway_url: gateway_url.into(),
            policy,
        }
    }

    fn transport_error(&self, reason: impl ToString) -> DeliveryError {
        DeliveryError::Transport {
            url: self.gateway_url.clone(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl PushGateway for HttpPushGateway {
    fn name(&self) -> &str {
        "http"
    }

    async fn deliver(
        &self,
        payload: &NotificationPayload,
    ) -> Result<DispatchOutcome, DeliveryError> {
        let url = Url::parse(&self.gateway_url)
            .map_err(|e| self.transport_error(format!("malformed gateway URL: {e}")))?;

        let body = serde_json::to_string(payload)?;
        let start = Instant::now();

        let response = self
            .client
            .post(url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(
                    gateway = %self.gateway_url,
                    error = %e,
                    "Push gateway request failed"
                );
                self.transport_error(e)
            })?;

        let status = response.status().as_u16();

        if !self.policy.accepts(status) {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                gateway = %self.gateway_url,
                status,
                body = %body,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Push gateway rejected notification"
            );
            return Err(DeliveryError::Status { status, body });
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;
        let elapsed_ms = start.elapsed().as_millis() as u32;

        for line in body.lines() {
            tracing::info!(status, "{line}");
        }
        tracing::info!(
            gateway = %self.gateway_url,
            status,
            devices = payload.notification.devices.len(),
            elapsed_ms,
            "Push notification delivered"
        );

        Ok(DispatchOutcome {
            status,
            body,
            elapsed_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::NotificationBuilder;
    use serde_json::json;
    use wiremock::matchers::{body_json, header as header_eq, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const NOTIFY_PATH: &str = "/_matrix/push/v1/notify";

    fn payload() -> NotificationPayload {
        NotificationBuilder::default().build(&["tok-a".to_string()], "create", "Acme", 7, 42)
    }

    fn gateway(url: impl Into<String>) -> HttpPushGateway {
        HttpPushGateway::new(url, ResponsePolicy::default(), GatewayTimeouts::default()).unwrap()
    }

    async fn server_answering(status: u16, body: &str) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(NOTIFY_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .expect(1)
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_posts_json_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(NOTIFY_PATH))
            .and(header_eq("content-type", "application/json"))
            .and(body_json(json!({
                "notification": {
                    "sender": "Acme",
                    "type": "create",
                    "servicerequest_id": 42,
                    "patient_id": 7,
                    "devices": [{"app_id": "care.amp.intensiv", "pushkey": "tok-a"}]
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"rejected":[]}"#))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = gateway(format!("{}{NOTIFY_PATH}", server.uri()))
            .deliver(&payload())
            .await
            .unwrap();
        assert_eq!(outcome.status, 200);
        assert_eq!(outcome.body, r#"{"rejected":[]}"#);
    }

    #[tokio::test]
    async fn test_400_is_accepted_by_default() {
        let server = server_answering(400, r#"{"rejected":["tok-a"]}"#).await;
        let outcome = gateway(format!("{}{NOTIFY_PATH}", server.uri()))
            .deliver(&payload())
            .await
            .unwrap();
        assert_eq!(outcome.status, 400);
        assert_eq!(outcome.body, r#"{"rejected":["tok-a"]}"#);
    }

    #[tokio::test]
    async fn test_400_is_rejected_by_strict_policy() {
        let server = server_answering(400, "bad").await;
        let gateway = HttpPushGateway::new(
            format!("{}{NOTIFY_PATH}", server.uri()),
            ResponsePolicy::strict(),
            GatewayTimeouts::default(),
        )
        .unwrap();
        let err = gateway.deliver(&payload()).await.unwrap_err();
        assert_eq!(err.status_code(), Some(400));
    }

    #[tokio::test]
    async fn test_500_is_a_status_error() {
        let server = server_answering(500, "boom").await;
        let err = gateway(format!("{}{NOTIFY_PATH}", server.uri()))
            .deliver(&payload())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DeliveryError::Status { status: 500, ref body } if body == "boom"
        ));
    }

    #[tokio::test]
    async fn test_malformed_url_is_a_transport_error() {
        let err = gateway("not a url").deliver(&payload()).await.unwrap_err();
        assert!(err.is_transport());
        assert!(err.to_string().contains("malformed gateway URL"));
    }

    #[tokio::test]
    async fn test_unreachable_gateway_is_a_transport_error() {
        // Bind then drop a listener so the port is very likely closed.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let gateway = HttpPushGateway::new(
            format!("http://127.0.0.1:{port}{NOTIFY_PATH}"),
            ResponsePolicy::default(),
            GatewayTimeouts {
                request: Duration::from_secs(2),
                connect: Duration::from_secs(1),
            },
        )
        .unwrap();
        let err = gateway.deliver(&payload()).await.unwrap_err();
        assert!(err.is_transport());
        assert_eq!(err.status_code(), None);
    }

    #[tokio::test]
    async fn test_slow_gateway_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;
        let gateway = HttpPushGateway::new(
            server.uri(),
            ResponsePolicy::default(),
            GatewayTimeouts {
                request: Duration::from_millis(200),
                connect: Duration::from_millis(200),
            },
        )
        .unwrap();
        let err = gateway.deliver(&payload()).await.unwrap_err();
        assert!(err.is_transport());
    }
}
