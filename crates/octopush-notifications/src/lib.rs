//! Push notifications for active ServiceRequests.
//!
//! After a ServiceRequest is created or updated, the pipeline resolves which
//! devices should hear about it and posts a single notification to the push
//! gateway:
//!
//! ```text
//! ResourceEvent ─▶ gate ─▶ resolver ─▶ filter ─▶ payload ─▶ dispatcher
//!                  (skip?)  (orgs)     (tokens)  (JSON)     (HTTP POST)
//! ```
//!
//! Every stage runs sequentially inside the hook invocation. Nothing is cached
//! or retried; each event resolves its references afresh.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod filter;
pub mod gate;
pub mod hook;
pub mod model;
pub mod payload;
pub mod pipeline;
pub mod policy;
pub mod resolver;

pub use config::PushConfig;
pub use dispatcher::{DispatchOutcome, GatewayTimeouts, HttpPushGateway, PushGateway};
pub use error::{DeliveryError, PushError, ReferenceRole, ResolutionError};
pub use filter::EndpointFilter;
pub use gate::{GateDecision, SkipReason};
pub use hook::PushHook;
pub use model::{
    ContactPoint, Endpoint, EndpointStatus, Organization, Reference, RequestStatus, ServiceRequest,
};
pub use payload::{
    DEFAULT_APP_ID, Device, NotificationBuilder, NotificationPayload, PushNotification,
};
pub use pipeline::{PipelineOutcome, Prepared, PushPipeline};
pub use policy::{ReferencePolicy, ReferenceValidation, ResponsePolicy};
pub use resolver::{ReferenceResolver, ResolvedOrder};
