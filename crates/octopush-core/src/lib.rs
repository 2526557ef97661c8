//! Shared building blocks for the octopush workspace.
//!
//! - [`events`]: write events emitted by the host server and the hook interface
//!   that reacts to them
//! - [`reference`]: parsing of `"<ResourceType>/<id>"` references

pub mod events;
pub mod reference;

pub use events::{HookError, ResourceEvent, ResourceEventType, ResourceHook};
pub use reference::{FhirReference, UnresolvableReference, parse_reference};
