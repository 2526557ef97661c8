//! Resource write events and the hook interface.
//!
//! The host event system owns the write path. Once a write has completed it
//! builds a [`ResourceEvent`] and awaits [`ResourceHook::handle`] on every
//! registered hook whose [`ResourceHook::matches`] returns true.
//!
//! ```ignore
//! use octopush_core::events::{ResourceEvent, ResourceHook};
//!
//! let event = ResourceEvent::created("ServiceRequest", "42", snapshot);
//! if hook.matches(&event) {
//!     hook.handle(&event).await?;
//! }
//! ```

pub mod hooks;
pub mod types;

pub use hooks::{HookError, ResourceHook};
pub use types::{ResourceEvent, ResourceEventType};
