//! Policies for reference validation and gateway response classification.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// What to do with a reference whose type tag or id is unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferencePolicy {
    /// Abort the pipeline for this event.
    Strict,
    /// Log and carry on: self references fall back to id `0`, routing
    /// references are treated as absent.
    Lenient,
}

impl ReferencePolicy {
    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Strict)
    }
}

/// Reference validation per reference family.
///
/// The order and patient ids only label the notification, while organization
/// and endpoint references decide who receives it, so the defaults differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceValidation {
    /// The order's own id and `subject` (patient).
    pub self_references: ReferencePolicy,
    /// `performer`, `requester` and `Organization.endpoint` entries.
    pub routing_references: ReferencePolicy,
}

impl Default for ReferenceValidation {
    fn default() -> Self {
        Self {
            self_references: ReferencePolicy::Lenient,
            routing_references: ReferencePolicy::Strict,
        }
    }
}

/// Which gateway status codes count as a delivered notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponsePolicy {
    accepted: BTreeSet<u16>,
}

impl ResponsePolicy {
    pub fn new(accepted: impl IntoIterator<Item = u16>) -> Self {
        Self {
            accepted: accepted.into_iter().collect(),
        }
    }

    /// Accepts 200 and 400. The gateway answers 400 when some pushkeys were
    /// rejected, which still means the request itself was processed.
    pub fn tolerant() -> Self {
        Self::new([200, 400])
    }

    /// Accepts 200 only.
    pub fn strict() -> Self {
        Self::new([200])
    }

    pub fn accepts(&self, status: u16) -> bool {
        self.accepted.contains(&status)
    }

    pub fn accepted_statuses(&self) -> impl Iterator<Item = u16> + '_ {
        self.accepted.iter().copied()
    }
}

impl Default for ResponsePolicy {
    fn default() -> Self {
        Self::tolerant()
    }
}
