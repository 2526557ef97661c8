//! Typed views of the FHIR R4 records the pipeline reads.
//!
//! Only the fields needed for routing are modelled; everything else in the
//! JSON is ignored on deserialization.

use serde::{Deserialize, Serialize};

pub const SERVICE_REQUEST: &str = "ServiceRequest";
pub const PATIENT: &str = "Patient";
pub const ORGANIZATION: &str = "Organization";
pub const ENDPOINT: &str = "Endpoint";

/// A FHIR `Reference` datatype.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Literal reference, e.g. `Organization/10`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl Reference {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: Some(reference.into()),
            display: None,
        }
    }

    /// The literal reference, ignoring blank strings.
    pub fn literal(&self) -> Option<&str> {
        self.reference
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }
}

/// `ServiceRequest.status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RequestStatus {
    Draft,
    Active,
    OnHold,
    Revoked,
    Completed,
    EnteredInError,
    Unknown(String),
}

impl RequestStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::OnHold => "on-hold",
            Self::Revoked => "revoked",
            Self::Completed => "completed",
            Self::EnteredInError => "entered-in-error",
            Self::Unknown(raw) => raw,
        }
    }
}

impl From<String> for RequestStatus {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "draft" => Self::Draft,
            "active" => Self::Active,
            "on-hold" => Self::OnHold,
            "revoked" => Self::Revoked,
            "completed" => Self::Completed,
            "entered-in-error" => Self::EnteredInError,
            _ => Self::Unknown(raw),
        }
    }
}

impl From<RequestStatus> for String {
    fn from(status: RequestStatus) -> Self {
        status.as_str().to_string()
    }
}

/// `Endpoint.status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EndpointStatus {
    Active,
    Suspended,
    Error,
    Off,
    EnteredInError,
    Test,
    Unknown(String),
}

impl EndpointStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Error => "error",
            Self::Off => "off",
            Self::EnteredInError => "entered-in-error",
            Self::Test => "test",
            Self::Unknown(raw) => raw,
        }
    }
}

impl From<String> for EndpointStatus {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "active" => Self::Active,
            "suspended" => Self::Suspended,
            "error" => Self::Error,
            "off" => Self::Off,
            "entered-in-error" => Self::EnteredInError,
            "test" => Self::Test,
            _ => Self::Unknown(raw),
        }
    }
}

impl From<EndpointStatus> for String {
    fn from(status: EndpointStatus) -> Self {
        status.as_str().to_string()
    }
}

/// The order that triggers notification evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    pub resource_type: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<RequestStatus>,
    #[serde(default)]
    pub subject: Option<Reference>,
    #[serde(default)]
    pub performer: Vec<Reference>,
    #[serde(default)]
    pub requester: Option<Reference>,
}

impl ServiceRequest {
    /// `"<resourceType>/<id>"`, or the id verbatim when it is already a
    /// reference. `None` when the snapshot has no id.
    pub fn self_reference(&self) -> Option<String> {
        let id = self.id.as_deref().map(str::trim).filter(|id| !id.is_empty())?;
        if id.contains('/') {
            Some(id.to_string())
        } else {
            Some(format!("{}/{}", self.resource_type, id))
        }
    }

    /// The first performer, matching FHIR's "first repetition" accessor.
    pub fn primary_performer(&self) -> Option<&Reference> {
        self.performer.first()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub resource_type: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub endpoint: Vec<Reference>,
}

/// A FHIR `ContactPoint`; for push endpoints the value is the device token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactPoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub resource_type: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<EndpointStatus>,
    #[serde(default)]
    pub contact: Vec<ContactPoint>,
}

impl Endpoint {
    pub fn is_active(&self) -> bool {
        matches!(self.status, Some(EndpointStatus::Active))
    }
}
