//! Integration event transport.
//!
//! Every event that crosses the service boundary travels as an
//! [`EventEnvelope`]: routing data up front, the event itself as a JSON
//! payload, and correlation metadata for tracing a request across services.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use uuid::Uuid;

use super::{DomainError, Timestamp};

/// An event published to other services.
///
/// Implementors only name their routing data; [`IntegrationEvent::to_envelope`]
/// does the wrapping.
pub trait IntegrationEvent: Serialize {
    /// Routing key, e.g. `class_session.created`. A `.vN` suffix sets the
    /// schema version.
    const EVENT_TYPE: &'static str;

    const AGGREGATE_TYPE: &'static str = "ClassSession";

    fn event_id(&self) -> EventId;

    fn aggregate_id(&self) -> String;

    fn occurred_at(&self) -> Timestamp;

    /// # Errors
    ///
    /// `InternalError` if the payload does not serialize.
    fn to_envelope(&self) -> Result<EventEnvelope, DomainError> {
        let mut envelope = EventEnvelope::new(
            Self::EVENT_TYPE,
            self.aggregate_id(),
            Self::AGGREGATE_TYPE,
            serde_json::to_value(self)?,
        );
        envelope.event_id = self.event_id();
        envelope.occurred_at = self.occurred_at();
        Ok(envelope)
    }
}

/// Unique id of one published event; consumers deduplicate on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Correlation carried from the triggering request or event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,

    /// Id of the event that caused this one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub causation_id: Option<String>,
}

/// Wire format of an integration event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event_id: EventId,
    pub event_type: String,
    pub schema_version: u32,
    pub aggregate_id: String,
    pub aggregate_type: String,
    pub occurred_at: Timestamp,
    pub payload: JsonValue,
    #[serde(default)]
    pub metadata: EventMetadata,
}

impl EventEnvelope {
    pub fn new(
        event_type: impl Into<String>,
        aggregate_id: impl Into<String>,
        aggregate_type: impl Into<String>,
        payload: JsonValue,
    ) -> Self {
        let event_type = event_type.into();
        Self {
            event_id: EventId::new(),
            schema_version: schema_version_of(&event_type),
            event_type,
            aggregate_id: aggregate_id.into(),
            aggregate_type: aggregate_type.into(),
            occurred_at: Timestamp::now(),
            payload,
            metadata: EventMetadata::default(),
        }
    }

    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.metadata.correlation_id = Some(id.into());
        self
    }

    pub fn with_causation_id(mut self, id: impl Into<String>) -> Self {
        self.metadata.causation_id = Some(id.into());
        self
    }

    /// Decodes the payload into the event it carries.
    pub fn payload_as<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.payload)
    }
}

fn schema_version_of(event_type: &str) -> u32 {
    event_type
        .rsplit_once(".v")
        .and_then(|(_, version)| version.parse().ok())
        .unwrap_or(1)
}
