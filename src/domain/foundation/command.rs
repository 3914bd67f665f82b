//! Correlation context passed into every command handler.

use uuid::Uuid;

use super::EventEnvelope;

/// Where a command came from, for tracing.
///
/// Requesters are carried on the commands themselves: verification results
/// and address answers are issued by the system, not by a user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandMetadata {
    correlation_id: Option<String>,
    causation_id: Option<String>,
}

impl CommandMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context for a command triggered by `envelope`: its id becomes the
    /// causation and its correlation is kept.
    pub fn caused_by(envelope: &EventEnvelope) -> Self {
        Self {
            correlation_id: envelope.metadata.correlation_id.clone(),
            causation_id: Some(envelope.event_id.to_string()),
        }
    }

    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// Copies the correlation onto an outgoing envelope, starting a new one
    /// when the command had none.
    pub fn stamp(&self, envelope: EventEnvelope) -> EventEnvelope {
        let correlation_id = self
            .correlation_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let envelope = envelope.with_correlation_id(correlation_id);
        match &self.causation_id {
            Some(causation_id) => envelope.with_causation_id(causation_id.clone()),
            None => envelope,
        }
    }
}
