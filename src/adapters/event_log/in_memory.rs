//! In-memory event log.
//!
//! Streams are kept as serialized JSON, so every append and read goes
//! through the same encoding a durable store would use.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::class_session::ClassSessionEvent;
use crate::domain::foundation::{ClassSessionId, DomainError, ErrorCode};
use crate::ports::EventLog;

#[derive(Debug, Clone, Default)]
pub struct InMemoryEventLog {
    streams: Arc<RwLock<HashMap<ClassSessionId, Vec<JsonValue>>>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every append fail until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn stream_len(&self, id: ClassSessionId) -> usize {
        self.streams.read().await.get(&id).map_or(0, Vec::len)
    }

    pub async fn stream_count(&self) -> usize {
        self.streams.read().await.len()
    }
}

#[async_trait]
impl EventLog for InMemoryEventLog {
    async fn append(
        &self,
        id: ClassSessionId,
        events: &[ClassSessionEvent],
    ) -> Result<(), DomainError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                "Event log unavailable",
            ));
        }
        if events.is_empty() {
            return Ok(());
        }

        // Encode everything before touching the stream so a failure appends nothing.
        let encoded = events
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;

        self.streams
            .write()
            .await
            .entry(id)
            .or_default()
            .extend(encoded);
        Ok(())
    }

    async fn read(&self, id: ClassSessionId) -> Result<Vec<ClassSessionEvent>, DomainError> {
        let streams = self.streams.read().await;
        let stream = streams
            .get(&id)
            .filter(|stream| !stream.is_empty())
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::EventStreamNotFound,
                    format!("No events for class session {}", id),
                )
            })?;

        stream
            .iter()
            .map(|value| serde_json::from_value(value.clone()).map_err(DomainError::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::class_session::{SessionUpdated, VerificationUpdated};

    fn retitle(title: &str) -> ClassSessionEvent {
        ClassSessionEvent::Updated(SessionUpdated {
            title: Some(title.to_string()),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn read_unknown_stream_is_not_found() {
        let log = InMemoryEventLog::new();

        let err = log.read(ClassSessionId::new()).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::EventStreamNotFound);
    }

    #[tokio::test]
    async fn appends_are_read_back_in_order() {
        let log = InMemoryEventLog::new();
        let id = ClassSessionId::new();

        log.append(id, &[retitle("a")]).await.unwrap();
        log.append(
            id,
            &[
                retitle("b"),
                ClassSessionEvent::VerificationUpdated(VerificationUpdated::default()),
            ],
        )
        .await
        .unwrap();

        let events = log.read(id).await.unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], retitle("a"));
        assert_eq!(events[1], retitle("b"));
    }

    #[tokio::test]
    async fn streams_are_isolated() {
        let log = InMemoryEventLog::new();
        let a = ClassSessionId::new();
        let b = ClassSessionId::new();

        log.append(a, &[retitle("a")]).await.unwrap();

        assert_eq!(log.stream_len(a).await, 1);
        assert!(log.read(b).await.is_err());
    }

    #[tokio::test]
    async fn unavailable_log_appends_nothing() {
        let log = InMemoryEventLog::new();
        let id = ClassSessionId::new();
        log.set_unavailable(true);

        let err = log.append(id, &[retitle("a")]).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(log.stream_count().await, 0);
    }
}
