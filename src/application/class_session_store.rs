//! Loading and committing class sessions against the event log.
//!
//! Commits happen while the caller holds the session lock; publishing the
//! returned envelopes happens after the lock is released, so a collaborator
//! that answers synchronously can take the lock again.

use std::sync::Arc;

use tracing::{error, info};

use crate::domain::class_session::{BatchInfo, ClassSession, ClassSessionError, ClassSessionEvent};
use crate::domain::foundation::{ClassSessionId, CommandMetadata, ErrorCode, EventEnvelope};
use crate::ports::EventLog;

use super::ClassSessionEventDispatcher;

/// Event-sourced repository for class sessions.
pub struct ClassSessionStore {
    event_log: Arc<dyn EventLog>,
    dispatcher: Arc<ClassSessionEventDispatcher>,
}

impl ClassSessionStore {
    pub fn new(event_log: Arc<dyn EventLog>, dispatcher: Arc<ClassSessionEventDispatcher>) -> Self {
        Self {
            event_log,
            dispatcher,
        }
    }

    pub fn dispatcher(&self) -> &ClassSessionEventDispatcher {
        &self.dispatcher
    }

    /// Rebuilds the session by replaying its stream.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id.
    pub async fn load(&self, id: ClassSessionId) -> Result<ClassSession, ClassSessionError> {
        Ok(self.load_with_history(id).await?.0)
    }

    /// Rebuilds the session and hands back the history it was built from.
    pub async fn load_with_history(
        &self,
        id: ClassSessionId,
    ) -> Result<(ClassSession, Vec<ClassSessionEvent>), ClassSessionError> {
        let events = self.event_log.read(id).await.map_err(|e| {
            if e.code == ErrorCode::EventStreamNotFound {
                ClassSessionError::not_found(id)
            } else {
                ClassSessionError::from(e)
            }
        })?;
        let session = ClassSession::from_events(id, &events)?;
        Ok((session, events))
    }

    /// Appends the pending events and returns the integration events to
    /// publish once the caller has released the session lock.
    ///
    /// Pending events are only cleared after the append succeeded; on error
    /// nothing is published and the session keeps them.
    pub async fn commit(
        &self,
        session: &mut ClassSession,
        batch: BatchInfo,
    ) -> Result<Vec<EventEnvelope>, ClassSessionError> {
        if session.pending_events().is_empty() {
            return Ok(Vec::new());
        }

        let pending = session.pending_events().to_vec();
        let envelopes = self
            .dispatcher
            .envelopes_for(session, &pending, batch)
            .map_err(ClassSessionError::from)?;

        if let Err(e) = self.event_log.append(session.id(), &pending).await {
            error!(
                class_session_id = %session.id(),
                error = %e,
                "failed to append class session events"
            );
            return Err(e.into());
        }
        session.take_pending_events();

        info!(
            class_session_id = %session.id(),
            events = pending.len(),
            version = session.version(),
            "class session events committed"
        );
        Ok(envelopes)
    }

    /// Publishes envelopes returned by [`commit`](Self::commit).
    pub async fn publish(
        &self,
        envelopes: Vec<EventEnvelope>,
        metadata: &CommandMetadata,
    ) -> Result<(), ClassSessionError> {
        self.dispatcher
            .publish(envelopes, metadata)
            .await
            .map_err(ClassSessionError::from)
    }

    /// Commit followed by publish, for sessions no one else can see yet.
    pub async fn commit_and_publish(
        &self,
        session: &mut ClassSession,
        batch: BatchInfo,
        metadata: &CommandMetadata,
    ) -> Result<(), ClassSessionError> {
        let envelopes = self.commit(session, batch).await?;
        self.publish(envelopes, metadata).await
    }
}
