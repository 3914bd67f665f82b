//! In-memory read projection.
//!
//! Holds the denormalized session records together with the class
//! ownership records they are scoped by.

use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::class::{ClassRecord, Requester};
use crate::domain::class_session::CreateStatus;
use crate::domain::foundation::{ClassId, ClassSessionId, DomainError, Timestamp, UserId};
use crate::ports::{
    ClassDirectory, ClassListQuery, ClassOverview, ClassPage, ClassReader, ClassSessionPage,
    ClassSessionProjection, ClassSessionReader, ClassSessionView, ListQuery, ScheduledSession,
    SessionStats, SessionStatus, SortDirection, SortField,
};

#[derive(Debug, Clone, Default)]
pub struct InMemoryReadProjection {
    sessions: Arc<RwLock<HashMap<ClassSessionId, ClassSessionView>>>,
    classes: Arc<RwLock<HashMap<ClassId, ClassRecord>>>,
}

impl InMemoryReadProjection {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

fn matches_text(view: &ClassSessionView, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    view.title.to_lowercase().contains(&needle) || view.description.to_lowercase().contains(&needle)
}

fn compare(a: &ClassSessionView, b: &ClassSessionView, field: SortField) -> Ordering {
    match field {
        SortField::Start => a.start.cmp(&b.start),
        SortField::End => a.end.cmp(&b.end),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        SortField::Title => a.title.cmp(&b.title),
    }
}

#[async_trait]
impl ClassSessionReader for InMemoryReadProjection {
    async fn get_by_id(&self, id: ClassSessionId) -> Result<Option<ClassSessionView>, DomainError> {
        Ok(self.sessions.read().await.get(&id).cloned())
    }

    async fn list(
        &self,
        query: &ListQuery,
        requester: &Requester,
    ) -> Result<ClassSessionPage, DomainError> {
        let now = Timestamp::now();
        let classes = self.classes.read().await;
        let sessions = self.sessions.read().await;

        let mut matching: Vec<ClassSessionView> = sessions
            .values()
            .filter(|view| view.create_status == CreateStatus::Created)
            .filter(|view| {
                classes
                    .get(&view.class_id)
                    .is_some_and(|class| class.is_visible_to(requester))
            })
            .filter(|view| query.class_id.as_ref().map_or(true, |id| &view.class_id == id))
            .filter(|view| query.q.as_deref().map_or(true, |q| matches_text(view, q)))
            .filter(|view| {
                query.statuses.is_empty() || query.statuses.contains(&view.status_at(now))
            })
            .filter(|view| query.start_from.map_or(true, |from| view.start >= from))
            .filter(|view| query.end_until.map_or(true, |until| view.end <= until))
            .cloned()
            .collect();

        matching.sort_by(|a, b| {
            let ordering = compare(a, b, query.order_by).then_with(|| a.id.cmp(&b.id));
            match query.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });

        let total_count = matching.len() as u64;
        let results = matching
            .into_iter()
            .skip(query.offset())
            .take(query.limit as usize)
            .collect();

        Ok(ClassSessionPage {
            total_count,
            results,
        })
    }

    async fn schedule_for_class(
        &self,
        class_id: &ClassId,
    ) -> Result<Vec<ScheduledSession>, DomainError> {
        Ok(self
            .sessions
            .read()
            .await
            .values()
            .filter(|view| &view.class_id == class_id && view.occupies_slot())
            .map(|view| ScheduledSession {
                id: view.id,
                interval: view.interval(),
            })
            .collect())
    }

    async fn stats_for_class(
        &self,
        class_id: &ClassId,
        requester: &Requester,
    ) -> Result<SessionStats, DomainError> {
        let now = Timestamp::now();
        let mut stats = SessionStats::default();
        let visible = self
            .classes
            .read()
            .await
            .get(class_id)
            .is_some_and(|class| class.is_visible_to(requester));
        if !visible {
            return Ok(stats);
        }

        self.sessions
            .read()
            .await
            .values()
            .filter(|view| &view.class_id == class_id)
            .filter(|view| view.create_status == CreateStatus::Created)
            .for_each(|view| stats.record(view, now));
        Ok(stats)
    }
}

#[async_trait]
impl ClassSessionProjection for InMemoryReadProjection {
    async fn upsert(&self, view: ClassSessionView) -> Result<(), DomainError> {
        self.sessions.write().await.insert(view.id, view);
        Ok(())
    }

    async fn remove(&self, id: ClassSessionId) -> Result<(), DomainError> {
        self.sessions.write().await.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl ClassReader for InMemoryReadProjection {
    async fn get_class(&self, class_id: &ClassId) -> Result<Option<ClassRecord>, DomainError> {
        Ok(self.classes.read().await.get(class_id).cloned())
    }

    async fn list_classes(
        &self,
        query: &ClassListQuery,
        requester: &Requester,
    ) -> Result<ClassPage, DomainError> {
        let now = Timestamp::now();
        let classes = self.classes.read().await;
        let sessions = self.sessions.read().await;

        let mut matching: Vec<ClassOverview> = classes
            .values()
            .filter(|class| class.is_visible_to(requester))
            .filter_map(|class| {
                let own: Vec<&ClassSessionView> = sessions
                    .values()
                    .filter(|view| view.class_id == class.class_id)
                    .filter(|view| view.create_status == CreateStatus::Created)
                    .collect();
                let ahead = own
                    .iter()
                    .any(|view| view.status_at(now) == SessionStatus::Scheduled);
                if !query.admits(ahead) {
                    return None;
                }

                let mut listed: Vec<ClassSessionView> = own
                    .into_iter()
                    .filter(|view| query.in_window(view))
                    .cloned()
                    .collect();
                if query.has_window() && listed.is_empty() {
                    return None;
                }
                listed.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));

                Some(ClassOverview {
                    class: class.clone(),
                    sessions: listed,
                })
            })
            .collect();

        matching.sort_by(|a, b| a.class.class_id.as_str().cmp(b.class.class_id.as_str()));

        let total_count = matching.len() as u64;
        let results = matching
            .into_iter()
            .skip(query.offset())
            .take(query.limit as usize)
            .collect();

        Ok(ClassPage {
            total_count,
            results,
        })
    }
}

#[async_trait]
impl ClassDirectory for InMemoryReadProjection {
    async fn insert_class(&self, record: ClassRecord) -> Result<(), DomainError> {
        self.classes
            .write()
            .await
            .insert(record.class_id.clone(), record);
        Ok(())
    }

    async fn remove_class(&self, class_id: &ClassId) -> Result<(), DomainError> {
        self.classes.write().await.remove(class_id);
        Ok(())
    }

    async fn assign_tutor(&self, class_id: &ClassId, tutor_id: UserId) -> Result<(), DomainError> {
        if let Some(record) = self.classes.write().await.get_mut(class_id) {
            record.tutor_id = Some(tutor_id);
        }
        Ok(())
    }
}
