//! ListClassesHandler - Query handler for browsing classes with their sessions.

use std::sync::Arc;

use crate::domain::class::Requester;
use crate::domain::class_session::ClassSessionError;
use crate::ports::{ClassListQuery, ClassPage, ClassReader};

const MAX_LIMIT: u32 = 100;

#[derive(Debug, Clone)]
pub struct ListClassesQuery {
    pub requester: Requester,
    pub filter: ClassListQuery,
}

pub struct ListClassesHandler {
    classes: Arc<dyn ClassReader>,
}

impl ListClassesHandler {
    pub fn new(classes: Arc<dyn ClassReader>) -> Self {
        Self { classes }
    }

    pub async fn handle(&self, query: ListClassesQuery) -> Result<ClassPage, ClassSessionError> {
        if query.filter.page == 0 {
            return Err(ClassSessionError::validation("page", "must be at least 1"));
        }
        if query.filter.limit == 0 || query.filter.limit > MAX_LIMIT {
            return Err(ClassSessionError::validation(
                "limit",
                format!("must be between 1 and {}", MAX_LIMIT),
            ));
        }
        Ok(self
            .classes
            .list_classes(&query.filter, &query.requester)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::class_session::test_support::{
        class_id, student_id, Harness,
    };
    use crate::domain::foundation::Timestamp;
    use crate::ports::SessionStatus;

    #[tokio::test]
    async fn lists_classes_with_upcoming_sessions() {
        let h = Harness::new();
        h.seed_class().await;
        let session = h.seed_session(Timestamp::now().add_days(1), 60).await;
        let handler = ListClassesHandler::new(h.projection.clone());

        let page = handler
            .handle(ListClassesQuery {
                requester: Requester::student(student_id()),
                filter: ClassListQuery {
                    statuses: vec![SessionStatus::Scheduled],
                    ..Default::default()
                },
            })
            .await
            .unwrap();

        assert_eq!(page.total_count, 1);
        assert_eq!(page.results[0].class.class_id, class_id());
        assert_eq!(page.results[0].sessions[0].id, session.id());
    }

    #[tokio::test]
    async fn finished_class_is_not_scheduled() {
        let h = Harness::new();
        h.seed_class().await;
        h.seed_session(Timestamp::now().add_days(-1), 60).await;
        let handler = ListClassesHandler::new(h.projection.clone());

        let page = handler
            .handle(ListClassesQuery {
                requester: Requester::student(student_id()),
                filter: ClassListQuery {
                    statuses: vec![SessionStatus::Scheduled],
                    ..Default::default()
                },
            })
            .await
            .unwrap();

        assert_eq!(page.total_count, 0);
    }

    #[tokio::test]
    async fn page_zero_is_rejected() {
        let h = Harness::new();
        let handler = ListClassesHandler::new(h.projection.clone());

        let result = handler
            .handle(ListClassesQuery {
                requester: Requester::student(student_id()),
                filter: ClassListQuery {
                    page: 0,
                    ..Default::default()
                },
            })
            .await;

        assert!(matches!(
            result,
            Err(ClassSessionError::ValidationFailed { ref field, .. }) if field == "page"
        ));
    }
}
