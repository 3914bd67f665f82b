//! ListClassSessionsHandler - Query handler for browsing sessions.

use std::sync::Arc;

use crate::domain::class::Requester;
use crate::domain::class_session::ClassSessionError;
use crate::ports::{ClassSessionPage, ClassSessionReader, ListQuery};

const MAX_LIMIT: u32 = 100;

/// Query for the sessions visible to a requester.
#[derive(Debug, Clone)]
pub struct ListClassSessionsQuery {
    pub requester: Requester,
    pub filter: ListQuery,
}

pub struct ListClassSessionsHandler {
    reader: Arc<dyn ClassSessionReader>,
}

impl ListClassSessionsHandler {
    pub fn new(reader: Arc<dyn ClassSessionReader>) -> Self {
        Self { reader }
    }

    pub async fn handle(
        &self,
        query: ListClassSessionsQuery,
    ) -> Result<ClassSessionPage, ClassSessionError> {
        if query.filter.page == 0 {
            return Err(ClassSessionError::validation("page", "must be at least 1"));
        }
        if query.filter.limit == 0 || query.filter.limit > MAX_LIMIT {
            return Err(ClassSessionError::validation(
                "limit",
                format!("must be between 1 and {}", MAX_LIMIT),
            ));
        }
        Ok(self.reader.list(&query.filter, &query.requester).await?)
    }
}
