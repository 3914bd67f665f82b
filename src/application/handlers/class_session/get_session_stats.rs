//! GetSessionStatsHandler - Query handler for the session counts of a class.

use std::sync::Arc;

use crate::domain::class::Requester;
use crate::domain::class_session::ClassSessionError;
use crate::domain::foundation::ClassId;
use crate::ports::{ClassSessionReader, SessionStats};

#[derive(Debug, Clone)]
pub struct GetSessionStatsQuery {
    pub class_id: ClassId,
    pub requester: Requester,
}

pub struct GetSessionStatsHandler {
    reader: Arc<dyn ClassSessionReader>,
}

impl GetSessionStatsHandler {
    pub fn new(reader: Arc<dyn ClassSessionReader>) -> Self {
        Self { reader }
    }

    pub async fn handle(
        &self,
        query: GetSessionStatsQuery,
    ) -> Result<SessionStats, ClassSessionError> {
        Ok(self
            .reader
            .stats_for_class(&query.class_id, &query.requester)
            .await?)
    }
}
