//! GetClassSessionHandler - Query handler for one session.

use std::sync::Arc;

use crate::domain::class::Requester;
use crate::domain::class_session::ClassSessionError;
use crate::domain::foundation::ClassSessionId;
use crate::ports::{ClassReader, ClassSessionReader, ClassSessionView};

#[derive(Debug, Clone)]
pub struct GetClassSessionQuery {
    pub class_session_id: ClassSessionId,
    pub requester: Requester,
}

pub struct GetClassSessionHandler {
    reader: Arc<dyn ClassSessionReader>,
    classes: Arc<dyn ClassReader>,
}

impl GetClassSessionHandler {
    pub fn new(reader: Arc<dyn ClassSessionReader>, classes: Arc<dyn ClassReader>) -> Self {
        Self { reader, classes }
    }

    pub async fn handle(
        &self,
        query: GetClassSessionQuery,
    ) -> Result<ClassSessionView, ClassSessionError> {
        let view = self
            .reader
            .get_by_id(query.class_session_id)
            .await?
            .ok_or_else(|| ClassSessionError::not_found(query.class_session_id))?;

        // Scoped like listing: only the class's student and tutor may look
        let visible = self
            .classes
            .get_class(&view.class_id)
            .await?
            .is_some_and(|class| class.is_visible_to(&query.requester));
        if !visible {
            return Err(ClassSessionError::forbidden());
        }

        Ok(view)
    }
}
