//! GetClassHandler - Query handler for one class record.

use std::sync::Arc;

use crate::domain::class::{ClassRecord, Requester};
use crate::domain::class_session::ClassSessionError;
use crate::domain::foundation::ClassId;
use crate::ports::ClassReader;

#[derive(Debug, Clone)]
pub struct GetClassQuery {
    pub class_id: ClassId,
    pub requester: Requester,
}

pub struct GetClassHandler {
    classes: Arc<dyn ClassReader>,
}

impl GetClassHandler {
    pub fn new(classes: Arc<dyn ClassReader>) -> Self {
        Self { classes }
    }

    pub async fn handle(&self, query: GetClassQuery) -> Result<ClassRecord, ClassSessionError> {
        let class = self
            .classes
            .get_class(&query.class_id)
            .await?
            .ok_or_else(|| ClassSessionError::class_not_found(query.class_id.clone()))?;
        if !class.is_visible_to(&query.requester) {
            return Err(ClassSessionError::forbidden());
        }
        Ok(class)
    }
}
