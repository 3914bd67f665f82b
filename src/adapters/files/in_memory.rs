//! In-memory file storage.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, FileId};
use crate::ports::{FileStorage, FileUpload, StoredFile};

/// Keeps uploaded files in memory and remembers deletions.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFileStorage {
    files: Arc<RwLock<HashMap<FileId, FileUpload>>>,
    deleted: Arc<RwLock<Vec<FileId>>>,
}

impl InMemoryFileStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, id: &FileId) -> bool {
        self.files.read().await.contains_key(id)
    }

    pub async fn file_count(&self) -> usize {
        self.files.read().await.len()
    }

    /// Every id passed to a delete call, in order.
    pub async fn deleted_ids(&self) -> Vec<FileId> {
        self.deleted.read().await.clone()
    }
}

#[async_trait]
impl FileStorage for InMemoryFileStorage {
    async fn upload_multiple_files(
        &self,
        files: Vec<FileUpload>,
    ) -> Result<Vec<StoredFile>, DomainError> {
        let mut stored_files = Vec::with_capacity(files.len());
        let mut store = self.files.write().await;
        for file in files {
            let id = FileId::new(Uuid::new_v4().simple().to_string())?;
            stored_files.push(StoredFile {
                id: id.clone(),
                file_name: file.file_name.clone(),
                description: file.description.clone(),
            });
            store.insert(id, file);
        }
        Ok(stored_files)
    }

    async fn delete_multiple_files(&self, ids: &[FileId]) -> Result<(), DomainError> {
        let mut store = self.files.write().await;
        for id in ids {
            store.remove(id);
        }
        self.deleted.write().await.extend(ids.iter().cloned());
        Ok(())
    }
}
