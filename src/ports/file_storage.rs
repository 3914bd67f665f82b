//! File storage port - session materials live in the file service.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, FileId};

/// A file to upload as session material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: String,
    #[serde(default)]
    pub description: String,
    pub content: Vec<u8>,
}

/// An uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    pub id: FileId,
    pub file_name: String,
    pub description: String,
}

/// Port for the file service.
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Uploads files, returning them in input order.
    async fn upload_multiple_files(
        &self,
        files: Vec<FileUpload>,
    ) -> Result<Vec<StoredFile>, DomainError>;

    /// Deletes files; unknown ids are ignored.
    async fn delete_multiple_files(&self, ids: &[FileId]) -> Result<(), DomainError>;
}
