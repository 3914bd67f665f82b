//! Class session command, query and inbound event handlers.
//!
//! Every write runs under the session lock, commits, releases the lock and
//! only then publishes.

mod apply_default_address;
mod apply_verification_result;
mod create_class_sessions;
mod delete_class_session;
mod delete_material;
mod get_class_session;
mod get_session_stats;
mod list_class_sessions;
mod update_class_session;

#[cfg(test)]
pub(crate) mod test_support;

pub use apply_default_address::{ApplyDefaultAddressHandler, DefaultAddressListener};
pub use apply_verification_result::{
    ApplyVerificationResultCommand, ApplyVerificationResultHandler, VerificationOutcome,
    VerificationResultListener,
};
pub use create_class_sessions::{
    BatchFailure, CreateClassSessionsCommand, CreateClassSessionsHandler,
    CreateClassSessionsResult,
};
pub use delete_class_session::{DeleteClassSessionCommand, DeleteClassSessionHandler};
pub use delete_material::{DeleteMaterialCommand, DeleteMaterialHandler};
pub use get_class_session::{GetClassSessionHandler, GetClassSessionQuery};
pub use get_session_stats::{GetSessionStatsHandler, GetSessionStatsQuery};
pub use list_class_sessions::{ListClassSessionsHandler, ListClassSessionsQuery};
pub use update_class_session::{UpdateClassSessionCommand, UpdateClassSessionHandler};

use tracing::{error, warn};

use crate::domain::class_session::{ClassSession, ClassSessionError};
use crate::domain::foundation::{FileId, UserId};
use crate::ports::{ClassReader, FileStorage};

/// Only the tutor of record of the session's class may change it.
async fn authorize_tutor(
    classes: &dyn ClassReader,
    session: &ClassSession,
    requester: &UserId,
) -> Result<(), ClassSessionError> {
    let class = classes
        .get_class(session.class_id())
        .await?
        .ok_or_else(|| ClassSessionError::class_not_found(session.class_id().clone()))?;
    if !class.is_tutored_by(requester) {
        warn!(
            class_session_id = %session.id(),
            requester = %requester,
            "requester is not the tutor of record"
        );
        return Err(ClassSessionError::forbidden());
    }
    Ok(())
}

/// Deletes files uploaded for a change that was never recorded.
async fn discard_uploads(files: &dyn FileStorage, ids: &[FileId]) {
    if ids.is_empty() {
        return;
    }
    if let Err(e) = files.delete_multiple_files(ids).await {
        error!(files = ids.len(), error = %e, "failed to delete uploads of an unrecorded change");
    }
}
