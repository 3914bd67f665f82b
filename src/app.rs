//! Application wiring.
//!
//! Builds the in-process adapters, the class session store and every handler
//! from an [`AppConfig`], then subscribes the inbound listeners to the bus.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::adapters::{InMemoryEventBus, InMemoryEventLog, InMemoryFileStorage, InMemoryReadProjection};
use crate::application::{
    ApplyDefaultAddressHandler, ApplyVerificationResultHandler, ClassDirectorySync,
    ClassSessionEventDispatcher, ClassSessionStore, CreateClassSessionsHandler,
    DefaultAddressListener, DeleteClassSessionHandler, DeleteMaterialHandler, GetClassHandler,
    GetClassSessionHandler, GetSessionStatsHandler, ListClassSessionsHandler, ListClassesHandler,
    LockRegistry, ReadProjectionSync,
    UpdateClassSessionHandler, VerificationResultListener,
};
use crate::config::{AppConfig, ValidationError};
use crate::ports::EventSubscriber;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ValidationError),
}

/// The class sessions service with all of its handlers.
pub struct ClassSessionsApp {
    pub bus: Arc<InMemoryEventBus>,
    pub event_log: Arc<InMemoryEventLog>,
    pub projection: Arc<InMemoryReadProjection>,
    pub files: Arc<InMemoryFileStorage>,
    pub store: Arc<ClassSessionStore>,
    pub locks: Arc<LockRegistry>,

    pub create: CreateClassSessionsHandler,
    pub update: UpdateClassSessionHandler,
    pub delete: DeleteClassSessionHandler,
    pub delete_material: DeleteMaterialHandler,
    pub get: GetClassSessionHandler,
    pub list: ListClassSessionsHandler,
    pub stats: GetSessionStatsHandler,
    pub get_class: GetClassHandler,
    pub list_classes: ListClassesHandler,
    pub verification: Arc<ApplyVerificationResultHandler>,
    pub default_address: Arc<ApplyDefaultAddressHandler>,
}

impl ClassSessionsApp {
    /// Wire the service from configuration.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when the scheduling settings are out of range.
    pub fn build(config: &AppConfig) -> Result<Self, AppError> {
        config.validate()?;
        let limits = config.scheduling.slot_limits();
        let recurrence = config.scheduling.recurrence_settings()?;

        let bus = Arc::new(InMemoryEventBus::new());
        let event_log = Arc::new(InMemoryEventLog::new());
        let projection = Arc::new(InMemoryReadProjection::new());
        let files = Arc::new(InMemoryFileStorage::new());

        let dispatcher = Arc::new(ClassSessionEventDispatcher::new(bus.clone()));
        let store = Arc::new(ClassSessionStore::new(event_log.clone(), dispatcher));
        let locks = Arc::new(LockRegistry::new(config.locking.acquire_timeout()));

        let verification = Arc::new(ApplyVerificationResultHandler::new(
            store.clone(),
            locks.clone(),
            files.clone(),
        ));
        let default_address = Arc::new(ApplyDefaultAddressHandler::new(
            store.clone(),
            locks.clone(),
        ));

        // Inbound events
        bus.subscribe_all(
            &VerificationResultListener::event_types(),
            Arc::new(VerificationResultListener::new(verification.clone())),
        );
        bus.subscribe(
            DefaultAddressListener::event_type(),
            Arc::new(DefaultAddressListener::new(default_address.clone())),
        );
        bus.subscribe_all(
            &ClassDirectorySync::event_types(),
            Arc::new(ClassDirectorySync::new(projection.clone())),
        );

        // Read side follows every committed session event
        bus.subscribe_all(
            &ReadProjectionSync::event_types(),
            Arc::new(ReadProjectionSync::new(store.clone(), projection.clone())),
        );

        let app = Self {
            create: CreateClassSessionsHandler::new(
                store.clone(),
                projection.clone(),
                files.clone(),
                limits,
                recurrence,
            ),
            update: UpdateClassSessionHandler::new(
                store.clone(),
                locks.clone(),
                projection.clone(),
                projection.clone(),
                files.clone(),
                limits,
            ),
            delete: DeleteClassSessionHandler::new(
                store.clone(),
                locks.clone(),
                projection.clone(),
                files.clone(),
            ),
            delete_material: DeleteMaterialHandler::new(
                store.clone(),
                locks.clone(),
                projection.clone(),
            ),
            get: GetClassSessionHandler::new(projection.clone(), projection.clone()),
            list: ListClassSessionsHandler::new(projection.clone()),
            stats: GetSessionStatsHandler::new(projection.clone()),
            get_class: GetClassHandler::new(projection.clone()),
            list_classes: ListClassesHandler::new(projection.clone()),
            verification,
            default_address,
            bus,
            event_log,
            projection,
            files,
            store,
            locks,
        };

        info!(
            environment = ?config.service.environment,
            lock_timeout_ms = config.locking.acquire_timeout_ms,
            "class sessions service wired"
        );
        Ok(app)
    }
}
