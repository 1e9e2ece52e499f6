//! Shared application state for all routes. The catalog is reloadable; the session is the designer's working draft.

use crate::backend::ReportBackend;
use crate::config::Catalog;
use crate::designer::DesignerSession;
use crate::error::AppError;
use crate::service::PreviewTracker;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn ReportBackend>,
    pub catalog: Arc<RwLock<Catalog>>,
    pub session: Arc<RwLock<DesignerSession>>,
    pub previews: Arc<PreviewTracker>,
    pub default_page_size: u32,
}

impl AppState {
    pub fn new(backend: Arc<dyn ReportBackend>, catalog: Catalog, default_page_size: u32) -> Self {
        AppState {
            backend,
            catalog: Arc::new(RwLock::new(catalog)),
            session: Arc::new(RwLock::new(DesignerSession::new("Untitled report"))),
            previews: Arc::new(PreviewTracker::new()),
            default_page_size,
        }
    }

    pub fn catalog(&self) -> Result<RwLockReadGuard<'_, Catalog>, AppError> {
        self.catalog.read().map_err(|_| AppError::StateLock)
    }

    pub fn session(&self) -> Result<RwLockReadGuard<'_, DesignerSession>, AppError> {
        self.session.read().map_err(|_| AppError::StateLock)
    }

    pub fn session_mut(&self) -> Result<RwLockWriteGuard<'_, DesignerSession>, AppError> {
        self.session.write().map_err(|_| AppError::StateLock)
    }
}
