//! Data-source catalog handlers.

use crate::config::{load_catalog, resolve};
use crate::error::AppError;
use crate::response::{success_many, success_one_ok};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};

pub async fn list_sources(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let sources = state.catalog()?.sources.clone();
    Ok(success_many(sources))
}

/// Cached source, or the backend's copy when the catalog has not seen it yet.
/// A fetched source is added to the catalog so it can be selected afterwards.
pub async fn get_source(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let cached = state.catalog()?.source(&id).cloned();
    let source = match cached {
        Some(source) => source,
        None => {
            let fetched = state.backend.get_data_source(&id).await?;
            let source = resolve(vec![fetched])?
                .sources
                .pop()
                .ok_or_else(|| AppError::NotFound(format!("data source {}", id)))?;
            state
                .catalog
                .write()
                .map_err(|_| AppError::StateLock)?
                .insert(source.clone());
            tracing::info!(data_source = %source.id, "data source added to catalog");
            source
        }
    };
    Ok(success_one_ok(source))
}

/// Refetch the catalog from the backend. Selected sources that disappeared stay selected.
pub async fn reload(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let catalog = load_catalog(state.backend.as_ref()).await?;
    let count = catalog.len();
    *state.catalog.write().map_err(|_| AppError::StateLock)? = catalog;
    tracing::info!(count, "catalog reloaded");
    Ok(success_one_ok(serde_json::json!({ "count": count })))
}
