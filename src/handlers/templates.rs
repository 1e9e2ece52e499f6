//! Report template handlers: save the session to the backend and load it back.

use crate::error::AppError;
use crate::response::{success_many, success_one, success_one_ok};
use crate::service::TemplateService;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct SaveTemplateBody {
    /// Existing template to overwrite; omitted to create one.
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

pub async fn list_templates(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let templates = state.backend.list_templates().await?;
    Ok(success_many(templates))
}

pub async fn save_template(
    State(state): State<AppState>,
    Json(body): Json<SaveTemplateBody>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.session()?.clone();
    let saved = TemplateService::save(
        state.backend.as_ref(),
        &session,
        body.id.as_deref(),
        &body.name,
        body.description,
    )
    .await?;
    Ok(success_one(saved))
}

/// Replace the current session with a stored template.
pub async fn load_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let (template, session) = TemplateService::load(state.backend.as_ref(), &id).await?;
    *state.session_mut()? = session;
    Ok(success_one_ok(template))
}

pub async fn delete_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.backend.delete_template(&id).await?;
    Ok(success_one_ok(serde_json::json!({ "deleted": id })))
}
