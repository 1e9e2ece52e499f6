//! Designer session handlers: source selection, joins, fields and preview.

use crate::config::{DataSourceJoin, ReportFieldPatch};
use crate::designer::{FieldOutcome, JoinOutcome, JoinSuggestion};
use crate::error::AppError;
use crate::query::{render_sql, Filters, Pagination, PreviewOptions, SortSpec};
use crate::response::{success_many, success_one, success_one_ok, success_with_notice, Notice};
use crate::service::PreviewService;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Deserialize)]
pub struct TitleBody {
    pub title: String,
}

#[derive(Deserialize)]
pub struct SelectSourceBody {
    pub id: String,
}

#[derive(Deserialize)]
pub struct AddFieldBody {
    pub qualified_name: String,
}

#[derive(Deserialize)]
pub struct ReorderBody {
    pub ids: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PreviewBody {
    /// 1-based page number.
    #[serde(default)]
    pub current: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
    #[serde(default)]
    pub filters: Option<Filters>,
    #[serde(default)]
    pub sorter: Option<SortSpec>,
}

impl PreviewBody {
    fn options(self, default_page_size: u32) -> PreviewOptions {
        PreviewOptions {
            pagination: Pagination::from_page(
                self.current.unwrap_or(1),
                self.page_size.unwrap_or(default_page_size),
            ),
            filters: self.filters,
            sorter: self.sorter,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SqlQuery {
    #[serde(default)]
    pub current: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

pub async fn get_session(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let config = state.session()?.to_report_config();
    Ok(success_one_ok(config))
}

pub async fn set_title(
    State(state): State<AppState>,
    Json(body): Json<TitleBody>,
) -> Result<impl IntoResponse, AppError> {
    let mut session = state.session_mut()?;
    session.title = body.title;
    Ok(success_one_ok(session.to_report_config()))
}

pub async fn select_source(
    State(state): State<AppState>,
    Json(body): Json<SelectSourceBody>,
) -> Result<impl IntoResponse, AppError> {
    let catalog = state.catalog()?;
    let mut session = state.session_mut()?;
    let added = session.select_source(&catalog, &body.id)?;
    let selected = session.selected_sources().to_vec();
    Ok(if added {
        success_one(selected)
    } else {
        success_with_notice(selected, Notice::AlreadySelected)
    })
}

pub async fn remove_source(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let mut session = state.session_mut()?;
    let was_selected = session.selected_sources().iter().any(|s| *s == id);
    let removal = session.remove_source(&id);
    Ok(if was_selected {
        success_one_ok(removal)
    } else {
        success_with_notice(removal, Notice::NotFound)
    })
}

fn join_response(
    outcome: JoinOutcome,
    joins: &[DataSourceJoin],
) -> Result<(axum::http::StatusCode, Json<crate::response::SuccessOne<Value>>), AppError> {
    let find = |id: &str| joins.iter().find(|j| j.id == id).cloned();
    Ok(match outcome {
        JoinOutcome::Added(id) => success_one(serde_json::to_value(find(&id))?),
        JoinOutcome::AlreadyConfigured(id) => {
            success_with_notice(serde_json::to_value(find(&id))?, Notice::AlreadyConfigured)
        }
        JoinOutcome::Rejected { missing } => {
            success_with_notice(json!({ "missing_data_source": missing }), Notice::Rejected)
        }
    })
}

pub async fn add_join(
    State(state): State<AppState>,
    Json(candidate): Json<DataSourceJoin>,
) -> Result<impl IntoResponse, AppError> {
    let mut session = state.session_mut()?;
    let outcome = session.add_join(candidate);
    join_response(outcome, session.joins().joins())
}

pub async fn remove_join(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let removed = state.session_mut()?.remove_join(&id);
    let body = json!({ "removed": removed });
    Ok(if removed {
        success_one_ok(body)
    } else {
        success_with_notice(body, Notice::NotFound)
    })
}

pub async fn join_suggestions(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let catalog = state.catalog()?;
    let suggestions = state.session()?.join_suggestions(&catalog);
    Ok(success_many(suggestions))
}

pub async fn accept_suggestion(
    State(state): State<AppState>,
    Json(suggestion): Json<JoinSuggestion>,
) -> Result<impl IntoResponse, AppError> {
    let mut session = state.session_mut()?;
    let outcome = session.accept_suggestion(suggestion);
    join_response(outcome, session.joins().joins())
}

pub async fn add_field(
    State(state): State<AppState>,
    Json(body): Json<AddFieldBody>,
) -> Result<impl IntoResponse, AppError> {
    let catalog = state.catalog()?;
    let mut session = state.session_mut()?;
    Ok(match session.add_field(&catalog, &body.qualified_name)? {
        FieldOutcome::Added(id) => success_one(serde_json::to_value(session.fields().get(&id))?),
        FieldOutcome::Duplicate(key) => success_with_notice(json!({ "key": key }), Notice::AlreadyConfigured),
    })
}

pub async fn update_field(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<ReportFieldPatch>,
) -> Result<impl IntoResponse, AppError> {
    let mut session = state.session_mut()?;
    let field = session.update_field(&id, patch)?.clone();
    Ok(success_one_ok(field))
}

pub async fn remove_field(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let removed = state.session_mut()?.remove_field(&id);
    let body = json!({ "removed": removed });
    Ok(if removed {
        success_one_ok(body)
    } else {
        success_with_notice(body, Notice::NotFound)
    })
}

pub async fn reorder_fields(
    State(state): State<AppState>,
    Json(body): Json<ReorderBody>,
) -> Result<impl IntoResponse, AppError> {
    let mut session = state.session_mut()?;
    session.reorder_fields(&body.ids);
    Ok(success_many(session.fields().fields().to_vec()))
}

pub async fn discard_default_fields(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let removed = state.session_mut()?.discard_default_fields();
    Ok(success_one_ok(json!({ "removed": removed })))
}

/// Assemble under the session lock, then call the backend with the lock released.
pub async fn preview(
    State(state): State<AppState>,
    body: Result<Json<PreviewBody>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    // A bodiless POST previews with default paging; a body that fails to parse is an error.
    let body = match body {
        Ok(Json(body)) => body,
        Err(JsonRejection::MissingJsonContentType(_)) => PreviewBody::default(),
        Err(rejection) => return Err(AppError::BadRequest(rejection.body_text())),
    };
    let options = body.options(state.default_page_size);
    let request = {
        let mut session = state.session_mut()?;
        session.assemble_preview(&options)?
    };
    let outcome = PreviewService::run(state.backend.as_ref(), &state.previews, &request).await?;
    Ok(success_one_ok(outcome))
}

/// SQL text for the preview pane. Assembled on a copy so defaults are not added to the session.
pub async fn preview_sql(
    State(state): State<AppState>,
    Query(query): Query<SqlQuery>,
) -> Result<impl IntoResponse, AppError> {
    let options = PreviewBody {
        current: query.current,
        page_size: query.page_size,
        ..Default::default()
    }
    .options(state.default_page_size);
    let mut draft = state.session()?.clone();
    let request = draft.assemble_preview(&options)?;
    let catalog = state.catalog()?;
    let sql = render_sql(&request, &catalog);
    tracing::debug!(sql = %sql, "sql preview");
    Ok(success_one_ok(json!({ "sql": sql, "request": request })))
}
