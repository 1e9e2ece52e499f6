//! Designer session, catalog and template routes.
//! Static segments (`/fields/defaults`, `/joins/suggestions`) are matched before `/:id`.

use crate::handlers::catalog::{get_source, list_sources, reload};
use crate::handlers::designer::{
    accept_suggestion, add_field, add_join, discard_default_fields, get_session, join_suggestions, preview,
    preview_sql, remove_field, remove_join, remove_source, reorder_fields, select_source, set_title, update_field,
};
use crate::handlers::templates::{delete_template, list_templates, load_template, save_template};
use crate::state::AppState;
use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

pub fn designer_routes(state: AppState) -> Router {
    Router::new()
        .route("/designer", get(get_session))
        .route("/designer/title", put(set_title))
        .route("/designer/sources", post(select_source))
        .route("/designer/sources/:id", delete(remove_source))
        .route("/designer/joins", post(add_join))
        .route("/designer/joins/suggestions", get(join_suggestions))
        .route("/designer/joins/suggestions/accept", post(accept_suggestion))
        .route("/designer/joins/:id", delete(remove_join))
        .route("/designer/fields", post(add_field))
        .route("/designer/fields/order", put(reorder_fields))
        .route("/designer/fields/defaults", delete(discard_default_fields))
        .route("/designer/fields/:id", patch(update_field).delete(remove_field))
        .route("/designer/preview", post(preview))
        .route("/designer/sql", get(preview_sql))
        .with_state(state)
}

pub fn catalog_routes(state: AppState) -> Router {
    Router::new()
        .route("/catalog", get(list_sources))
        .route("/catalog/reload", post(reload))
        .route("/catalog/:id", get(get_source))
        .with_state(state)
}

pub fn template_routes(state: AppState) -> Router {
    Router::new()
        .route("/templates", get(list_templates).post(save_template))
        .route("/templates/:id", delete(delete_template))
        .route("/templates/:id/load", post(load_template))
        .with_state(state)
}
