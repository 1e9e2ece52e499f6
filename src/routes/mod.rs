//! Router assembly.

mod common;
mod designer;

pub use common::common_routes;
pub use designer::{catalog_routes, designer_routes, template_routes};

use crate::state::AppState;
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;

/// Every route, with request bodies capped at `body_limit` bytes.
pub fn app(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .merge(common_routes())
        .merge(designer_routes(state.clone()))
        .merge(catalog_routes(state.clone()))
        .merge(template_routes(state))
        .layer(RequestBodyLimitLayer::new(body_limit))
}
