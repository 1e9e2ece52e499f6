//! Report designer: multi-datasource join/field configuration and preview query assembly
//! for the HR reporting backend.

pub mod backend;
pub mod config;
pub mod designer;
pub mod error;
pub mod handlers;
pub mod naming;
pub mod query;
pub mod response;
pub mod routes;
pub mod service;
pub mod settings;
pub mod state;

pub use backend::{BackendConfig, HttpBackend, ReportBackend};
pub use config::{load_catalog, resolve, validate, Catalog, ReportConfig};
pub use designer::{DesignerSession, FieldOutcome, JoinOutcome, JoinSuggestion};
pub use error::{AppError, ConfigError};
pub use query::{assemble_preview, render_sql, PreviewOptions, PreviewRequest, PreviewResponse};
pub use routes::{app, common_routes, designer_routes};
pub use service::{PreviewOutcome, PreviewService, PreviewTracker, TemplateService};
pub use settings::Settings;
pub use state::AppState;
