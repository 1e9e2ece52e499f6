//! Reporting backend: the external service that owns catalogs, templates and query execution.

mod http;

pub use http::*;

use crate::config::{DataSource, ReportTemplate};
use crate::error::AppError;
use crate::query::{PreviewRequest, PreviewResponse};
use async_trait::async_trait;

pub const PREVIEW_MULTI_PATH: &str = "/reports/data-sources/preview-multi";
pub const DATA_SOURCES_PATH: &str = "/reports/data-sources";
pub const TEMPLATES_PATH: &str = "/reports/templates";

#[async_trait]
pub trait ReportBackend: Send + Sync {
    async fn list_data_sources(&self) -> Result<Vec<DataSource>, AppError>;

    async fn get_data_source(&self, id: &str) -> Result<DataSource, AppError>;

    /// Run a preview query. One call per user action; no retries.
    async fn preview(&self, request: &PreviewRequest) -> Result<PreviewResponse, AppError>;

    async fn list_templates(&self) -> Result<Vec<ReportTemplate>, AppError>;

    async fn get_template(&self, id: &str) -> Result<ReportTemplate, AppError>;

    async fn create_template(&self, template: &ReportTemplate) -> Result<ReportTemplate, AppError>;

    async fn update_template(&self, id: &str, template: &ReportTemplate) -> Result<ReportTemplate, AppError>;

    async fn delete_template(&self, id: &str) -> Result<(), AppError>;
}
