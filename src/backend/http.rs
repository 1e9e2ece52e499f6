//! reqwest implementation of [`ReportBackend`].

use super::{ReportBackend, DATA_SOURCES_PATH, PREVIEW_MULTI_PATH, TEMPLATES_PATH};
use crate::config::{DataSource, ReportTemplate};
use crate::error::AppError;
use crate::query::{PreviewRequest, PreviewResponse};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct BackendConfig {
    /// Base URL including the API prefix, e.g. `http://localhost:8000/api/v1`.
    pub base_url: String,
    pub timeout: Duration,
    /// Sent as `Authorization: Bearer ...` when set.
    pub token: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig {
            base_url: "http://localhost:8000/api/v1".into(),
            timeout: Duration::from_secs(30),
            token: None,
        }
    }
}

pub struct HttpBackend {
    client: Client,
    config: BackendConfig,
}

impl HttpBackend {
    pub fn new(config: BackendConfig) -> Result<Self, AppError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(HttpBackend { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        tracing::debug!(%method, url = %url, "backend request");
        let builder = self.client.request(method, url);
        match &self.config.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(builder: RequestBuilder) -> Result<Response, AppError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let detail = error_detail(&body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });
        tracing::warn!(status = status.as_u16(), detail = %detail, "backend error");
        Err(AppError::Backend {
            status: status.as_u16(),
            detail,
        })
    }

    async fn json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, AppError> {
        let response = Self::send(builder).await?;
        Ok(response.json().await?)
    }
}

/// Pull the human-readable message out of `{"detail": ...}`. Non-string details are rendered as JSON.
pub fn error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

#[async_trait]
impl ReportBackend for HttpBackend {
    async fn list_data_sources(&self) -> Result<Vec<DataSource>, AppError> {
        Self::json(self.request(Method::GET, DATA_SOURCES_PATH)).await
    }

    async fn get_data_source(&self, id: &str) -> Result<DataSource, AppError> {
        let path = format!("{}/{}", DATA_SOURCES_PATH, id);
        Self::json(self.request(Method::GET, &path)).await
    }

    async fn preview(&self, request: &PreviewRequest) -> Result<PreviewResponse, AppError> {
        let response: PreviewResponse =
            Self::json(self.request(Method::POST, PREVIEW_MULTI_PATH).json(request)).await?;
        tracing::info!(
            rows = response.data.len(),
            total_count = response.total_count,
            success = response.success,
            "preview returned"
        );
        Ok(response)
    }

    async fn list_templates(&self) -> Result<Vec<ReportTemplate>, AppError> {
        Self::json(self.request(Method::GET, TEMPLATES_PATH)).await
    }

    async fn get_template(&self, id: &str) -> Result<ReportTemplate, AppError> {
        let path = format!("{}/{}", TEMPLATES_PATH, id);
        Self::json(self.request(Method::GET, &path)).await
    }

    async fn create_template(&self, template: &ReportTemplate) -> Result<ReportTemplate, AppError> {
        Self::json(self.request(Method::POST, TEMPLATES_PATH).json(template)).await
    }

    async fn update_template(&self, id: &str, template: &ReportTemplate) -> Result<ReportTemplate, AppError> {
        let path = format!("{}/{}", TEMPLATES_PATH, id);
        Self::json(self.request(Method::PUT, &path).json(template)).await
    }

    async fn delete_template(&self, id: &str) -> Result<(), AppError> {
        let path = format!("{}/{}", TEMPLATES_PATH, id);
        Self::send(self.request(Method::DELETE, &path)).await?;
        Ok(())
    }
}
