//! Designer server: hosts one report-designer session in front of the HR reporting backend.
//!
//! Run from repo root: `cargo run -p designer-server`
//! Configure with BACKEND_URL, BIND_ADDR, BACKEND_TIMEOUT_SECS, BACKEND_TOKEN, DEFAULT_PAGE_SIZE, BODY_LIMIT_BYTES.

use report_designer::{app, load_catalog, AppState, Catalog, HttpBackend, ReportBackend, Settings};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("report_designer=info,designer_server=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    let backend: Arc<dyn ReportBackend> = Arc::new(HttpBackend::new(settings.backend.clone())?);

    // The backend may come up after us; start with an empty catalog and let POST /catalog/reload retry.
    let catalog = match load_catalog(backend.as_ref()).await {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::warn!(error = %e, backend = %settings.backend.base_url, "catalog unavailable at startup");
            Catalog::default()
        }
    };
    tracing::info!(data_sources = catalog.len(), "catalog loaded");

    let state = AppState::new(backend, catalog, settings.default_page_size);
    let router = app(state, settings.body_limit_bytes);

    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("designer server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}
