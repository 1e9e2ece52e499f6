//! Save designer sessions as backend report templates and load them back.

use crate::backend::ReportBackend;
use crate::config::{validate, ReportTemplate};
use crate::designer::{is_default_field, DesignerSession};
use crate::error::AppError;

pub struct TemplateService;

impl TemplateService {
    /// Persist the session. Synthesized default fields are not saved.
    /// Creates a template when `id` is None, otherwise updates it.
    pub async fn save(
        backend: &dyn ReportBackend,
        session: &DesignerSession,
        id: Option<&str>,
        name: &str,
        description: Option<String>,
    ) -> Result<ReportTemplate, AppError> {
        if name.trim().is_empty() {
            return Err(AppError::Validation("template name is required".into()));
        }
        let mut config = session.to_report_config();
        config.fields.retain(|f| !is_default_field(f));
        validate(&config)?;
        let template = ReportTemplate {
            id: id.map(str::to_string),
            name: name.trim().to_string(),
            description,
            config,
            created_at: None,
            updated_at: None,
        };
        let saved = match id {
            Some(id) => backend.update_template(id, &template).await?,
            None => backend.create_template(&template).await?,
        };
        tracing::info!(template_id = ?saved.id, name = %saved.name, "template saved");
        Ok(saved)
    }

    pub async fn load(backend: &dyn ReportBackend, id: &str) -> Result<(ReportTemplate, DesignerSession), AppError> {
        let template = backend.get_template(id).await?;
        let session = DesignerSession::from_report_config(template.config.clone())?;
        tracing::info!(template_id = %id, "template loaded");
        Ok((template, session))
    }
}
