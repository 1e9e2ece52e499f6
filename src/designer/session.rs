//! Designer session: the selected data sources plus their joins and fields, mutated as one unit.

use crate::config::{validate, Catalog, DataSourceJoin, FieldItem, ReportConfig, ReportField, ReportFieldPatch};
use crate::designer::{FieldOutcome, FieldSet, JoinOutcome, JoinSet, JoinSuggestion};
use crate::error::{AppError, ConfigError};
use crate::query::{assemble_preview, Filters, PreviewOptions, PreviewRequest, SortSpec};
use serde::Serialize;

/// What a source removal cascaded into.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SourceRemoval {
    pub joins_removed: usize,
    pub fields_removed: usize,
}

#[derive(Clone, Debug, Default)]
pub struct DesignerSession {
    pub title: String,
    selected: Vec<String>,
    primary: Option<String>,
    joins: JoinSet,
    fields: FieldSet,
    pub filters: Option<Filters>,
    pub sorting: Option<Vec<SortSpec>>,
}

impl DesignerSession {
    pub fn new(title: impl Into<String>) -> Self {
        DesignerSession {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Restore a session from a stored report config after validating it.
    pub fn from_report_config(config: ReportConfig) -> Result<Self, ConfigError> {
        validate(&config)?;
        let joins = JoinSet::from_joins(config.joins, &config.data_sources);
        Ok(DesignerSession {
            title: config.title,
            primary: config.data_source.or_else(|| config.data_sources.first().cloned()),
            selected: config.data_sources,
            joins,
            fields: FieldSet::from_fields(config.fields),
            filters: config.filters,
            sorting: config.sorting,
        })
    }

    pub fn to_report_config(&self) -> ReportConfig {
        ReportConfig {
            title: self.title.clone(),
            data_source: self.primary.clone(),
            data_sources: self.selected.clone(),
            joins: self.joins.joins().to_vec(),
            fields: self.fields.fields().to_vec(),
            filters: self.filters.clone(),
            sorting: self.sorting.clone(),
        }
    }

    pub fn selected_sources(&self) -> &[String] {
        &self.selected
    }

    pub fn primary_source(&self) -> Option<&str> {
        self.primary.as_deref()
    }

    pub fn joins(&self) -> &JoinSet {
        &self.joins
    }

    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    pub fn is_multi_source(&self) -> bool {
        self.selected.len() > 1
    }

    /// Add a catalog source to the selection. Returns false when already selected.
    pub fn select_source(&mut self, catalog: &Catalog, id: &str) -> Result<bool, AppError> {
        if !catalog.contains(id) {
            return Err(AppError::NotFound(format!("data source {}", id)));
        }
        if self.selected.iter().any(|s| s == id) {
            return Ok(false);
        }
        self.selected.push(id.to_string());
        if self.primary.is_none() {
            self.primary = Some(id.to_string());
        }
        tracing::info!(data_source = %id, selected = self.selected.len(), "data source selected");
        Ok(true)
    }

    /// Remove a source together with every join and field that references it.
    /// Unknown ids remove nothing.
    pub fn remove_source(&mut self, id: &str) -> SourceRemoval {
        let before = self.selected.len();
        self.selected.retain(|s| s != id);
        if before == self.selected.len() {
            return SourceRemoval::default();
        }
        if self.primary.as_deref() == Some(id) {
            self.primary = self.selected.first().cloned();
        }
        let removal = SourceRemoval {
            joins_removed: self.joins.retain_sources(&self.selected),
            fields_removed: self.fields.retain_sources(&self.selected),
        };
        tracing::info!(
            data_source = %id,
            joins_removed = removal.joins_removed,
            fields_removed = removal.fields_removed,
            "data source removed"
        );
        removal
    }

    pub fn add_join(&mut self, candidate: DataSourceJoin) -> JoinOutcome {
        self.joins.add_join(candidate, &self.selected)
    }

    pub fn remove_join(&mut self, id: &str) -> bool {
        self.joins.remove_join(id)
    }

    pub fn join_suggestions(&self, catalog: &Catalog) -> Vec<JoinSuggestion> {
        self.joins.auto_detect_joins(&self.selected, catalog)
    }

    pub fn accept_suggestion(&mut self, suggestion: JoinSuggestion) -> JoinOutcome {
        self.joins.accept_suggestion(suggestion, &self.selected)
    }

    /// Add a catalog field by qualified name (`"employees.name"`).
    pub fn add_field(&mut self, catalog: &Catalog, qualified: &str) -> Result<FieldOutcome, AppError> {
        let item = catalog
            .field(qualified)
            .ok_or_else(|| AppError::NotFound(format!("field {}", qualified)))?
            .clone();
        self.add_field_item(&item)
    }

    pub fn add_field_item(&mut self, item: &FieldItem) -> Result<FieldOutcome, AppError> {
        if !self.selected.iter().any(|s| *s == item.source_data_source_id) {
            return Err(AppError::Validation(format!(
                "data source {} is not selected",
                item.source_data_source_id
            )));
        }
        let multi = self.is_multi_source();
        Ok(self.fields.add_field(item, multi))
    }

    pub fn update_field(&mut self, id: &str, patch: ReportFieldPatch) -> Result<&ReportField, AppError> {
        self.fields.update_field(id, patch)
    }

    pub fn remove_field(&mut self, id: &str) -> bool {
        self.fields.remove_field(id)
    }

    pub fn reorder_fields(&mut self, ids: &[String]) {
        self.fields.reorder(ids)
    }

    pub fn discard_default_fields(&mut self) -> usize {
        self.fields.discard_defaults()
    }

    pub fn assemble_preview(&mut self, options: &PreviewOptions) -> Result<PreviewRequest, AppError> {
        assemble_preview(&self.selected, &self.joins, &mut self.fields, options)
    }
}
