//! Load the data-source catalog from the reporting backend and resolve it.

use crate::backend::ReportBackend;
use crate::config::{Catalog, DataSource};
use crate::error::{AppError, ConfigError};
use crate::naming::{is_source_id, qualified_name};
use std::collections::HashSet;

/// Check ids and field names for presence and uniqueness, then fill `source_data_source_id` and `qualified_name` on every field.
pub fn resolve(mut sources: Vec<DataSource>) -> Result<Catalog, ConfigError> {
    let mut seen = HashSet::new();
    for source in &mut sources {
        if !is_source_id(&source.id) {
            return Err(ConfigError::InvalidIdentifier(source.id.clone()));
        }
        if !seen.insert(source.id.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate data source id '{}'",
                source.id
            )));
        }
        let mut field_names = HashSet::new();
        for field in &mut source.fields {
            if field.field_name.is_empty() {
                return Err(ConfigError::InvalidIdentifier(format!(
                    "{}.{}",
                    source.id, field.field_name
                )));
            }
            if !field_names.insert(field.field_name.clone()) {
                return Err(ConfigError::DuplicateField(qualified_name(
                    &source.id,
                    &field.field_name,
                )));
            }
            field.source_data_source_id = source.id.clone();
            field.qualified_name = qualified_name(&source.id, &field.field_name);
        }
    }
    Ok(Catalog::from_sources(sources))
}

/// Fetch every data source (with fields) from the backend and resolve them.
pub async fn load_catalog(backend: &dyn ReportBackend) -> Result<Catalog, AppError> {
    let sources = backend.list_data_sources().await?;
    tracing::debug!(count = sources.len(), "loaded data sources");
    Ok(resolve(sources)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DataSourceType, FieldItem, FieldType};

    fn source(id: &str, fields: &[&str]) -> DataSource {
        DataSource {
            id: id.into(),
            name: id.into(),
            type_: DataSourceType::Table,
            schema: None,
            description: None,
            fields: fields
                .iter()
                .map(|f| FieldItem {
                    source_data_source_id: String::new(),
                    qualified_name: String::new(),
                    ..FieldItem::new("", f, FieldType::String)
                })
                .collect(),
        }
    }

    #[test]
    fn fills_qualified_names() {
        let catalog = resolve(vec![source("employees", &["id", "name"])]).unwrap();
        let field = catalog.field("employees.name").unwrap();
        assert_eq!(field.qualified_name, "employees.name");
        assert_eq!(field.source_data_source_id, "employees");
        assert!(catalog.field("employees.salary").is_none());
    }

    #[test]
    fn rejects_duplicate_sources() {
        let err = resolve(vec![source("employees", &[]), source("employees", &[])]).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn accepts_numeric_ids_and_unicode_columns() {
        let catalog = resolve(vec![
            source("employees", &["id"]),
            source("12", &["name", "salário base"]),
        ])
        .unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.field("12.name").unwrap().source_data_source_id, "12");
        assert!(catalog.field("12.salário base").is_some());
    }

    #[test]
    fn rejects_empty_or_dotted_names() {
        let err = resolve(vec![source("employees", &[""])]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidIdentifier(_)));
        let err = resolve(vec![source("hr.employees", &["id"])]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidIdentifier(_)));
    }

    #[test]
    fn rejects_duplicate_fields() {
        let err = resolve(vec![source("employees", &["id", "id"])]).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateField(ref q) if q == "employees.id"));
    }
}
