//! Report config validation: referential integrity between sources, joins and fields.

use crate::config::ReportConfig;
use crate::error::ConfigError;
use crate::naming::is_source_id;
use std::collections::HashSet;

pub fn validate(config: &ReportConfig) -> Result<(), ConfigError> {
    let mut source_ids: HashSet<&str> = HashSet::new();
    for id in &config.data_sources {
        if !is_source_id(id) {
            return Err(ConfigError::InvalidIdentifier(id.clone()));
        }
        if !source_ids.insert(id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "data source '{}' selected twice",
                id
            )));
        }
    }

    if let Some(primary) = &config.data_source {
        if !source_ids.contains(primary.as_str()) {
            return Err(ConfigError::MissingReference {
                kind: "data source",
                id: primary.clone(),
            });
        }
    }

    for join in &config.joins {
        if !source_ids.contains(join.left_data_source_id.as_str())
            || !source_ids.contains(join.right_data_source_id.as_str())
        {
            return Err(ConfigError::MissingReference {
                kind: "join",
                id: join.id.clone(),
            });
        }
        for name in [&join.left_field_name, &join.right_field_name] {
            if name.is_empty() {
                return Err(ConfigError::InvalidIdentifier(name.clone()));
            }
        }
    }

    let mut names = HashSet::new();
    let mut orders = HashSet::new();
    for field in &config.fields {
        if !source_ids.contains(field.source_id()) {
            return Err(ConfigError::MissingReference {
                kind: "field",
                id: field.id.clone(),
            });
        }
        if field.field_name.is_empty() {
            return Err(ConfigError::InvalidIdentifier(field.field_name.clone()));
        }
        if !names.insert(field.request_name()) {
            return Err(ConfigError::DuplicateField(field.request_name().to_string()));
        }
        if !orders.insert(field.display_order) {
            return Err(ConfigError::DuplicateDisplayOrder {
                order: field.display_order,
                field_id: field.id.clone(),
            });
        }
    }

    Ok(())
}
