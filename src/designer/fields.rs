//! Field mapping: the ordered, deduplicated output columns of a report.

use crate::config::{FieldItem, FieldType, ReportField, ReportFieldPatch};
use crate::error::{AppError, ConfigError};
use crate::naming::{default_alias, qualified_name};

/// Id prefix marking fields synthesized by [`FieldSet::auto_populate_defaults`].
pub const DEFAULT_FIELD_PREFIX: &str = "default_";

const DEFAULT_FIELDS: [(&str, FieldType); 2] = [("id", FieldType::Number), ("name", FieldType::String)];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldOutcome {
    Added(String),
    /// A field with the same key is already present; the list is unchanged.
    Duplicate(String),
}

#[derive(Clone, Debug, Default)]
pub struct FieldSet {
    fields: Vec<ReportField>,
}

/// Dedup key: qualified in multi-source mode, bare otherwise.
fn field_key(source_id: &str, field_name: &str, multi_source: bool) -> String {
    if multi_source {
        qualified_name(source_id, field_name)
    } else {
        field_name.to_string()
    }
}

pub fn is_default_field(field: &ReportField) -> bool {
    field.id.starts_with(DEFAULT_FIELD_PREFIX)
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from stored fields, sorted by display order.
    pub fn from_fields(mut fields: Vec<ReportField>) -> Self {
        fields.sort_by_key(|f| f.display_order);
        FieldSet { fields }
    }

    pub fn fields(&self) -> &[ReportField] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ReportField> {
        self.fields.iter().find(|f| f.id == id)
    }

    fn contains_key(&self, key: &str, multi_source: bool) -> bool {
        self.fields
            .iter()
            .any(|f| field_key(f.source_id(), &f.field_name, multi_source) == key)
    }

    /// Equals the list length until a field is removed; never reuses an order.
    fn next_display_order(&self) -> u32 {
        self.fields
            .iter()
            .map(|f| f.display_order + 1)
            .max()
            .unwrap_or(0)
            .max(self.fields.len() as u32)
    }

    pub fn add_field(&mut self, item: &FieldItem, multi_source: bool) -> FieldOutcome {
        let key = field_key(&item.source_data_source_id, &item.field_name, multi_source);
        if self.contains_key(&key, multi_source) {
            tracing::debug!(field = %key, "field already added");
            return FieldOutcome::Duplicate(key);
        }
        let id = uuid::Uuid::new_v4().to_string();
        let field = ReportField {
            id: id.clone(),
            field_name: item.field_name.clone(),
            field_alias: item
                .field_alias
                .clone()
                .unwrap_or_else(|| default_alias(&item.field_name)),
            data_source: item.source_data_source_id.clone(),
            field_type: item.field_type,
            display_order: self.next_display_order(),
            is_visible: true,
            is_sortable: true,
            is_filterable: true,
            width: None,
            formatting_config: None,
            qualified_field_name: Some(qualified_name(&item.source_data_source_id, &item.field_name)),
            source_data_source_id: Some(item.source_data_source_id.clone()),
        };
        tracing::info!(field = %key, display_order = field.display_order, "field added");
        self.fields.push(field);
        FieldOutcome::Added(id)
    }

    pub fn update_field(&mut self, id: &str, patch: ReportFieldPatch) -> Result<&ReportField, AppError> {
        if let Some(order) = patch.display_order {
            if self.fields.iter().any(|f| f.id != id && f.display_order == order) {
                return Err(ConfigError::DuplicateDisplayOrder {
                    order,
                    field_id: id.to_string(),
                }
                .into());
            }
        }
        let field = self
            .fields
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| AppError::NotFound(format!("field {}", id)))?;
        if let Some(alias) = patch.field_alias {
            field.field_alias = alias;
        }
        if let Some(order) = patch.display_order {
            field.display_order = order;
        }
        if let Some(v) = patch.is_visible {
            field.is_visible = v;
        }
        if let Some(v) = patch.is_sortable {
            field.is_sortable = v;
        }
        if let Some(v) = patch.is_filterable {
            field.is_filterable = v;
        }
        if patch.width.is_some() {
            field.width = patch.width;
        }
        if patch.formatting_config.is_some() {
            field.formatting_config = patch.formatting_config;
        }
        self.fields.sort_by_key(|f| f.display_order);
        self.get(id)
            .ok_or_else(|| AppError::NotFound(format!("field {}", id)))
    }

    /// Remove by id. Remaining fields keep their display orders.
    pub fn remove_field(&mut self, id: &str) -> bool {
        let before = self.fields.len();
        self.fields.retain(|f| f.id != id);
        before != self.fields.len()
    }

    /// Renumber to `0..N` following `ids`; fields not listed keep their relative order after them.
    pub fn reorder(&mut self, ids: &[String]) {
        let rank = |f: &ReportField| {
            ids.iter()
                .position(|id| *id == f.id)
                .unwrap_or(ids.len())
        };
        self.fields.sort_by_key(|f| (rank(f), f.display_order));
        for (i, f) in self.fields.iter_mut().enumerate() {
            f.display_order = i as u32;
        }
    }

    /// Add `id` and `name` for each source so a joined preview has columns. Returns how many were added.
    pub fn auto_populate_defaults(&mut self, source_ids: &[String]) -> usize {
        let mut added = 0;
        for source_id in source_ids {
            for (name, field_type) in DEFAULT_FIELDS {
                if self.contains_key(&qualified_name(source_id, name), true) {
                    continue;
                }
                let field = ReportField {
                    id: format!("{}{}_{}", DEFAULT_FIELD_PREFIX, source_id, name),
                    field_name: name.to_string(),
                    field_alias: format!("{} {}", source_id, default_alias(name)),
                    data_source: source_id.clone(),
                    field_type,
                    display_order: self.next_display_order(),
                    is_visible: true,
                    is_sortable: true,
                    is_filterable: true,
                    width: None,
                    formatting_config: None,
                    qualified_field_name: Some(qualified_name(source_id, name)),
                    source_data_source_id: Some(source_id.clone()),
                };
                self.fields.push(field);
                added += 1;
            }
        }
        if added > 0 {
            tracing::info!(added, "populated default fields");
        }
        added
    }

    /// Remove every synthesized default field, leaving explicit selections alone.
    pub fn discard_defaults(&mut self) -> usize {
        let before = self.fields.len();
        self.fields.retain(|f| !is_default_field(f));
        before - self.fields.len()
    }

    /// Drop fields whose source is outside `selected`. Returns how many were removed.
    pub fn retain_sources(&mut self, selected: &[String]) -> usize {
        let before = self.fields.len();
        self.fields
            .retain(|f| selected.iter().any(|s| s == f.source_id()));
        before - self.fields.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FormattingConfig;

    fn item(source: &str, name: &str) -> FieldItem {
        FieldItem::new(source, name, FieldType::String)
    }

    fn ids(set: &FieldSet) -> Vec<String> {
        set.fields().iter().map(|f| f.id.clone()).collect()
    }

    #[test]
    fn duplicate_add_keeps_list_unchanged() {
        let mut set = FieldSet::new();
        set.add_field(&item("employees", "name"), true);
        set.add_field(&item("departments", "name"), true);
        let before = ids(&set);
        let out = set.add_field(&item("employees", "name"), true);
        assert_eq!(out, FieldOutcome::Duplicate("employees.name".into()));
        assert_eq!(ids(&set), before);
    }

    #[test]
    fn single_source_mode_dedups_on_bare_name() {
        let mut set = FieldSet::new();
        set.add_field(&item("employees", "name"), false);
        let out = set.add_field(&item("departments", "name"), false);
        assert_eq!(out, FieldOutcome::Duplicate("name".into()));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn display_orders_follow_insertion() {
        let mut set = FieldSet::new();
        for name in ["a", "b", "c", "d"] {
            set.add_field(&item("employees", name), true);
        }
        let orders: Vec<u32> = set.fields().iter().map(|f| f.display_order).collect();
        assert_eq!(orders, vec![0, 1, 2, 3]);
    }

    #[test]
    fn removal_keeps_order_and_avoids_reuse() {
        let mut set = FieldSet::new();
        for name in ["a", "b", "c"] {
            set.add_field(&item("employees", name), true);
        }
        let first = set.fields()[0].id.clone();
        assert!(set.remove_field(&first));
        assert!(!set.remove_field(&first));
        let names: Vec<&str> = set.fields().iter().map(|f| f.field_name.as_str()).collect();
        assert_eq!(names, vec!["b", "c"]);
        set.add_field(&item("employees", "d"), true);
        let orders: Vec<u32> = set.fields().iter().map(|f| f.display_order).collect();
        assert_eq!(orders, vec![1, 2, 3]);
    }

    #[test]
    fn update_merges_patch() {
        let mut set = FieldSet::new();
        let FieldOutcome::Added(id) = set.add_field(&item("employees", "salary"), true) else {
            panic!("expected added");
        };
        let patch = ReportFieldPatch {
            field_alias: Some("Base Pay".into()),
            is_sortable: Some(false),
            formatting_config: Some(FormattingConfig {
                decimal_places: Some(2),
                thousand_separator: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        };
        let field = set.update_field(&id, patch).unwrap();
        assert_eq!(field.field_alias, "Base Pay");
        assert!(!field.is_sortable);
        assert!(field.is_visible);
        assert_eq!(field.source_data_source_id.as_deref(), Some("employees"));
        assert_eq!(field.formatting_config.as_ref().unwrap().decimal_places, Some(2));
    }

    #[test]
    fn update_rejects_taken_display_order() {
        let mut set = FieldSet::new();
        set.add_field(&item("employees", "a"), true);
        let FieldOutcome::Added(id) = set.add_field(&item("employees", "b"), true) else {
            panic!("expected added");
        };
        let patch = ReportFieldPatch {
            display_order: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            set.update_field(&id, patch),
            Err(AppError::Config(ConfigError::DuplicateDisplayOrder { .. }))
        ));
        assert!(matches!(
            set.update_field("missing", ReportFieldPatch::default()),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn defaults_are_marked_and_discardable() {
        let mut set = FieldSet::new();
        set.add_field(&item("employees", "hire_date"), true);
        let added = set.auto_populate_defaults(&["employees".into(), "departments".into()]);
        assert_eq!(added, 4);
        assert_eq!(set.fields().iter().filter(|f| is_default_field(f)).count(), 4);
        assert_eq!(set.discard_defaults(), 4);
        assert_eq!(set.len(), 1);
        assert_eq!(set.fields()[0].field_name, "hire_date");
    }

    #[test]
    fn reorder_renumbers() {
        let mut set = FieldSet::new();
        for name in ["a", "b", "c"] {
            set.add_field(&item("employees", name), true);
        }
        let c = set.fields()[2].id.clone();
        set.reorder(&[c]);
        let names: Vec<&str> = set.fields().iter().map(|f| f.field_name.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
        let orders: Vec<u32> = set.fields().iter().map(|f| f.display_order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[test]
    fn retain_drops_fields_of_removed_source() {
        let mut set = FieldSet::new();
        set.add_field(&item("employees", "name"), true);
        set.add_field(&item("departments", "name"), true);
        assert_eq!(set.retain_sources(&["employees".into()]), 1);
        assert!(set.fields().iter().all(|f| f.source_id() == "employees"));
    }
}
