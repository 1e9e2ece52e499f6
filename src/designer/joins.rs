//! Join configuration: the edges between selected data sources used for multi-source previews.

use crate::config::{Catalog, DataSourceJoin, JoinType, DEFAULT_SCHEMA};
use crate::naming::{referenced_table, table_matches};
use serde::{Deserialize, Serialize};

/// Result of [`JoinSet::add_join`]. Only `Added` changes the set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JoinOutcome {
    Added(String),
    /// Same `(left_source, left_field, right_source, right_field)` already present; carries its id.
    AlreadyConfigured(String),
    /// An endpoint is not in the current selection.
    Rejected { missing: String },
}

/// A join proposed from foreign-key metadata. Never applied without [`JoinSet::accept_suggestion`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinSuggestion {
    pub left_data_source_id: String,
    pub left_field_name: String,
    pub right_data_source_id: String,
    pub right_field_name: String,
    pub join_type: JoinType,
    /// Table name the foreign key was resolved to.
    pub referenced_table: String,
}

impl JoinSuggestion {
    pub fn into_join(self) -> DataSourceJoin {
        DataSourceJoin {
            id: String::new(),
            left_data_source_id: self.left_data_source_id,
            left_field_name: self.left_field_name,
            right_data_source_id: self.right_data_source_id,
            right_field_name: self.right_field_name,
            join_type: self.join_type,
            condition: None,
        }
    }

    fn edge(&self) -> (&str, &str, &str, &str) {
        (
            &self.left_data_source_id,
            &self.left_field_name,
            &self.right_data_source_id,
            &self.right_field_name,
        )
    }
}

#[derive(Clone, Debug, Default)]
pub struct JoinSet {
    joins: Vec<DataSourceJoin>,
}

impl JoinSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from stored joins, keeping the first of any duplicated edge.
    pub fn from_joins(joins: Vec<DataSourceJoin>, selected: &[String]) -> Self {
        let mut set = JoinSet::new();
        for join in joins {
            set.add_join(join, selected);
        }
        set
    }

    pub fn joins(&self) -> &[DataSourceJoin] {
        &self.joins
    }

    pub fn len(&self) -> usize {
        self.joins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joins.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&DataSourceJoin> {
        self.joins.iter().find(|j| j.id == id)
    }

    /// Insert `candidate` with a fresh id if both endpoints are selected and the edge is new.
    /// An id already on the candidate is kept when it is unused.
    pub fn add_join(&mut self, mut candidate: DataSourceJoin, selected: &[String]) -> JoinOutcome {
        for side in [&candidate.left_data_source_id, &candidate.right_data_source_id] {
            if !selected.iter().any(|s| s == side) {
                tracing::warn!(data_source = %side, "join endpoint not in selection");
                return JoinOutcome::Rejected {
                    missing: side.clone(),
                };
            }
        }
        if let Some(existing) = self.joins.iter().find(|j| j.edge() == candidate.edge()) {
            return JoinOutcome::AlreadyConfigured(existing.id.clone());
        }
        if candidate.id.is_empty() || self.get(&candidate.id).is_some() {
            candidate.id = uuid::Uuid::new_v4().to_string();
        }
        let id = candidate.id.clone();
        tracing::info!(
            join_id = %id,
            left = %candidate.left_data_source_id,
            right = %candidate.right_data_source_id,
            "join added"
        );
        self.joins.push(candidate);
        JoinOutcome::Added(id)
    }

    /// Remove by id. Unknown ids are ignored.
    pub fn remove_join(&mut self, id: &str) -> bool {
        let before = self.joins.len();
        self.joins.retain(|j| j.id != id);
        before != self.joins.len()
    }

    /// Drop joins touching any source outside `selected`. Returns how many were removed.
    pub fn retain_sources(&mut self, selected: &[String]) -> usize {
        let before = self.joins.len();
        self.joins.retain(|j| {
            selected.iter().any(|s| *s == j.left_data_source_id)
                && selected.iter().any(|s| *s == j.right_data_source_id)
        });
        before - self.joins.len()
    }

    /// Propose LEFT joins from foreign-key fields of the selected sources to other selected sources.
    /// The target table comes from `foreign_key_info` when present, else from the `_id` naming convention.
    pub fn auto_detect_joins(&self, selected: &[String], catalog: &Catalog) -> Vec<JoinSuggestion> {
        let mut out: Vec<JoinSuggestion> = Vec::new();
        for source_id in selected {
            let Some(source) = catalog.source(source_id) else { continue };
            for field in source.fields.iter().filter(|f| f.is_foreign_key) {
                let (table, schema, target_field) = match &field.foreign_key_info {
                    Some(info) => (
                        info.referenced_table.as_str(),
                        info.referenced_schema.as_deref().unwrap_or(DEFAULT_SCHEMA),
                        info.referenced_field.as_str(),
                    ),
                    None => match referenced_table(&field.field_name) {
                        Some(t) => (t, DEFAULT_SCHEMA, "id"),
                        None => continue,
                    },
                };
                let target = selected
                    .iter()
                    .filter(|id| *id != source_id)
                    .filter_map(|id| catalog.source(id))
                    .find(|ds| {
                        ds.schema_name() == schema
                            && (table_matches(&ds.id, table) || table_matches(&ds.name, table))
                    });
                let Some(target) = target else { continue };
                let suggestion = JoinSuggestion {
                    left_data_source_id: source.id.clone(),
                    left_field_name: field.field_name.clone(),
                    right_data_source_id: target.id.clone(),
                    right_field_name: target_field.to_string(),
                    join_type: JoinType::Left,
                    referenced_table: table.to_string(),
                };
                let configured = self.joins.iter().any(|j| j.edge() == suggestion.edge());
                if !configured && !out.iter().any(|s| s.edge() == suggestion.edge()) {
                    out.push(suggestion);
                }
            }
        }
        tracing::debug!(count = out.len(), "join suggestions");
        out
    }

    pub fn accept_suggestion(&mut self, suggestion: JoinSuggestion, selected: &[String]) -> JoinOutcome {
        self.add_join(suggestion.into_join(), selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{resolve, DataSource, DataSourceType, FieldItem, FieldType, ForeignKeyInfo};

    fn selected(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn edge(left: &str, lf: &str, right: &str, rf: &str) -> DataSourceJoin {
        DataSourceJoin {
            id: String::new(),
            left_data_source_id: left.into(),
            left_field_name: lf.into(),
            right_data_source_id: right.into(),
            right_field_name: rf.into(),
            join_type: JoinType::Left,
            condition: None,
        }
    }

    fn catalog() -> Catalog {
        let table = |id: &str, fields: Vec<FieldItem>| DataSource {
            id: id.into(),
            name: id.into(),
            type_: DataSourceType::Table,
            schema: None,
            description: None,
            fields,
        };
        resolve(vec![
            table(
                "employees",
                vec![
                    FieldItem::new("employees", "id", FieldType::Number),
                    FieldItem::new("employees", "department_id", FieldType::Number).foreign_key(None),
                    FieldItem::new("employees", "manager_ref", FieldType::Number).foreign_key(Some(
                        ForeignKeyInfo {
                            referenced_table: "employees".into(),
                            referenced_field: "id".into(),
                            referenced_schema: None,
                        },
                    )),
                    FieldItem::new("employees", "position_id", FieldType::Number).foreign_key(None),
                ],
            ),
            table("departments", vec![FieldItem::new("departments", "id", FieldType::Number)]),
            table("positions", vec![FieldItem::new("positions", "id", FieldType::Number)]),
        ])
        .unwrap()
    }

    #[test]
    fn add_assigns_fresh_ids() {
        let sel = selected(&["employees", "departments"]);
        let mut set = JoinSet::new();
        let JoinOutcome::Added(id) = set.add_join(edge("employees", "department_id", "departments", "id"), &sel) else {
            panic!("expected added");
        };
        assert!(!id.is_empty());
        assert_eq!(set.get(&id).unwrap().left_field_name, "department_id");
    }

    #[test]
    fn duplicate_edge_is_a_noop() {
        let sel = selected(&["employees", "departments"]);
        let mut set = JoinSet::new();
        let first = set.add_join(edge("employees", "department_id", "departments", "id"), &sel);
        let mut again = edge("employees", "department_id", "departments", "id");
        again.join_type = JoinType::Inner;
        let second = set.add_join(again, &sel);
        assert_eq!(set.len(), 1);
        match (first, second) {
            (JoinOutcome::Added(a), JoinOutcome::AlreadyConfigured(b)) => assert_eq!(a, b),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn rejects_unselected_endpoints() {
        let sel = selected(&["employees"]);
        let mut set = JoinSet::new();
        let out = set.add_join(edge("employees", "department_id", "departments", "id"), &sel);
        assert_eq!(
            out,
            JoinOutcome::Rejected {
                missing: "departments".into()
            }
        );
        assert!(set.is_empty());
    }

    #[test]
    fn remove_unknown_is_silent() {
        let mut set = JoinSet::new();
        assert!(!set.remove_join("nope"));
    }

    #[test]
    fn retain_drops_dangling_joins() {
        let sel = selected(&["employees", "departments", "positions"]);
        let mut set = JoinSet::new();
        set.add_join(edge("employees", "department_id", "departments", "id"), &sel);
        set.add_join(edge("employees", "position_id", "positions", "id"), &sel);
        let removed = set.retain_sources(&selected(&["employees", "positions"]));
        assert_eq!(removed, 1);
        assert!(set.joins().iter().all(|j| !j.touches("departments")));
    }

    #[test]
    fn detects_by_naming_convention_within_selection() {
        let sel = selected(&["employees", "departments"]);
        let set = JoinSet::new();
        let suggestions = set.auto_detect_joins(&sel, &catalog());
        assert_eq!(suggestions.len(), 1);
        let s = &suggestions[0];
        assert_eq!(s.left_field_name, "department_id");
        assert_eq!(s.right_data_source_id, "departments");
        assert_eq!(s.right_field_name, "id");
        assert_eq!(s.join_type, JoinType::Left);
        assert!(set.is_empty());
    }

    #[test]
    fn skips_configured_and_accepts_explicitly() {
        let sel = selected(&["employees", "departments", "positions"]);
        let cat = catalog();
        let mut set = JoinSet::new();
        let suggestions = set.auto_detect_joins(&sel, &cat);
        assert_eq!(suggestions.len(), 2);
        let out = set.accept_suggestion(suggestions[0].clone(), &sel);
        assert!(matches!(out, JoinOutcome::Added(_)));
        assert_eq!(set.auto_detect_joins(&sel, &cat).len(), 1);
    }
}
