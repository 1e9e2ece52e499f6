//! Builds the preview request sent to the backend, and a display-only SQL rendering of it.

use crate::config::{Catalog, DataSourceJoin, DEFAULT_SCHEMA};
use crate::designer::{FieldSet, JoinSet};
use crate::error::AppError;
use crate::naming::qualified_name;
use crate::query::{Filters, Pagination, SortSpec};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const JOINS_REQUIRED: &str =
    "multiple data sources are selected but no joins are configured; add a join before previewing";
pub const NO_DATA_SOURCE: &str = "select a data source before previewing";

/// Body of `POST /reports/data-sources/preview-multi`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRequest {
    /// Set for single-source previews only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_sources: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joins: Option<Vec<DataSourceJoin>>,
    pub fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<Filters>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sorter: Option<SortSpec>,
    pub page_size: u32,
    pub offset: u32,
}

impl PreviewRequest {
    pub fn is_multi_source(&self) -> bool {
        self.data_sources.is_some()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PreviewResponse {
    #[serde(default)]
    pub data: Vec<serde_json::Value>,
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub success: bool,
    /// Backend explanation, usually present when `success` is false.
    #[serde(default, alias = "detail", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct PreviewOptions {
    pub pagination: Pagination,
    pub filters: Option<Filters>,
    pub sorter: Option<SortSpec>,
}

/// Multi-source mode needs more than one source and at least one join.
pub fn is_multi_source_query(data_sources: &[String], joins: &JoinSet) -> bool {
    data_sources.len() > 1 && !joins.is_empty()
}

/// Assemble the preview request. Refuses (without touching the backend) when several sources
/// are selected without joins. In multi-source mode with no fields, default `id`/`name` fields
/// are added to `fields` first.
pub fn assemble_preview(
    data_sources: &[String],
    joins: &JoinSet,
    fields: &mut FieldSet,
    options: &PreviewOptions,
) -> Result<PreviewRequest, AppError> {
    if data_sources.is_empty() {
        return Err(AppError::Precondition(NO_DATA_SOURCE.into()));
    }
    if data_sources.len() > 1 && joins.is_empty() {
        tracing::warn!(sources = data_sources.len(), "preview refused: no joins configured");
        return Err(AppError::Precondition(JOINS_REQUIRED.into()));
    }
    let multi = is_multi_source_query(data_sources, joins);
    if multi && fields.is_empty() {
        fields.auto_populate_defaults(data_sources);
    }

    let mut ordered: Vec<_> = fields.fields().iter().collect();
    ordered.sort_by_key(|f| f.display_order);
    let field_names = ordered
        .iter()
        .map(|f| {
            if multi {
                f.qualified_field_name
                    .clone()
                    .unwrap_or_else(|| qualified_name(f.source_id(), &f.field_name))
            } else {
                f.field_name.clone()
            }
        })
        .collect();

    let request = PreviewRequest {
        data_source: if multi { None } else { data_sources.first().cloned() },
        data_sources: multi.then(|| data_sources.to_vec()),
        joins: multi.then(|| joins.joins().to_vec()),
        fields: field_names,
        filters: options.filters.clone().filter(|f| !f.is_empty()),
        sorter: options.sorter.clone(),
        page_size: options.pagination.page_size,
        offset: options.pagination.offset,
    };
    tracing::debug!(
        multi_source = multi,
        fields = request.fields.len(),
        page_size = request.page_size,
        offset = request.offset,
        "assembled preview request"
    );
    Ok(request)
}

/// Quote an identifier for display. Source ids double as table aliases.
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn qualified_table(schema: &str, table: &str) -> String {
    format!("{}.{}", quoted(schema), quoted(table))
}

fn column(source: &str, field: &str) -> String {
    format!("{}.{}", quoted(source), quoted(field))
}

/// Render an assembled request as SQL for the designer's preview pane. The backend builds the
/// query it actually runs; this text is never executed.
pub fn render_sql(request: &PreviewRequest, catalog: &Catalog) -> String {
    let sources: Vec<String> = match (&request.data_sources, &request.data_source) {
        (Some(multi), _) => multi.clone(),
        (None, Some(single)) => vec![single.clone()],
        (None, None) => Vec::new(),
    };
    let table_of = |id: &str| {
        let (schema, name) = catalog
            .source(id)
            .map(|ds| (ds.schema_name().to_string(), ds.name.clone()))
            .unwrap_or_else(|| (DEFAULT_SCHEMA.to_string(), id.to_string()));
        format!("{} {}", qualified_table(&schema, &name), quoted(id))
    };

    let select_list = if request.fields.is_empty() {
        "*".to_string()
    } else {
        request
            .fields
            .iter()
            .map(|f| match f.split_once('.') {
                Some((source, field)) => {
                    format!("{} AS {}", column(source, field), quoted(&format!("{}_{}", source, field)))
                }
                None => quoted(f),
            })
            .collect::<Vec<_>>()
            .join(", ")
    };

    let Some(primary) = sources.first() else {
        return format!("SELECT {}", select_list);
    };
    let mut sql = format!("SELECT {} FROM {}", select_list, table_of(primary));
    let mut joined: HashSet<&str> = HashSet::from([primary.as_str()]);
    let mut extra_where = Vec::new();

    for join in request.joins.iter().flatten() {
        let mut on = format!(
            "{} = {}",
            column(&join.left_data_source_id, &join.left_field_name),
            column(&join.right_data_source_id, &join.right_field_name)
        );
        if let Some(cond) = join.condition.as_deref().filter(|c| !c.trim().is_empty()) {
            on = format!("{} AND ({})", on, cond.trim());
        }
        let left_in = joined.contains(join.left_data_source_id.as_str());
        let right_in = joined.contains(join.right_data_source_id.as_str());
        let target = match (left_in, right_in) {
            (true, false) => &join.right_data_source_id,
            (false, _) => &join.left_data_source_id,
            (true, true) => {
                extra_where.push(on);
                continue;
            }
        };
        sql.push_str(&format!(" {} {} ON {}", join.join_type.sql_keyword(), table_of(target), on));
        joined.insert(target.as_str());
    }

    if !extra_where.is_empty() {
        sql.push_str(&format!(" WHERE {}", extra_where.join(" AND ")));
    }
    if let Some(sorter) = request.sorter.as_ref().filter(|s| request.fields.contains(&s.field)) {
        let target = match sorter.field.split_once('.') {
            Some((source, field)) => column(source, field),
            None => quoted(&sorter.field),
        };
        sql.push_str(&format!(" ORDER BY {} {}", target, sorter.order.sql_keyword()));
    }
    sql.push_str(&format!(" LIMIT {} OFFSET {}", request.page_size, request.offset));
    sql
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{resolve, DataSource, DataSourceType, FieldItem, FieldType, JoinType};
    use crate::designer::FieldOutcome;
    use crate::query::SortOrder;

    fn sources(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn employee_join() -> DataSourceJoin {
        DataSourceJoin {
            id: String::new(),
            left_data_source_id: "employees".into(),
            left_field_name: "department_id".into(),
            right_data_source_id: "departments".into(),
            right_field_name: "id".into(),
            join_type: JoinType::Left,
            condition: None,
        }
    }

    #[test]
    fn refuses_multiple_sources_without_joins() {
        let mut fields = FieldSet::new();
        let err = assemble_preview(
            &sources(&["employees", "departments"]),
            &JoinSet::new(),
            &mut fields,
            &PreviewOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Precondition(ref m) if m == JOINS_REQUIRED));
        assert!(fields.is_empty());
    }

    #[test]
    fn refuses_empty_selection() {
        let err = assemble_preview(&[], &JoinSet::new(), &mut FieldSet::new(), &PreviewOptions::default())
            .unwrap_err();
        assert!(matches!(err, AppError::Precondition(_)));
    }

    #[test]
    fn builds_multi_source_request() {
        let sel = sources(&["employees", "departments"]);
        let mut joins = JoinSet::new();
        joins.add_join(employee_join(), &sel);
        let mut fields = FieldSet::new();
        fields.add_field(&FieldItem::new("employees", "name", FieldType::String), true);
        fields.add_field(&FieldItem::new("departments", "name", FieldType::String), true);

        let req = assemble_preview(&sel, &joins, &mut fields, &PreviewOptions::default()).unwrap();
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["dataSources"], serde_json::json!(["employees", "departments"]));
        assert_eq!(json["fields"], serde_json::json!(["employees.name", "departments.name"]));
        assert_eq!(json["joins"][0]["left_field_name"], "department_id");
        assert_eq!(json["joins"][0]["join_type"], "left");
        assert_eq!(json["pageSize"], 20);
        assert_eq!(json["offset"], 0);
        assert!(json.get("dataSource").is_none());
        assert!(json.get("filters").is_none());
        assert!(json.get("sorter").is_none());
    }

    #[test]
    fn populates_defaults_when_joined_without_fields() {
        let sel = sources(&["A", "B"]);
        let mut joins = JoinSet::new();
        joins.add_join(
            DataSourceJoin {
                left_data_source_id: "A".into(),
                left_field_name: "b_id".into(),
                right_data_source_id: "B".into(),
                right_field_name: "id".into(),
                ..employee_join()
            },
            &sel,
        );
        let mut fields = FieldSet::new();
        let req = assemble_preview(&sel, &joins, &mut fields, &PreviewOptions::default()).unwrap();
        assert_eq!(req.fields, vec!["A.id", "A.name", "B.id", "B.name"]);
        let distinct: HashSet<_> = fields
            .fields()
            .iter()
            .map(|f| f.qualified_field_name.clone().unwrap())
            .collect();
        assert_eq!(fields.len(), 4);
        assert_eq!(distinct.len(), 4);
    }

    #[test]
    fn single_source_uses_bare_names() {
        let sel = sources(&["employees"]);
        let mut fields = FieldSet::new();
        let FieldOutcome::Added(_) = fields.add_field(&FieldItem::new("employees", "name", FieldType::String), false)
        else {
            panic!("expected added");
        };
        let options = PreviewOptions {
            pagination: Pagination::from_page(2, 10),
            ..Default::default()
        };
        let req = assemble_preview(&sel, &JoinSet::new(), &mut fields, &options).unwrap();
        assert!(!req.is_multi_source());
        assert_eq!(req.data_source.as_deref(), Some("employees"));
        assert_eq!(req.fields, vec!["name"]);
        assert_eq!(req.joins, None);
        assert_eq!((req.page_size, req.offset), (10, 10));
    }

    fn table(id: &str, name: &str) -> DataSource {
        DataSource {
            id: id.into(),
            name: name.into(),
            type_: DataSourceType::Table,
            schema: None,
            description: None,
            fields: vec![],
        }
    }

    #[test]
    fn renders_join_sql() {
        let table = |id: &str| table(id, id);
        let catalog = resolve(vec![table("employees"), table("departments")]).unwrap();
        let mut join = employee_join();
        join.condition = Some("departments.active = true".into());
        let req = PreviewRequest {
            data_source: None,
            data_sources: Some(sources(&["employees", "departments"])),
            joins: Some(vec![join]),
            fields: vec!["employees.name".into()],
            filters: None,
            sorter: Some(SortSpec {
                field: "employees.name".into(),
                order: SortOrder::Desc,
            }),
            page_size: 20,
            offset: 0,
        };
        assert_eq!(
            render_sql(&req, &catalog),
            "SELECT \"employees\".\"name\" AS \"employees_name\" FROM \"hr\".\"employees\" \"employees\" \
             LEFT JOIN \"hr\".\"departments\" \"departments\" ON \"employees\".\"department_id\" = \
             \"departments\".\"id\" AND (departments.active = true) \
             ORDER BY \"employees\".\"name\" DESC LIMIT 20 OFFSET 0"
        );
    }

    #[test]
    fn sql_uses_table_name_not_source_id() {
        let mut source = table("12", "employee_master");
        source.schema = Some("payroll".into());
        let catalog = resolve(vec![source]).unwrap();
        let req = PreviewRequest {
            data_source: Some("12".into()),
            data_sources: None,
            joins: None,
            fields: vec!["name".into()],
            filters: None,
            sorter: None,
            page_size: 10,
            offset: 30,
        };
        assert_eq!(
            render_sql(&req, &catalog),
            "SELECT \"name\" FROM \"payroll\".\"employee_master\" \"12\" LIMIT 10 OFFSET 30"
        );
    }
}
