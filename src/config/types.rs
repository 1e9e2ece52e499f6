//! Report designer model types matching the reporting backend's JSON.

use crate::naming::qualified_name;
use crate::query::SortSpec;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Schema assumed for data sources that do not name one.
pub const DEFAULT_SCHEMA: &str = "hr";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceType {
    Table,
    View,
    Query,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    String,
    Number,
    Date,
    Boolean,
    Json,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForeignKeyInfo {
    pub referenced_table: String,
    #[serde(default = "default_referenced_field")]
    pub referenced_field: String,
    #[serde(default)]
    pub referenced_schema: Option<String>,
}

fn default_referenced_field() -> String {
    "id".into()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldItem {
    pub field_name: String,
    #[serde(default)]
    pub field_alias: Option<String>,
    #[serde(default)]
    pub field_type: FieldType,
    #[serde(default)]
    pub is_foreign_key: bool,
    #[serde(default)]
    pub foreign_key_info: Option<ForeignKeyInfo>,
    /// Filled in by the catalog loader when the backend omits it.
    #[serde(default)]
    pub source_data_source_id: String,
    /// `{source_data_source_id}.{field_name}`; recomputed on load.
    #[serde(default)]
    pub qualified_name: String,
}

impl FieldItem {
    pub fn new(source_id: &str, field_name: &str, field_type: FieldType) -> Self {
        FieldItem {
            field_name: field_name.to_string(),
            field_alias: None,
            field_type,
            is_foreign_key: false,
            foreign_key_info: None,
            source_data_source_id: source_id.to_string(),
            qualified_name: qualified_name(source_id, field_name),
        }
    }

    pub fn foreign_key(mut self, info: Option<ForeignKeyInfo>) -> Self {
        self.is_foreign_key = true;
        self.foreign_key_info = info;
        self
    }

    pub fn alias(mut self, alias: &str) -> Self {
        self.field_alias = Some(alias.to_string());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DataSource {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub type_: DataSourceType,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldItem>,
}

impl DataSource {
    pub fn schema_name(&self) -> &str {
        self.schema.as_deref().unwrap_or(DEFAULT_SCHEMA)
    }

    pub fn field(&self, field_name: &str) -> Option<&FieldItem> {
        self.fields.iter().find(|f| f.field_name == field_name)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinType {
    Inner,
    #[default]
    Left,
    Right,
    Full,
}

impl JoinType {
    pub fn sql_keyword(self) -> &'static str {
        match self {
            JoinType::Inner => "INNER JOIN",
            JoinType::Left => "LEFT JOIN",
            JoinType::Right => "RIGHT JOIN",
            JoinType::Full => "FULL OUTER JOIN",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DataSourceJoin {
    #[serde(default)]
    pub id: String,
    pub left_data_source_id: String,
    pub left_field_name: String,
    pub right_data_source_id: String,
    pub right_field_name: String,
    #[serde(default)]
    pub join_type: JoinType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

impl DataSourceJoin {
    /// Dedup key: the two endpoints, ignoring join type and condition.
    pub fn edge(&self) -> (&str, &str, &str, &str) {
        (
            &self.left_data_source_id,
            &self.left_field_name,
            &self.right_data_source_id,
            &self.right_field_name,
        )
    }

    pub fn touches(&self, source_id: &str) -> bool {
        self.left_data_source_id == source_id || self.right_data_source_id == source_id
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatType {
    #[default]
    Text,
    Number,
    Currency,
    Percentage,
    Date,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FormattingConfig {
    #[serde(default)]
    pub format_type: FormatType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimal_places: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thousand_separator: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReportField {
    pub id: String,
    pub field_name: String,
    pub field_alias: String,
    /// Owning data source id.
    pub data_source: String,
    #[serde(default)]
    pub field_type: FieldType,
    pub display_order: u32,
    #[serde(default = "default_true")]
    pub is_visible: bool,
    #[serde(default = "default_true")]
    pub is_sortable: bool,
    #[serde(default = "default_true")]
    pub is_filterable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatting_config: Option<FormattingConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualified_field_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_data_source_id: Option<String>,
}

fn default_true() -> bool {
    true
}

impl ReportField {
    /// Source id used for cascade checks; falls back to `data_source`.
    pub fn source_id(&self) -> &str {
        self.source_data_source_id.as_deref().unwrap_or(&self.data_source)
    }

    /// Name sent to the backend: qualified when known, else bare.
    pub fn request_name(&self) -> &str {
        self.qualified_field_name.as_deref().unwrap_or(&self.field_name)
    }
}

/// Mutable subset of a [`ReportField`]. `id` and `source_data_source_id` are not patchable.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ReportFieldPatch {
    #[serde(default)]
    pub field_alias: Option<String>,
    #[serde(default)]
    pub display_order: Option<u32>,
    #[serde(default)]
    pub is_visible: Option<bool>,
    #[serde(default)]
    pub is_sortable: Option<bool>,
    #[serde(default)]
    pub is_filterable: Option<bool>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub formatting_config: Option<FormattingConfig>,
}

/// Working draft of a report; the backend stores it inside a [`ReportTemplate`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportConfig {
    #[serde(default)]
    pub title: String,
    /// Primary data source id.
    #[serde(default)]
    pub data_source: Option<String>,
    #[serde(default)]
    pub data_sources: Vec<String>,
    #[serde(default)]
    pub joins: Vec<DataSourceJoin>,
    #[serde(default)]
    pub fields: Vec<ReportField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sorting: Option<Vec<SortSpec>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReportTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub config: ReportConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}
