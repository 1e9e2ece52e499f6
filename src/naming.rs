//! Field naming: qualified names, the `_id` foreign-key convention, and display aliases.

const FOREIGN_KEY_SUFFIX: &str = "_id";

/// `"{source_id}.{field_name}"`.
pub fn qualified_name(source_id: &str, field_name: &str) -> String {
    format!("{}.{}", source_id, field_name)
}

/// Split `"employees.name"` into `("employees", "name")`. Splits on the first dot only.
pub fn split_qualified(name: &str) -> Option<(&str, &str)> {
    let (source, field) = name.split_once('.')?;
    if source.is_empty() || field.is_empty() {
        return None;
    }
    Some((source, field))
}

/// Table a foreign-key column points at by naming convention.
/// e.g. "department_id" -> "department"; "id" and "name" -> None.
pub fn referenced_table(field_name: &str) -> Option<&str> {
    field_name
        .strip_suffix(FOREIGN_KEY_SUFFIX)
        .filter(|t| !t.is_empty())
}

/// Whether a data source id or name matches a referenced table name.
/// Accepts the plural form ("department" matches "departments").
pub fn table_matches(candidate: &str, table: &str) -> bool {
    let candidate = candidate.rsplit('.').next().unwrap_or(candidate);
    candidate.eq_ignore_ascii_case(table)
        || candidate
            .strip_suffix('s')
            .is_some_and(|c| c.eq_ignore_ascii_case(table))
}

/// Display alias from a snake_case column name.
/// e.g. "hire_date" -> "Hire Date", "id" -> "Id"
pub fn default_alias(field_name: &str) -> String {
    let mut out = String::with_capacity(field_name.len());
    let mut capitalize_next = true;
    for c in field_name.chars() {
        if c == '_' {
            if !out.is_empty() && !out.ends_with(' ') {
                out.push(' ');
            }
            capitalize_next = true;
        } else if capitalize_next {
            out.extend(c.to_uppercase());
            capitalize_next = false;
        } else {
            out.push(c);
        }
    }
    out.trim_end().to_string()
}

/// Data-source ids are opaque backend keys (often numeric). They only need to be non-empty
/// and free of the dot that separates a qualified field name.
pub fn is_source_id(s: &str) -> bool {
    !s.is_empty() && !s.contains('.')
}
