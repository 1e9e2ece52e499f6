//! Resolved catalog: data sources indexed by id with qualified field names filled in.

use crate::config::{DataSource, FieldItem};
use crate::naming::split_qualified;
use std::collections::HashMap;

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    pub sources: Vec<DataSource>,
    by_id: HashMap<String, usize>,
}

impl Catalog {
    /// Build the index. Callers go through [`crate::config::resolve`], which checks ids are unique.
    pub(crate) fn from_sources(sources: Vec<DataSource>) -> Self {
        let by_id = sources
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.clone(), i))
            .collect();
        Catalog { sources, by_id }
    }

    /// Add a resolved source, replacing any cached source with the same id.
    pub(crate) fn insert(&mut self, source: DataSource) {
        match self.by_id.get(&source.id) {
            Some(&i) => self.sources[i] = source,
            None => {
                self.by_id.insert(source.id.clone(), self.sources.len());
                self.sources.push(source);
            }
        }
    }

    pub fn source(&self, id: &str) -> Option<&DataSource> {
        self.by_id.get(id).map(|&i| &self.sources[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Look up a field by `"{source}.{field}"`.
    pub fn field(&self, qualified: &str) -> Option<&FieldItem> {
        let (source, field) = split_qualified(qualified)?;
        self.source(source)?.field(field)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DataSourceType;

    fn source(id: &str, description: &str) -> DataSource {
        DataSource {
            id: id.into(),
            name: id.into(),
            type_: DataSourceType::View,
            schema: None,
            description: Some(description.into()),
            fields: vec![],
        }
    }

    #[test]
    fn insert_appends_or_replaces() {
        let mut catalog = Catalog::from_sources(vec![source("employees", "v1")]);
        catalog.insert(source("positions", "v1"));
        catalog.insert(source("employees", "v2"));
        assert_eq!(catalog.len(), 2);
        assert!(catalog.contains("positions"));
        assert_eq!(catalog.source("employees").unwrap().description.as_deref(), Some("v2"));
    }
}
