//! Pagination, sorting and filter parameters of a preview request.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Column filters passed through to the backend untouched.
pub type Filters = serde_json::Map<String, serde_json::Value>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page_size: u32,
    pub offset: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination {
            page_size: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

impl Pagination {
    /// Page size is clamped to `1..=MAX_PAGE_SIZE`.
    pub fn new(page_size: u32, offset: u32) -> Self {
        Pagination {
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
            offset,
        }
    }

    /// From a 1-based page number as shown in a paged table.
    pub fn from_page(current: u32, page_size: u32) -> Self {
        let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        Pagination {
            page_size,
            offset: current.saturating_sub(1).saturating_mul(page_size),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    #[serde(alias = "ascend")]
    Asc,
    #[serde(alias = "descend")]
    Desc,
}

impl SortOrder {
    pub fn sql_keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    /// Qualified or bare field name, as sent in `fields`.
    pub field: String,
    #[serde(default)]
    pub order: SortOrder,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_are_one_based() {
        assert_eq!(Pagination::from_page(1, 20), Pagination { page_size: 20, offset: 0 });
        assert_eq!(Pagination::from_page(3, 50), Pagination { page_size: 50, offset: 100 });
        assert_eq!(Pagination::from_page(0, 20).offset, 0);
    }

    #[test]
    fn page_size_is_clamped() {
        assert_eq!(Pagination::new(0, 0).page_size, 1);
        assert_eq!(Pagination::new(5000, 0).page_size, MAX_PAGE_SIZE);
    }

    #[test]
    fn accepts_table_sort_orders() {
        let s: SortSpec = serde_json::from_str(r#"{"field":"employees.name","order":"descend"}"#).unwrap();
        assert_eq!(s.order, SortOrder::Desc);
        assert_eq!(serde_json::to_value(&s).unwrap()["order"], "desc");
    }
}
