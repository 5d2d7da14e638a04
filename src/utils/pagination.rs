use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// Parses an optional query value leniently: absent, empty, or non-numeric
/// input becomes `None` (callers fall back to a default) instead of a 400.
fn deserialize_lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.and_then(|s| s.trim().parse::<i64>().ok()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// The SQL keyword; sort direction is interpolated, never bound, so it
    /// has to come from this closed enum.
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Shared list-endpoint query parameters.
///
/// Out-of-range and non-numeric values are clamped to the nearest valid
/// bound rather than rejected, so a bad `?page=abc` still returns data.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationParams {
    #[serde(default, deserialize_with = "deserialize_lenient_i64")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_lenient_i64")]
    pub limit: Option<i64>,
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_order: Option<String>,
}

impl PaginationParams {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(10).max(1).min(100)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }

    pub fn sort_order(&self) -> SortOrder {
        match &self.sort_order {
            Some(order) if order.eq_ignore_ascii_case("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }

    /// Resolves `sortBy` against a per-resource whitelist of
    /// `(query name, sql column)` pairs, falling back to the default column
    /// when the requested one is unknown.
    pub fn sort_column(
        &self,
        allowed: &[(&str, &'static str)],
        default: &'static str,
    ) -> &'static str {
        self.sort_by
            .as_deref()
            .and_then(|requested| {
                allowed
                    .iter()
                    .find(|(name, _)| *name == requested)
                    .map(|(_, column)| *column)
            })
            .unwrap_or(default)
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationMeta {
    pub fn new(total: i64, page: i64, limit: i64) -> Self {
        let total_pages = (total as u64).div_ceil(limit as u64) as i64;
        Self {
            page,
            limit,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

/// Standard shape for every paginated list response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, total: i64, page: i64, limit: i64) -> Self {
        Self {
            data,
            pagination: PaginationMeta::new(total, page, limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<i64>, limit: Option<i64>) -> PaginationParams {
        PaginationParams {
            page,
            limit,
            sort_by: None,
            sort_order: None,
        }
    }

    #[test]
    fn test_pagination_params_defaults() {
        let params = PaginationParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), 10);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_pagination_params_page_min_boundary() {
        assert_eq!(params(Some(0), None).page(), 1);
        assert_eq!(params(Some(-3), None).page(), 1);
    }

    #[test]
    fn test_pagination_params_limit_min_boundary() {
        assert_eq!(params(None, Some(0)).limit(), 1);
        assert_eq!(params(None, Some(-10)).limit(), 1);
    }

    #[test]
    fn test_pagination_params_limit_max_boundary() {
        assert_eq!(params(None, Some(150)).limit(), 100);
        assert_eq!(params(None, Some(100)).limit(), 100);
    }

    #[test]
    fn test_pagination_params_offset_from_page() {
        assert_eq!(params(Some(3), Some(20)).offset(), 40);
    }

    #[test]
    fn test_pagination_params_non_numeric_input_falls_back() {
        let params: PaginationParams =
            serde_json::from_str(r#"{"page":"abc","limit":""}"#).unwrap();
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), 10);
    }

    #[test]
    fn test_pagination_params_string_numbers_parse() {
        let params: PaginationParams =
            serde_json::from_str(r#"{"page":"2","limit":"50"}"#).unwrap();
        assert_eq!(params.page(), 2);
        assert_eq!(params.limit(), 50);
        assert_eq!(params.offset(), 50);
    }

    #[test]
    fn test_sort_order_defaults_to_desc() {
        assert_eq!(PaginationParams::default().sort_order(), SortOrder::Desc);
    }

    #[test]
    fn test_sort_order_parses_asc_case_insensitively() {
        let params = PaginationParams {
            sort_order: Some("ASC".to_string()),
            ..Default::default()
        };
        assert_eq!(params.sort_order(), SortOrder::Asc);
        assert_eq!(params.sort_order().as_sql(), "ASC");
    }

    #[test]
    fn test_sort_order_unknown_value_falls_back_to_desc() {
        let params = PaginationParams {
            sort_order: Some("sideways".to_string()),
            ..Default::default()
        };
        assert_eq!(params.sort_order(), SortOrder::Desc);
    }

    #[test]
    fn test_sort_column_respects_whitelist() {
        let allowed = [("name", "name"), ("createdAt", "created_at")];
        let params = PaginationParams {
            sort_by: Some("createdAt".to_string()),
            ..Default::default()
        };
        assert_eq!(params.sort_column(&allowed, "created_at"), "created_at");
    }

    #[test]
    fn test_sort_column_rejects_unknown_column() {
        let allowed = [("name", "name")];
        let params = PaginationParams {
            sort_by: Some("password; DROP TABLE users".to_string()),
            ..Default::default()
        };
        assert_eq!(params.sort_column(&allowed, "created_at"), "created_at");
    }

    #[test]
    fn test_pagination_meta_middle_page() {
        let meta = PaginationMeta::new(25, 2, 10);
        assert_eq!(meta.total_pages, 3);
        assert!(meta.has_next);
        assert!(meta.has_prev);
    }

    #[test]
    fn test_pagination_meta_first_page() {
        let meta = PaginationMeta::new(25, 1, 10);
        assert_eq!(meta.total_pages, 3);
        assert!(meta.has_next);
        assert!(!meta.has_prev);
    }

    #[test]
    fn test_pagination_meta_last_page() {
        let meta = PaginationMeta::new(25, 3, 10);
        assert!(!meta.has_next);
        assert!(meta.has_prev);
    }

    #[test]
    fn test_pagination_meta_exact_division() {
        let meta = PaginationMeta::new(30, 3, 10);
        assert_eq!(meta.total_pages, 3);
        assert!(!meta.has_next);
    }

    #[test]
    fn test_pagination_meta_empty_result() {
        let meta = PaginationMeta::new(0, 1, 10);
        assert_eq!(meta.total_pages, 0);
        assert!(!meta.has_next);
        assert!(!meta.has_prev);
    }

    #[test]
    fn test_pagination_meta_serializes_camel_case() {
        let meta = PaginationMeta::new(25, 2, 10);
        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(value["totalPages"], 3);
        assert_eq!(value["hasNext"], true);
        assert_eq!(value["hasPrev"], true);
    }

    #[test]
    fn test_paginated_response_shape() {
        let response = PaginatedResponse::new(vec!["a", "b"], 25, 2, 10);
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["data"].as_array().unwrap().len(), 2);
        assert_eq!(value["pagination"]["page"], 2);
    }
}
