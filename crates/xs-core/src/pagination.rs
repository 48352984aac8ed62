//! Pagination parameters for list endpoints.
//!
//! Both offset-based (`limit` + `offset`) and page-based (`limit` + `page`)
//! pagination are accepted. When `page` is present it wins over `offset`.
//! Empty query values (`?limit=`) are treated as absent.

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

fn deserialize_optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s.trim().parse::<i64>().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Metadata attached to every paginated response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaginationMeta {
    /// Total number of matching items across all pages
    pub total: i64,
    pub limit: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    pub has_more: bool,
}

impl PaginationMeta {
    pub fn new(params: &PaginationParams, total: i64) -> Self {
        let limit = params.limit();
        let offset = params.offset();
        let page = params.page();
        Self {
            total,
            limit,
            offset: if page.is_some() { None } else { Some(offset) },
            page,
            has_more: offset.saturating_add(limit) < total,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
pub struct PaginationParams {
    /// Maximum number of items to return (1-100, default: 10)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub limit: Option<i64>,
    /// Number of items to skip (ignored when `page` is set)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub offset: Option<i64>,
    /// Page number, 1-indexed
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
}

impl PaginationParams {
    #[must_use]
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    #[must_use]
    pub fn offset(&self) -> i64 {
        match self.page() {
            Some(page) => (page - 1).saturating_mul(self.limit()),
            None => self.offset.unwrap_or(0).max(0),
        }
    }

    #[must_use]
    pub fn page(&self) -> Option<i64> {
        self.page.map(|p| p.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(limit: Option<i64>, offset: Option<i64>, page: Option<i64>) -> PaginationParams {
        PaginationParams {
            limit,
            offset,
            page,
        }
    }

    #[test]
    fn test_defaults() {
        let p = PaginationParams::default();
        assert_eq!(p.limit(), 10);
        assert_eq!(p.offset(), 0);
        assert_eq!(p.page(), None);
    }

    #[test]
    fn test_limit_is_clamped() {
        assert_eq!(params(Some(0), None, None).limit(), 1);
        assert_eq!(params(Some(-5), None, None).limit(), 1);
        assert_eq!(params(Some(150), None, None).limit(), 100);
    }

    #[test]
    fn test_page_takes_precedence_over_offset() {
        let p = params(Some(20), Some(5), Some(3));
        assert_eq!(p.offset(), 40);
    }

    #[test]
    fn test_negative_offset_and_page() {
        assert_eq!(params(Some(10), Some(-5), None).offset(), 0);
        assert_eq!(params(Some(10), None, Some(-2)).offset(), 0);
    }

    #[test]
    fn test_empty_query_values_are_none() {
        let p: PaginationParams =
            serde_json::from_str(r#"{"limit":"","offset":"15","page":null}"#).unwrap();
        assert_eq!(p.limit, None);
        assert_eq!(p.offset, Some(15));
        assert_eq!(p.page, None);
    }

    #[test]
    fn test_meta_for_offset_request() {
        let meta = PaginationMeta::new(&params(Some(10), Some(10), None), 25);
        assert_eq!(meta.offset, Some(10));
        assert_eq!(meta.page, None);
        assert!(meta.has_more);
    }

    #[test]
    fn test_huge_page_and_offset_saturate() {
        let p = params(Some(10), None, Some(i64::MAX));
        assert_eq!(p.offset(), i64::MAX);
        assert!(!PaginationMeta::new(&p, 5).has_more);

        let p = params(Some(10), Some(i64::MAX), None);
        assert_eq!(p.offset(), i64::MAX);
        let meta = PaginationMeta::new(&p, 5);
        assert_eq!(meta.offset, Some(i64::MAX));
        assert!(!meta.has_more);
    }

    #[test]
    fn test_meta_for_last_page() {
        let meta = PaginationMeta::new(&params(Some(10), None, Some(3)), 25);
        assert_eq!(meta.offset, None);
        assert_eq!(meta.page, Some(3));
        assert!(!meta.has_more);
    }
}
