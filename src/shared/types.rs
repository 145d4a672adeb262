use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::shared::constants::DEFAULT_LIST_LIMIT;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub meta: Option<Meta>,
    pub errors: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Meta {
    pub total: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

impl Meta {
    pub fn total(total: i64) -> Self {
        Self { total, limit: None }
    }

    pub fn with_limit(total: i64, limit: Option<i64>) -> Self {
        Self { total, limit }
    }
}

/// Resolves an optional `limit` query value.
///
/// Absent means unbounded; zero or negative values fall back to
/// [`DEFAULT_LIST_LIMIT`].
pub fn resolve_limit(limit: Option<i64>) -> Option<i64> {
    limit.map(|l| if l > 0 { l } else { DEFAULT_LIST_LIMIT })
}

/// Reads a `limit` query value without ever rejecting the request. Text that
/// is not a number becomes 0, which [`resolve_limit`] turns into the default.
pub fn deserialize_limit<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.map(|value| value.trim().parse().unwrap_or(0)))
}

impl<T> ApiResponse<T> {
    pub fn success(data: Option<T>, message: Option<String>, meta: Option<Meta>) -> Self {
        Self {
            success: true,
            data,
            message,
            meta,
            errors: None,
        }
    }

    pub fn error(message: Option<String>, errors: Option<Vec<String>>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message,
            meta: None,
            errors,
        }
    }
}

/// Shorthand for the `{ message: "ok" }` acknowledgement used by action endpoints
pub fn ok_message() -> ApiResponse<()> {
    ApiResponse::success(None, Some("ok".to_string()), None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;

    #[test]
    fn test_resolve_limit() {
        assert_eq!(resolve_limit(None), None);
        assert_eq!(resolve_limit(Some(20)), Some(20));
        assert_eq!(resolve_limit(Some(0)), Some(DEFAULT_LIST_LIMIT));
        assert_eq!(resolve_limit(Some(-3)), Some(DEFAULT_LIST_LIMIT));
    }

    #[test]
    fn test_meta_skips_missing_limit() {
        let json = serde_json::to_value(Meta::total(3)).unwrap();
        assert_eq!(json, serde_json::json!({ "total": 3 }));
    }

    #[derive(Debug, Deserialize)]
    struct LimitQuery {
        #[serde(default, deserialize_with = "deserialize_limit")]
        limit: Option<i64>,
    }

    fn limit_of(query: &str) -> Option<i64> {
        let uri: axum::http::Uri = format!("/api/places?{}", query).parse().unwrap();
        let Query(parsed) = Query::<LimitQuery>::try_from_uri(&uri).unwrap();
        resolve_limit(parsed.limit)
    }

    #[test]
    fn test_unparsable_limit_falls_back_to_default() {
        assert_eq!(limit_of(""), None);
        assert_eq!(limit_of("limit=25"), Some(25));
        assert_eq!(limit_of("limit=abc"), Some(DEFAULT_LIST_LIMIT));
        assert_eq!(limit_of("limit=-1"), Some(DEFAULT_LIST_LIMIT));
    }
}
