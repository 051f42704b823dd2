use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

const MAX_LIMIT: i64 = 100;

#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    #[serde(alias = "per_page")]
    pub limit: Option<i64>,
}

impl Pagination {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self { page, limit }
    }

    /// Returns `(page, limit, offset)` with `limit` clamped to `1..=100`.
    /// A page whose offset does not fit in an `i64` is rejected.
    pub fn normalize(&self, default_limit: i64) -> AppResult<(i64, i64, i64)> {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self.limit.unwrap_or(default_limit).clamp(1, MAX_LIMIT);
        let offset = (page - 1)
            .checked_mul(limit)
            .ok_or_else(|| AppError::BadRequest("Page is out of range".into()))?;
        Ok((page, limit, offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_absent() {
        assert_eq!(Pagination::default().normalize(10).unwrap(), (1, 10, 0));
        assert_eq!(Pagination::default().normalize(20).unwrap(), (1, 20, 0));
    }

    #[test]
    fn computes_offset_from_page() {
        assert_eq!(Pagination::new(Some(3), Some(10)).normalize(20).unwrap(), (3, 10, 20));
    }

    #[test]
    fn clamps_out_of_range_values() {
        assert_eq!(Pagination::new(Some(0), Some(0)).normalize(10).unwrap(), (1, 1, 0));
        assert_eq!(Pagination::new(Some(-4), Some(1000)).normalize(10).unwrap(), (1, 100, 0));
    }

    #[test]
    fn accepts_per_page_alias() {
        let parsed: Pagination = serde_json::from_str(r#"{"page": 2, "per_page": 5}"#).unwrap();
        assert_eq!(parsed.normalize(10).unwrap(), (2, 5, 5));
    }

    #[test]
    fn huge_page_is_rejected_instead_of_overflowing() {
        let err = Pagination::new(Some(i64::MAX), Some(100)).normalize(10).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(ref msg) if msg == "Page is out of range"));

        let last = i64::MAX / 100 + 1;
        assert_eq!(
            Pagination::new(Some(last), Some(100)).normalize(10).unwrap(),
            (last, 100, (last - 1) * 100)
        );
    }
}
