use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema, Clone, PartialEq)]
pub struct Meta {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

impl Meta {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let pages = if limit > 0 { (total + limit - 1) / limit } else { 0 };
        Self {
            page,
            limit,
            total,
            pages,
        }
    }
}

/// Success envelope shared by every endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Meta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T, pagination: Option<Meta>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: message.into(),
            pagination,
        }
    }

    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: message.into(),
            pagination: None,
        }
    }
}

/// Failure envelope produced by `AppError`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, details: Option<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn meta_rounds_pages_up() {
        assert_eq!(Meta::new(1, 10, 0).pages, 0);
        assert_eq!(Meta::new(1, 10, 10).pages, 1);
        assert_eq!(Meta::new(2, 10, 11).pages, 2);
    }

    #[test]
    fn success_envelope_shape() {
        let body = ApiResponse::success("Ok", json!({"id": 1}), Some(Meta::new(1, 20, 3)));
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            json!({
                "success": true,
                "data": {"id": 1},
                "message": "Ok",
                "pagination": {"page": 1, "limit": 20, "total": 3, "pages": 1}
            })
        );
    }

    #[test]
    fn message_only_envelope_omits_data() {
        let body = ApiResponse::<serde_json::Value>::message_only("Logout successful");
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value, json!({"success": true, "message": "Logout successful"}));
    }

    #[test]
    fn error_envelope_shape() {
        let value =
            serde_json::to_value(ErrorResponse::new("Failed", Some("boom".into()))).unwrap();
        assert_eq!(
            value,
            json!({"success": false, "error": "Failed", "details": "boom"})
        );
    }
}
