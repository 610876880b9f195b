use axum::{
    extract::rejection::JsonRejection,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

/// A single failed validation check, pointing at the offending field.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Request-level error taxonomy. Every variant renders as the
/// `{"error": {"message", "code", "details"?}}` envelope.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation {
        message: String,
        details: Vec<FieldError>,
    },
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("No active nutrition plan")]
    NoActivePlan,
    #[error("{0}")]
    Conflict(String),
    #[error("Too many requests. Please wait before creating more meals.")]
    RateLimited { retry_after: i64 },
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(details: Vec<FieldError>) -> Self {
        Self::Validation {
            message: "Validation failed".into(),
            details,
        }
    }

    /// Malformed or undeserializable JSON body.
    pub fn bad_json(rejection: JsonRejection) -> Self {
        Self::Validation {
            message: "Invalid JSON in request body".into(),
            details: vec![FieldError::new("body", rejection.body_text())],
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::NoActivePlan => "NO_ACTIVE_PLAN",
            Self::Conflict(_) => "CONFLICT",
            Self::RateLimited { .. } => "RATE_LIMIT_EXCEEDED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) | Self::NoActivePlan => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    message: String,
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let (message, details) = match &self {
            Self::Validation { message, details } => (
                message.clone(),
                serde_json::to_value(details).ok(),
            ),
            Self::RateLimited { retry_after } => (
                self.to_string(),
                Some(serde_json::json!({ "retry_after": retry_after })),
            ),
            Self::Internal(cause) => {
                error!(error = %cause, "internal error");
                ("Internal server error".to_string(), None)
            }
            other => (other.to_string(), None),
        };

        let mut headers = HeaderMap::new();
        if let Self::RateLimited { retry_after } = &self {
            if let Ok(value) = retry_after.to_string().parse() {
                headers.insert(header::RETRY_AFTER, value);
            }
        }

        let body = ErrorEnvelope {
            error: ErrorDetail {
                message,
                code,
                details,
            },
        };
        (status, headers, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_carries_code_and_message() {
        let body = ErrorEnvelope {
            error: ErrorDetail {
                message: "Validation failed".into(),
                code: "VALIDATION_ERROR",
                details: None,
            },
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains(r#""code":"VALIDATION_ERROR""#));
        assert!(json.contains("Validation failed"));
        assert!(!json.contains("details"));
    }

    #[test]
    fn validation_details_keep_field_paths() {
        let err = ApiError::validation(vec![FieldError::new(
            "ingredients",
            "At least one ingredient is required for ingredient-level meals",
        )]);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn rate_limited_sets_retry_after_header() {
        let response = ApiError::RateLimited { retry_after: 17 }.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers().get(header::RETRY_AFTER).unwrap(),
            "17"
        );
    }

    #[test]
    fn no_active_plan_is_not_found_with_its_own_code() {
        let err = ApiError::NoActivePlan;
        assert_eq!(err.code(), "NO_ACTIVE_PLAN");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
