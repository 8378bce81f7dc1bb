//! API error-handling module

use std::fmt;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::notification::NotificationError;

/// An error response
#[derive(Debug, Deserialize, Serialize)]
pub struct ErrorResponse {
    /// The error message
    pub error: String,
}

/// An error raised in the API
#[derive(Debug)]
pub struct ApiError {
    /// The status code
    pub status: StatusCode,

    /// The error message
    pub message: String,
}

impl ApiError {
    /// Create a new API error
    #[must_use]
    pub fn new(status: StatusCode, message: &str) -> Self {
        Self {
            status,
            message: message.to_string(),
        }
    }

    /// Create a new bad request error
    #[must_use]
    pub fn new_400(message: &str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Create new internal server error
    #[must_use]
    pub fn new_500(message: &str) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<NotificationError> for ApiError {
    fn from(err: NotificationError) -> Self {
        match &err {
            NotificationError::MissingFields | NotificationError::InvalidAddress { .. } => {
                Self::new_400(&err.to_string())
            }
            NotificationError::InvalidSender(source) => {
                Self::new_500(&format!("{err}: {source}"))
            }
            NotificationError::Delivery(source) => Self::new_500(&source.to_string()),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::new_500(&err.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{body::to_bytes, http::StatusCode, response::IntoResponse};
    use contactline_smtp::{Error, Stage};
    use testresult::TestResult;

    use super::ApiError;
    use crate::notification::NotificationError;

    #[tokio::test]
    async fn test_error_response() -> TestResult {
        let error = ApiError::new_500("Internal server error");

        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(response.into_body(), usize::MAX).await?;
        assert_eq!(body, r#"{"error":"Internal server error"}"#);

        Ok(())
    }

    #[test]
    fn test_missing_fields_is_bad_request() {
        let api_error = ApiError::from(NotificationError::MissingFields);

        assert_eq!(api_error.status, StatusCode::BAD_REQUEST);
        assert_eq!(api_error.message, "Missing required fields");
    }

    #[test]
    fn test_invalid_address_is_bad_request() {
        let api_error = ApiError::from(NotificationError::InvalidAddress {
            field: "email",
            reason: "Address must contain @".to_string(),
        });

        assert_eq!(api_error.status, StatusCode::BAD_REQUEST);
        assert_eq!(api_error.message, "Invalid email address: Address must contain @");
    }

    #[test]
    fn test_delivery_failure_keeps_relay_text() {
        let source = Error::AuthRejected("535 5.7.8 Authentication failed".to_string());
        let api_error = ApiError::from(NotificationError::Delivery(source));

        assert_eq!(api_error.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            api_error.message,
            "SMTP AUTH failed: 535 5.7.8 Authentication failed"
        );
    }

    #[test]
    fn test_timeout_is_internal_error() {
        let api_error = ApiError::from(NotificationError::Delivery(Error::Timeout(Stage::Data)));

        assert_eq!(api_error.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api_error.message, "SMTP DATA command timed out");
    }

    #[test]
    fn test_bad_json_is_internal_error() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let api_error = ApiError::from(err);

        assert_eq!(api_error.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
