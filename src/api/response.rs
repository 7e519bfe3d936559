//! Response envelope and error mapping
//!
//! Every JSON endpoint answers `{ success, message?, data?, error? }`.

use crate::domain::AdminError;
use axum::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// JSON envelope shared by all API responses
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 200 with `success: true`
pub fn success<T: Serialize>(message: impl Into<String>, data: Option<T>) -> Response {
    Json(Envelope {
        success: true,
        message: Some(message.into()),
        data,
        error: None,
    })
    .into_response()
}

/// Failed request, rendered as `success: false`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub error: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            error: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Attach the underlying error text
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.error = Some(detail.into());
        self
    }

    /// Replace the status code
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }
}

impl From<AdminError> for ApiError {
    fn from(error: AdminError) -> Self {
        match &error {
            AdminError::Validation(msg) => ApiError::bad_request(msg.clone()),
            AdminError::Authentication(msg) => ApiError::new(StatusCode::FORBIDDEN, msg.clone()),
            AdminError::Connection(failure) => {
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, failure.kind.user_message())
                    .with_detail(failure.detail.clone())
            }
            AdminError::Database(detail) | AdminError::Timeout(detail) => ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Lỗi khi thực thi trên cơ sở dữ liệu",
            )
            .with_detail(detail.clone()),
            other => ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Lỗi máy chủ")
                .with_detail(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Envelope::<()> {
            success: false,
            message: Some(self.message),
            data: None,
            error: self.error,
        };
        (self.status, Json(body)).into_response()
    }
}

/// `Json` extractor whose rejections use the envelope
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                tracing::debug!(error = %rejection.body_text(), "Rejected request body");
                Err(rejection_error(&rejection))
            }
        }
    }
}

fn rejection_error(rejection: &JsonRejection) -> ApiError {
    let message = match rejection {
        JsonRejection::MissingJsonContentType(_) => "Yêu cầu phải có Content-Type: application/json",
        _ => "Dữ liệu gửi lên không đúng định dạng JSON",
    };
    ApiError::bad_request(message).with_detail(rejection.body_text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConnectionFailure;

    #[test]
    fn test_connection_failure_maps_to_500_with_detail() {
        let err: ApiError =
            AdminError::from(ConnectionFailure::from_message("Login failed for user 'sa'.")).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Tên đăng nhập hoặc mật khẩu không đúng.");
        assert_eq!(err.error.as_deref(), Some("Login failed for user 'sa'."));
    }

    #[test]
    fn test_validation_maps_to_400() {
        let err: ApiError = AdminError::Validation("thiếu".to_string()).into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.error, None);
    }

    #[test]
    fn test_envelope_omits_empty_fields() {
        let body = serde_json::to_value(Envelope::<()> {
            success: false,
            message: Some("x".to_string()),
            data: None,
            error: None,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"success": false, "message": "x"}));
    }
}
