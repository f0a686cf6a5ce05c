use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::content::FetchError;
use crate::impact::ImpactError;
use crate::store::StoreError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

/// JSON error envelope. Responses built from it also carry a copy in their
/// extensions so the request-id middleware can stamp `traceId` without
/// re-parsing the body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub success: bool,
    pub code: String,
    pub message: String,
    pub trace_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
    pub is_operational: bool,
}

impl AppError {
    pub fn bad_request(code: &str, message: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: code.to_string(),
            message: message.to_string(),
            is_operational: true,
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code: "NOT_FOUND".to_string(),
            message: message.to_string(),
            is_operational: true,
        }
    }

    pub fn bad_gateway(message: &str) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            code: "UPSTREAM_ERROR".to_string(),
            message: message.to_string(),
            is_operational: true,
        }
    }

    pub fn insufficient_storage(message: &str) -> Self {
        Self {
            status: StatusCode::INSUFFICIENT_STORAGE,
            code: "STORAGE_QUOTA_EXCEEDED".to_string(),
            message: message.to_string(),
            is_operational: true,
        }
    }

    pub fn internal(message: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "INTERNAL_ERROR".to_string(),
            message: message.to_string(),
            is_operational: false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let exposed_message = if self.is_operational {
            self.message.clone()
        } else {
            "Internal server error".to_string()
        };

        if self.is_operational {
            tracing::warn!(status = %self.status, code = %self.code, error = %self.message, "API error");
        } else {
            tracing::error!(status = %self.status, code = %self.code, error = %self.message, "Internal API error");
        }

        error_response(
            self.status,
            ErrorBody {
                success: false,
                code: self.code,
                message: exposed_message,
                trace_id: None,
            },
        )
    }
}

pub(crate) fn error_response(status: StatusCode, body: ErrorBody) -> Response {
    let mut response = (status, Json(body.clone())).into_response();
    response.extensions_mut().insert(body);
    response
}

// Validation and quota errors are safe to show; everything else is redacted
// by `IntoResponse`.
impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        match &value {
            StoreError::Validation(msg) => AppError::bad_request("VALIDATION_ERROR", msg),
            StoreError::QuotaExceeded { .. } => AppError::insufficient_storage(&value.to_string()),
            _ => AppError::internal(&value.to_string()),
        }
    }
}

impl From<FetchError> for AppError {
    fn from(value: FetchError) -> Self {
        match &value {
            FetchError::NotFound(_) => AppError::not_found(&value.to_string()),
            FetchError::Config(_) => AppError::internal(&value.to_string()),
            _ => AppError::bad_gateway(&value.to_string()),
        }
    }
}

impl From<ImpactError> for AppError {
    fn from(value: ImpactError) -> Self {
        AppError::bad_request("INVALID_IMPACT_INPUT", &value.to_string())
    }
}

pub fn ok<T: Serialize>(data: T) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(ApiResponse {
            success: true,
            data,
        }),
    )
}
