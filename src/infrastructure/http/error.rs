//! HTTP Error Handling
//!
//! 应用层错误到 `{"error": "..."}` 响应的唯一转换点

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::ApplicationError;

/// 统一错误响应格式
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    PayloadTooLarge(String),
    Internal(String),
}

impl ApiError {
    /// 上传流水线失败
    ///
    /// 校验错误原样返回 400，其余统一包装为 `Error processing file: ...`
    pub fn processing(err: ApplicationError) -> Self {
        match err {
            ApplicationError::ValidationError(msg) => ApiError::BadRequest(msg),
            other => ApiError::Internal(format!("Error processing file: {}", other)),
        }
    }

    /// 结果文件读取失败，一律 404
    pub fn retrieval(err: impl std::fmt::Display) -> Self {
        ApiError::NotFound(format!("Error retrieving result file: {}", err))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::PayloadTooLarge(msg)
            | ApiError::Internal(msg) => msg,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Internal(msg) => {
                tracing::error!(status = status.as_u16(), error = %msg, "Internal server error");
            }
            ApiError::NotFound(msg) => {
                tracing::warn!(status = status.as_u16(), error = %msg, "Resource not found");
            }
            ApiError::BadRequest(msg) | ApiError::PayloadTooLarge(msg) => {
                tracing::warn!(status = status.as_u16(), error = %msg, "Bad request");
            }
        }

        (status, Json(ErrorResponse::new(self.message()))).into_response()
    }
}
