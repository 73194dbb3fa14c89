//! Result File Handler
//!
//! `GET /results/*path`：流式返回已落盘的音频或图片

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
};
use tokio_util::io::ReaderStream;

use crate::application::GetResultFile;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 读取结果文件
///
/// 路径相对于结果根目录，任何失败（不存在、越界）都返回 404
pub async fn get_result_file(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> Result<Response, ApiError> {
    let resolved = state
        .get_result_file_handler
        .handle(GetResultFile { path })
        .await
        .map_err(ApiError::retrieval)?;

    let file = tokio::fs::File::open(&resolved.path)
        .await
        .map_err(ApiError::retrieval)?;

    let stream = ReaderStream::new(file);
    let body = Body::from_stream(stream);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, resolved.content_type)
        .header(header::CONTENT_LENGTH, resolved.size)
        .body(body)
        .map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)))
}
