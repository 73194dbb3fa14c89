//! Upload Handler
//!
//! `POST /api/upload`：multipart `file` + `text`

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};

use crate::application::ProcessUpload;
use crate::domain::upload::UploadedFile;
use crate::infrastructure::http::dto::UploadResponse;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 上传参考音频与文本，同步完成远程合成
pub async fn upload(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let command = read_upload_form(multipart).await?;

    let response = state
        .process_upload_handler
        .handle(command)
        .await
        .map_err(ApiError::processing)?;

    Ok(Json(response.into()))
}

/// 读取表单：`file` 取文件名和内容，`text` 取文本，其余字段忽略
///
/// 没有 filename 属性的 `file` 按普通表单字段处理，等同于未上传文件；
/// `filename=""` 则保留为空文件名
async fn read_upload_form(mut multipart: Multipart) -> Result<ProcessUpload, ApiError> {
    let mut command = ProcessUpload::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            "file" => {
                let Some(filename) = field.file_name().map(str::to_string) else {
                    tracing::debug!("Ignoring file field without filename");
                    continue;
                };
                let data = field.bytes().await.map_err(multipart_error)?;
                command.file = Some(UploadedFile::new(filename, data.to_vec()));
            }
            "text" => {
                command.text = Some(field.text().await.map_err(multipart_error)?);
            }
            other => {
                tracing::debug!(field = %other, "Ignoring unknown multipart field");
            }
        }
    }

    Ok(command)
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(format!("Error processing file: {}", e.body_text()))
    } else {
        ApiError::BadRequest(format!("Failed to read multipart field: {}", e.body_text()))
    }
}
