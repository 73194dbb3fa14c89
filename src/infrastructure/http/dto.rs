//! Data Transfer Objects

use serde::Serialize;

use crate::application::ProcessUploadResponse;

/// 上传成功消息
pub const UPLOAD_SUCCESS_MESSAGE: &str = "File uploaded and processed successfully";

/// `POST /api/upload` 成功响应
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: &'static str,
    /// 清洗后的文件名
    pub filename: String,
    /// 音频的公开路径，如 `/results/result_1/audio_result.wav`
    pub audio_result: String,
    /// 图片的公开路径
    pub image_result: String,
    /// 远程服务返回的文本
    pub text_result: String,
}

impl From<ProcessUploadResponse> for UploadResponse {
    fn from(response: ProcessUploadResponse) -> Self {
        Self {
            message: UPLOAD_SUCCESS_MESSAGE,
            audio_result: response.artifacts.audio_public_path(),
            image_result: response.artifacts.image_public_path(),
            filename: response.filename,
            text_result: response.text_result,
        }
    }
}

/// `GET /api/ping` 响应
#[derive(Debug, Serialize)]
pub struct PingResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// 远程 TTS 服务是否可达
    pub tts: bool,
}
