//! Result Queries - 结果文件查询

use std::path::PathBuf;

/// 获取结果文件查询
#[derive(Debug, Clone)]
pub struct GetResultFile {
    /// 相对于结果根目录的路径，例如 `result_1/audio_result.wav`
    pub path: String,
}

/// 获取结果文件响应
#[derive(Debug, Clone)]
pub struct GetResultFileResponse {
    /// 结果根目录内的绝对路径
    pub path: PathBuf,
    /// 文件大小（字节）
    pub size: u64,
    pub content_type: &'static str,
}
