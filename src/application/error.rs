//! 应用层错误定义
//!
//! 统一的命令/查询错误类型，HTTP 层在唯一的转换点把它映射为状态码和 JSON

use thiserror::Error;

use super::ports::{ArtifactStoreError, StagingError, SynthesisError};

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 客户端请求不合法（400）
    #[error("{0}")]
    ValidationError(String),

    /// 远程合成服务失败或返回了意外结构（500）
    #[error("{0}")]
    UpstreamError(String),

    /// 本地文件系统读写失败（500）
    #[error("{0}")]
    StorageError(String),

    /// 请求的结果文件不存在（404）
    #[error("{0}")]
    NotFound(String),
}

impl ApplicationError {
    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建上游错误
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::UpstreamError(message.into())
    }

    /// 创建存储错误
    pub fn storage(message: impl Into<String>) -> Self {
        Self::StorageError(message.into())
    }

    /// 创建 NotFound 错误
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}

impl From<SynthesisError> for ApplicationError {
    fn from(err: SynthesisError) -> Self {
        Self::UpstreamError(format!("Synthesis failed: {}", err))
    }
}

impl From<StagingError> for ApplicationError {
    fn from(err: StagingError) -> Self {
        Self::StorageError(err.to_string())
    }
}

impl From<ArtifactStoreError> for ApplicationError {
    fn from(err: ArtifactStoreError) -> Self {
        match err {
            ArtifactStoreError::NotFound(msg) => Self::NotFound(format!("File not found: {}", msg)),
            ArtifactStoreError::InvalidPath(msg) => {
                Self::NotFound(format!("Invalid path: {}", msg))
            }
            ArtifactStoreError::IoError(_) => Self::StorageError(err.to_string()),
        }
    }
}
