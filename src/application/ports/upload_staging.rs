//! Upload Staging Port - 出站端口
//!
//! 上传文件的平铺暂存区，以清洗后的文件名为键

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use super::artifact_store::SweepResult;

/// 暂存错误
#[derive(Debug, Error)]
pub enum StagingError {
    #[error("Invalid filename: {0:?}")]
    InvalidFilename(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Upload Staging Port
///
/// 同名文件后写覆盖先写，不做版本管理也不加锁
#[async_trait]
pub trait UploadStagingPort: Send + Sync {
    /// 写入上传内容，返回暂存路径
    ///
    /// `filename` 必须是已清洗的文件名
    async fn stage(&self, filename: &str, data: &[u8]) -> Result<PathBuf, StagingError>;

    /// 删除修改时间早于 `max_age` 的暂存文件
    async fn sweep_older_than(&self, max_age: Duration) -> Result<SweepResult, StagingError>;
}
