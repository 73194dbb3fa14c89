//! Artifact Store Port - 出站端口
//!
//! 结果槽位分配、产物落盘、按相对路径读取

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::domain::result::{ArtifactRole, ResultSlot};

/// 结果存储错误
#[derive(Debug, Error)]
pub enum ArtifactStoreError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// 清理结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepResult {
    /// 删除的条目数（槽位目录或文件）
    pub removed: u64,
    /// 释放的空间（字节）
    pub freed_bytes: u64,
}

/// Artifact Store Port - 出站端口
#[async_trait]
pub trait ArtifactStorePort: Send + Sync {
    /// 结果根目录
    fn root(&self) -> &Path;

    /// 分配下一个结果槽位并创建目录
    async fn allocate_next_slot(&self) -> Result<ResultSlot, ArtifactStoreError>;

    /// 将合成产物移动（而非复制）到槽位中，返回落盘路径
    async fn relocate(
        &self,
        source: &Path,
        slot: ResultSlot,
        role: ArtifactRole,
    ) -> Result<PathBuf, ArtifactStoreError>;

    /// 将相对路径解析为结果根目录内的现有文件
    ///
    /// 任何越出根目录的路径都返回 NotFound
    async fn resolve(&self, relative_path: &str) -> Result<PathBuf, ArtifactStoreError>;

    /// 删除修改时间早于 `max_age` 的槽位
    async fn sweep_older_than(&self, max_age: Duration) -> Result<SweepResult, ArtifactStoreError>;
}
