//! File Artifact Store - 文件系统结果存储实现
//!
//! 实现 ArtifactStorePort trait
//!
//! 目录布局: `<root>/result_<N>/{audio_result.wav, image_result.png}`

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::sync::Mutex;

use crate::application::ports::{ArtifactStoreError, ArtifactStorePort, SweepResult};
use crate::domain::result::{ArtifactRole, ResultSlot};

/// 同一进程内槽位目录被其他进程抢先创建时，最多向后尝试的次数
const MAX_ALLOCATION_ATTEMPTS: u32 = 64;

#[cfg(windows)]
const CROSS_DEVICE_ERROR: i32 = 17;
#[cfg(not(windows))]
const CROSS_DEVICE_ERROR: i32 = 18;

/// 文件系统结果存储
pub struct FileArtifactStore {
    /// 结果根目录（已规范化）
    root: PathBuf,
    /// 串行化槽位分配与清理
    slot_lock: Mutex<()>,
}

impl FileArtifactStore {
    /// 创建新的结果存储，根目录不存在时自动创建
    pub async fn new(root: impl AsRef<Path>) -> Result<Self, ArtifactStoreError> {
        let root = root.as_ref();

        fs::create_dir_all(root)
            .await
            .map_err(|e| ArtifactStoreError::IoError(e.to_string()))?;

        let root = fs::canonicalize(root)
            .await
            .map_err(|e| ArtifactStoreError::IoError(e.to_string()))?;

        Ok(Self {
            root,
            slot_lock: Mutex::new(()),
        })
    }

    /// 扫描根目录，返回所有 `result_<N>` 槽位（升序）
    async fn scan_slots(&self) -> Result<Vec<ResultSlot>, ArtifactStoreError> {
        let mut slots = Vec::new();
        let mut entries = fs::read_dir(&self.root)
            .await
            .map_err(|e| ArtifactStoreError::IoError(e.to_string()))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ArtifactStoreError::IoError(e.to_string()))?
        {
            let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
            if !is_dir {
                continue;
            }
            if let Some(slot) = entry.file_name().to_str().and_then(ResultSlot::from_dir_name) {
                slots.push(slot);
            }
        }

        slots.sort();
        Ok(slots)
    }

    /// 只允许普通路径分量，拒绝 `..`、绝对路径和盘符
    fn join_relative(&self, relative_path: &str) -> Result<PathBuf, ArtifactStoreError> {
        let mut path = self.root.clone();
        let mut has_component = false;

        for component in Path::new(relative_path).components() {
            match component {
                Component::Normal(part) => {
                    path.push(part);
                    has_component = true;
                }
                Component::CurDir => {}
                _ => {
                    return Err(ArtifactStoreError::InvalidPath(relative_path.to_string()));
                }
            }
        }

        if !has_component {
            return Err(ArtifactStoreError::InvalidPath(relative_path.to_string()));
        }

        Ok(path)
    }
}

/// 统计目录下文件总大小（单层，槽位目录不嵌套）
async fn dir_size(dir: &Path) -> u64 {
    let mut total = 0;
    if let Ok(mut entries) = fs::read_dir(dir).await {
        while let Ok(Some(entry)) = entries.next_entry().await {
            if let Ok(metadata) = entry.metadata().await {
                if metadata.is_file() {
                    total += metadata.len();
                }
            }
        }
    }
    total
}

/// 删除目录下的文件，保留目录本身
async fn empty_dir(dir: &Path) -> Result<u64, std::io::Error> {
    let mut removed = 0;
    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            fs::remove_file(entry.path()).await?;
            removed += 1;
        }
    }
    Ok(removed)
}

#[async_trait]
impl ArtifactStorePort for FileArtifactStore {
    fn root(&self) -> &Path {
        &self.root
    }

    async fn allocate_next_slot(&self) -> Result<ResultSlot, ArtifactStoreError> {
        let _guard = self.slot_lock.lock().await;

        let mut slot = self
            .scan_slots()
            .await?
            .last()
            .map(ResultSlot::next)
            .unwrap_or_else(|| ResultSlot::new(1));

        for _ in 0..MAX_ALLOCATION_ATTEMPTS {
            // create_dir 而不是 create_dir_all：目录已存在时必须失败
            match fs::create_dir(slot.dir_in(&self.root)).await {
                Ok(()) => {
                    tracing::debug!(slot = %slot, "Allocated result slot");
                    return Ok(slot);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    tracing::warn!(slot = %slot, "Result slot already exists, trying next");
                    slot = slot.next();
                }
                Err(e) => {
                    return Err(ArtifactStoreError::IoError(format!(
                        "Failed to create {}: {}",
                        slot, e
                    )));
                }
            }
        }

        Err(ArtifactStoreError::IoError(format!(
            "No free result slot after {} attempts",
            MAX_ALLOCATION_ATTEMPTS
        )))
    }

    async fn relocate(
        &self,
        source: &Path,
        slot: ResultSlot,
        role: ArtifactRole,
    ) -> Result<PathBuf, ArtifactStoreError> {
        let target = slot.dir_in(&self.root).join(role.file_name());

        match fs::rename(source, &target).await {
            Ok(()) => {}
            // 下载目录与结果目录不在同一文件系统时退化为复制后删除
            Err(e) if e.raw_os_error() == Some(CROSS_DEVICE_ERROR) => {
                fs::copy(source, &target).await.map_err(|e| {
                    ArtifactStoreError::IoError(format!(
                        "Failed to copy {} to {}: {}",
                        source.display(),
                        target.display(),
                        e
                    ))
                })?;
                fs::remove_file(source)
                    .await
                    .map_err(|e| ArtifactStoreError::IoError(e.to_string()))?;
            }
            Err(e) => {
                return Err(ArtifactStoreError::IoError(format!(
                    "Failed to move {} to {}: {}",
                    source.display(),
                    target.display(),
                    e
                )));
            }
        }

        tracing::debug!(
            slot = %slot,
            role = %role,
            path = %target.display(),
            "Artifact stored"
        );

        Ok(target)
    }

    async fn resolve(&self, relative_path: &str) -> Result<PathBuf, ArtifactStoreError> {
        let candidate = self.join_relative(relative_path)?;

        // 规范化以识别指向根目录之外的符号链接
        let resolved = fs::canonicalize(&candidate)
            .await
            .map_err(|_| ArtifactStoreError::NotFound(relative_path.to_string()))?;

        if !resolved.starts_with(&self.root) {
            tracing::warn!(path = %relative_path, "Rejected path outside results root");
            return Err(ArtifactStoreError::InvalidPath(relative_path.to_string()));
        }

        let metadata = fs::metadata(&resolved)
            .await
            .map_err(|_| ArtifactStoreError::NotFound(relative_path.to_string()))?;
        if !metadata.is_file() {
            return Err(ArtifactStoreError::NotFound(relative_path.to_string()));
        }

        Ok(resolved)
    }

    async fn sweep_older_than(&self, max_age: Duration) -> Result<SweepResult, ArtifactStoreError> {
        let _guard = self.slot_lock.lock().await;

        let max_age = chrono::Duration::from_std(max_age)
            .map_err(|e| ArtifactStoreError::IoError(e.to_string()))?;
        let cutoff = Utc::now() - max_age;

        let slots = self.scan_slots().await?;
        let newest = slots.last().copied();
        let mut result = SweepResult::default();

        for slot in slots {
            let dir = slot.dir_in(&self.root);
            let modified = match fs::metadata(&dir).await.and_then(|m| m.modified()) {
                Ok(modified) => DateTime::<Utc>::from(modified),
                Err(e) => {
                    tracing::warn!(slot = %slot, error = %e, "Failed to stat result slot");
                    continue;
                }
            };
            if modified > cutoff {
                continue;
            }

            let size = dir_size(&dir).await;

            // 最新的槽位只清空不删除，保证编号不会回退
            let outcome = if Some(slot) == newest {
                empty_dir(&dir).await.map(|files| files > 0)
            } else {
                fs::remove_dir_all(&dir).await.map(|()| true)
            };

            match outcome {
                Ok(true) => {
                    result.removed += 1;
                    result.freed_bytes += size;
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(slot = %slot, error = %e, "Failed to remove result slot");
                }
            }
        }

        if result.removed > 0 {
            tracing::info!(
                removed = result.removed,
                freed_bytes = result.freed_bytes,
                cutoff = %cutoff.to_rfc3339(),
                "Swept expired result slots"
            );
        }

        Ok(result)
    }
}
