//! File Upload Staging - 上传暂存目录实现
//!
//! 实现 UploadStagingPort trait，平铺目录 `<dir>/<filename>`

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

use crate::application::ports::{StagingError, SweepResult, UploadStagingPort};

/// 文件系统上传暂存
pub struct FileUploadStaging {
    dir: PathBuf,
}

impl FileUploadStaging {
    /// 创建暂存目录
    pub async fn new(dir: impl AsRef<Path>) -> Result<Self, StagingError> {
        let dir = dir.as_ref().to_path_buf();

        fs::create_dir_all(&dir)
            .await
            .map_err(|e| StagingError::IoError(e.to_string()))?;

        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// 暂存文件名必须是单个普通路径分量
fn is_plain_file_name(filename: &str) -> bool {
    !filename.is_empty()
        && filename != "."
        && filename != ".."
        && !filename.contains(['/', '\\'])
}

#[async_trait]
impl UploadStagingPort for FileUploadStaging {
    async fn stage(&self, filename: &str, data: &[u8]) -> Result<PathBuf, StagingError> {
        if !is_plain_file_name(filename) {
            return Err(StagingError::InvalidFilename(filename.to_string()));
        }

        let path = self.dir.join(filename);

        fs::write(&path, data)
            .await
            .map_err(|e| StagingError::IoError(format!("{}: {}", path.display(), e)))?;

        tracing::debug!(
            path = %path.display(),
            size = data.len(),
            "Upload staged"
        );

        Ok(path)
    }

    async fn sweep_older_than(&self, max_age: Duration) -> Result<SweepResult, StagingError> {
        let max_age = chrono::Duration::from_std(max_age)
            .map_err(|e| StagingError::IoError(e.to_string()))?;
        let cutoff = Utc::now() - max_age;

        let mut result = SweepResult::default();
        let mut entries = fs::read_dir(&self.dir)
            .await
            .map_err(|e| StagingError::IoError(e.to_string()))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StagingError::IoError(e.to_string()))?
        {
            let metadata = match entry.metadata().await {
                Ok(metadata) if metadata.is_file() => metadata,
                _ => continue,
            };
            let modified = match metadata.modified() {
                Ok(modified) => DateTime::<Utc>::from(modified),
                Err(_) => continue,
            };
            if modified > cutoff {
                continue;
            }

            match fs::remove_file(entry.path()).await {
                Ok(()) => {
                    result.removed += 1;
                    result.freed_bytes += metadata.len();
                }
                Err(e) => {
                    tracing::warn!(
                        path = %entry.path().display(),
                        error = %e,
                        "Failed to remove staged upload"
                    );
                }
            }
        }

        if result.removed > 0 {
            tracing::info!(
                removed = result.removed,
                freed_bytes = result.freed_bytes,
                "Swept expired uploads"
            );
        }

        Ok(result)
    }
}
