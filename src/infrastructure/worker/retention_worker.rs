//! Retention Worker - 上传与结果的定期清理

use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{ArtifactStorePort, SweepResult, UploadStagingPort};

/// Worker 配置
#[derive(Debug, Clone)]
pub struct RetentionWorkerConfig {
    /// 两次清理之间的间隔
    pub interval: Duration,
    /// 超过该时长未修改的上传和结果会被删除
    pub max_age: Duration,
}

impl Default for RetentionWorkerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3600),
            max_age: Duration::from_secs(7 * 24 * 3600),
        }
    }
}

/// 一轮清理的汇总
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetentionReport {
    pub uploads: SweepResult,
    /// 合成失败后遗留在下载目录中的输出
    pub downloads: SweepResult,
    pub results: SweepResult,
}

/// 保留策略 Worker
///
/// 按固定间隔清理上传暂存区、下载目录和结果目录；单轮失败只记录日志，不会终止循环
///
/// 下载目录与暂存区同为平铺目录，复用同一个端口
pub struct RetentionWorker {
    config: RetentionWorkerConfig,
    staging: Arc<dyn UploadStagingPort>,
    downloads: Arc<dyn UploadStagingPort>,
    artifact_store: Arc<dyn ArtifactStorePort>,
}

impl RetentionWorker {
    pub fn new(
        config: RetentionWorkerConfig,
        staging: Arc<dyn UploadStagingPort>,
        downloads: Arc<dyn UploadStagingPort>,
        artifact_store: Arc<dyn ArtifactStorePort>,
    ) -> Self {
        Self {
            config,
            staging,
            downloads,
            artifact_store,
        }
    }

    /// 启动 Worker
    pub async fn run(self) {
        tracing::info!(
            interval_secs = self.config.interval.as_secs(),
            max_age_secs = self.config.max_age.as_secs(),
            "RetentionWorker started"
        );

        let mut interval = tokio::time::interval(self.config.interval);
        // 第一次 tick 立即返回，启动时先清理一轮
        loop {
            interval.tick().await;
            self.sweep_once().await;
        }
    }

    /// 执行一轮清理
    pub async fn sweep_once(&self) -> RetentionReport {
        let mut report = RetentionReport::default();

        match self.staging.sweep_older_than(self.config.max_age).await {
            Ok(result) => report.uploads = result,
            Err(e) => tracing::error!(error = %e, "Failed to sweep uploads"),
        }

        match self.downloads.sweep_older_than(self.config.max_age).await {
            Ok(result) => report.downloads = result,
            Err(e) => tracing::error!(error = %e, "Failed to sweep downloads"),
        }

        match self
            .artifact_store
            .sweep_older_than(self.config.max_age)
            .await
        {
            Ok(result) => report.results = result,
            Err(e) => tracing::error!(error = %e, "Failed to sweep results"),
        }

        let freed_bytes = report.uploads.freed_bytes
            + report.downloads.freed_bytes
            + report.results.freed_bytes;
        if report.uploads.removed + report.downloads.removed + report.results.removed > 0 {
            tracing::info!(
                uploads_removed = report.uploads.removed,
                downloads_removed = report.downloads.removed,
                results_removed = report.results.removed,
                freed_bytes,
                "Retention sweep completed"
            );
        } else {
            tracing::debug!("Retention sweep found nothing to remove");
        }

        report
    }
}
