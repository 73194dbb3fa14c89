//! voxgate - E2/F5-TTS 网关
//!
//! 组装顺序：配置 → 日志 → 存储适配器 → 远程合成客户端 → 保留策略 Worker → HTTP 服务器

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use voxgate::config::{load_config, print_config, AppConfig};
use voxgate::infrastructure::adapters::{
    FileArtifactStore, FileUploadStaging, GradioTtsClient, GradioTtsClientConfig,
};
use voxgate::infrastructure::http::{AppState, HttpServer, ServerConfig};
use voxgate::infrastructure::worker::{RetentionWorker, RetentionWorkerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);

    tracing::info!("voxgate {} starting", env!("CARGO_PKG_VERSION"));
    print_config(&config);

    // 创建上传暂存区和结果存储
    let staging = Arc::new(FileUploadStaging::new(&config.storage.uploads_dir).await?);
    let artifact_store = Arc::new(FileArtifactStore::new(&config.storage.results_dir).await?);

    // 创建远程合成客户端
    let tts_config = GradioTtsClientConfig {
        base_url: config.tts.url.clone(),
        api_prefix: config.tts.api_prefix.clone(),
        api_name: config.tts.api_name.clone(),
        timeout_secs: config.tts.timeout_secs,
        hf_token: config.tts.hf_token.clone(),
        download_dir: config.storage.download_dir.clone(),
        params: config.tts.params(),
    };
    let synthesis_engine = Arc::new(GradioTtsClient::new(tts_config)?);

    // 启动保留策略 Worker（默认关闭）
    if config.gc.enabled {
        let downloads = Arc::new(FileUploadStaging::new(&config.storage.download_dir).await?);
        let worker = RetentionWorker::new(
            RetentionWorkerConfig {
                interval: Duration::from_secs(config.gc.interval_secs),
                max_age: Duration::from_secs(config.gc.max_age_secs),
            },
            staging.clone(),
            downloads,
            artifact_store.clone(),
        );
        tokio::spawn(worker.run());
    }

    // 创建 HTTP 服务器
    let server_config = ServerConfig::new(&config.server.host, config.server.port)
        .with_static_dir(&config.server.static_dir)
        .with_max_body_bytes(config.server.max_body_bytes);
    let state = AppState::new(staging, synthesis_engine, artifact_store);
    let server = HttpServer::new(server_config, state);

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                return;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

/// 初始化日志，`RUST_LOG` 优先于配置中的级别
fn init_tracing(config: &AppConfig) {
    let log_filter = format!(
        "{},voxgate={},tower_http=debug",
        config.log.level, config.log.level
    );
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
