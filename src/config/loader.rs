//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `VOXGATE_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `VOXGATE_SERVER__PORT=8080`
/// - `VOXGATE_TTS__URL=http://127.0.0.1:7860`
/// - `VOXGATE_TTS__HF_TOKEN=hf_xxx`
/// - `VOXGATE_STORAGE__RESULTS_DIR=/data/results`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5000)?
        .set_default("server.static_dir", "static")?
        .set_default("server.max_body_bytes", 50 * 1024 * 1024)?
        .set_default("tts.url", "https://mrfakename-e2-f5-tts.hf.space")?
        .set_default("tts.api_prefix", "/gradio_api")?
        .set_default("tts.api_name", "/basic_tts")?
        .set_default("storage.uploads_dir", "uploads")?
        .set_default("storage.results_dir", "results")?
        .set_default("storage.download_dir", "data/tmp")?
        .set_default("gc.enabled", false)?
        .set_default("gc.interval_secs", 3600)?
        .set_default("gc.max_age_secs", 7 * 24 * 3600)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    // 例如: VOXGATE_TTS__URL=http://127.0.0.1:7860
    builder = builder.add_source(
        Environment::with_prefix("VOXGATE")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.tts.url.is_empty() {
        return Err(ConfigError::ValidationError(
            "TTS URL cannot be empty".to_string(),
        ));
    }

    if !config.tts.url.starts_with("http://") && !config.tts.url.starts_with("https://") {
        return Err(ConfigError::ValidationError(format!(
            "TTS URL must be http(s): {}",
            config.tts.url
        )));
    }

    if !config.tts.api_name.starts_with('/') {
        return Err(ConfigError::ValidationError(
            "TTS api_name must start with '/'".to_string(),
        ));
    }

    config
        .tts
        .params()
        .validate()
        .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

    let dirs = [
        ("storage.uploads_dir", &config.storage.uploads_dir),
        ("storage.results_dir", &config.storage.results_dir),
        ("storage.download_dir", &config.storage.download_dir),
    ];
    for (key, dir) in dirs {
        if dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be empty",
                key
            )));
        }
    }

    // 验证 GC 配置
    if config.gc.enabled && config.gc.interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "GC interval cannot be 0 when GC is enabled".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!("Static Directory: {:?}", config.server.static_dir);
    tracing::info!("TTS URL: {}{}", config.tts.url, config.tts.api_prefix);
    tracing::info!("TTS Endpoint: {}", config.tts.api_name);
    match config.tts.timeout_secs {
        Some(secs) => tracing::info!("TTS Timeout: {}s", secs),
        None => tracing::info!("TTS Timeout: none"),
    }
    tracing::info!("TTS Token: {}", if config.tts.hf_token.is_some() { "set" } else { "unset" });
    tracing::info!("Uploads Directory: {:?}", config.storage.uploads_dir);
    tracing::info!("Results Directory: {:?}", config.storage.results_dir);
    tracing::info!("GC Enabled: {}", config.gc.enabled);
    if config.gc.enabled {
        tracing::info!("GC Interval: {}s", config.gc.interval_secs);
        tracing::info!("GC Max Age: {}s", config.gc.max_age_secs);
    }
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
