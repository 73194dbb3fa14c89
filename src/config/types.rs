//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::synthesis::SynthesisParams;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 远程 TTS 服务配置
    #[serde(default)]
    pub tts: TtsConfig,

    /// 存储配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// 保留策略配置
    #[serde(default)]
    pub gc: GcConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 落地页等静态文件目录，`GET /` 返回其中的 index.html
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,

    /// 请求体大小上限（字节）
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}

fn default_max_body_bytes() -> usize {
    50 * 1024 * 1024 // 50 MB
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

/// 远程 TTS 服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct TtsConfig {
    /// Gradio 服务基础 URL
    #[serde(default = "default_tts_url")]
    pub url: String,

    /// Gradio API 路径前缀
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// 端点名称
    #[serde(default = "default_api_name")]
    pub api_name: String,

    /// 请求超时时间（秒），不设置则一直等待
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Hugging Face 访问令牌
    #[serde(default)]
    pub hf_token: Option<String>,

    /// 是否去除静音
    #[serde(default)]
    pub remove_silence: bool,

    /// 交叉淡化时长（秒）
    #[serde(default = "default_cross_fade")]
    pub cross_fade_duration: f64,

    /// NFE 步数
    #[serde(default = "default_nfe_steps")]
    pub nfe_steps: u32,

    /// 语速倍率
    #[serde(default = "default_speed")]
    pub speed: f64,
}

fn default_tts_url() -> String {
    "https://mrfakename-e2-f5-tts.hf.space".to_string()
}

fn default_api_prefix() -> String {
    "/gradio_api".to_string()
}

fn default_api_name() -> String {
    "/basic_tts".to_string()
}

fn default_cross_fade() -> f64 {
    0.15
}

fn default_nfe_steps() -> u32 {
    32
}

fn default_speed() -> f64 {
    1.0
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            url: default_tts_url(),
            api_prefix: default_api_prefix(),
            api_name: default_api_name(),
            timeout_secs: None,
            hf_token: None,
            remove_silence: false,
            cross_fade_duration: default_cross_fade(),
            nfe_steps: default_nfe_steps(),
            speed: default_speed(),
        }
    }
}

impl TtsConfig {
    /// 合成参数
    pub fn params(&self) -> SynthesisParams {
        SynthesisParams {
            remove_silence: self.remove_silence,
            cross_fade_duration: self.cross_fade_duration,
            nfe_steps: self.nfe_steps,
            speed: self.speed,
        }
    }
}

/// 存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// 上传暂存目录
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: PathBuf,

    /// 结果根目录
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,

    /// 远程输出下载目录
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,
}

fn default_uploads_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("results")
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("data/tmp")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            uploads_dir: default_uploads_dir(),
            results_dir: default_results_dir(),
            download_dir: default_download_dir(),
        }
    }
}

/// 保留策略（GC）配置
///
/// 默认关闭：上传和结果永久保留
#[derive(Debug, Clone, Deserialize)]
pub struct GcConfig {
    /// 是否启用自动清理
    #[serde(default)]
    pub enabled: bool,

    /// 清理间隔（秒）
    #[serde(default = "default_gc_interval")]
    pub interval_secs: u64,

    /// 保留时长（秒），早于此时间的上传和结果会被删除
    #[serde(default = "default_max_age")]
    pub max_age_secs: u64,
}

fn default_gc_interval() -> u64 {
    3600 // 1 小时
}

fn default_max_age() -> u64 {
    7 * 24 * 3600 // 7 天
}

impl Default for GcConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_secs: default_gc_interval(),
            max_age_secs: default_max_age(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
