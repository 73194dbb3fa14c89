//! Synthesis Engine Port - 远程 TTS 合成抽象
//!
//! 定义远程合成服务的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::synthesis::SynthesisResult;

/// 合成错误
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// 合成请求
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    /// 本地参考音频路径
    pub reference_audio: PathBuf,
    /// 参考音频对应的文本
    pub reference_text: String,
    /// 需要合成的文本
    pub gen_text: String,
}

impl SynthesisRequest {
    /// 参考文本与合成文本使用同一个字符串
    pub fn with_shared_text(reference_audio: PathBuf, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            reference_audio,
            reference_text: text.clone(),
            gen_text: text,
        }
    }
}

/// Synthesis Engine Port
///
/// 调用方会一直等待直到远程服务返回或出错，不做重试
#[async_trait]
pub trait SynthesisEnginePort: Send + Sync {
    /// 执行一次远程合成，返回下载到本地的音频、图片路径和生成文本
    async fn synthesize(&self, request: SynthesisRequest) -> Result<SynthesisResult, SynthesisError>;

    /// 检查远程服务是否可用
    async fn health_check(&self) -> bool {
        true
    }
}
