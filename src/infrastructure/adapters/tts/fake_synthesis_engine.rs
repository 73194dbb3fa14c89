//! Fake Synthesis Engine - 用于测试的合成引擎
//!
//! 不调用远程服务，把固定内容写入下载目录后返回

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

use crate::application::ports::{SynthesisEnginePort, SynthesisError, SynthesisRequest};
use crate::domain::synthesis::SynthesisResult;

/// Fake Synthesis Engine 配置
#[derive(Debug, Clone)]
pub struct FakeSynthesisEngineConfig {
    /// 输出文件写入目录
    pub download_dir: PathBuf,
    /// 固定返回的音频内容
    pub audio_bytes: Vec<u8>,
    /// 固定返回的图片内容
    pub image_bytes: Vec<u8>,
    /// 固定返回的文本，None 时回显合成文本
    pub text: Option<String>,
    /// 设置后每次调用都以该信息失败
    pub failure: Option<String>,
}

impl FakeSynthesisEngineConfig {
    pub fn new(download_dir: impl Into<PathBuf>) -> Self {
        Self {
            download_dir: download_dir.into(),
            audio_bytes: b"RIFF fake synthesized audio".to_vec(),
            image_bytes: b"\x89PNG fake spectrogram".to_vec(),
            text: None,
            failure: None,
        }
    }
}

/// Fake Synthesis Engine
pub struct FakeSynthesisEngine {
    config: FakeSynthesisEngineConfig,
    calls: AtomicU32,
    last_request: Mutex<Option<SynthesisRequest>>,
}

impl FakeSynthesisEngine {
    pub fn new(config: FakeSynthesisEngineConfig) -> Self {
        Self {
            config,
            calls: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// 被调用的次数
    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// 最近一次收到的请求
    pub fn last_request(&self) -> Option<SynthesisRequest> {
        self.last_request.lock().ok().and_then(|r| r.clone())
    }

    async fn write_output(&self, ext: &str, data: &[u8]) -> Result<PathBuf, SynthesisError> {
        let path = self
            .config
            .download_dir
            .join(format!("{}.{}", Uuid::new_v4(), ext));
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| SynthesisError::IoError(e.to_string()))?;
        Ok(path)
    }
}

#[async_trait]
impl SynthesisEnginePort for FakeSynthesisEngine {
    async fn synthesize(&self, request: SynthesisRequest) -> Result<SynthesisResult, SynthesisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request.clone());
        }

        tracing::debug!(
            reference = %request.reference_audio.display(),
            text_len = request.gen_text.len(),
            "FakeSynthesisEngine: returning fixed artifacts"
        );

        if let Some(message) = &self.config.failure {
            return Err(SynthesisError::ServiceError(message.clone()));
        }

        tokio::fs::create_dir_all(&self.config.download_dir)
            .await
            .map_err(|e| SynthesisError::IoError(e.to_string()))?;

        let audio_path = self.write_output("wav", &self.config.audio_bytes).await?;
        let image_path = self.write_output("png", &self.config.image_bytes).await?;

        Ok(SynthesisResult {
            audio_path,
            image_path,
            generated_text: self
                .config
                .text
                .clone()
                .unwrap_or_else(|| request.gen_text.clone()),
        })
    }
}
