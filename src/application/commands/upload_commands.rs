//! Upload Commands

use crate::domain::result::StoredArtifacts;
use crate::domain::upload::UploadedFile;

/// 上传并合成命令
///
/// file 与 text 都是可选的，缺失由处理器判定为校验失败
#[derive(Debug, Clone, Default)]
pub struct ProcessUpload {
    pub file: Option<UploadedFile>,
    pub text: Option<String>,
}

/// 上传并合成响应
#[derive(Debug, Clone)]
pub struct ProcessUploadResponse {
    /// 清洗后的文件名
    pub filename: String,
    /// 落盘的结果
    pub artifacts: StoredArtifacts,
    /// 远程服务返回的文本
    pub text_result: String,
}

/// 流水线阶段
///
/// `Received → Validated → Staged → Synthesized → Stored → Responded`，任一阶段失败即终止
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Received,
    Validated,
    Staged,
    Synthesized,
    Stored,
    Responded,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Received => "received",
            Self::Validated => "validated",
            Self::Staged => "staged",
            Self::Synthesized => "synthesized",
            Self::Stored => "stored",
            Self::Responded => "responded",
        };
        write!(f, "{}", name)
    }
}
