//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（SynthesisEngine、ArtifactStore、UploadStaging）
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;

// Re-exports
pub use commands::{
    handlers::ProcessUploadHandler, PipelineStage, ProcessUpload, ProcessUploadResponse,
};

pub use error::ApplicationError;

pub use ports::{
    // Artifact store
    ArtifactStoreError,
    ArtifactStorePort,
    SweepResult,
    // Synthesis engine
    SynthesisEnginePort,
    SynthesisError,
    SynthesisRequest,
    // Upload staging
    StagingError,
    UploadStagingPort,
};

pub use queries::{handlers::GetResultFileHandler, GetResultFile, GetResultFileResponse};
