//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod artifact_store;
mod synthesis_engine;
mod upload_staging;

pub use artifact_store::{ArtifactStoreError, ArtifactStorePort, SweepResult};
pub use synthesis_engine::{SynthesisEnginePort, SynthesisError, SynthesisRequest};
pub use upload_staging::{StagingError, UploadStagingPort};
