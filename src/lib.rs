//! voxgate - E2/F5-TTS 网关
//!
//! 接收参考音频和文本，转发给远程 Gradio TTS 服务，把合成的音频和频谱图
//! 保存在按序编号的结果目录中并对外提供访问。
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Upload Context: 上传校验、文件名清洗
//! - Synthesis Context: 合成参数与结果
//! - Result Context: 结果槽位与产物命名
//!
//! 应用层 (application/):
//! - Ports: SynthesisEngine, ArtifactStore, UploadStaging
//! - Commands: 上传 → 合成 → 落盘流水线
//! - Queries: 结果文件读取
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: axum 路由、错误映射、落地页
//! - Adapters: Gradio 客户端、文件系统存储
//! - Worker: 保留策略清理

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
