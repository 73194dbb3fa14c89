//! Application State
//!
//! 包含端口与 Command/Query Handlers 的应用状态

use std::sync::Arc;

use crate::application::{
    ArtifactStorePort, GetResultFileHandler, ProcessUploadHandler, SynthesisEnginePort,
    UploadStagingPort,
};

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub synthesis_engine: Arc<dyn SynthesisEnginePort>,

    // ========== Command Handlers ==========
    pub process_upload_handler: ProcessUploadHandler,

    // ========== Query Handlers ==========
    pub get_result_file_handler: GetResultFileHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        staging: Arc<dyn UploadStagingPort>,
        synthesis_engine: Arc<dyn SynthesisEnginePort>,
        artifact_store: Arc<dyn ArtifactStorePort>,
    ) -> Self {
        Self {
            synthesis_engine: synthesis_engine.clone(),

            process_upload_handler: ProcessUploadHandler::new(
                staging,
                synthesis_engine,
                artifact_store.clone(),
            ),

            get_result_file_handler: GetResultFileHandler::new(artifact_store),
        }
    }
}
