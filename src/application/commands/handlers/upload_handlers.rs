//! Upload Command Handlers - 上传 → 合成 → 落盘 流水线

use std::sync::Arc;

use crate::application::commands::{PipelineStage, ProcessUpload, ProcessUploadResponse};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    ArtifactStorePort, SynthesisEnginePort, SynthesisRequest, UploadStagingPort,
};
use crate::domain::result::{ArtifactRole, StoredArtifacts};
use crate::domain::upload::{secure_filename, UploadVerdict};

/// ProcessUpload Handler
///
/// 合成成功后才分配槽位；音频移动成功但图片移动失败时不回滚，槽位中只留下音频
pub struct ProcessUploadHandler {
    staging: Arc<dyn UploadStagingPort>,
    synthesis_engine: Arc<dyn SynthesisEnginePort>,
    artifact_store: Arc<dyn ArtifactStorePort>,
}

impl ProcessUploadHandler {
    pub fn new(
        staging: Arc<dyn UploadStagingPort>,
        synthesis_engine: Arc<dyn SynthesisEnginePort>,
        artifact_store: Arc<dyn ArtifactStorePort>,
    ) -> Self {
        Self {
            staging,
            synthesis_engine,
            artifact_store,
        }
    }

    pub async fn handle(
        &self,
        command: ProcessUpload,
    ) -> Result<ProcessUploadResponse, ApplicationError> {
        tracing::debug!(stage = %PipelineStage::Received, "Upload received");

        // Received → Validated
        let verdict = UploadVerdict::classify(command.file.as_ref(), command.text.as_deref());
        if let Some(message) = verdict.rejection_message() {
            tracing::warn!(verdict = ?verdict, "Upload rejected");
            return Err(ApplicationError::validation(message));
        }
        let (Some(file), Some(text)) = (command.file, command.text) else {
            return Err(ApplicationError::validation("File or text input missing"));
        };
        tracing::debug!(
            stage = %PipelineStage::Validated,
            original_filename = %file.filename,
            size = file.data.len(),
            "Upload validated"
        );

        // Validated → Staged
        let filename = secure_filename(&file.filename);
        let staged_path = self.staging.stage(&filename, &file.data).await?;
        tracing::debug!(
            stage = %PipelineStage::Staged,
            path = %staged_path.display(),
            "Upload staged"
        );

        // Staged → Synthesized
        let request = SynthesisRequest::with_shared_text(staged_path, text);
        let result = self.synthesis_engine.synthesize(request).await?;
        tracing::debug!(
            stage = %PipelineStage::Synthesized,
            audio = %result.audio_path.display(),
            image = %result.image_path.display(),
            "Synthesis completed"
        );

        // Synthesized → Stored
        let slot = self.artifact_store.allocate_next_slot().await?;
        let audio_path = self
            .artifact_store
            .relocate(&result.audio_path, slot, ArtifactRole::Audio)
            .await?;
        let image_path = self
            .artifact_store
            .relocate(&result.image_path, slot, ArtifactRole::Image)
            .await?;
        tracing::debug!(stage = %PipelineStage::Stored, slot = %slot, "Artifacts stored");

        tracing::info!(
            stage = %PipelineStage::Responded,
            filename = %filename,
            slot = %slot,
            "Upload processed"
        );

        Ok(ProcessUploadResponse {
            filename,
            artifacts: StoredArtifacts {
                slot,
                audio_path,
                image_path,
            },
            text_result: result.generated_text,
        })
    }
}
