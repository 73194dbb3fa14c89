//! Result Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::ArtifactStorePort;
use crate::application::queries::result_queries::{GetResultFile, GetResultFileResponse};
use crate::domain::result::content_type_for;

/// GetResultFile Handler - 定位已落盘的结果文件
pub struct GetResultFileHandler {
    artifact_store: Arc<dyn ArtifactStorePort>,
}

impl GetResultFileHandler {
    pub fn new(artifact_store: Arc<dyn ArtifactStorePort>) -> Self {
        Self { artifact_store }
    }

    pub async fn handle(
        &self,
        query: GetResultFile,
    ) -> Result<GetResultFileResponse, ApplicationError> {
        let path = self.artifact_store.resolve(&query.path).await?;

        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| ApplicationError::not_found(format!("{}: {}", query.path, e)))?;

        Ok(GetResultFileResponse {
            content_type: content_type_for(&path),
            size: metadata.len(),
            path,
        })
    }
}
