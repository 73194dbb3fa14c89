//! Storage Adapter - 文件系统存储实现

mod file_artifact_store;
mod file_upload_staging;

pub use file_artifact_store::FileArtifactStore;
pub use file_upload_staging::FileUploadStaging;
