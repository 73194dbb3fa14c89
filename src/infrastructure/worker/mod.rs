//! Worker Layer - Background Task Processing
//!
//! 实现 RetentionWorker，定期清理过期的上传和结果

mod retention_worker;

pub use retention_worker::{RetentionReport, RetentionWorker, RetentionWorkerConfig};
