//! Domain Layer - 领域层
//!
//! 包含三个限界上下文:
//! - Upload Context: 上传校验与文件名清洗
//! - Synthesis Context: 远程合成参数与结果
//! - Result Context: 结果槽位与产物命名

pub mod result;
pub mod synthesis;
pub mod upload;
