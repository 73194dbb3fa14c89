//! Upload Context - 上传请求限界上下文
//!
//! 职责:
//! - 请求形态校验（file + text、文件名、扩展名白名单）
//! - 文件名清洗

mod filename;
mod value_objects;

pub use filename::secure_filename;
pub use value_objects::{is_allowed, UploadVerdict, UploadedFile, ALLOWED_EXTENSIONS};
