//! Upload Context - Value Objects

/// 允许上传的扩展名（小写，不含点）
///
/// 只检查客户端提供的文件名，不做内容嗅探或 MIME 检查
pub const ALLOWED_EXTENSIONS: &[&str] = &[
    "txt", "pdf", "png", "jpg", "jpeg", "gif", "mp3", "mp4", "wav",
];

/// 判断文件名的扩展名是否在允许列表中
///
/// 取最后一个 `.` 之后的部分并转小写；没有 `.` 的文件名一律拒绝
pub fn is_allowed(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| {
            let ext = ext.to_lowercase();
            ALLOWED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// 上传的参考音频文件
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// 客户端提供的原始文件名（可能为空）
    pub filename: String,
    /// 文件内容
    pub data: Vec<u8>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
        }
    }
}

/// 请求校验结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadVerdict {
    /// 缺少 file 或 text
    Missing,
    /// 文件名为空
    EmptyFilename,
    /// 扩展名不在允许列表中
    DisallowedExtension,
    /// 通过
    Valid,
}

impl UploadVerdict {
    /// 对请求形态做分类，无副作用
    pub fn classify(file: Option<&UploadedFile>, text: Option<&str>) -> Self {
        let (file, _text) = match (file, text) {
            (Some(file), Some(text)) => (file, text),
            _ => return Self::Missing,
        };

        if file.filename.is_empty() {
            return Self::EmptyFilename;
        }

        if !is_allowed(&file.filename) {
            return Self::DisallowedExtension;
        }

        Self::Valid
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// 返回给客户端的错误信息，`Valid` 时为 None
    pub fn rejection_message(&self) -> Option<&'static str> {
        match self {
            Self::Missing => Some("File or text input missing"),
            Self::EmptyFilename => Some("No file selected"),
            Self::DisallowedExtension => Some("File type not allowed"),
            Self::Valid => None,
        }
    }
}
