//! Result Context - Value Objects

use std::path::{Path, PathBuf};

/// 结果目录名前缀
pub const SLOT_DIR_PREFIX: &str = "result_";

/// 公开访问结果文件的 URL 前缀
pub const RESULTS_URL_PREFIX: &str = "/results";

/// 结果槽位 - 一次成功合成对应的结果目录 `result_<N>`
///
/// 不变量:
/// - index 从 1 开始
/// - 目录中只存放一份音频和一份图片
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResultSlot(u64);

impl ResultSlot {
    pub fn new(index: u64) -> Self {
        Self(index)
    }

    pub fn index(&self) -> u64 {
        self.0
    }

    /// 下一个槽位
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// 目录名，例如 `result_3`
    pub fn dir_name(&self) -> String {
        format!("{}{}", SLOT_DIR_PREFIX, self.0)
    }

    /// 从目录名解析槽位，非 `result_<N>` 形式返回 None
    pub fn from_dir_name(name: &str) -> Option<Self> {
        name.strip_prefix(SLOT_DIR_PREFIX)
            .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|digits| digits.parse().ok())
            .map(Self)
    }

    /// 槽位在结果根目录下的路径
    pub fn dir_in(&self, results_root: &Path) -> PathBuf {
        results_root.join(self.dir_name())
    }

    /// 某个产物的公开 URL 路径
    pub fn public_path(&self, role: ArtifactRole) -> String {
        format!(
            "{}/{}/{}",
            RESULTS_URL_PREFIX,
            self.dir_name(),
            role.file_name()
        )
    }
}

impl std::fmt::Display for ResultSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dir_name())
    }
}

/// 产物角色，决定槽位内的固定文件名
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactRole {
    Audio,
    Image,
}

impl ArtifactRole {
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Audio => "audio_result.wav",
            Self::Image => "image_result.png",
        }
    }
}

impl std::fmt::Display for ArtifactRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Audio => write!(f, "audio"),
            Self::Image => write!(f, "image"),
        }
    }
}

/// 已落盘的一组结果
#[derive(Debug, Clone)]
pub struct StoredArtifacts {
    pub slot: ResultSlot,
    pub audio_path: PathBuf,
    pub image_path: PathBuf,
}

impl StoredArtifacts {
    pub fn audio_public_path(&self) -> String {
        self.slot.public_path(ArtifactRole::Audio)
    }

    pub fn image_public_path(&self) -> String {
        self.slot.public_path(ArtifactRole::Image)
    }
}

/// 根据扩展名推断 Content-Type
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match ext.as_deref() {
        Some("wav") => "audio/wav",
        Some("mp3") => "audio/mpeg",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}
