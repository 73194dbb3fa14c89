//! Upload Context - 文件名清洗
//!
//! 规则：
//! 1. NFKD 分解后丢弃非 ASCII 字符（`é` → `e`）
//! 2. 路径分隔符 `/` 替换为空白，`\` 按普通字符在第 4 步丢弃
//! 3. 连续空白折叠为单个 `_`
//! 4. 仅保留 `[A-Za-z0-9_.-]`
//! 5. 去掉首尾的 `.` 和 `_`
//!
//! 结果可能为空字符串，由调用方决定如何处理

use unicode_normalization::UnicodeNormalization;

/// 清洗客户端提供的文件名，使其可以安全地作为暂存目录下的文件名
pub fn secure_filename(filename: &str) -> String {
    let ascii: String = filename
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' { ' ' } else { c })
        .collect();

    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");

    let stripped: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();

    stripped.trim_matches(|c| c == '.' || c == '_').to_string()
}
