use thiserror::Error;

/// 自定义错误类型
#[derive(Error, Debug)]
pub enum CertError {
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("New certificate requires at least one signatory")]
    EmptySignatories,

    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// 判断字符串去除首尾空白后是否为空
///
/// 表单字段的"必填"语义以此为准：仅包含空白字符的输入视为未填写。
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// 截断过长字符串用于展示（报告输出）
pub fn truncate_for_display(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{}...", truncated)
    } else {
        text.to_string()
    }
}
