/// 文件 IO 模块
///
/// 命令行工具的输入输出：读取证书载荷 JSON 文件、写出校验报告。
/// 仅负责 IO，不做实体语义解析。

use std::path::Path;

use serde_json::Value;

use crate::utils::CertError;

/// 读取证书载荷文件
///
/// # 参数
/// * `path` - JSON 文件路径，内容为单个载荷对象或载荷对象数组
///
/// # 返回
/// 载荷列表（单个对象包装为单元素列表）
pub fn load_certificate_payloads(path: &Path) -> Result<Vec<Value>, CertError> {
    let text = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&text)?;

    match value {
        Value::Array(items) => Ok(items),
        object @ Value::Object(_) => Ok(vec![object]),
        _ => Err(CertError::InvalidPayload(
            "certificate file must contain an object or an array of objects".to_string(),
        )),
    }
}

/// 写出报告文件（JSON）
pub fn write_report(path: &Path, report: &Value) -> Result<(), CertError> {
    let text = serde_json::to_string_pretty(report)?;
    std::fs::write(path, text)?;
    Ok(())
}
