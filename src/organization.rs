use serde::Deserialize;
use serde_json::{json, Value};

use crate::entity::Editable;
use crate::utils::CertError;
use crate::validation::ValidationResult;

/// 证书关联机构（子实体）
///
/// 嵌入父证书载荷时只序列化缩减字段集（仅 `short_name`），
/// 且不携带父回链。
///
/// 机构自身的校验规则在上游始终处于待定状态，这里有意保持
/// 恒真校验，不杜撰必填语义（见 DESIGN.md）。
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Organization {
    /// 持久化 id，缺失表示尚未持久化
    #[serde(default)]
    pub id: Option<u64>,
    /// 机构短名（嵌入证书载荷的唯一字段）
    #[serde(default)]
    pub short_name: String,
    /// 机构全名
    #[serde(default)]
    pub long_name: String,
    /// 最近一次快照（不参与序列化）
    #[serde(skip)]
    original: Value,
}

impl Organization {
    /// 创建新的机构
    pub fn new(short_name: impl Into<String>, long_name: impl Into<String>) -> Self {
        let mut organization = Organization {
            id: None,
            short_name: short_name.into(),
            long_name: long_name.into(),
            original: Value::Null,
        };
        organization.snapshot();
        organization
    }

    /// 从载荷解析机构（缺失字段用默认值补齐）
    ///
    /// 同时接受完整载荷与缩减载荷（仅 `short_name`）。
    pub fn from_payload(payload: &Value) -> Result<Self, CertError> {
        let mut organization: Organization = serde_json::from_value(payload.clone())?;
        organization.snapshot();
        Ok(organization)
    }

    /// 序列化为完整载荷
    pub fn payload(&self) -> Value {
        json!({
            "id": self.id,
            "short_name": self.short_name,
            "long_name": self.long_name,
        })
    }

    /// 序列化为缩减载荷（嵌入父证书时使用）
    pub fn reduced_payload(&self) -> Value {
        json!({ "short_name": self.short_name })
    }
}

impl Editable for Organization {
    fn snapshot(&mut self) {
        self.original = self.payload();
    }

    fn revert(&mut self) -> Result<(), CertError> {
        let restored = Self::from_payload(&self.original.clone())?;
        *self = restored;
        Ok(())
    }

    fn validate(&self) -> ValidationResult {
        // 机构校验有意缺省
        Ok(())
    }

    fn is_new(&self) -> bool {
        self.id.is_none()
    }

    fn is_dirty(&self) -> bool {
        self.payload() != self.original
    }
}
