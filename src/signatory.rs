use serde::Deserialize;
use serde_json::{json, Value};

use crate::entity::Editable;
use crate::utils::{is_blank, CertError};
use crate::validation::{ValidationError, ValidationResult};

/// 签署人姓名最大长度（字符数）
pub const SIGNATORY_NAME_MAX: usize = 40;
/// 签署人头衔最大长度（字符数）
pub const SIGNATORY_TITLE_MAX: usize = 40;

/// 证书签署人（子实体）
///
/// 证书的子实体之一。持久化时序列化**全部**字段，并通过
/// `certificate` 字段以 id 方式回链父证书（非拥有引用，仅用于导航）。
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Signatory {
    /// 持久化 id，缺失表示尚未持久化
    #[serde(default)]
    pub id: Option<u64>,
    /// 父证书 id 回链
    #[serde(default, rename = "certificate")]
    pub certificate_id: Option<u64>,
    /// 姓名
    #[serde(default)]
    pub name: String,
    /// 头衔
    #[serde(default)]
    pub title: String,
    /// 所属机构
    #[serde(default)]
    pub organization: String,
    /// 签名图片路径
    #[serde(default)]
    pub signature_image_path: String,
    /// 最近一次快照（不参与序列化）
    #[serde(skip)]
    original: Value,
}

impl Signatory {
    /// 创建新的签署人
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        let mut signatory = Signatory {
            id: None,
            certificate_id: None,
            name: name.into(),
            title: title.into(),
            organization: String::new(),
            signature_image_path: String::new(),
            original: Value::Null,
        };
        signatory.snapshot();
        signatory
    }

    /// 创建归属于指定证书的默认签署人
    ///
    /// 用于新证书的子实体播种：字段全部为默认值，仅携带父回链。
    pub fn default_for(certificate_id: Option<u64>) -> Self {
        let mut signatory = Self::new("", "");
        signatory.certificate_id = certificate_id;
        signatory.snapshot();
        signatory
    }

    /// 从载荷解析签署人（缺失字段用默认值补齐）
    pub fn from_payload(payload: &Value) -> Result<Self, CertError> {
        let mut signatory: Signatory = serde_json::from_value(payload.clone())?;
        signatory.snapshot();
        Ok(signatory)
    }

    /// 序列化为载荷（全部字段 + 父回链）
    pub fn payload(&self) -> Value {
        json!({
            "id": self.id,
            "certificate": self.certificate_id,
            "name": self.name,
            "title": self.title,
            "organization": self.organization,
            "signature_image_path": self.signature_image_path,
        })
    }
}

impl Editable for Signatory {
    fn snapshot(&mut self) {
        self.original = self.payload();
    }

    fn revert(&mut self) -> Result<(), CertError> {
        let restored = Self::from_payload(&self.original.clone())?;
        *self = restored;
        Ok(())
    }

    fn validate(&self) -> ValidationResult {
        if is_blank(&self.name) {
            return Err(ValidationError::field("name", "Signatory name is required."));
        }
        if self.name.chars().count() > SIGNATORY_NAME_MAX {
            return Err(ValidationError::field(
                "name",
                format!(
                    "Signatory name is too long (maximum {} characters).",
                    SIGNATORY_NAME_MAX
                ),
            ));
        }
        if self.title.chars().count() > SIGNATORY_TITLE_MAX {
            return Err(ValidationError::field(
                "title",
                format!(
                    "Signatory title is too long (maximum {} characters).",
                    SIGNATORY_TITLE_MAX
                ),
            ));
        }
        Ok(())
    }

    fn is_new(&self) -> bool {
        self.id.is_none()
    }

    fn is_dirty(&self) -> bool {
        self.payload() != self.original
    }
}
