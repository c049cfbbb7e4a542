/// 校验失败的出错位置
///
/// 校验失败以结构化数据返回（消息 + 出错位置），永远不会抛出，
/// 由调用方决定如何向用户呈现。字段级错误与子关系级错误是不同的
/// 变体，便于界面精确定位反馈。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// 单个字段不合法
    Field(&'static str),
    /// 跨字段约束不满足（如课程 key 组合长度限制）
    Fields(&'static [&'static str]),
    /// 子关系中存在未通过自身校验的子实体
    Relation(&'static str),
}

/// 单次校验失败
///
/// `message` 面向用户，`kind` 面向程序（定位出错字段/关系）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// 人类可读的错误消息
    pub message: String,
    /// 出错位置
    pub kind: ValidationErrorKind,
}

pub type ValidationResult = Result<(), ValidationError>;

impl ValidationError {
    /// 创建字段级错误
    pub fn field(name: &'static str, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ValidationErrorKind::Field(name),
        }
    }

    /// 创建跨字段错误
    pub fn fields(names: &'static [&'static str], message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ValidationErrorKind::Fields(names),
        }
    }

    /// 创建子关系级错误
    pub fn relation(name: &'static str, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ValidationErrorKind::Relation(name),
        }
    }

    /// 获取涉及的字段/关系名称列表
    pub fn offending_names(&self) -> Vec<&'static str> {
        match self.kind {
            ValidationErrorKind::Field(name) => vec![name],
            ValidationErrorKind::Fields(names) => names.to_vec(),
            ValidationErrorKind::Relation(name) => vec![name],
        }
    }

    /// 是否为子关系级错误
    pub fn is_relation_error(&self) -> bool {
        matches!(self.kind, ValidationErrorKind::Relation(_))
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.offending_names().join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_error() {
        let err = ValidationError::field("name", "Certificate name is required.");
        assert_eq!(err.offending_names(), vec!["name"]);
        assert!(!err.is_relation_error());
        assert_eq!(err.to_string(), "Certificate name is required. (name)");
    }

    #[test]
    fn test_relation_error() {
        let err = ValidationError::relation("signatories", "Signatory field(s) has invalid data.");
        assert!(err.is_relation_error());
        assert_eq!(err.offending_names(), vec!["signatories"]);
    }

    #[test]
    fn test_fields_error() {
        let err = ValidationError::fields(&["org", "number", "run"], "too long");
        assert_eq!(err.offending_names(), vec!["org", "number", "run"]);
    }
}
