use serde_json::json;

use crate::gateway::{CourseGateway, GatewayError};
use crate::utils::is_blank;
use crate::validation::ValidationError;

/// org+number+run 组合长度默认上限
pub const DEFAULT_KEY_LENGTH_LIMIT: usize = 65;

/// 课程创建表单字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseField {
    Name,
    Org,
    Number,
    Run,
}

impl CourseField {
    /// 字段名（与表单输入项一致）
    pub fn name(&self) -> &'static str {
        match self {
            CourseField::Name => "name",
            CourseField::Org => "org",
            CourseField::Number => "number",
            CourseField::Run => "run",
        }
    }
}

/// 组合长度约束涉及的字段
const KEY_FIELDS: &[&str] = &["org", "number", "run"];

/// 课程创建表单校验器
///
/// 对应课程创建（含新课程与重开课程）时的前端校验：
/// - 每个字段可独立标记为必填，必填字段去空白后不得为空
/// - org、number、run 的组合长度不得超过可配置的上限
///
/// 校验为纯函数；提交通过 `CourseGateway` 完成。
#[derive(Debug, Clone)]
pub struct CourseCreationForm {
    pub name: String,
    pub org: String,
    pub number: String,
    pub run: String,
    /// 标记为必填的字段
    pub required_fields: Vec<CourseField>,
    /// 组合长度上限
    pub key_length_limit: usize,
}

impl CourseCreationForm {
    /// 创建表单（四个字段全部必填，默认组合长度上限）
    pub fn new(
        name: impl Into<String>,
        org: impl Into<String>,
        number: impl Into<String>,
        run: impl Into<String>,
    ) -> Self {
        CourseCreationForm {
            name: name.into(),
            org: org.into(),
            number: number.into(),
            run: run.into(),
            required_fields: vec![
                CourseField::Name,
                CourseField::Org,
                CourseField::Number,
                CourseField::Run,
            ],
            key_length_limit: DEFAULT_KEY_LENGTH_LIMIT,
        }
    }

    /// 设置必填字段集合
    pub fn with_required_fields(mut self, fields: Vec<CourseField>) -> Self {
        self.required_fields = fields;
        self
    }

    /// 设置组合长度上限
    pub fn with_key_length_limit(mut self, limit: usize) -> Self {
        self.key_length_limit = limit;
        self
    }

    fn field_value(&self, field: CourseField) -> &str {
        match field {
            CourseField::Name => &self.name,
            CourseField::Org => &self.org,
            CourseField::Number => &self.number,
            CourseField::Run => &self.run,
        }
    }

    /// 组合 key 长度（org + number + run）
    pub fn key_length(&self) -> usize {
        self.org.chars().count() + self.number.chars().count() + self.run.chars().count()
    }

    /// 校验表单
    ///
    /// # 返回
    /// 所有失败项的列表，空列表表示通过。必填项失败为字段级错误；
    /// 组合长度失败为跨字段错误，消息中带入当前上限值。
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        for &field in &self.required_fields {
            if is_blank(self.field_value(field)) {
                errors.push(ValidationError::field(field.name(), "Required field."));
            }
        }

        if self.key_length() > self.key_length_limit {
            errors.push(ValidationError::fields(
                KEY_FIELDS,
                format!(
                    "The combined length of the organization, course number, and course run fields cannot be more than {} characters.",
                    self.key_length_limit
                ),
            ));
        }

        errors
    }

    /// 校验是否通过
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// 提交课程创建请求
    ///
    /// # 返回
    /// 成功时返回后端给出的跳转地址；失败时错误消息为后端原文。
    pub fn create(&self, gateway: &dyn CourseGateway) -> Result<String, GatewayError> {
        let payload = json!({
            "display_name": self.name,
            "org": self.org,
            "number": self.number,
            "run": self.run,
        });
        let created = gateway.create_course(&payload)?;
        Ok(created.url)
    }
}
