/// 日期格式指令翻译模块
///
/// 后端下发 strftime 风格的日期格式（`%Y %y %m %d %b %B`），
/// 日期选择控件使用自己的指令词汇（`yy y mm dd M MM`）。
/// 本模块做一对一的指令翻译，并组装控件的默认配置。

use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use serde_json::{Map, Value};

/// 默认日期格式（未配置时使用）
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// 指令翻译表：strftime 指令 -> 控件指令
const DIRECTIVE_TRANSLATION: &[(&str, &str)] = &[
    ("%Y", "yy"),
    ("%y", "y"),
    ("%m", "mm"),
    ("%d", "dd"),
    ("%b", "M"),  // 月份短名，随语言环境
    ("%B", "MM"), // 月份全名，随语言环境
];

/// 将 strftime 风格格式串翻译为控件格式串
///
/// 翻译表之外的字符原样保留。替换结果不含 `%`，因此各条替换互不干扰。
///
/// # 示例
/// ```rust,ignore
/// assert_eq!(translate_directive_format("%Y-%m-%d"), "yy-mm-dd");
/// ```
pub fn translate_directive_format(format: &str) -> String {
    let mut translated = format.to_string();
    for (directive, widget) in DIRECTIVE_TRANSLATION {
        translated = translated.replace(directive, widget);
    }
    translated
}

/// 用给定日期渲染 strftime 格式串（命令行预览用）
///
/// # 返回
/// 格式串含无法识别的指令时返回 None。
pub fn sample_render(format: &str, date: NaiveDate) -> Option<String> {
    let items: Vec<Item> = StrftimeItems::new(format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return None;
    }
    Some(date.format_with_items(items.into_iter()).to_string())
}

/// 日期选择控件默认配置
///
/// 由翻译后的格式串与调用方附加的默认项合并而成，
/// 序列化后整体交给控件。
#[derive(Debug, Clone, PartialEq)]
pub struct DatePickerDefaults {
    /// 控件词汇的日期格式
    pub date_format: String,
    /// 附加默认项（原样透传给控件）
    pub extra: Map<String, Value>,
}

impl DatePickerDefaults {
    /// 从 strftime 格式串构建
    pub fn from_directive_format(format: &str) -> Self {
        DatePickerDefaults {
            date_format: translate_directive_format(format),
            extra: Map::new(),
        }
    }

    /// 附加一项控件默认配置
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// 序列化为控件配置对象
    pub fn to_config(&self) -> Value {
        let mut config = Map::new();
        config.insert(
            "dateFormat".to_string(),
            Value::String(self.date_format.clone()),
        );
        for (key, value) in &self.extra {
            config.insert(key.clone(), value.clone());
        }
        Value::Object(config)
    }
}

impl Default for DatePickerDefaults {
    fn default() -> Self {
        Self::from_directive_format(DEFAULT_DATE_FORMAT)
    }
}
