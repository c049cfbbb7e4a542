use serde::Deserialize;
use serde_json::{json, Value};

use crate::entity::{Editable, EntityState};
use crate::gateway::CertificateGateway;
use crate::organization::Organization;
use crate::signatory::Signatory;
use crate::utils::{is_blank, CertError};
use crate::validation::{ValidationError, ValidationResult};

/// 签署人子关系名
pub const SIGNATORIES_RELATION: &str = "signatories";
/// 机构子关系名
pub const ORGANIZATIONS_RELATION: &str = "organizations";

fn default_honor_code_disclaimer() -> String {
    "Honor Code Disclaimer".to_string()
}

fn default_name() -> String {
    "Name of the certificate".to_string()
}

fn default_description() -> String {
    "Description of the certificate".to_string()
}

fn default_version() -> u32 {
    1
}

/// 证书属性集
///
/// 字段按用途分三组（与表单展示对应）：
/// - 表单中展示的元数据：`course_title`、`course_description`、
///   `show_grade`、`honor_code_disclaimer`
/// - 暂未在表单中展示的元数据：`name`、`description`
/// - 仅内部使用：`version`、`is_active`
///
/// 通过 serde 字段默认值实现"默认值打底、部分载荷覆盖"的合并语义，
/// 构造、回退与网关载荷解析共用这一条解析路径。
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CertificateAttributes {
    #[serde(default)]
    pub course_title: String,
    #[serde(default)]
    pub course_description: String,
    #[serde(default)]
    pub show_grade: bool,
    #[serde(default = "default_honor_code_disclaimer")]
    pub honor_code_disclaimer: String,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_description")]
    pub description: String,
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub is_active: bool,
}

impl Default for CertificateAttributes {
    fn default() -> Self {
        CertificateAttributes {
            course_title: String::new(),
            course_description: String::new(),
            show_grade: false,
            honor_code_disclaimer: default_honor_code_disclaimer(),
            name: default_name(),
            description: default_description(),
            version: default_version(),
            is_active: false,
        }
    }
}

/// 证书构造选项
#[derive(Debug, Clone, Copy, Default)]
pub struct CertificateOptions {
    /// 为新证书播种一个默认签署人
    pub seed_default_signatory: bool,
    /// 允许新证书不携带任何签署人
    pub allow_empty_children: bool,
}

/// 课程证书（父实体）
///
/// # 核心特性
/// - **快照/回退**: 快照基线只在构造、显式 `snapshot`、持久化成功时推进
/// - **嵌套子实体**: 按值独占持有签署人与机构，子实体以 id 回链父证书
/// - **纯校验**: `validate` 无副作用，可在任意状态重复调用
///
/// # 使用示例
///
/// ```rust,ignore
/// use certificate_editor::{Certificate, CertificateOptions, Editable, InMemoryGateway};
/// use serde_json::json;
///
/// let mut certificate = Certificate::new(
///     json!({"name": "Intro to X"}),
///     CertificateOptions { seed_default_signatory: true, ..Default::default() },
/// )?;
///
/// certificate.signatories_mut()[0].name = "Jane Doe".to_string();
/// certificate.validate()?;
///
/// let gateway = InMemoryGateway::new();
/// certificate.persist(&gateway)?;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Certificate {
    id: Option<u64>,
    pub attributes: CertificateAttributes,
    signatories: Vec<Signatory>,
    organizations: Vec<Organization>,
    /// 最近一次快照（构造时写入，之后只在显式操作时推进）
    original: Value,
    allow_empty_children: bool,
}

/// 一次载荷解析的结果（构造与回退共用）
struct ParsedPayload {
    id: Option<u64>,
    attributes: CertificateAttributes,
    signatories: Vec<Signatory>,
    organizations: Vec<Organization>,
}

impl Certificate {
    /// 创建证书
    ///
    /// # 参数
    /// * `initial` - 初始属性载荷（可部分，缺失字段用默认值补齐；
    ///   可携带 `id`、`signatories`、`organizations`）
    /// * `options` - 构造选项
    ///
    /// # 行为
    /// - 默认值打底，`initial` 覆盖
    /// - `seed_default_signatory` 且当前无签署人时，播种恰好一个默认签署人
    /// - 新证书（无 id）必须至少有一个签署人，除非 `allow_empty_children`
    /// - 返回前记录快照
    pub fn new(initial: Value, options: CertificateOptions) -> Result<Self, CertError> {
        let parsed = Self::parse_payload(&initial)?;

        let mut certificate = Certificate {
            id: parsed.id,
            attributes: parsed.attributes,
            signatories: parsed.signatories,
            organizations: parsed.organizations,
            original: Value::Null,
            allow_empty_children: options.allow_empty_children,
        };

        if options.seed_default_signatory && certificate.signatories.is_empty() {
            certificate
                .signatories
                .push(Signatory::default_for(certificate.id));
        }

        if certificate.id.is_none()
            && certificate.signatories.is_empty()
            && !options.allow_empty_children
        {
            return Err(CertError::EmptySignatories);
        }

        certificate.snapshot();
        Ok(certificate)
    }

    /// 从持久化载荷创建证书
    pub fn from_payload(payload: Value) -> Result<Self, CertError> {
        Self::new(
            payload,
            CertificateOptions {
                seed_default_signatory: false,
                allow_empty_children: true,
            },
        )
    }

    /// 解析证书载荷（构造与回退共用的唯一解析路径）
    fn parse_payload(payload: &Value) -> Result<ParsedPayload, CertError> {
        let object = payload
            .as_object()
            .ok_or_else(|| CertError::InvalidPayload("certificate payload must be an object".to_string()))?;

        let id = match object.get("id") {
            None | Some(Value::Null) => None,
            Some(value) => Some(value.as_u64().ok_or_else(|| {
                CertError::InvalidPayload("certificate id must be a non-negative integer".to_string())
            })?),
        };

        // 未知键（id、子关系）会被 serde 忽略，属性缺失用默认值补齐
        let attributes: CertificateAttributes = serde_json::from_value(payload.clone())?;

        let signatories = match object.get(SIGNATORIES_RELATION) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(Signatory::from_payload)
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => {
                return Err(CertError::InvalidPayload(
                    "signatories must be an array".to_string(),
                ))
            }
        };

        let organizations = match object.get(ORGANIZATIONS_RELATION) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(Organization::from_payload)
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => {
                return Err(CertError::InvalidPayload(
                    "organizations must be an array".to_string(),
                ))
            }
        };

        Ok(ParsedPayload {
            id,
            attributes,
            signatories,
            organizations,
        })
    }

    /// 持久化 id
    pub fn id(&self) -> Option<u64> {
        self.id
    }

    /// 签署人列表
    pub fn signatories(&self) -> &[Signatory] {
        &self.signatories
    }

    /// 签署人列表（可变）
    pub fn signatories_mut(&mut self) -> &mut Vec<Signatory> {
        &mut self.signatories
    }

    /// 机构列表
    pub fn organizations(&self) -> &[Organization] {
        &self.organizations
    }

    /// 机构列表（可变）
    pub fn organizations_mut(&mut self) -> &mut Vec<Organization> {
        &mut self.organizations
    }

    /// 追加签署人并写入父回链
    pub fn add_signatory(&mut self, mut signatory: Signatory) {
        signatory.certificate_id = self.id;
        self.signatories.push(signatory);
    }

    /// 追加机构
    pub fn add_organization(&mut self, organization: Organization) {
        self.organizations.push(organization);
    }

    /// 序列化为内部载荷（快照与脏检查使用）
    ///
    /// 与网关载荷的区别：子实体全部以完整字段序列化，保证回退无损。
    pub fn payload(&self) -> Value {
        let mut payload = self.attributes_payload();
        if let Value::Object(map) = &mut payload {
            map.insert(
                SIGNATORIES_RELATION.to_string(),
                Value::Array(self.signatories.iter().map(Signatory::payload).collect()),
            );
            map.insert(
                ORGANIZATIONS_RELATION.to_string(),
                Value::Array(self.organizations.iter().map(Organization::payload).collect()),
            );
        }
        payload
    }

    /// 序列化为网关载荷
    ///
    /// 签署人序列化全部字段并以 id 回链父证书；机构只序列化缩减
    /// 字段集（`short_name`），不携带父回链。
    pub fn gateway_payload(&self) -> Value {
        let mut payload = self.attributes_payload();
        if let Value::Object(map) = &mut payload {
            map.insert(
                SIGNATORIES_RELATION.to_string(),
                Value::Array(self.signatories.iter().map(Signatory::payload).collect()),
            );
            map.insert(
                ORGANIZATIONS_RELATION.to_string(),
                Value::Array(
                    self.organizations
                        .iter()
                        .map(Organization::reduced_payload)
                        .collect(),
                ),
            );
        }
        payload
    }

    fn attributes_payload(&self) -> Value {
        json!({
            "id": self.id,
            "course_title": self.attributes.course_title,
            "course_description": self.attributes.course_description,
            "show_grade": self.attributes.show_grade,
            "honor_code_disclaimer": self.attributes.honor_code_disclaimer,
            "name": self.attributes.name,
            "description": self.attributes.description,
            "version": self.attributes.version,
            "is_active": self.attributes.is_active,
        })
    }

    /// 持久化到网关
    ///
    /// # 行为
    /// - 无 id 走 `create`，有 id 走 `update`
    /// - 成功：新实体采用应答中的 id，签署人父回链同步，随后推进快照
    /// - 失败：本地状态不发生任何改变，网关错误消息原样上抛
    ///
    /// 除构造与显式 `snapshot` 外，这是唯一推进快照基线的路径。
    pub fn persist(&mut self, gateway: &dyn CertificateGateway) -> Result<(), CertError> {
        let payload = self.gateway_payload();

        let response = match self.id {
            None => gateway.create(&payload),
            Some(id) => gateway.update(id, &payload),
        }
        .map_err(|error| CertError::Gateway(error.message))?;

        if self.id.is_none() {
            let id = response.id.ok_or_else(|| {
                CertError::Gateway("create response did not contain an id".to_string())
            })?;
            self.id = Some(id);
        }

        for signatory in &mut self.signatories {
            signatory.certificate_id = self.id;
        }

        self.snapshot();
        Ok(())
    }

    /// 证书统计信息
    pub fn stats(&self) -> CertificateStats {
        CertificateStats {
            name: self.attributes.name.clone(),
            state: self.state(),
            is_active: self.attributes.is_active,
            version: self.attributes.version,
            signatory_count: self.signatories.len(),
            organization_count: self.organizations.len(),
        }
    }
}

impl Editable for Certificate {
    fn snapshot(&mut self) {
        // 先递归快照子实体，再记录父载荷
        for signatory in &mut self.signatories {
            signatory.snapshot();
        }
        for organization in &mut self.organizations {
            organization.snapshot();
        }
        self.original = self.payload();
    }

    fn revert(&mut self) -> Result<(), CertError> {
        let parsed = Self::parse_payload(&self.original.clone())?;
        self.id = parsed.id;
        self.attributes = parsed.attributes;
        self.signatories = parsed.signatories;
        self.organizations = parsed.organizations;
        Ok(())
    }

    fn validate(&self) -> ValidationResult {
        if is_blank(&self.attributes.name) {
            return Err(ValidationError::field(
                "name",
                "Certificate name is required.",
            ));
        }

        let all_signatories_valid = self.signatories.iter().all(|signatory| signatory.is_valid());
        if !all_signatories_valid {
            // 父实体只指认出错关系，具体原因由调用方逐个检查子实体
            return Err(ValidationError::relation(
                SIGNATORIES_RELATION,
                "Signatory field(s) has invalid data.",
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

/// 证书统计信息
#[derive(Debug, Clone)]
pub struct CertificateStats {
    pub name: String,
    pub state: EntityState,
    pub is_active: bool,
    pub version: u32,
    pub signatory_count: usize,
    pub organization_count: usize,
}

impl std::fmt::Display for CertificateStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== 证书统计 ===")?;
        writeln!(f, "名称: {}", self.name)?;
        writeln!(f, "状态: {}", self.state)?;
        writeln!(f, "已激活: {}", self.is_active)?;
        writeln!(f, "版本: {}", self.version)?;
        writeln!(f, "签署人数量: {}", self.signatory_count)?;
        writeln!(f, "机构数量: {}", self.organization_count)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{InMemoryGateway, RejectingGateway};
    use crate::validation::ValidationErrorKind;
    use serde_json::json;

    fn seeded_options() -> CertificateOptions {
        CertificateOptions {
            seed_default_signatory: true,
            allow_empty_children: false,
        }
    }

    fn valid_certificate() -> Certificate {
        let mut certificate =
            Certificate::new(json!({"name": "Intro to X"}), seeded_options()).unwrap();
        certificate.signatories_mut()[0].name = "Jane Doe".to_string();
        certificate.snapshot();
        certificate
    }

    #[test]
    fn test_defaults_merge() {
        let certificate = Certificate::new(json!({"name": "Intro to X"}), seeded_options()).unwrap();

        // 提供的字段覆盖默认值
        assert_eq!(certificate.attributes.name, "Intro to X");
        // 缺失字段保持默认值
        assert_eq!(
            certificate.attributes.description,
            "Description of the certificate"
        );
        assert_eq!(
            certificate.attributes.honor_code_disclaimer,
            "Honor Code Disclaimer"
        );
        assert_eq!(certificate.attributes.version, 1);
        assert!(!certificate.attributes.is_active);
        assert_eq!(certificate.attributes.course_title, "");
    }

    #[test]
    fn test_seed_creates_exactly_one_signatory() {
        let certificate = Certificate::new(json!({"name": "Intro to X"}), seeded_options()).unwrap();
        assert_eq!(certificate.signatories().len(), 1);
    }

    #[test]
    fn test_new_without_children_rejected() {
        let result = Certificate::new(json!({"name": "Intro to X"}), CertificateOptions::default());
        assert!(matches!(result, Err(CertError::EmptySignatories)));

        // 显式允许空子关系时放行
        let certificate = Certificate::new(
            json!({"name": "Intro to X"}),
            CertificateOptions {
                seed_default_signatory: false,
                allow_empty_children: true,
            },
        )
        .unwrap();
        assert!(certificate.signatories().is_empty());
    }

    #[test]
    fn test_blank_name_fails_validation() {
        let certificate = Certificate::new(json!({"name": ""}), seeded_options()).unwrap();
        let err = certificate.validate().unwrap_err();
        assert_eq!(err.message, "Certificate name is required.");
        assert_eq!(err.kind, ValidationErrorKind::Field("name"));
    }

    #[test]
    fn test_invalid_signatory_reported_as_relation() {
        // 播种出的默认签署人姓名为空，自身校验不通过
        let certificate = Certificate::new(json!({"name": "Intro to X"}), seeded_options()).unwrap();
        let err = certificate.validate().unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::Relation(SIGNATORIES_RELATION));
        assert_eq!(err.message, "Signatory field(s) has invalid data.");

        // 具体原因由子实体自述
        let child_err = certificate.signatories()[0].validate().unwrap_err();
        assert_eq!(child_err.message, "Signatory name is required.");
    }

    #[test]
    fn test_valid_certificate_passes() {
        let certificate = valid_certificate();
        assert!(certificate.validate().is_ok());
    }

    #[test]
    fn test_validate_is_pure() {
        let certificate = valid_certificate();
        let before = certificate.clone();
        for _ in 0..3 {
            let _ = certificate.validate();
        }
        assert_eq!(certificate, before);
    }

    #[test]
    fn test_revert_restores_snapshot() {
        let mut certificate = valid_certificate();

        certificate.attributes.name = "Renamed".to_string();
        certificate.attributes.is_active = true;
        certificate.signatories_mut()[0].title = "Dean".to_string();
        certificate.add_organization(Organization::new("MITx", "MIT Online"));
        assert!(certificate.is_dirty());

        certificate.revert().unwrap();
        assert_eq!(certificate.attributes.name, "Intro to X");
        assert!(!certificate.attributes.is_active);
        assert_eq!(certificate.signatories()[0].title, "");
        assert!(certificate.organizations().is_empty());
        assert!(!certificate.is_dirty());
    }

    #[test]
    fn test_revert_is_idempotent() {
        let mut certificate = valid_certificate();
        certificate.attributes.name = "Renamed".to_string();

        certificate.revert().unwrap();
        let once = certificate.clone();
        certificate.revert().unwrap();
        assert_eq!(certificate, once);
    }

    #[test]
    fn test_persist_new_assigns_id_and_snapshots() {
        let gateway = InMemoryGateway::new();
        let mut certificate = valid_certificate();
        assert_eq!(certificate.state(), EntityState::New);

        certificate.persist(&gateway).unwrap();

        assert_eq!(certificate.id(), Some(1));
        assert_eq!(certificate.state(), EntityState::Saved);
        // 签署人父回链已同步
        assert_eq!(certificate.signatories()[0].certificate_id, Some(1));

        // 持久化成功后快照已推进，回退是空操作
        let before = certificate.clone();
        certificate.revert().unwrap();
        assert_eq!(certificate, before);
    }

    #[test]
    fn test_persist_update_path() {
        let gateway = InMemoryGateway::new();
        let mut certificate = valid_certificate();
        certificate.persist(&gateway).unwrap();

        certificate.attributes.name = "Renamed".to_string();
        assert_eq!(certificate.state(), EntityState::Dirty);

        certificate.persist(&gateway).unwrap();
        assert_eq!(certificate.state(), EntityState::Saved);
        assert_eq!(certificate.id(), Some(1));

        let stored = gateway.stored_certificate(1).unwrap();
        assert_eq!(stored["name"], json!("Renamed"));
    }

    #[test]
    fn test_persist_failure_leaves_state_untouched() {
        let gateway = RejectingGateway::new("datastore unavailable");
        let mut certificate = valid_certificate();
        certificate.attributes.name = "Renamed".to_string();
        let before = certificate.clone();

        let err = certificate.persist(&gateway).unwrap_err();
        match err {
            CertError::Gateway(message) => assert_eq!(message, "datastore unavailable"),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(certificate, before);
        assert_eq!(certificate.state(), EntityState::New);
    }

    #[test]
    fn test_gateway_payload_contract() {
        let mut certificate = valid_certificate();
        certificate.add_organization(Organization::new("MITx", "MIT Online"));

        let gateway = InMemoryGateway::new();
        certificate.persist(&gateway).unwrap();
        let payload = certificate.gateway_payload();

        // 签署人：全部字段 + 父回链
        let signatory = &payload["signatories"][0];
        assert_eq!(signatory["certificate"], json!(1));
        assert_eq!(signatory["name"], json!("Jane Doe"));
        assert!(signatory.get("signature_image_path").is_some());

        // 机构：仅缩减字段集，无父回链
        let organization = &payload["organizations"][0];
        assert_eq!(organization, &json!({"short_name": "MITx"}));
    }

    #[test]
    fn test_from_payload_roundtrip() {
        let payload = json!({
            "id": 42,
            "name": "Intro to X",
            "is_active": true,
            "signatories": [
                {"id": 7, "certificate": 42, "name": "Jane Doe", "title": "Dean"}
            ],
            "organizations": [
                {"short_name": "MITx"}
            ]
        });

        let certificate = Certificate::from_payload(payload).unwrap();
        assert_eq!(certificate.id(), Some(42));
        assert_eq!(certificate.state(), EntityState::Saved);
        assert_eq!(certificate.signatories()[0].certificate_id, Some(42));
        assert_eq!(certificate.organizations()[0].short_name, "MITx");
    }

    #[test]
    fn test_invalid_payload_rejected() {
        assert!(matches!(
            Certificate::from_payload(json!("not an object")),
            Err(CertError::InvalidPayload(_))
        ));
        assert!(matches!(
            Certificate::from_payload(json!({"id": -3})),
            Err(CertError::InvalidPayload(_))
        ));
        assert!(matches!(
            Certificate::from_payload(json!({"name": "X", "signatories": "oops"})),
            Err(CertError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_stats_display() {
        let certificate = valid_certificate();
        let stats = certificate.stats();
        assert_eq!(stats.signatory_count, 1);
        let rendered = stats.to_string();
        assert!(rendered.contains("Intro to X"));
        assert!(rendered.contains("签署人数量: 1"));
    }
}
