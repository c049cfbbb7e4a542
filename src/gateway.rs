/// 持久化网关抽象层 - trait 定义
///
/// 该模块定义证书/课程持久化的抽象接口，支持依赖注入和测试 mock。
/// 网关只负责传输与后端应答，不负责实体状态管理；超时、重试等
/// 传输层关注点也属于网关实现，不属于实体层。

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;

/// 网关错误
///
/// `message` 为后端返回的错误消息原文，实体层原样向调用方转发，
/// 不做改写。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct GatewayError {
    pub message: String,
}

impl GatewayError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// 网关成功应答
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayResponse {
    /// 持久化 id（create 应答必含；update 应答可缺省）
    pub id: Option<u64>,
    /// 后端回显的载荷
    pub body: Value,
}

/// 证书持久化网关 trait
///
/// # 职责
/// - `create`: 首次持久化，应答携带新分配的 id
/// - `update`: 按 id 更新已持久化实体
///
/// # 实现示例
/// ```rust,ignore
/// use certificate_editor::{CertificateGateway, GatewayError, GatewayResponse};
///
/// struct HttpGateway { base_url: String }
/// impl CertificateGateway for HttpGateway {
///     fn create(&self, payload: &Value) -> Result<GatewayResponse, GatewayError> {
///         // POST {base_url}/certificates
///         todo!()
///     }
///     fn update(&self, id: u64, payload: &Value) -> Result<GatewayResponse, GatewayError> {
///         // POST {base_url}/certificates/{id}
///         todo!()
///     }
/// }
/// ```
pub trait CertificateGateway {
    /// 创建新证书
    fn create(&self, payload: &Value) -> Result<GatewayResponse, GatewayError>;

    /// 更新已有证书
    fn update(&self, id: u64, payload: &Value) -> Result<GatewayResponse, GatewayError>;
}

/// 课程创建应答：后端返回跳转地址
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseCreated {
    pub url: String,
}

/// 课程创建网关 trait
pub trait CourseGateway {
    /// 创建课程
    ///
    /// # 返回
    /// 成功时返回跳转地址；失败时错误消息来自后端原文。
    fn create_course(&self, payload: &Value) -> Result<CourseCreated, GatewayError>;
}

/// 内存网关实现
///
/// 顺序分配 id，载荷存于内存。用于命令行演示和测试，
/// 不产生任何网络调用。
#[derive(Debug)]
pub struct InMemoryGateway {
    next_id: Cell<u64>,
    certificates: RefCell<HashMap<u64, Value>>,
    course_keys: RefCell<Vec<String>>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(1),
            certificates: RefCell::new(HashMap::new()),
            course_keys: RefCell::new(Vec::new()),
        }
    }

    /// 已存储的证书数量
    pub fn certificate_count(&self) -> usize {
        self.certificates.borrow().len()
    }

    /// 获取指定证书的已存载荷副本
    pub fn stored_certificate(&self, id: u64) -> Option<Value> {
        self.certificates.borrow().get(&id).cloned()
    }

    fn allocate_id(&self) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    fn course_key(payload: &Value) -> (String, String, String) {
        // 缺失字段按空串处理，key 仍可构造
        let field = |name: &str| {
            payload
                .get(name)
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string()
        };
        (field("org"), field("number"), field("run"))
    }
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl CertificateGateway for InMemoryGateway {
    fn create(&self, payload: &Value) -> Result<GatewayResponse, GatewayError> {
        let id = self.allocate_id();
        let mut body = payload.clone();
        if let Value::Object(map) = &mut body {
            map.insert("id".to_string(), id.into());
        }
        self.certificates.borrow_mut().insert(id, body.clone());
        Ok(GatewayResponse { id: Some(id), body })
    }

    fn update(&self, id: u64, payload: &Value) -> Result<GatewayResponse, GatewayError> {
        let mut store = self.certificates.borrow_mut();
        if !store.contains_key(&id) {
            return Err(GatewayError::new(format!(
                "Certificate with id {} does not exist.",
                id
            )));
        }
        store.insert(id, payload.clone());
        Ok(GatewayResponse {
            id: Some(id),
            body: payload.clone(),
        })
    }
}

impl CourseGateway for InMemoryGateway {
    fn create_course(&self, payload: &Value) -> Result<CourseCreated, GatewayError> {
        let (org, number, run) = Self::course_key(payload);
        let key = format!("course-v1:{}+{}+{}", org, number, run);

        let mut keys = self.course_keys.borrow_mut();
        if keys.contains(&key) {
            return Err(GatewayError::new(
                "There is already a course defined with the same organization and course number.",
            ));
        }
        keys.push(key.clone());

        Ok(CourseCreated {
            url: format!("/course/{}", key),
        })
    }
}

/// 固定失败网关：任何调用都返回给定错误消息
///
/// 用于测试持久化失败路径（失败时实体状态必须保持不变）。
#[derive(Debug, Clone)]
pub struct RejectingGateway {
    pub message: String,
}

impl RejectingGateway {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl CertificateGateway for RejectingGateway {
    fn create(&self, _payload: &Value) -> Result<GatewayResponse, GatewayError> {
        Err(GatewayError::new(self.message.clone()))
    }

    fn update(&self, _id: u64, _payload: &Value) -> Result<GatewayResponse, GatewayError> {
        Err(GatewayError::new(self.message.clone()))
    }
}

impl CourseGateway for RejectingGateway {
    fn create_course(&self, _payload: &Value) -> Result<CourseCreated, GatewayError> {
        Err(GatewayError::new(self.message.clone()))
    }
}
