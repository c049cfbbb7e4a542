/// 可编辑实体协议
///
/// 该模块定义表单驱动记录的统一编辑协议：快照/回退/校验。
/// 遵循"修改-保存分离"原则，所有修改仅发生在内存中，
/// 快照基线只在显式操作（构造、`snapshot`、持久化成功）时推进。
///
/// # 状态机
///
/// ```text
/// New --(persist 成功)--> Saved
/// Saved --(修改)--> Dirty --(persist 成功)--> Saved
///                   Dirty --(revert)-------> Saved
/// ```
///
/// `validate` 可在任意状态调用，且从不改变状态。

use crate::utils::CertError;
use crate::validation::ValidationResult;

/// 实体的编辑状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityState {
    /// 尚未持久化（无 id）
    New,
    /// 当前状态与快照一致
    Saved,
    /// 当前状态偏离快照
    Dirty,
}

impl std::fmt::Display for EntityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityState::New => write!(f, "new"),
            EntityState::Saved => write!(f, "saved"),
            EntityState::Dirty => write!(f, "dirty"),
        }
    }
}

/// 可编辑实体 trait
///
/// # 职责
/// - `snapshot`: 记录当前序列化状态作为回退点（含递归快照子实体）
/// - `revert`: 用快照重建当前状态，重走与构造相同的解析路径，幂等
/// - `validate`: 纯函数校验，可重复调用，不产生副作用
pub trait Editable {
    /// 记录当前状态为回退基线
    fn snapshot(&mut self);

    /// 回退到最近一次快照
    ///
    /// # 行为
    /// 连续调用两次与调用一次等价（幂等）。
    fn revert(&mut self) -> Result<(), CertError>;

    /// 校验当前状态
    fn validate(&self) -> ValidationResult;

    /// 是否尚未持久化
    fn is_new(&self) -> bool;

    /// 当前状态是否偏离快照
    fn is_dirty(&self) -> bool;

    /// 校验是否通过
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// 计算当前编辑状态
    fn state(&self) -> EntityState {
        if self.is_new() {
            EntityState::New
        } else if self.is_dirty() {
            EntityState::Dirty
        } else {
            EntityState::Saved
        }
    }
}
