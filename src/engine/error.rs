// ==========================================
// 资源分配工作台 - 引擎层错误类型
// ==========================================
// 职责: 修复分派失败 / 目标记录不存在 / 调用方契约违反
// 红线: 数据质量问题一律是 Finding，不是错误
// ==========================================

use thiserror::Error;

use crate::domain::error::DomainError;
use crate::domain::types::{EntityType, FindingCategory};

/// 引擎层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("该问题不支持自动修复 (finding={finding_id}, category={category}): {reason}")]
    FixNotApplicable {
        finding_id: String,
        category: FindingCategory,
        reason: String,
    },

    #[error("目标记录不存在 ({entity_type} {entity_id})，请重新校验后再修复")]
    EntityNotFound {
        entity_type: EntityType,
        entity_id: String,
    },

    #[error(transparent)]
    Contract(#[from] DomainError),
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
