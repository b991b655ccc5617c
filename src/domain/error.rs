// ==========================================
// 资源分配工作台 - 领域层错误类型
// ==========================================
// 职责: 调用方契约违反（与数据质量 Finding 严格区分）
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 领域层错误类型（调用方编程错误）
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("criteriaOrder 必须是 8 个评价维度的完整排列: {0}")]
    InvalidCriteriaOrder(String),

    #[error("权重超出范围 (维度 {criterion}): {weight} 不在 [0, 100]")]
    WeightOutOfRange { criterion: String, weight: u32 },

    #[error("未知预设: {0}")]
    UnknownPreset(String),
}

/// Result 类型别名
pub type DomainResult<T> = Result<T, DomainError>;
