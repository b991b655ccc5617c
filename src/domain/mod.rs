// ==========================================
// 资源分配工作台 - 领域模型层
// ==========================================
// 职责: 实体仓、校验结果、业务规则、优先级权重、分配结果
// 红线: 不含引擎逻辑，不含 I/O
// ==========================================

pub mod allocation;
pub mod entity;
pub mod error;
pub mod finding;
pub mod priority;
pub mod rule;
pub mod types;

// 重导出核心类型
pub use allocation::{
    AllocationResult, OptimizationDeltas, OptimizationResult, SimulationReport, SkippedRule,
};
pub use entity::{Client, EntityStore, IntField, Task, Worker};
pub use error::{DomainError, DomainResult};
pub use finding::{Finding, ValidationSummary, STRUCTURE_ENTITY_ID};
pub use priority::{Criterion, Preset, PriorityWeights, CUSTOM_PRESET};
pub use rule::{PatternAction, PatternField, Rule, RuleBody, RuleKind, RuleSet, SlotTarget};
pub use types::{EntityType, ErrorClass, FindingCategory, Severity, StressLevel};
