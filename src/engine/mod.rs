// ==========================================
// 资源分配工作台 - 引擎层
// ==========================================
// 职责: 校验 / 自动修复 / 分配仿真 / 优化
// 红线: 引擎无状态、无 I/O，输入快照输出新值
// 红线: 数据质量问题输出 Finding，规则问题输出跳过报告
// ==========================================

pub mod auto_fix;
pub mod error;
pub mod optimizer;
pub mod simulator;
pub mod validation;

// 重导出核心引擎
pub use auto_fix::{AutoFixEngine, FixBatchReport, FixFailure};
pub use error::{EngineError, EngineResult};
pub use optimizer::{OptimizationObjective, Optimizer};
pub use simulator::AllocationSimulator;
pub use validation::{entity_label, ValidationEngine};
