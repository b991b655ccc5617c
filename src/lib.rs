// ==========================================
// 资源分配工作台 - 核心库
// ==========================================
// 系统定位: 决策支持（校验 → 修复 → 仿真 → 优化 → 导出）
// 红线: 核心引擎为纯函数，无 I/O；导入与导出在边界完成
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 校验 / 修复 / 仿真 / 优化
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 阈值与系数
pub mod config;

// 日志系统
pub mod logging;

// API 层 - 会话接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{EntityType, ErrorClass, FindingCategory, Severity, StressLevel};

// 领域实体
pub use domain::{
    AllocationResult, Client, EntityStore, Finding, IntField, OptimizationResult,
    PriorityWeights, Rule, RuleBody, RuleSet, Task, ValidationSummary, Worker,
};

// 引擎
pub use engine::{AllocationSimulator, AutoFixEngine, Optimizer, ValidationEngine};

// API
pub use api::{AllocationSession, ConfigExport};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "资源分配工作台";
