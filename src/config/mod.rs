// ==========================================
// 资源分配工作台 - 配置层
// ==========================================
// 职责: 引擎阈值与系数的加载与覆写
// 存储: 内存 key-value（可从 JSON 文档加载）
// ==========================================

pub mod config_manager;
pub mod thresholds;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigError, ConfigManager, ConfigScope};
pub use thresholds::{OptimizerFactors, SimulationThresholds, ValidationThresholds};
