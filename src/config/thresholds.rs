// ==========================================
// 资源分配工作台 - 引擎阈值参数
// ==========================================
// 职责: 校验洞察比例、压力阈值、优化系数（均带默认值）
// ==========================================

use serde::{Deserialize, Serialize};

/// 校验引擎阈值（启发式洞察）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidationThresholds {
    /// 高优先级客户数 / 员工数 超过该比例时提示
    pub high_priority_client_ratio: f64,

    /// 判定"高优先级"的最低 PriorityLevel
    pub high_priority_level: i64,

    /// 低技能员工占比超过该比例时提示
    pub low_skill_worker_ratio: f64,

    /// 技能数 <= 该值视为低技能
    pub low_skill_max_count: usize,

    /// 可用阶段数少于 MaxLoadPerPhase 的员工占比超过该比例时提示
    pub overcommitted_worker_ratio: f64,
}

impl Default for ValidationThresholds {
    fn default() -> Self {
        Self {
            high_priority_client_ratio: 0.5,
            high_priority_level: 4,
            low_skill_worker_ratio: 0.3,
            low_skill_max_count: 2,
            overcommitted_worker_ratio: 0.3,
        }
    }
}

/// 仿真器阈值（压力判定）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimulationThresholds {
    pub stress_high_ratio: f64,
    pub stress_medium_ratio: f64,
}

impl Default for SimulationThresholds {
    fn default() -> Self {
        Self {
            stress_high_ratio: 0.8,
            stress_medium_ratio: 0.6,
        }
    }
}

/// 优化器系数（示意性启发式，非求解器）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OptimizerFactors {
    /// cost 目标: 负载削减比例
    pub cost_workload_reduction: f64,

    /// cost 目标: 效率放大系数
    pub cost_efficiency_factor: f64,

    /// priority 目标: 效率加分
    pub priority_efficiency_boost: u32,

    /// priority 目标: 判定"高优先级客户"的最低 PriorityLevel
    pub high_priority_level: i64,
}

impl Default for OptimizerFactors {
    fn default() -> Self {
        Self {
            cost_workload_reduction: 0.15,
            cost_efficiency_factor: 1.15,
            priority_efficiency_boost: 15,
            high_priority_level: 4,
        }
    }
}
